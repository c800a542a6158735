// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the WebSocket transport against an in-process server.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tack_core::{ClientMessage, EventName, ServerMessage};
use tack_sync::{listener, ConnectionState, SessionEnd, SyncClient, SyncConfig, SyncNotification};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Accept one WebSocket connection, returning it with its Authorization header.
async fn accept(listener: &TcpListener) -> (WebSocketStream<TcpStream>, Option<String>) {
    let (stream, _) = listener.accept().await.expect("accept tcp");
    let auth = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&auth);
    let ws = tokio_tungstenite::accept_hdr_async(stream, move |req: &Request, resp: Response| {
        *seen.lock().unwrap() = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok::<_, ErrorResponse>(resp)
    })
    .await
    .expect("websocket handshake");
    let header = auth.lock().unwrap().take();
    (ws, header)
}

async fn bind() -> (TcpListener, SyncConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut config = SyncConfig::new(format!("ws://{}", addr));
    config.connect_timeout_ms = 2_000;
    config.reconnect.base_delay_ms = 20;
    config.reconnect.max_delay_ms = 200;
    (listener, config)
}

async fn next_client_message(ws: &mut WebSocketStream<TcpStream>) -> ClientMessage {
    loop {
        match ws.next().await.expect("client frame").expect("read frame") {
            Message::Text(text) => return ClientMessage::from_json(&text).unwrap(),
            Message::Close(_) => panic!("client closed the connection"),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_session_over_websocket() {
    let (tcp, config) = bind().await;

    let server = tokio::spawn(async move {
        let (mut ws, auth) = accept(&tcp).await;
        assert_eq!(auth.as_deref(), Some("Bearer T1"));

        ws.send(Message::Text(
            r#"{"event":"users:online","data":[{"id":"alice"},"bob"]}"#.into(),
        ))
        .await
        .unwrap();

        let join = next_client_message(&mut ws).await;
        assert_eq!(join, ClientMessage::BoardJoin("b1".into()));

        ws.send(Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "session revoked".into(),
        })))
        .await
        .unwrap();
        // Drain until the client acknowledges the close
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut client = SyncClient::new(config).unwrap();
    let online = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&online);
    client.on(
        EventName::UsersOnline,
        listener(move |msg| {
            if let ServerMessage::UsersOnline(users) = msg {
                sink.lock()
                    .unwrap()
                    .extend(users.iter().map(|u| u.id.clone()));
            }
            Ok(())
        }),
    );

    let connected = client.connect("T1").await.unwrap();
    assert_eq!(connected, SyncNotification::Connected { reconnect: false });
    assert!(client.is_connected());

    let event = client.next_event().await.unwrap();
    assert_eq!(event, SyncNotification::Event(EventName::UsersOnline));
    assert_eq!(*online.lock().unwrap(), ["alice", "bob"]);

    client.join_board("b1").await.unwrap();

    let ended = client.next_event().await.unwrap();
    assert_eq!(ended, SyncNotification::Ended(SessionEnd::ServerTerminated));
    assert_eq!(client.state(), ConnectionState::Idle);
    assert!(client.retry_deadline().is_none());

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server finished")
        .unwrap();
}

#[tokio::test]
async fn test_abrupt_drop_reconnects() {
    let (tcp, config) = bind().await;

    let server = tokio::spawn(async move {
        let (ws, _) = accept(&tcp).await;
        // Drop without a close frame
        drop(ws);

        let (mut ws, auth) = accept(&tcp).await;
        assert_eq!(auth.as_deref(), Some("Bearer T1"));
        ws.send(Message::Text(
            r#"{"event":"task:deleted","data":"t1"}"#.into(),
        ))
        .await
        .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut client = SyncClient::new(config).unwrap();
    client.connect("T1").await.unwrap();

    let dropped = client.next_event().await.unwrap();
    assert!(
        matches!(dropped, SyncNotification::RetryScheduled { attempt: 1, .. }),
        "got {dropped:?}"
    );

    let reconnected = client.next_event().await.unwrap();
    assert_eq!(reconnected, SyncNotification::Connected { reconnect: true });

    let event = client.next_event().await.unwrap();
    assert_eq!(event, SyncNotification::Event(EventName::TaskDeleted));

    client.cleanup().await;
    assert_eq!(client.state(), ConnectionState::Idle);

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server finished")
        .unwrap();
}

#[tokio::test]
async fn test_malformed_frame_is_skipped() {
    let (tcp, config) = bind().await;

    let server = tokio::spawn(async move {
        let (mut ws, _) = accept(&tcp).await;
        ws.send(Message::Text("not json".into())).await.unwrap();
        ws.send(Message::Text(r#"{"event":"board:exploded"}"#.into()))
            .await
            .unwrap();
        ws.send(Message::Text(
            r#"{"event":"column:deleted","data":"col-a"}"#.into(),
        ))
        .await
        .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut client = SyncClient::new(config).unwrap();
    client.connect("T1").await.unwrap();

    let event = client.next_event().await.unwrap();
    assert_eq!(event, SyncNotification::Event(EventName::ColumnDeleted));
    assert!(client.is_connected());

    client.disconnect().await;
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server finished")
        .unwrap();
}

#[tokio::test]
async fn test_unreachable_server_exhausts_retries() {
    // Bind then drop to get a port nothing listens on
    let (tcp, mut config) = bind().await;
    drop(tcp);
    config.reconnect.max_attempts = 2;

    let mut client = SyncClient::new(config).unwrap();
    let first = client.connect("T1").await.unwrap();
    assert!(matches!(first, SyncNotification::RetryScheduled { attempt: 1, .. }));

    let mut last = first;
    while let Some(notification) = client.next_event().await {
        last = notification;
    }
    assert_eq!(
        last,
        SyncNotification::Ended(SessionEnd::RetriesExhausted { attempts: 2 })
    );
}
