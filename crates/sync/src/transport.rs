// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for WebSocket communication.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! A transport holds at most one open handle. Opening again discards the
//! previous handle first, and sending on a closed handle is a no-op.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tack_core::protocol::{ClientMessage, ServerMessage};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection attempt did not finish in time.
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// No configured mechanism is supported by this transport.
    #[error("no supported transport mechanism in {0:?}")]
    Unsupported(Vec<Mechanism>),

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// An inbound frame was not a known event. The connection stays usable.
    #[error("undecodable frame: {0}")]
    Decode(String),

    /// Serialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Opaque session token presented when the connection is opened.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Credential::new(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Credential(token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Low-level connection mechanism, in the order the client prefers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mechanism {
    /// Full-duplex socket.
    WebSocket,
    /// HTTP long-polling fallback.
    Polling,
}

/// Options applied when opening a handle.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOptions {
    /// Maximum time to wait for the handshake.
    pub connect_timeout: Duration,
    /// Mechanisms ordered by preference.
    pub mechanisms: Vec<Mechanism>,
    /// Always open a fresh handle instead of resuming an existing one.
    pub force_new: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions {
            connect_timeout: Duration::from_secs(20),
            mechanisms: vec![Mechanism::WebSocket, Mechanism::Polling],
            force_new: true,
        }
    }
}

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server deliberately ended the session (e.g. revoked token).
    ServerDisconnect,
    /// The connection closed without a deliberate server decision.
    TransportClose {
        /// Close code, if the peer sent one.
        code: Option<u16>,
    },
    /// The connection broke.
    TransportError(String),
}

impl DisconnectReason {
    /// True when the server ended the session on purpose; such sessions are not retried.
    pub fn is_deliberate(&self) -> bool {
        matches!(self, DisconnectReason::ServerDisconnect)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::ServerDisconnect => f.write_str("server disconnect"),
            DisconnectReason::TransportClose { code: Some(code) } => {
                write!(f, "transport close (code {})", code)
            }
            DisconnectReason::TransportClose { code: None } => f.write_str("transport close"),
            DisconnectReason::TransportError(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// What `recv` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    /// An inbound event.
    Message(ServerMessage),
    /// The handle is gone.
    Closed(DisconnectReason),
}

/// Transport trait for WebSocket-like communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send {
    /// Open a handle to `url`, authenticating with `credential` during the handshake.
    fn open(
        &mut self,
        url: &str,
        credential: &Credential,
        options: &TransportOptions,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Close the handle, if any.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Send a message to the server. No-op when closed.
    fn send(
        &mut self,
        msg: ClientMessage,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Wait for the next inbound message or the end of the connection.
    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<TransportSignal>> + Send + '_>>;

    /// Check if a handle is open.
    fn is_open(&self) -> bool;
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// WebSocket transport implementation using tokio-tungstenite.
pub struct WebSocketTransport {
    /// The WebSocket connection, if connected.
    ws: Option<WebSocketConnection>,
}

/// Internal WebSocket connection wrapper.
struct WebSocketConnection {
    sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport { ws: None }
    }

    /// Mechanisms this transport can open.
    pub const SUPPORTED: &'static [Mechanism] = &[Mechanism::WebSocket];
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the first mechanism in preference order that `supported` contains.
pub fn select_mechanism(preferred: &[Mechanism], supported: &[Mechanism]) -> Option<Mechanism> {
    preferred.iter().copied().find(|m| supported.contains(m))
}

/// Maps a close frame from the server to a disconnect reason.
///
/// Normal (1000) and policy (1008) closes are deliberate; going-away,
/// abnormal and everything else are treated as transient.
pub fn close_reason(code: Option<u16>) -> DisconnectReason {
    match code {
        Some(1000) | Some(1008) => DisconnectReason::ServerDisconnect,
        code => DisconnectReason::TransportClose { code },
    }
}

impl Transport for WebSocketTransport {
    fn open(
        &mut self,
        url: &str,
        credential: &Credential,
        options: &TransportOptions,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let url = url.to_string();
        let token = credential.expose().to_string();
        let options = options.clone();
        Box::pin(async move {
            use futures_util::{SinkExt, StreamExt};
            use tokio_tungstenite::tungstenite::client::IntoClientRequest;
            use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};

            if self.ws.is_some() && !options.force_new {
                return Ok(());
            }
            if let Some(mut old) = self.ws.take() {
                let _ = old.sink.close().await;
            }

            if select_mechanism(&options.mechanisms, Self::SUPPORTED).is_none() {
                return Err(TransportError::Unsupported(options.mechanisms));
            }

            let mut request = url
                .into_client_request()
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, bearer);

            let (ws_stream, _) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                use futures_util::SinkExt;
                ws.sink
                    .close()
                    .await
                    .map_err(|e| TransportError::SendFailed(e.to_string()))?;
            }
            Ok(())
        })
    }

    fn send(
        &mut self,
        msg: ClientMessage,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::Message;

            let Some(ws) = self.ws.as_mut() else {
                return Ok(());
            };

            let json = msg
                .to_json()
                .map_err(|e| TransportError::SerializationError(e.to_string()))?;

            if let Err(e) = ws.sink.send(Message::Text(json.into())).await {
                // Connection is broken, clear it
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }

            Ok(())
        })
    }

    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<TransportSignal>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return ServerMessage::from_json(&text)
                            .map(TransportSignal::Message)
                            .map_err(|e| TransportError::Decode(e.to_string()));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        self.ws = None;
                        let code = frame.map(|f| u16::from(f.code));
                        return Ok(TransportSignal::Closed(close_reason(code)));
                    }
                    Some(Ok(_)) => {
                        // Ping/pong, binary and raw frames carry no events
                        continue;
                    }
                    Some(Err(e)) => {
                        self.ws = None;
                        return Ok(TransportSignal::Closed(DisconnectReason::TransportError(
                            e.to_string(),
                        )));
                    }
                    None => {
                        self.ws = None;
                        return Ok(TransportSignal::Closed(DisconnectReason::TransportClose {
                            code: None,
                        }));
                    }
                }
            }
        })
    }

    fn is_open(&self) -> bool {
        self.ws.is_some()
    }
}
