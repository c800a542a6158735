// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::time::Duration;
use tack_core::{Cursor, ServerError, Task, TypingInfo, User};
use tack_sync::SessionEnd;
use yare::parameterized;

#[parameterized(
    deleted = { ServerMessage::TaskDeleted("t1".into()), "task t1 deleted" },
    left = { ServerMessage::UserLeft("bob".into()), "bob left" },
    stop_typing = { ServerMessage::ChatStopTyping("bob".into()), "bob stopped typing" },
    column_deleted = { ServerMessage::ColumnDeleted("col-a".into()), "column col-a deleted" },
    error = { ServerMessage::error("denied"), "server error: denied" },
)]
fn test_describe_id_events(msg: ServerMessage, expected: &str) {
    assert_eq!(describe(&msg), expected);
}

#[test]
fn test_describe_task_events() {
    let task = Task::new("t1", "col-a", "Write docs", 0);
    assert_eq!(
        describe(&ServerMessage::TaskCreated(task)),
        "task t1 created in col-a: Write docs"
    );
    let moved = ServerMessage::TaskMoved {
        task_id: "t1".into(),
        from_column_id: "col-a".into(),
        to_column_id: "col-b".into(),
        position: 2,
    };
    assert_eq!(describe(&moved), "task t1 moved col-a -> col-b at 2");
}

#[test]
fn test_describe_presence() {
    let mut alice = User::new("alice");
    alice.name = Some("Alice".into());
    assert_eq!(
        describe(&ServerMessage::UserJoined(alice.clone())),
        "Alice joined"
    );
    assert_eq!(
        describe(&ServerMessage::UsersOnline(vec![alice, User::new("bob")])),
        "online: alice, bob"
    );
    assert_eq!(
        describe(&ServerMessage::UserCursor(Cursor {
            user_id: "bob".into(),
            x: 1.5,
            y: 2.0
        })),
        "bob cursor at (1.5, 2)"
    );
    assert_eq!(
        describe(&ServerMessage::ChatTyping(TypingInfo {
            user_id: "bob".into(),
            user_name: None
        })),
        "bob is typing"
    );
}

#[test]
fn test_describe_coded_error() {
    let msg = ServerMessage::Error(ServerError {
        message: "no access".into(),
        code: Some("FORBIDDEN".into()),
    });
    assert_eq!(describe(&msg), "server error [FORBIDDEN]: no access");
}

#[test]
fn test_status_lines() {
    assert_eq!(
        status(&SyncNotification::Connected { reconnect: true }).as_deref(),
        Some("reconnected")
    );
    assert_eq!(
        status(&SyncNotification::RetryScheduled {
            attempt: 2,
            delay: Duration::from_millis(2000)
        })
        .as_deref(),
        Some("connection lost, retrying in 2000ms (attempt 2)")
    );
    assert_eq!(
        status(&SyncNotification::Ended(SessionEnd::RetriesExhausted {
            attempts: 5
        }))
        .as_deref(),
        Some("max reconnection attempts reached (5)")
    );
    assert_eq!(
        status(&SyncNotification::Event(EventName::TaskDeleted)),
        None
    );
}
