// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The `watch` command: follow one board until interrupted.

use std::sync::Arc;

use tack_core::{EventName, ServerMessage};
use tack_sync::{
    listener, AuthState, Credential, SessionBinder, SyncClient, SyncConfig, SyncNotification,
};
use tracing::info;

use crate::error::{Error, Result};

pub async fn run(
    config: SyncConfig,
    board: &str,
    token: Credential,
    presence: bool,
) -> Result<()> {
    let mut binder = SessionBinder::new(SyncClient::new(config)?);

    let printer = listener(move |msg| {
        if presence || !msg.name().is_presence() {
            println!("{}", describe(msg));
        }
        Ok(())
    });
    for event in EventName::ALL {
        binder.client_mut().on(event, Arc::clone(&printer));
    }

    if let Some(first) = binder.set_auth(AuthState::SignedIn(token)).await? {
        report(&first);
    }
    binder.join_board(board).await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                binder.set_auth(AuthState::SignedOut).await?;
                return Ok(());
            }
            notification = binder.next_event() => match notification {
                Some(SyncNotification::Ended(end)) => return Err(Error::SessionEnded(end)),
                Some(notification) => report(&notification),
                None => return Ok(()),
            }
        }
    }
}

fn report(notification: &SyncNotification) {
    if let Some(line) = status(notification) {
        eprintln!("{}", line);
    }
}

/// Status line for connection changes; `None` for events.
pub fn status(notification: &SyncNotification) -> Option<String> {
    match notification {
        SyncNotification::Connected { reconnect: false } => Some("connected".to_string()),
        SyncNotification::Connected { reconnect: true } => Some("reconnected".to_string()),
        SyncNotification::RetryScheduled { attempt, delay } => Some(format!(
            "connection lost, retrying in {}ms (attempt {})",
            delay.as_millis(),
            attempt
        )),
        SyncNotification::Ended(end) => Some(end.to_string()),
        SyncNotification::Event(_) => None,
    }
}

/// One-line human description of an inbound event.
pub fn describe(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::BoardUpdated(board) => {
            format!("board {} updated: {}", board.id, board.title)
        }
        ServerMessage::TaskCreated(task) => format!(
            "task {} created in {}: {}",
            task.id, task.column_id, task.title
        ),
        ServerMessage::TaskUpdated(task) => format!("task {} updated: {}", task.id, task.title),
        ServerMessage::TaskDeleted(id) => format!("task {} deleted", id),
        ServerMessage::TaskMoved {
            task_id,
            from_column_id,
            to_column_id,
            position,
        } => format!(
            "task {} moved {} -> {} at {}",
            task_id, from_column_id, to_column_id, position
        ),
        ServerMessage::ColumnCreated(column) => {
            format!("column {} created: {}", column.id, column.title)
        }
        ServerMessage::ColumnUpdated(column) => {
            format!("column {} updated: {}", column.id, column.title)
        }
        ServerMessage::ColumnDeleted(id) => format!("column {} deleted", id),
        ServerMessage::UserJoined(user) => {
            format!("{} joined", user.name.as_deref().unwrap_or(&user.id))
        }
        ServerMessage::UserLeft(id) => format!("{} left", id),
        ServerMessage::UserCursor(cursor) => {
            format!("{} cursor at ({}, {})", cursor.user_id, cursor.x, cursor.y)
        }
        ServerMessage::UsersOnline(users) => {
            let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
            format!("online: {}", ids.join(", "))
        }
        ServerMessage::ChatMessage(message) => {
            format!("<{}> {}", message.user_id, message.content)
        }
        ServerMessage::ChatTyping(typing) => format!(
            "{} is typing",
            typing.user_name.as_deref().unwrap_or(&typing.user_id)
        ),
        ServerMessage::ChatStopTyping(id) => format!("{} stopped typing", id),
        ServerMessage::Error(error) => match &error.code {
            Some(code) => format!("server error [{}]: {}", code, error.message),
            None => format!("server error: {}", error.message),
        },
        ServerMessage::Notification(note) => format!("[{}] {}", note.kind, note.message),
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
