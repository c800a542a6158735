// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for client-server communication.
//!
//! Every frame is a JSON object tagged with the event name:
//!
//! ```text
//! {"event": "task:move", "data": {"taskId": "t1", "toColumnId": "c2", "position": 2}}
//! {"event": "chat:typing"}
//! ```
//!
//! - Client sends commands expressing an intent to mutate shared state
//! - Server broadcasts the resulting state changes and presence signals

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::{CommandName, EventName};
use crate::model::{
    Board, ChatMessage, Column, Cursor, NewChatMessage, NewColumn, NewTask, Notification, Point,
    ServerError, Task, TypingInfo, Updates, User,
};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Subscribe to a board's broadcasts.
    #[serde(rename = "board:join")]
    BoardJoin(String),

    #[serde(rename = "board:leave")]
    BoardLeave(String),

    #[serde(rename = "board:update")]
    BoardUpdate { board_id: String, updates: Updates },

    #[serde(rename = "task:create")]
    TaskCreate(NewTask),

    #[serde(rename = "task:update")]
    TaskUpdate { task_id: String, updates: Updates },

    #[serde(rename = "task:delete")]
    TaskDelete(String),

    /// Move a task to `position` within `to_column_id`.
    #[serde(rename = "task:move")]
    TaskMove {
        task_id: String,
        to_column_id: String,
        position: u32,
    },

    #[serde(rename = "column:create")]
    ColumnCreate(NewColumn),

    #[serde(rename = "column:update")]
    ColumnUpdate { column_id: String, updates: Updates },

    #[serde(rename = "column:delete")]
    ColumnDelete(String),

    #[serde(rename = "chat:send")]
    ChatSend(NewChatMessage),

    #[serde(rename = "chat:typing")]
    ChatTyping,

    #[serde(rename = "chat:stop-typing")]
    ChatStopTyping,

    #[serde(rename = "user:cursor")]
    UserCursor(Point),
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full board after an update.
    #[serde(rename = "board:updated")]
    BoardUpdated(Board),

    #[serde(rename = "task:created")]
    TaskCreated(Task),

    /// Full task after an update.
    #[serde(rename = "task:updated")]
    TaskUpdated(Task),

    /// Id of the deleted task.
    #[serde(rename = "task:deleted")]
    TaskDeleted(String),

    #[serde(rename = "task:moved")]
    TaskMoved {
        task_id: String,
        from_column_id: String,
        to_column_id: String,
        position: u32,
    },

    #[serde(rename = "column:created")]
    ColumnCreated(Column),

    #[serde(rename = "column:updated")]
    ColumnUpdated(Column),

    #[serde(rename = "column:deleted")]
    ColumnDeleted(String),

    #[serde(rename = "user:joined")]
    UserJoined(User),

    /// Id of the user who left.
    #[serde(rename = "user:left")]
    UserLeft(String),

    #[serde(rename = "user:cursor")]
    UserCursor(Cursor),

    /// Everyone currently online on the board. Replaces any earlier list.
    #[serde(rename = "users:online")]
    UsersOnline(Vec<User>),

    #[serde(rename = "chat:message")]
    ChatMessage(ChatMessage),

    #[serde(rename = "chat:typing")]
    ChatTyping(TypingInfo),

    /// Id of the user who stopped typing.
    #[serde(rename = "chat:stop-typing")]
    ChatStopTyping(String),

    /// Application-level error. Delivered like any other event.
    #[serde(rename = "error")]
    Error(ServerError),

    #[serde(rename = "notification")]
    Notification(Notification),
}

impl ClientMessage {
    /// Returns the wire name of this command.
    pub fn name(&self) -> CommandName {
        match self {
            ClientMessage::BoardJoin(_) => CommandName::BoardJoin,
            ClientMessage::BoardLeave(_) => CommandName::BoardLeave,
            ClientMessage::BoardUpdate { .. } => CommandName::BoardUpdate,
            ClientMessage::TaskCreate(_) => CommandName::TaskCreate,
            ClientMessage::TaskUpdate { .. } => CommandName::TaskUpdate,
            ClientMessage::TaskDelete(_) => CommandName::TaskDelete,
            ClientMessage::TaskMove { .. } => CommandName::TaskMove,
            ClientMessage::ColumnCreate(_) => CommandName::ColumnCreate,
            ClientMessage::ColumnUpdate { .. } => CommandName::ColumnUpdate,
            ClientMessage::ColumnDelete(_) => CommandName::ColumnDelete,
            ClientMessage::ChatSend(_) => CommandName::ChatSend,
            ClientMessage::ChatTyping => CommandName::ChatTyping,
            ClientMessage::ChatStopTyping => CommandName::ChatStopTyping,
            ClientMessage::UserCursor(_) => CommandName::UserCursor,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl ServerMessage {
    /// Returns the event name listeners subscribe to for this message.
    pub fn name(&self) -> EventName {
        match self {
            ServerMessage::BoardUpdated(_) => EventName::BoardUpdated,
            ServerMessage::TaskCreated(_) => EventName::TaskCreated,
            ServerMessage::TaskUpdated(_) => EventName::TaskUpdated,
            ServerMessage::TaskDeleted(_) => EventName::TaskDeleted,
            ServerMessage::TaskMoved { .. } => EventName::TaskMoved,
            ServerMessage::ColumnCreated(_) => EventName::ColumnCreated,
            ServerMessage::ColumnUpdated(_) => EventName::ColumnUpdated,
            ServerMessage::ColumnDeleted(_) => EventName::ColumnDeleted,
            ServerMessage::UserJoined(_) => EventName::UserJoined,
            ServerMessage::UserLeft(_) => EventName::UserLeft,
            ServerMessage::UserCursor(_) => EventName::UserCursor,
            ServerMessage::UsersOnline(_) => EventName::UsersOnline,
            ServerMessage::ChatMessage(_) => EventName::ChatMessage,
            ServerMessage::ChatTyping(_) => EventName::ChatTyping,
            ServerMessage::ChatStopTyping(_) => EventName::ChatStopTyping,
            ServerMessage::Error(_) => EventName::Error,
            ServerMessage::Notification(_) => EventName::Notification,
        }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error(ServerError {
            message: message.into(),
            code: None,
        })
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
