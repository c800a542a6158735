// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Board entities carried by inbound events and outbound commands.
//!
//! Field names are camelCase on the wire. Every entity keeps fields it does
//! not know about in `extra`, so a replica never drops data a newer server
//! sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Partial update: only the fields that changed.
pub type Updates = Map<String, Value>;

/// A shared board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Board {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Board {
            id: id.into(),
            title: title.into(),
            description: None,
            extra: Map::new(),
        }
    }
}

/// A column on a board. Tasks live in columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>, position: u32) -> Self {
        Column {
            id: id.into(),
            title: title.into(),
            position,
            color: None,
            extra: Map::new(),
        }
    }
}

/// A task card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub column_id: String,
    pub title: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        column_id: impl Into<String>,
        title: impl Into<String>,
        position: u32,
    ) -> Self {
        Task {
            id: id.into(),
            column_id: column_id.into(),
            title: title.into(),
            position,
            description: None,
            assignee_id: None,
            due_date: None,
            extra: Map::new(),
        }
    }
}

/// Payload of `task:create`. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub column_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

impl NewTask {
    pub fn new(column_id: impl Into<String>, title: impl Into<String>) -> Self {
        NewTask {
            column_id: column_id.into(),
            title: title.into(),
            position: None,
            description: None,
            assignee_id: None,
        }
    }
}

/// Payload of `column:create`. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewColumn {
    pub board_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl NewColumn {
    pub fn new(board_id: impl Into<String>, title: impl Into<String>) -> Self {
        NewColumn {
            board_id: board_id.into(),
            title: title.into(),
            position: None,
        }
    }
}

/// A user as seen by presence events.
///
/// Deserializes from a full object or from a bare user id string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "UserRepr")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        User {
            id: id.into(),
            name: None,
            avatar: None,
            extra: Map::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserRepr {
    Id(String),
    Full(UserFields),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserFields {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<UserRepr> for User {
    fn from(repr: UserRepr) -> Self {
        match repr {
            UserRepr::Id(id) => User::new(id),
            UserRepr::Full(fields) => User {
                id: fields.id,
                name: fields.name,
                avatar: fields.avatar,
                extra: fields.extra,
            },
        }
    }
}

/// Pointer position on the board canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Another user's cursor, as broadcast by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub user_id: String,
    pub x: f64,
    pub y: f64,
}

/// Payload of `chat:send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMessage {
    pub board_id: String,
    pub content: String,
}

impl NewChatMessage {
    pub fn new(board_id: impl Into<String>, content: impl Into<String>) -> Self {
        NewChatMessage {
            board_id: board_id.into(),
            content: content.into(),
        }
    }
}

/// A chat message as stored and broadcast by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who is typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingInfo {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// A user-facing notification pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "default_notification_kind")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_notification_kind() -> String {
    "info".to_string()
}

/// Application-level error reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
