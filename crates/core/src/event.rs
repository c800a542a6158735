// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of event names used on the wire.
//!
//! Inbound names ([`EventName`]) are what listeners subscribe to. Outbound
//! names ([`CommandName`]) tag the commands a client sends. A few names
//! (`user:cursor`, `chat:typing`, `chat:stop-typing`) appear in both sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Name of an event sent from server to client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "board:updated")]
    BoardUpdated,
    #[serde(rename = "task:created")]
    TaskCreated,
    #[serde(rename = "task:updated")]
    TaskUpdated,
    #[serde(rename = "task:deleted")]
    TaskDeleted,
    #[serde(rename = "task:moved")]
    TaskMoved,
    #[serde(rename = "column:created")]
    ColumnCreated,
    #[serde(rename = "column:updated")]
    ColumnUpdated,
    #[serde(rename = "column:deleted")]
    ColumnDeleted,
    #[serde(rename = "user:joined")]
    UserJoined,
    #[serde(rename = "user:left")]
    UserLeft,
    #[serde(rename = "user:cursor")]
    UserCursor,
    #[serde(rename = "users:online")]
    UsersOnline,
    #[serde(rename = "chat:message")]
    ChatMessage,
    #[serde(rename = "chat:typing")]
    ChatTyping,
    #[serde(rename = "chat:stop-typing")]
    ChatStopTyping,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "notification")]
    Notification,
}

impl EventName {
    /// Every inbound event name, in wire-contract order.
    pub const ALL: [EventName; 17] = [
        EventName::BoardUpdated,
        EventName::TaskCreated,
        EventName::TaskUpdated,
        EventName::TaskDeleted,
        EventName::TaskMoved,
        EventName::ColumnCreated,
        EventName::ColumnUpdated,
        EventName::ColumnDeleted,
        EventName::UserJoined,
        EventName::UserLeft,
        EventName::UserCursor,
        EventName::UsersOnline,
        EventName::ChatMessage,
        EventName::ChatTyping,
        EventName::ChatStopTyping,
        EventName::Error,
        EventName::Notification,
    ];

    /// Returns the name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::BoardUpdated => "board:updated",
            EventName::TaskCreated => "task:created",
            EventName::TaskUpdated => "task:updated",
            EventName::TaskDeleted => "task:deleted",
            EventName::TaskMoved => "task:moved",
            EventName::ColumnCreated => "column:created",
            EventName::ColumnUpdated => "column:updated",
            EventName::ColumnDeleted => "column:deleted",
            EventName::UserJoined => "user:joined",
            EventName::UserLeft => "user:left",
            EventName::UserCursor => "user:cursor",
            EventName::UsersOnline => "users:online",
            EventName::ChatMessage => "chat:message",
            EventName::ChatTyping => "chat:typing",
            EventName::ChatStopTyping => "chat:stop-typing",
            EventName::Error => "error",
            EventName::Notification => "notification",
        }
    }

    /// Returns true for presence and chat signals that do not touch board data.
    pub fn is_presence(&self) -> bool {
        matches!(
            self,
            EventName::UserJoined
                | EventName::UserLeft
                | EventName::UserCursor
                | EventName::UsersOnline
                | EventName::ChatTyping
                | EventName::ChatStopTyping
        )
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EventName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_string()))
    }
}

/// Name of a command sent from client to server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    BoardJoin,
    BoardLeave,
    BoardUpdate,
    TaskCreate,
    TaskUpdate,
    TaskDelete,
    TaskMove,
    ColumnCreate,
    ColumnUpdate,
    ColumnDelete,
    ChatSend,
    ChatTyping,
    ChatStopTyping,
    UserCursor,
}

impl CommandName {
    /// Returns the name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::BoardJoin => "board:join",
            CommandName::BoardLeave => "board:leave",
            CommandName::BoardUpdate => "board:update",
            CommandName::TaskCreate => "task:create",
            CommandName::TaskUpdate => "task:update",
            CommandName::TaskDelete => "task:delete",
            CommandName::TaskMove => "task:move",
            CommandName::ColumnCreate => "column:create",
            CommandName::ColumnUpdate => "column:update",
            CommandName::ColumnDelete => "column:delete",
            CommandName::ChatSend => "chat:send",
            CommandName::ChatTyping => "chat:typing",
            CommandName::ChatStopTyping => "chat:stop-typing",
            CommandName::UserCursor => "user:cursor",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
