// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client-local replica of a shared board.
//!
//! Each connected client keeps one [`BoardReplica`] and feeds it every
//! inbound [`ServerMessage`]. Application is idempotent: "updated" events
//! carry the full entity and "deleted" events carry only the id, so applying
//! the same event twice leaves the replica unchanged the second time.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::model::{
    Board, ChatMessage, Column, Cursor, Notification, ServerError, Task, TypingInfo, User,
};
use crate::protocol::ServerMessage;

/// Maximum notifications retained; older ones are dropped first.
pub const MAX_NOTIFICATIONS: usize = 50;

/// Maximum chat messages retained; older ones are dropped first.
pub const MAX_MESSAGES: usize = 500;

/// Local copy of board, task, column, presence and chat state.
#[derive(Debug, Clone, Default)]
pub struct BoardReplica {
    board: Option<Board>,
    columns: BTreeMap<String, Column>,
    tasks: BTreeMap<String, Task>,
    online: BTreeMap<String, User>,
    cursors: BTreeMap<String, Cursor>,
    typing: BTreeMap<String, TypingInfo>,
    messages: VecDeque<ChatMessage>,
    message_ids: HashSet<String>,
    notifications: VecDeque<Notification>,
    last_error: Option<ServerError>,
}

impl BoardReplica {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an inbound event. Returns true if the replica changed.
    pub fn apply(&mut self, msg: &ServerMessage) -> bool {
        match msg {
            ServerMessage::BoardUpdated(board) => {
                if self.board.as_ref() == Some(board) {
                    return false;
                }
                self.board = Some(board.clone());
                true
            }
            ServerMessage::TaskCreated(task) | ServerMessage::TaskUpdated(task) => {
                upsert(&mut self.tasks, &task.id, task)
            }
            ServerMessage::TaskDeleted(task_id) => self.tasks.remove(task_id).is_some(),
            ServerMessage::TaskMoved {
                task_id,
                to_column_id,
                position,
                ..
            } => {
                // The source column is informational; the destination is authoritative.
                let Some(task) = self.tasks.get_mut(task_id) else {
                    return false;
                };
                if task.column_id == *to_column_id && task.position == *position {
                    return false;
                }
                task.column_id.clone_from(to_column_id);
                task.position = *position;
                true
            }
            ServerMessage::ColumnCreated(column) | ServerMessage::ColumnUpdated(column) => {
                upsert(&mut self.columns, &column.id, column)
            }
            ServerMessage::ColumnDeleted(column_id) => {
                let removed = self.columns.remove(column_id).is_some();
                let before = self.tasks.len();
                self.tasks.retain(|_, task| task.column_id != *column_id);
                removed || self.tasks.len() != before
            }
            ServerMessage::UserJoined(user) => upsert(&mut self.online, &user.id, user),
            ServerMessage::UserLeft(user_id) => self.forget_user(user_id),
            ServerMessage::UserCursor(cursor) => {
                upsert(&mut self.cursors, &cursor.user_id, cursor)
            }
            ServerMessage::UsersOnline(users) => {
                let online: BTreeMap<String, User> =
                    users.iter().map(|u| (u.id.clone(), u.clone())).collect();
                if online == self.online {
                    return false;
                }
                self.cursors.retain(|id, _| online.contains_key(id));
                self.typing.retain(|id, _| online.contains_key(id));
                self.online = online;
                true
            }
            ServerMessage::ChatMessage(message) => self.push_message(message),
            ServerMessage::ChatTyping(info) => upsert(&mut self.typing, &info.user_id, info),
            ServerMessage::ChatStopTyping(user_id) => self.typing.remove(user_id).is_some(),
            ServerMessage::Error(error) => {
                if self.last_error.as_ref() == Some(error) {
                    return false;
                }
                self.last_error = Some(error.clone());
                true
            }
            ServerMessage::Notification(notification) => self.push_notification(notification),
        }
    }

    fn forget_user(&mut self, user_id: &str) -> bool {
        let was_online = self.online.remove(user_id).is_some();
        let had_cursor = self.cursors.remove(user_id).is_some();
        let was_typing = self.typing.remove(user_id).is_some();
        was_online || had_cursor || was_typing
    }

    fn push_message(&mut self, message: &ChatMessage) -> bool {
        if !self.message_ids.insert(message.id.clone()) {
            return false;
        }
        self.messages.push_back(message.clone());
        while self.messages.len() > MAX_MESSAGES {
            if let Some(evicted) = self.messages.pop_front() {
                self.message_ids.remove(&evicted.id);
            }
        }
        true
    }

    fn push_notification(&mut self, notification: &Notification) -> bool {
        if let Some(id) = &notification.id {
            if self
                .notifications
                .iter()
                .any(|n| n.id.as_ref() == Some(id))
            {
                return false;
            }
        }
        self.notifications.push_back(notification.clone());
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        true
    }

    /// Drops all replicated state, e.g. when the session ends.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Tasks in a column, ordered by position then id.
    pub fn tasks_in_column(&self, column_id: &str) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| t.column_id == column_id)
            .collect();
        tasks.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        tasks
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.get(column_id)
    }

    /// Columns ordered by position then id.
    pub fn columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.values().collect();
        columns.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        columns
    }

    /// Ids of online users, sorted.
    pub fn online_user_ids(&self) -> Vec<&str> {
        self.online.keys().map(String::as_str).collect()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online.contains_key(user_id)
    }

    pub fn cursor(&self, user_id: &str) -> Option<&Cursor> {
        self.cursors.get(user_id)
    }

    /// Ids of users currently typing, sorted.
    pub fn typing_user_ids(&self) -> Vec<&str> {
        self.typing.keys().map(String::as_str).collect()
    }

    /// Retained chat messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn last_error(&self) -> Option<&ServerError> {
        self.last_error.as_ref()
    }
}

/// Inserts `value` under `key`. Returns true unless an equal value was already there.
fn upsert<T: Clone + PartialEq>(map: &mut BTreeMap<String, T>, key: &str, value: &T) -> bool {
    if map.get(key) == Some(value) {
        return false;
    }
    map.insert(key.to_string(), value.clone());
    true
}

#[cfg(test)]
#[path = "replica_tests.rs"]
mod tests;
