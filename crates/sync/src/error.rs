// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sync client.

use thiserror::Error;

use crate::config::ConfigError;
use crate::reconnect::ConnectionState;
use crate::transport::TransportError;

/// Errors returned by `SyncClient` and `SessionBinder` operations.
///
/// Connection loss is not one of these; it is reported through
/// [`SyncNotification`](crate::client::SyncNotification).
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("credential must not be empty")]
    EmptyCredential,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("connection is {0:?}, cannot take this transition")]
    UnexpectedState(ConnectionState),
}

/// A specialized Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Failure reported by a listener callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listener failed: {0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        ListenerError(message.into())
    }
}
