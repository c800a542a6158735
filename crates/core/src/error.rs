// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tack-core operations.

use thiserror::Error;

/// All possible errors that can occur in tack-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "unknown event name: '{0}'\n  hint: event names look like 'task:created' or 'board:join'"
    )]
    UnknownEvent(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for tack-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
