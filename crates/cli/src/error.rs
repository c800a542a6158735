// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use tack_sync::{ConfigError, SessionEnd, SyncError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("no session token\n  hint: pass --token or set TACK_TOKEN")]
    MissingToken,

    #[error("no configuration found at {0}\n  hint: pass --url or --config")]
    NoConfig(String),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("{0}")]
    SessionEnded(#[from] SessionEnd),
}

pub type Result<T> = std::result::Result<T, Error>;
