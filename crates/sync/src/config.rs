// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync client configuration.
//!
//! Configuration is stored in `<config dir>/tack/sync.toml`:
//!
//! ```toml
//! url = "ws://localhost:3001"
//! connect_timeout_ms = 20000
//! transports = ["websocket", "polling"]
//! force_new = true
//!
//! [reconnect]
//! base_delay_ms = 1000
//! factor = 2
//! max_attempts = 5
//! max_delay_ms = 30000
//! ```
//!
//! Every key except `url` is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reconnect::Backoff;
use crate::transport::{select_mechanism, Mechanism, TransportOptions, WebSocketTransport};

const CONFIG_DIR_NAME: &str = "tack";
const CONFIG_FILE_NAME: &str = "sync.toml";

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Sync client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Server endpoint, `ws://...` or `wss://...`.
    pub url: String,
    /// Handshake timeout in milliseconds (default: 20000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Mechanisms in preference order (default: websocket, polling).
    #[serde(default = "default_transports")]
    pub transports: Vec<Mechanism>,
    /// Open a fresh handle on every (re)connect (default: true).
    #[serde(default = "default_force_new")]
    pub force_new: bool,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Reconnection backoff settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_factor")]
    pub factor: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            base_delay_ms: default_base_delay_ms(),
            factor: default_factor(),
            max_attempts: default_max_attempts(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    20_000
}

fn default_transports() -> Vec<Mechanism> {
    vec![Mechanism::WebSocket, Mechanism::Polling]
}

fn default_force_new() -> bool {
    true
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_factor() -> u32 {
    2
}

fn default_max_attempts() -> u32 {
    5
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl SyncConfig {
    /// Creates a config for `url` with every other setting at its default.
    pub fn new(url: impl Into<String>) -> Self {
        SyncConfig {
            url: url.into(),
            connect_timeout_ms: default_connect_timeout_ms(),
            transports: default_transports(),
            force_new: default_force_new(),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Loads and validates configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default location: `<config dir>/tack/sync.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "url '{}' must start with ws:// or wss://",
                self.url
            )));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "connect_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if select_mechanism(&self.transports, WebSocketTransport::SUPPORTED).is_none() {
            return Err(ConfigError::Invalid(format!(
                "transports {:?} must include websocket",
                self.transports
            )));
        }
        let reconnect = &self.reconnect;
        if reconnect.factor == 0 {
            return Err(ConfigError::Invalid(
                "reconnect.factor must be at least 1".to_string(),
            ));
        }
        if reconnect.max_delay_ms < reconnect.base_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "reconnect.max_delay_ms ({}) is less than reconnect.base_delay_ms ({})",
                reconnect.max_delay_ms, reconnect.base_delay_ms
            )));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: self.connect_timeout(),
            mechanisms: self.transports.clone(),
            force_new: self.force_new,
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            base: Duration::from_millis(self.reconnect.base_delay_ms),
            factor: self.reconnect.factor,
            max_attempts: self.reconnect.max_attempts,
            max_delay: Duration::from_millis(self.reconnect.max_delay_ms),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
