// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Config resolution and the `config` command.

use std::path::Path;

use tack_sync::SyncConfig;

use crate::error::{Error, Result};

/// Resolve configuration from an explicit file, the default file, or `--url`.
///
/// `url` overrides whatever the file says.
pub fn resolve_config(path: Option<&Path>, url: Option<&str>) -> Result<SyncConfig> {
    let file = match path {
        Some(path) => Some(path.to_path_buf()),
        None => SyncConfig::default_path().filter(|p| p.exists()),
    };

    let mut config = match (file, url) {
        (Some(file), _) => SyncConfig::load(&file)?,
        (None, Some(url)) => SyncConfig::new(url),
        (None, None) => {
            let expected = SyncConfig::default_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "tack/sync.toml".to_string());
            return Err(Error::NoConfig(expected));
        }
    };

    if let Some(url) = url {
        config.url = url.to_string();
    }
    config.validate()?;
    Ok(config)
}

/// Render the resolved configuration as TOML.
pub fn render_config(config: &SyncConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
