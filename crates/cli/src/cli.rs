// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Environment variable holding the session token for `watch`.
pub const TOKEN_ENV: &str = "TACK_TOKEN";

#[derive(Parser, Debug)]
#[command(name = "tack")]
#[command(about = "Follow a collaborative board in real time")]
#[command(version)]
pub struct Cli {
    /// Config file (default: <config dir>/tack/sync.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server URL, overriding the config file
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join a board and print its events as they arrive
    Watch {
        /// Board to join
        board: String,

        /// Session token (default: $TACK_TOKEN)
        #[arg(short, long)]
        token: Option<String>,

        /// Also print cursor and typing events
        #[arg(short, long)]
        presence: bool,
    },

    /// Print the resolved configuration
    Config,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
