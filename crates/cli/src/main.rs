// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tack: follow a collaborative board from the terminal.

mod cli;
mod commands;
mod error;
mod watch;

use std::process::ExitCode;

use clap::Parser;
use tack_sync::Credential;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, TOKEN_ENV};
use error::{Error, Result};

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = commands::resolve_config(cli.config.as_deref(), cli.url.as_deref())?;
    match cli.command {
        Command::Config => {
            print!("{}", commands::render_config(&config)?);
            Ok(())
        }
        Command::Watch {
            board,
            token,
            presence,
        } => {
            let token = token
                .or_else(|| std::env::var(TOKEN_ENV).ok())
                .map(Credential::new)
                .filter(|t| !t.is_empty())
                .ok_or(Error::MissingToken)?;
            watch::run(config, &board, token, presence).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
