//! Tic-tac-toe client - command line entry point.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use tictactoe_client::{Board, ClientConfig, HttpMoveClient, MoveCalculator};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            server_url,
            move_delay_ms,
            reset_delay_ms,
        } => {
            let mut config = load_config(&config, server_url)?;
            if let Some(ms) = move_delay_ms {
                config = config.with_move_delay_ms(ms);
            }
            if let Some(ms) = reset_delay_ms {
                config = config.with_reset_delay_ms(ms);
            }
            tui::run_tui(config).await
        }
        Command::Check { config, server_url } => {
            initialize_stderr_tracing();
            let config = load_config(&config, server_url)?;
            run_check(config).await
        }
    }
}

/// Loads the config file and applies the server URL override.
fn load_config(path: &Path, server_url: Option<String>) -> Result<ClientConfig> {
    let mut config = ClientConfig::load_or_default(path)?;
    if let Some(url) = server_url {
        config = config.with_server_url(url);
    }
    Ok(config)
}

/// Asks the move service for a reply to an empty board.
#[instrument(skip_all, fields(server_url = %config.server_url()))]
async fn run_check(config: ClientConfig) -> Result<()> {
    let client = HttpMoveClient::new(config.server_url(), config.request_timeout())?;
    info!(endpoint = %client.endpoint(), "Checking move service");

    let verdict = client
        .calculate_move(&Board::new())
        .await
        .with_context(|| format!("move service at {} did not answer", client.endpoint()))?;

    println!("{} answered with status {}", client.endpoint(), verdict.status());
    println!("{}", verdict.board().display());
    Ok(())
}

fn initialize_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tictactoe_client=debug")),
        )
        .with_writer(std::io::stderr)
        .init();
}
