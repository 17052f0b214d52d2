//! Command-line interface for tictactoe_client.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe client - play X against a remote move service
#[derive(Parser, Debug)]
#[command(name = "tictactoe_client")]
#[command(about = "Play tic-tac-toe against a remote move-calculation service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Path to the TOML config file (defaults are used if it doesn't exist)
        #[arg(short, long, default_value = "tictactoe_client.toml")]
        config: PathBuf,

        /// Move service base URL (overrides the config file)
        #[arg(long)]
        server_url: Option<String>,

        /// Delay before asking the service for its move, in milliseconds
        #[arg(long)]
        move_delay_ms: Option<u64>,

        /// Delay before an automatic reset, in milliseconds
        #[arg(long)]
        reset_delay_ms: Option<u64>,
    },

    /// Send one empty-board request to the move service and print its answer
    Check {
        /// Path to the TOML config file (defaults are used if it doesn't exist)
        #[arg(short, long, default_value = "tictactoe_client.toml")]
        config: PathBuf,

        /// Move service base URL (overrides the config file)
        #[arg(long)]
        server_url: Option<String>,
    },
}
