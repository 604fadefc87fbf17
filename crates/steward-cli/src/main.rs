//! Steward CLI - authority registry tooling.
//!
//! Replays operation scripts against a fresh registry and prints the
//! outcome of each call, the authorized set and the audit journal.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod script;
mod theme;

use commands::{config, principal, run};

/// Steward - authorized-principal registry with an audit trail
#[derive(Parser)]
#[command(name = "steward")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (defaults to ./steward.toml if present)
    #[arg(short, long, global = true, env = "STEWARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an operation script against a fresh registry
    Run {
        /// TOML script with a `creator` and `[[step]]` tables
        script: PathBuf,

        /// Print the audit journal as JSON lines only
        #[arg(long)]
        json: bool,
    },

    /// Print the principal derived from a label
    Principal {
        /// Human-readable label
        label: String,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = steward_config::Config::load(cli.config.as_deref())?;
    steward_telemetry::setup_logging(&config_bridge::to_log_config(
        &resolved.config,
        cli.verbose,
    ))?;
    tracing::debug!(file = ?resolved.loaded_file, "configuration resolved");

    match cli.command {
        Commands::Run { script, json } => run::run_script(&script, json, &resolved.config).await,
        Commands::Principal { label } => principal::show_principal(&label),
        Commands::Config {
            command: ConfigCommands::Show,
        } => config::show_config(&resolved),
    }
}
