//! ForensIQ CLI — entry point.
//!
//! # Commands
//!
//! - `forensiq init` — write a default config
//! - `forensiq status [--check]` — show configuration and the stored session
//! - `forensiq session ensure|show|clear|end` — session id lifecycle
//! - `forensiq log KIND [--query Q] [--results JSON] [--meta K=V]...` — log an interaction
//! - `forensiq history [--limit N] [--json]` — recent interactions
//! - `forensiq context get|set` — investigation context

mod context_cmd;
mod helpers;
mod init;
mod log_cmd;
mod session_cmd;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use forensiq_client::{create_client, create_client_with_store, SessionClient};
use forensiq_core::config::{load_config, Config};
use forensiq_core::session::MemoryIdStore;
use forensiq_core::types::InteractionKind;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// ForensIQ — session and interaction tracking for forensic investigations
#[derive(Parser)]
#[command(name = "forensiq", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    /// Config file (default: ~/.forensiq/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Keep the session id in memory only (nothing written to disk)
    #[arg(long, global = true, default_value_t = false)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Show configuration and the stored session
    Status {
        /// Ask the server whether the stored session is still valid
        #[arg(long, default_value_t = false)]
        check: bool,
    },

    /// Manage the session id
    Session {
        #[command(subcommand)]
        action: session_cmd::SessionCommands,
    },

    /// Log one interaction to the active session
    Log {
        /// search, generate, detect, view, delete, or other
        kind: InteractionKind,

        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,

        /// Structured result summary as a JSON value
        #[arg(short, long)]
        results: Option<String>,

        /// Metadata entry KEY=VALUE (VALUE is parsed as JSON when possible)
        #[arg(short, long = "meta")]
        meta: Vec<String>,
    },

    /// Show recent interactions, newest first
    History {
        /// Maximum number of entries (default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print raw JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Read or replace the investigation context
    Context {
        #[command(subcommand)]
        action: context_cmd::ContextCommands,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli.config.as_deref().map(helpers::expand_tilde);
    let config = load_config(config_path.as_deref());

    match cli.command {
        Commands::Init => init::run(config_path),
        Commands::Status { check } => status::run(&config, config_path, check).await,
        Commands::Session { action } => {
            let client = build_client(&config, cli.ephemeral)?;
            session_cmd::dispatch(&client, action).await
        }
        Commands::Log {
            kind,
            query,
            results,
            meta,
        } => {
            let client = build_client(&config, cli.ephemeral)?;
            log_cmd::log(&client, kind, query, results, meta).await
        }
        Commands::History { limit, json } => {
            let client = build_client(&config, cli.ephemeral)?;
            let limit = limit.unwrap_or(config.session.history_limit);
            log_cmd::history(&client, limit, json).await
        }
        Commands::Context { action } => {
            let client = build_client(&config, cli.ephemeral)?;
            context_cmd::dispatch(&client, action).await
        }
    }
}

/// Build a `SessionClient` from the loaded configuration.
fn build_client(config: &Config, ephemeral: bool) -> Result<SessionClient> {
    let client = if ephemeral {
        debug!("Using in-memory session id store");
        create_client_with_store(config, Arc::new(MemoryIdStore::new()))
    } else {
        create_client(config)
    };
    client.context("failed to create session client")
}

/// Initialize tracing/logging. `RUST_LOG` wins over `--logs`.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("forensiq=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
