// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # BotCall CLI
//!
//! The `botcall` binary runs the rendezvous registry and talks to one.
//!
//! ## Commands
//!
//! - `botcall serve` - Run the registry server
//! - `botcall register|lookup|agents|health` - Registry client operations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use botcall::commands::{self, RegisterArgs, ServeArgs};
use botcall_sdk::{BotcallClient, DEFAULT_REGISTRY_URL};

/// BotCall - rendezvous and presence registry for bots
#[derive(Parser)]
#[command(name = "botcall")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Registry base URL used by client commands
    #[arg(long, global = true, env = "BOTCALL_REGISTRY_URL", default_value = DEFAULT_REGISTRY_URL)]
    registry: String,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "BOTCALL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the registry server
    Serve(ServeArgs),

    /// Register (or refresh) an agent
    Register(RegisterArgs),

    /// Look up an agent's presence
    Lookup {
        /// Agent ID
        agent_id: String,
    },

    /// List agents currently online
    Agents,

    /// Check registry health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let client = BotcallClient::new(cli.registry.clone());

    match cli.command {
        Commands::Serve(args) => {
            info!("Starting BotCall registry v{}", env!("CARGO_PKG_VERSION"));
            commands::serve::handle_command(args).await
        }
        Commands::Register(args) => commands::agent::register(args, client).await,
        Commands::Lookup { agent_id } => commands::agent::lookup(agent_id, client, cli.json).await,
        Commands::Agents => commands::agent::list_agents(client, cli.json).await,
        Commands::Health => commands::agent::health(client).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
