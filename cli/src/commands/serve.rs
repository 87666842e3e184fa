// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use botcall_core::domain::config::RegistryConfig;

use crate::server;

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, env = "BOTCALL_CONFIG_PATH", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bind host (overrides config file and BOTCALL_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides config file and PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

/// Config file, then environment, then explicit flags.
pub fn resolve_config(args: &ServeArgs) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::load_or_default(args.config.clone()).context("Failed to load configuration")?;
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    Ok(config)
}

pub async fn handle_command(args: ServeArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    server::start_server(config).await
}
