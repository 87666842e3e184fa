// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::time::Duration;

use botcall_sdk::{AgentMode, BotcallClient, PresenceStatus, RegisterRequest};

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Your bot's unique ID
    #[arg(long, value_name = "ID")]
    pub agent_id: String,

    /// Reachable address (host:port or URL)
    #[arg(long, value_name = "ENDPOINT")]
    pub endpoint: String,

    /// Dial hint: direct, relay, nat-pending or any custom value
    #[arg(long, default_value = "direct")]
    pub mode: AgentMode,

    /// Attestation token passed through to the registry
    #[arg(long, default_value = "")]
    pub attestation: String,

    /// Keep re-registering every N seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub keepalive: Option<u64>,
}

pub async fn register(args: RegisterArgs, client: BotcallClient) -> Result<()> {
    let request = RegisterRequest::new(args.agent_id.clone(), args.endpoint.clone())
        .with_mode(args.mode)
        .with_attestation(args.attestation);

    let response = client
        .register(&request)
        .await
        .with_context(|| format!("Failed to register with {}", client.base_url()))?;

    println!(
        "{}",
        format!("✓ Registered {} at {} ({})", args.agent_id, args.endpoint, response.status).green()
    );
    if !response.url.is_empty() {
        println!("  Callback: {}", response.url);
    }
    println!("  Lookup:   {}/v1/lookup/{}", client.base_url(), args.agent_id);

    if let Some(secs) = args.keepalive {
        let handle = client.start_keepalive(request, Duration::from_secs(secs.max(1)));
        println!("{}", format!("Re-registering every {}s; press Ctrl+C to stop", secs.max(1)).dimmed());
        tokio::signal::ctrl_c().await.context("Failed to wait for Ctrl+C")?;
        handle.stop().await;
    }

    Ok(())
}

pub async fn lookup(agent_id: String, client: BotcallClient, json: bool) -> Result<()> {
    let response = client.lookup(&agent_id).await.context("Lookup failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let status = match response.status {
        PresenceStatus::Online => "online".green(),
        PresenceStatus::Offline => "offline".red(),
    };
    println!("{:<18} {}", "AGENT", agent_id.bold());
    println!("{:<18} {}", "STATUS", status);

    if let Some(error) = &response.error {
        println!("{:<18} {}", "ERROR", error.yellow());
        return Ok(());
    }
    if let Some(endpoint) = &response.endpoint {
        println!("{:<18} {}", "ENDPOINT", endpoint);
    }
    if let Some(mode) = &response.mode {
        println!("{:<18} {}", "MODE", mode);
    }
    if let Some(last_seen) = &response.last_seen {
        println!("{:<18} {}", "LAST SEEN", last_seen);
    }
    println!("{:<18} {}", "ATTESTATION VALID", response.attestation_valid);

    Ok(())
}

pub async fn list_agents(client: BotcallClient, json: bool) -> Result<()> {
    let list = client.list_agents().await.context("Failed to list agents")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if list.agents.is_empty() {
        println!("{}", "No agents online".yellow());
        return Ok(());
    }

    println!("{} agents online:", list.count);
    println!("{:<24} {:<32} {:<12} {}", "ID", "ENDPOINT", "MODE", "LAST SEEN");
    for agent in list.agents {
        println!(
            "{:<24} {:<32} {:<12} {}",
            agent.id.as_str().bold(),
            agent.endpoint,
            agent.mode.as_ref().map(AgentMode::as_str).unwrap_or("-"),
            agent.last_seen.to_rfc3339()
        );
    }

    Ok(())
}

pub async fn health(client: BotcallClient) -> Result<()> {
    let health = client
        .health()
        .await
        .with_context(|| format!("Registry at {} is unreachable", client.base_url()))?;
    println!(
        "{}",
        format!("✓ Registry {} ({}) version {}", client.base_url(), health.status, health.version).green()
    );
    Ok(())
}
