// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Registry HTTP server
//!
//! Wires one Presence Store, the Registry Service and the optional reaper
//! behind the axum router, then serves until SIGINT/SIGTERM. On shutdown new
//! connections are refused, WebSocket sessions and the reaper are cancelled,
//! and in-flight requests get `shutdown_grace` to finish before the server
//! task is aborted.

use anyhow::{Context, Result};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use botcall_core::application::{PresenceReaper, RegistryService};
use botcall_core::domain::attestation::AttestationVerifier;
use botcall_core::domain::clock::{Clock, SystemClock};
use botcall_core::domain::config::RegistryConfig;
use botcall_core::infrastructure::{AcceptAllVerifier, InMemoryPresenceStore};
use botcall_core::presentation::api::{app, AppState};

pub async fn start_server(config: RegistryConfig) -> Result<()> {
    config.validate().context("Configuration validation failed")?;

    if let Some(port) = config.metrics_port {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Prometheus metrics exporter listening on port {}", port);
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(InMemoryPresenceStore::with_clock(clock.clone()));

    let verifier: Arc<dyn AttestationVerifier> = Arc::new(AcceptAllVerifier);
    warn!(
        verifier = verifier.name(),
        "Attestation verification is not configured; every registration is accepted"
    );

    let registry = Arc::new(RegistryService::new(
        store.clone(),
        verifier,
        clock,
        config.liveness_window,
    ));

    let shutdown = CancellationToken::new();

    let reaper = Arc::new(PresenceReaper::new(store, config.reaper.clone(), shutdown.child_token()));
    let reaper_handle = reaper.start();

    let state = AppState::new(registry, config.heartbeat_interval)
        .with_public_host(config.public_host.clone())
        .with_shutdown(shutdown.clone());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(
        liveness_window = ?config.liveness_window,
        heartbeat_interval = ?config.heartbeat_interval,
        "BotCall registry listening on {}",
        addr
    );

    let result = serve_until(listener, app(state), shutdown_signal(), shutdown, config.shutdown_grace).await;
    let _ = reaper_handle.await;

    info!("Server stopped");
    result
}

/// Serve `app` until `signal` resolves, then shut down within `grace`.
pub async fn serve_until(
    listener: TcpListener,
    app: Router,
    signal: impl Future<Output = ()>,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<()> {
    let token = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    });

    tokio::select! {
        _ = signal => {
            info!("Shutting down...");
        }
        res = &mut server => {
            shutdown.cancel();
            return res.context("HTTP server task failed")?.context("HTTP server failed");
        }
    }

    shutdown.cancel();

    match tokio::time::timeout(grace, &mut server).await {
        Ok(res) => res.context("HTTP server task failed")?.context("HTTP server failed"),
        Err(_) => {
            warn!(?grace, "Graceful shutdown timed out; forcing termination");
            server.abort();
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
