// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;
use std::time::Duration;

use botcall::commands::serve::resolve_config;
use botcall::commands::ServeArgs;
use botcall::server::serve_until;
use botcall_core::application::RegistryService;
use botcall_core::domain::clock::{Clock, SystemClock};
use botcall_core::infrastructure::{AcceptAllVerifier, InMemoryPresenceStore};
use botcall_core::presentation::api::{app, AppState};
use botcall_sdk::{BotcallClient, PresenceStatus, RegisterRequest};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

fn test_state(shutdown: CancellationToken) -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(InMemoryPresenceStore::with_clock(clock.clone()));
    let registry = Arc::new(RegistryService::new(
        store,
        Arc::new(AcceptAllVerifier),
        clock,
        Duration::from_secs(300),
    ));
    AppState::new(registry, Duration::from_secs(30)).with_shutdown(shutdown)
}

#[tokio::test]
async fn test_serve_until_stops_on_signal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve_until(
        listener,
        app(test_state(shutdown.clone())),
        async move {
            let _ = stop_rx.await;
        },
        shutdown.clone(),
        Duration::from_secs(2),
    ));

    let client = BotcallClient::new(format!("http://{}", addr));
    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");

    let registered = client
        .register(&RegisterRequest::new("cli-bot", "10.0.0.1:9000"))
        .await
        .unwrap();
    assert!(registered.confirmed);
    let presence = client.lookup("cli-bot").await.unwrap();
    assert_eq!(presence.status, PresenceStatus::Online);

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop within the grace period")
        .unwrap();
    assert!(result.is_ok());
    assert!(shutdown.is_cancelled());
}

#[tokio::test]
async fn test_serve_until_refuses_connections_after_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();

    let server = tokio::spawn(serve_until(
        listener,
        app(test_state(shutdown.clone())),
        async {},
        shutdown.clone(),
        Duration::from_secs(2),
    ));

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let client = BotcallClient::new(format!("http://{}", addr));
    assert!(client.health().await.is_err());
}

#[test]
fn test_resolve_config_flags_override_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("botcall-config.yaml");
    std::fs::write(&path, "host: 127.0.0.1\nport: 9000\nliveness_window: 2m\n").unwrap();

    let args = ServeArgs {
        config: Some(path.clone()),
        host: None,
        port: Some(7000),
    };
    let config = resolve_config(&args).unwrap();
    assert_eq!(config.port, 7000);
    assert_eq!(config.host, "127.0.0.1");

    let args = ServeArgs {
        config: Some(path),
        host: Some("0.0.0.0".to_string()),
        port: Some(7001),
    };
    let config = resolve_config(&args).unwrap();
    assert_eq!(config.bind_addr(), "0.0.0.0:7001");
}

#[test]
fn test_resolve_config_missing_file_fails() {
    let args = ServeArgs {
        config: Some("/nonexistent/botcall-config.yaml".into()),
        ..Default::default()
    };
    assert!(resolve_config(&args).is_err());
}
