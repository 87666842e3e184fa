// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use botcall_core::application::{RegisterAgent, RegistryService};
use botcall_core::domain::agent::{Agent, AgentId, AgentMode};
use botcall_core::domain::clock::SystemClock;
use botcall_core::domain::repository::PresenceRepository;
use botcall_core::infrastructure::{AcceptAllVerifier, InMemoryPresenceStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(5 * 60);

#[test]
fn parallel_threads_register_without_lost_updates() {
    const N: usize = 64;
    let store = InMemoryPresenceStore::new();

    std::thread::scope(|scope| {
        for i in 0..N {
            let store = store.clone();
            scope.spawn(move || {
                let id = AgentId::new(format!("agent-{i}"));
                store.register(Agent::new(id, format!("10.0.0.{i}:9000"), Some(AgentMode::Direct), "", Utc::now()));
            });
        }
    });

    assert_eq!(store.len(), N);
    for i in 0..N {
        let agent = store.lookup(&AgentId::new(format!("agent-{i}"))).expect("registered agent");
        assert_eq!(agent.endpoint, format!("10.0.0.{i}:9000"));
    }
    assert_eq!(store.list_online(WINDOW).len(), N);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_tasks_register_touch_and_read() {
    const N: usize = 200;
    let store = Arc::new(InMemoryPresenceStore::new());
    let registry = Arc::new(RegistryService::new(
        store.clone(),
        Arc::new(AcceptAllVerifier),
        Arc::new(SystemClock),
        WINDOW,
    ));

    let mut handles = Vec::with_capacity(N * 2);
    for i in 0..N {
        let writer = registry.clone();
        handles.push(tokio::spawn(async move {
            let request = RegisterAgent {
                agent_id: format!("bot-{i}"),
                endpoint: format!("bot-{i}.example:9000"),
                mode: Some("relay".to_string()),
                attestation: "token".to_string(),
            };
            writer.register(request, "registry.test").await.unwrap();
            // Touch and read interleaved with other writers
            assert!(writer.heartbeat(&AgentId::new(format!("bot-{i}"))));
            let _ = writer.list_online();
        }));

        let reader = registry.clone();
        handles.push(tokio::spawn(async move {
            // Readers racing writers never see a half-written record
            if let Some(agent) = reader.store().lookup(&AgentId::new(format!("bot-{i}"))) {
                assert_eq!(agent.endpoint, format!("bot-{i}.example:9000"));
                assert_eq!(agent.mode, Some(AgentMode::Relay));
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.len(), N);
    assert_eq!(registry.list_online().len(), N);
}

#[test]
fn concurrent_overwrites_of_one_id_leave_a_single_whole_record() {
    let store = InMemoryPresenceStore::new();

    std::thread::scope(|scope| {
        for i in 0..32 {
            let store = store.clone();
            scope.spawn(move || {
                let agent = Agent::new(
                    AgentId::from("shared"),
                    format!("endpoint-{i}"),
                    Some(AgentMode::Direct),
                    format!("attestation-{i}"),
                    Utc::now(),
                );
                store.register(agent);
            });
        }
    });

    assert_eq!(store.len(), 1);
    let agent = store.lookup(&AgentId::from("shared")).unwrap();
    let suffix = agent.endpoint.strip_prefix("endpoint-").unwrap();
    assert_eq!(agent.attestation, format!("attestation-{suffix}"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reregistration_reports_each_callers_own_record() {
    let store = Arc::new(InMemoryPresenceStore::new());
    let registry = Arc::new(RegistryService::new(
        store.clone(),
        Arc::new(AcceptAllVerifier),
        Arc::new(SystemClock),
        WINDOW,
    ));

    let handles: Vec<_> = (0..64)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let request = RegisterAgent {
                    agent_id: "shared".to_string(),
                    endpoint: format!("endpoint-{i}"),
                    mode: Some(format!("mode-{i}")),
                    attestation: String::new(),
                };
                let registration = registry.register(request, "registry.test").await.unwrap();
                assert_eq!(registration.agent.endpoint, format!("endpoint-{i}"));
                assert_eq!(registration.agent.mode, Some(AgentMode::Other(format!("mode-{i}"))));
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(store.len(), 1);
}
