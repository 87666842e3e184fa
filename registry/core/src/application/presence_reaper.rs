// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Presence Reaper - background reclamation of long-dead agents
//!
//! Records are never removed on the request path; an agent that stops
//! re-registering just reads as offline. Left alone the table grows without
//! bound, so when enabled the reaper periodically drops every record whose
//! `last_seen` is older than the retention window. Retention is validated to
//! exceed the liveness window, so only agents already reported offline are
//! ever removed.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Bounded memory for long-running registries

use metrics::{counter, gauge};
use std::sync::Arc;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::config::ReaperConfig;
use crate::domain::repository::PresenceRepository;

pub struct PresenceReaper {
    store: Arc<dyn PresenceRepository>,
    config: ReaperConfig,
    shutdown_token: CancellationToken,
}

impl PresenceReaper {
    pub fn new(store: Arc<dyn PresenceRepository>, config: ReaperConfig, shutdown_token: CancellationToken) -> Self {
        Self {
            store,
            config,
            shutdown_token,
        }
    }

    /// Start the reaper background task
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        if !self.config.enabled {
            info!("Presence reaper is disabled");
            return;
        }

        info!(
            interval = ?self.config.interval,
            retention = ?self.config.retention,
            "Starting presence reaper background task"
        );

        // First sweep one interval after start, not immediately.
        let period = self.config.interval;
        let mut tick = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let reclaimed = self.sweep();
                    if reclaimed > 0 {
                        info!(reclaimed, "Presence reaper removed expired agents");
                    } else {
                        debug!("Presence reaper cycle found nothing to remove");
                    }
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received, stopping presence reaper");
                    break;
                }
            }
        }

        info!("Presence reaper background task stopped");
    }

    /// One reclamation pass. Returns the number of records removed.
    pub fn sweep(&self) -> usize {
        let reclaimed = self.store.reclaim(self.config.retention);
        counter!("botcall_reclaimed_total").increment(reclaimed as u64);
        gauge!("botcall_agents").set(self.store.len() as f64);
        reclaimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{Agent, AgentId, AgentMode};
    use crate::domain::clock::ManualClock;
    use crate::infrastructure::InMemoryPresenceStore;
    use chrono::Utc;
    use std::time::Duration;

    fn config(enabled: bool) -> ReaperConfig {
        ReaperConfig {
            enabled,
            interval: Duration::from_millis(20),
            retention: Duration::from_secs(3600),
        }
    }

    fn register(store: &InMemoryPresenceStore, id: &str) {
        store.register(Agent::new(AgentId::from(id), "e", Some(AgentMode::Direct), "", Utc::now()));
    }

    #[test]
    fn test_sweep_removes_expired_only() {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(InMemoryPresenceStore::with_clock(clock.clone()));
        register(&store, "gone");
        clock.advance(Duration::from_secs(2 * 3600));
        register(&store, "fresh");

        let reaper = PresenceReaper::new(store.clone(), config(true), CancellationToken::new());
        assert_eq!(reaper.sweep(), 1);
        assert!(store.lookup(&AgentId::from("fresh")).is_some());
        assert!(store.lookup(&AgentId::from("gone")).is_none());
    }

    #[tokio::test]
    async fn test_background_task_reclaims_and_stops() {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(InMemoryPresenceStore::with_clock(clock.clone()));
        register(&store, "gone");
        clock.advance(Duration::from_secs(2 * 3600));

        let token = CancellationToken::new();
        let reaper = Arc::new(PresenceReaper::new(store.clone(), config(true), token.clone()));
        let handle = reaper.start();

        tokio::time::timeout(Duration::from_secs(5), async {
            while !store.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("reaper should reclaim the expired agent");

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("reaper should stop on cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn test_disabled_reaper_exits_immediately() {
        let store = Arc::new(InMemoryPresenceStore::new());
        let reaper = Arc::new(PresenceReaper::new(store, config(false), CancellationToken::new()));
        tokio::time::timeout(Duration::from_secs(1), reaper.start())
            .await
            .expect("disabled reaper returns at once")
            .unwrap();
    }
}
