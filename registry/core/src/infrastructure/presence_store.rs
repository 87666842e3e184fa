// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! In-memory Presence Store
//!
//! The authoritative table of agent records for one registry process.
//!
//! # Concurrency
//!
//! One map-wide `RwLock`. `lookup`, `list_online` and `len` share it;
//! `register`, `touch` and `reclaim` hold it exclusively. Records are replaced
//! whole under the write lock, so a reader sees either the old record or the
//! new one. The clock is read before the lock is taken and nothing inside the
//! critical sections awaits.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::agent::{Agent, AgentId};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::repository::PresenceRepository;

#[derive(Clone)]
pub struct InMemoryPresenceStore {
    agents: Arc<RwLock<HashMap<AgentId, Agent>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryPresenceStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            agents: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }
}

impl Default for InMemoryPresenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceRepository for InMemoryPresenceStore {
    fn register(&self, mut agent: Agent) -> Agent {
        agent.touch(self.clock.now());
        debug!(agent_id = %agent.id, endpoint = %agent.endpoint, "Stored agent record");
        self.agents.write().insert(agent.id.clone(), agent.clone());
        agent
    }

    fn lookup(&self, id: &AgentId) -> Option<Agent> {
        self.agents.read().get(id).cloned()
    }

    fn touch(&self, id: &AgentId) -> bool {
        let now = self.clock.now();
        match self.agents.write().get_mut(id) {
            Some(agent) => {
                agent.touch(now);
                true
            }
            None => false,
        }
    }

    fn list_online(&self, window: Duration) -> Vec<Agent> {
        let now = self.clock.now();
        let mut online: Vec<Agent> = self
            .agents
            .read()
            .values()
            .filter(|a| a.is_live(now, window))
            .cloned()
            .collect();
        online.sort_by(|a, b| a.id.cmp(&b.id));
        online
    }

    fn reclaim(&self, retention: Duration) -> usize {
        let now = self.clock.now();
        let mut agents = self.agents.write();
        let before = agents.len();
        agents.retain(|_, a| a.age(now) < retention);
        before - agents.len()
    }

    fn len(&self) -> usize {
        self.agents.read().len()
    }
}
