// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presence Repository Interface
//!
//! Storage contract for agent presence records, defined in the domain layer
//! and implemented in `crate::infrastructure::presence_store`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `PresenceRepository` | `Agent` | `InMemoryPresenceStore` |
//!
//! Unlike the usual repository shape these methods are synchronous and
//! infallible: every operation is an in-memory map mutation under a lock, and
//! no implementation may hold its lock across an `.await`.

use std::time::Duration;

use crate::domain::agent::{Agent, AgentId};

pub trait PresenceRepository: Send + Sync {
    /// Insert or fully replace the record keyed by `agent.id`, marking it
    /// online as of now. Returns the record exactly as stored.
    fn register(&self, agent: Agent) -> Agent;

    /// Snapshot of the current record, if any. Never decides liveness.
    fn lookup(&self, id: &AgentId) -> Option<Agent>;

    /// Refresh `last_seen` and the online flag. Returns `false` (and creates
    /// nothing) for an unknown id.
    fn touch(&self, id: &AgentId) -> bool;

    /// Records flagged online and seen strictly within `window`, sorted by id.
    fn list_online(&self, window: Duration) -> Vec<Agent>;

    /// Remove every record whose age is at least `retention`. Returns how many
    /// were removed.
    fn reclaim(&self, retention: Duration) -> usize;

    /// Number of records, live or stale.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
