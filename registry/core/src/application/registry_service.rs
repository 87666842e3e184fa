// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Registry Service
//!
//! Protocol logic on top of the Presence Store: request validation, the
//! attestation check, and the single liveness policy.
//!
//! ## Liveness
//!
//! An agent is online iff its record is flagged online and
//! `now - last_seen < liveness_window`. Lookup and listing both consult the
//! same configured window. Nothing is evicted when an agent goes stale; the
//! offline state is inferred on read.
//!
//! ## Heartbeats
//!
//! `heartbeat` is what the WebSocket session calls after each successful
//! server-sent ping. Liveness therefore tracks "the registry could still write
//! to this agent's socket", not "the agent answered".

use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::agent::{Agent, AgentId, AgentMode};
use crate::domain::attestation::{AttestationVerdict, AttestationVerifier};
use crate::domain::clock::Clock;
use crate::domain::repository::PresenceRepository;

/// Client-side failures. None of these touch the store.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Missing required fields: {0}")]
    MissingField(&'static str),

    #[error("Invalid JSON: {0}")]
    MalformedBody(String),

    #[error("Missing agent ID")]
    MissingAgentId,

    #[error("Attestation rejected: {0}")]
    AttestationRejected(String),
}

/// Validated-on-use registration input.
#[derive(Debug, Clone, Default)]
pub struct RegisterAgent {
    pub agent_id: String,
    pub endpoint: String,
    /// Stored as sent; empty or absent means no mode
    pub mode: Option<String>,
    pub attestation: String,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub agent: Agent,
    pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Never registered (or reclaimed). A normal negative result.
    Unknown,
    Known {
        agent: Agent,
        online: bool,
        attestation_valid: bool,
    },
}

pub struct RegistryService {
    store: Arc<dyn PresenceRepository>,
    verifier: Arc<dyn AttestationVerifier>,
    clock: Arc<dyn Clock>,
    liveness_window: Duration,
}

impl RegistryService {
    pub fn new(
        store: Arc<dyn PresenceRepository>,
        verifier: Arc<dyn AttestationVerifier>,
        clock: Arc<dyn Clock>,
        liveness_window: Duration,
    ) -> Self {
        Self {
            store,
            verifier,
            clock,
            liveness_window,
        }
    }

    pub fn store(&self) -> Arc<dyn PresenceRepository> {
        self.store.clone()
    }

    /// Validate, verify the attestation, then insert or replace the record.
    ///
    /// `host` is the authority the caller reached us on; it becomes part of the
    /// signaling callback URL.
    pub async fn register(&self, request: RegisterAgent, host: &str) -> Result<Registration, RegistryError> {
        if request.agent_id.is_empty() {
            return Err(RegistryError::MissingField("agent_id"));
        }
        if request.endpoint.is_empty() {
            return Err(RegistryError::MissingField("endpoint"));
        }

        let mode = request.mode.filter(|m| !m.is_empty()).map(AgentMode::from);

        let id = AgentId::new(request.agent_id);
        if let AttestationVerdict::Rejected(reason) = self.verifier.verify(&id, &request.attestation).await {
            debug!(agent_id = %id, reason = %reason, "Registration refused by attestation verifier");
            return Err(RegistryError::AttestationRejected(reason));
        }

        let agent = self
            .store
            .register(Agent::new(id, request.endpoint, mode, request.attestation, self.clock.now()));

        info!(agent_id = %agent.id, endpoint = %agent.endpoint, mode = ?agent.mode, "Registered agent");
        counter!("botcall_registrations_total").increment(1);
        gauge!("botcall_agents").set(self.store.len() as f64);

        let callback_url = callback_url(host, &agent.id);
        Ok(Registration { agent, callback_url })
    }

    pub async fn lookup(&self, agent_id: &str) -> Result<Presence, RegistryError> {
        if agent_id.is_empty() {
            return Err(RegistryError::MissingAgentId);
        }

        let id = AgentId::from(agent_id);
        let Some(agent) = self.store.lookup(&id) else {
            counter!("botcall_lookups_total", "status" => "unknown").increment(1);
            return Ok(Presence::Unknown);
        };

        let online = agent.is_live(self.clock.now(), self.liveness_window);
        let attestation_valid = self.verifier.verify(&agent.id, &agent.attestation).await.is_accepted();

        let status = if online { "online" } else { "offline" };
        counter!("botcall_lookups_total", "status" => status).increment(1);

        Ok(Presence::Known {
            agent,
            online,
            attestation_valid,
        })
    }

    /// Liveness-only refresh from a WebSocket heartbeat. Unknown ids are ignored.
    pub fn heartbeat(&self, id: &AgentId) -> bool {
        let touched = self.store.touch(id);
        if touched {
            counter!("botcall_heartbeats_total").increment(1);
        } else {
            debug!(agent_id = %id, "Heartbeat for unregistered agent ignored");
        }
        touched
    }

    /// Every agent currently online under the configured window.
    pub fn list_online(&self) -> Vec<Agent> {
        self.store.list_online(self.liveness_window)
    }
}

pub fn callback_url(host: &str, id: &AgentId) -> String {
    format!("wss://{}/v1/call/{}", host, id)
}
