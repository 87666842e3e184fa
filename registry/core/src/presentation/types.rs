// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! JSON bodies exchanged over the registry HTTP API. Shared with the SDK.

use serde::{Deserialize, Serialize};

use crate::domain::agent::{Agent, AgentMode};

/// `POST /v1/register` body. Absent fields deserialize as empty so that the
/// service, not serde, reports which one is missing. `mode` may be absent,
/// null or any string; it is stored as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default)]
    pub attestation: String,
}

impl RegisterRequest {
    pub fn new(agent_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            endpoint: endpoint.into(),
            mode: Some(AgentMode::Direct.to_string()),
            attestation: String::new(),
        }
    }

    pub fn with_mode(mut self, mode: AgentMode) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_attestation(mut self, attestation: impl Into<String>) -> Self {
        self.attestation = attestation.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// `GET /v1/lookup/{agent_id}` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub status: PresenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AgentMode>,
    pub attestation_valid: bool,
    /// RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LookupResponse {
    pub fn not_found() -> Self {
        Self {
            status: PresenceStatus::Offline,
            endpoint: None,
            mode: None,
            attestation_valid: false,
            last_seen: None,
            error: Some("Agent not found".to_string()),
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == PresenceStatus::Online
    }
}

/// `GET /v1/agents` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentList {
    pub agents: Vec<Agent>,
    pub count: usize,
}

/// `GET /health` body. Describes the registry process, not any agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
