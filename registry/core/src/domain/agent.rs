// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Caller-supplied agent identifier. Opaque to the registry; last writer wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How a caller should dial the registered endpoint.
///
/// Opaque to the registry: whatever the agent sent is stored and returned.
/// The well-known hints get their own variants; anything else round-trips
/// through `Other` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentMode {
    #[default]
    Direct,
    Relay,
    NatPending,
    Other(String),
}

impl AgentMode {
    pub fn as_str(&self) -> &str {
        match self {
            AgentMode::Direct => "direct",
            AgentMode::Relay => "relay",
            AgentMode::NatPending => "nat-pending",
            AgentMode::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for AgentMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "direct" => AgentMode::Direct,
            "relay" => AgentMode::Relay,
            "nat-pending" => AgentMode::NatPending,
            _ => AgentMode::Other(s),
        }
    }
}

impl From<AgentMode> for String {
    fn from(mode: AgentMode) -> Self {
        match mode {
            AgentMode::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for AgentMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AgentMode::from(s.to_string()))
    }
}

/// A registered bot: where it can be reached and when it was last heard from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(rename = "agent_id")]
    pub id: AgentId,
    pub endpoint: String,
    /// Absent when the agent registered without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AgentMode>,
    pub attestation: String,
    pub online: bool,
    pub last_seen: DateTime<Utc>,
}

impl Agent {
    /// Build a freshly registered record, online as of `now`.
    pub fn new(
        id: AgentId,
        endpoint: impl Into<String>,
        mode: Option<AgentMode>,
        attestation: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            endpoint: endpoint.into(),
            mode,
            attestation: attestation.into(),
            online: true,
            last_seen: now,
        }
    }

    /// Liveness-only refresh. Endpoint, mode and attestation are left alone.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
        self.online = true;
    }

    /// Time elapsed since `last_seen`. A `last_seen` in the future counts as zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_seen).to_std().unwrap_or(Duration::ZERO)
    }

    /// Online iff flagged online and heard from strictly within `window`.
    pub fn is_live(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.online && self.age(now) < window
    }
}
