// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Attestation verification seam.
//!
//! The registry stores whatever credential an agent presents. Whether that
//! credential is checked is decided by the `AttestationVerifier` the server is
//! built with; the registry itself implements no verification.

use async_trait::async_trait;

use crate::domain::agent::AgentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationVerdict {
    Accepted,
    Rejected(String),
}

impl AttestationVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AttestationVerdict::Accepted)
    }
}

#[async_trait]
pub trait AttestationVerifier: Send + Sync {
    /// Short name used in startup logs.
    fn name(&self) -> &'static str;

    async fn verify(&self, agent_id: &AgentId, attestation: &str) -> AttestationVerdict;
}
