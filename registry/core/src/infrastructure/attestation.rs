// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;

use crate::domain::agent::AgentId;
use crate::domain::attestation::{AttestationVerdict, AttestationVerifier};

/// Accepts every attestation, including an empty one.
///
/// Selecting this verifier means registrations are not authenticated. The
/// server logs a warning when it starts with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

#[async_trait]
impl AttestationVerifier for AcceptAllVerifier {
    fn name(&self) -> &'static str {
        "accept-all"
    }

    async fn verify(&self, _agent_id: &AgentId, _attestation: &str) -> AttestationVerdict {
        AttestationVerdict::Accepted
    }
}
