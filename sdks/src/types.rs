// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub use botcall_core::domain::agent::{Agent, AgentId, AgentMode};
pub use botcall_core::presentation::types::{
    AgentList, ErrorResponse, HealthResponse, LookupResponse, PresenceStatus, RegisterRequest, RegisterResponse,
};

/// Errors returned by [`crate::BotcallClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registry returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Registration rejected")]
    Rejected,
}
