// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Concrete adapters behind the domain traits.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** In-memory presence storage and the default attestation verifier

pub mod attestation;
pub mod presence_store;

pub use attestation::AcceptAllVerifier;
pub use presence_store::InMemoryPresenceStore;
