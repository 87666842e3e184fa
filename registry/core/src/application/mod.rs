// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application
//!
//! Registry use cases built on the domain contracts.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Registration, lookup, heartbeat and listing; stale-record reclamation

pub mod presence_reaper;
pub mod registry_service;

pub use presence_reaper::PresenceReaper;
pub use registry_service::{Presence, RegisterAgent, Registration, RegistryError, RegistryService};
