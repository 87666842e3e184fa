// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! BotCall Rust SDK
//!
//! Register an agent with a BotCall registry, keep it registered, and look
//! other agents up.

pub mod client;
pub mod types;

pub use client::{BotcallClient, KeepaliveHandle, DEFAULT_REGISTRY_URL};
pub use types::*;
