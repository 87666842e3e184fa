// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! BotCall presence registry
//!
//! Tracks which agents are reachable, where, and whether they are still alive.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Presence Store, Registry Service and the HTTP/WebSocket surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
