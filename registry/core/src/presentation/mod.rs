// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`botcall-core`)
//!
//! HTTP and WebSocket surface that translates external requests into
//! `RegistryService` calls. **No registry logic lives here.**
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP/WebSocket (Axum) | register, lookup, listing, health, heartbeat socket |
//! | [`types`] | JSON | request/response bodies, shared with the SDK |

pub mod api;
pub mod types;
