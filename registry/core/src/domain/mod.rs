// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Agent records, the presence repository contract, the attestation seam and
//! registry configuration.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types shared by every other layer; no transport knowledge

pub mod agent;
pub mod attestation;
pub mod clock;
pub mod config;
pub mod repository;
