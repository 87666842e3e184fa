// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the BotCall CLI

pub mod agent;
pub mod serve;

pub use self::agent::RegisterArgs;
pub use self::serve::ServeArgs;
