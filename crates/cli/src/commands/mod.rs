// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! CLI command implementations

pub mod add;
pub mod daemon;
pub mod list;
pub mod remove;
pub mod show;
pub mod watch;
pub mod webhook;
