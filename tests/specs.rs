// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Workspace-level specs driving the real `kz` and `kzd` binaries.
//!
//! Each spec gets its own state directory, so daemons never collide and the
//! suite can run in parallel. Specs that need a provider talk to a local
//! HTTP stub instead of the real endpoints.

mod prelude;

mod cli;
mod daemon;
mod identity;
