// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

use kz_core::{IdentityId, TrackedIdentity};
use serde::{Deserialize, Serialize};

use super::IdentitySummary;

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    /// Daemon status
    Status {
        uptime_secs: u64,
        /// Identities in the record store
        tracked: usize,
        /// Identities the poll loop is actually sampling
        pollable: usize,
        /// Live subscriber connections
        subscribers: usize,
    },

    /// List of tracked identities
    Identities { identities: Vec<IdentitySummary> },

    /// Single identity, full record including the profile blob
    Identity { identity: Option<Box<TrackedIdentity>> },

    /// Identity registered successfully
    IdentityAdded { identity: IdentitySummary },

    /// Identity removed
    Removed { id: IdentityId, key: String },

    /// Connection is upgraded; `PresenceUpdate` frames follow
    Subscribed,

    /// Error response
    Error { message: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
