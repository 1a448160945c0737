// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

use serde::{Deserialize, Serialize};

use super::Query;

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Get daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,

    /// Register a new identity by provider username.
    ///
    /// The daemon resolves the username against the profile directory to
    /// obtain the polling key and display fields before inserting.
    IdentityAdd {
        username: String,
        /// Webhook endpoint to notify on transitions
        #[serde(default, skip_serializing_if = "Option::is_none")]
        webhook: Option<String>,
    },

    /// Stop tracking an identity (target: id, key, or display name)
    IdentityRemove { target: String },

    /// Set or clear the webhook endpoint for an identity
    WebhookSet {
        target: String,
        /// `None` clears the webhook
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// Query state
    Query { query: Query },

    /// Upgrade this connection into a live presence update stream.
    ///
    /// After `Response::Subscribed`, the daemon writes length-prefixed JSON
    /// `PresenceUpdate` frames until the client disconnects.
    Subscribe,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
