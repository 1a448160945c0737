// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Live update payloads published when a tracked identity changes status.

use crate::id::IdentityId;
use serde::{Deserialize, Serialize};

/// A confirmed presence transition, as delivered to live subscribers.
///
/// `last_active` is already humanized ("4 minutes ago", or "unknown" when the
/// provider reported no activity timestamp), so consumers can render it
/// without a clock of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub identity_id: IdentityId,
    /// Provider-side key the identity is polled under.
    pub key: String,
    /// New status, exactly as the provider reported it.
    pub status: String,
    pub last_active: String,
}

impl PresenceUpdate {
    /// Short human line used in logs and plain-text webhook bodies.
    pub fn describe(&self, display_name: &str) -> String {
        match self.status.as_str() {
            "online" => format!("{display_name} is ONLINE"),
            "offline" => {
                format!("{display_name} went OFFLINE (last seen {})", self.last_active)
            }
            other => format!("{display_name} status: {other}"),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
