// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Listing DTOs carried in responses.

use kz_core::{IdentityId, TrackedIdentity};
use serde::{Deserialize, Serialize};

/// One row of `kz list`: the tracked record minus the profile blob.
///
/// Timestamps stay RFC 3339 on the wire; the CLI humanizes at render time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentitySummary {
    pub id: IdentityId,
    pub key: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl From<&TrackedIdentity> for IdentitySummary {
    fn from(identity: &TrackedIdentity) -> Self {
        Self {
            id: identity.id.clone(),
            key: identity.key.clone(),
            display_name: identity.display_name.clone(),
            status: identity.status.clone(),
            last_active: identity.last_active.clone(),
            updated_at: identity.updated_at.clone(),
            webhook_url: identity.webhook_url.clone(),
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
