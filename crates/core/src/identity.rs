// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! The durable record for one watched identity.

use crate::id::IdentityId;
use serde::{Deserialize, Serialize};

/// A tracked identity as persisted in the record store.
///
/// `status`, `last_active`, and `updated_at` start as `None` and are filled in
/// by the poll loop once the provider reports something. Timestamps are
/// RFC 3339 strings throughout; presence status is kept verbatim as the
/// provider spelled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedIdentity {
    pub id: IdentityId,
    /// Provider-side key used when opening a presence stream.
    pub key: String,
    /// Human-facing name, shown in listings and webhook bodies.
    pub display_name: String,
    /// Raw profile blob captured at registration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
    /// Last persisted status, verbatim from the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// RFC 3339 instant the provider last saw this identity active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,
    /// RFC 3339 instant of the last persisted transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Per-identity webhook endpoint, if one is registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub created_at: String,
}

impl TrackedIdentity {
    /// Whether the poll loop can open a presence stream for this record.
    pub fn is_pollable(&self) -> bool {
        !self.key.is_empty()
    }
}

crate::builder! {
    pub struct TrackedIdentityBuilder => TrackedIdentity {
        into {
            id: IdentityId = IdentityId::new(),
            key: String = "hikaru",
            display_name: String = "Hikaru",
            created_at: String = "2026-01-10T12:00:00Z",
        }
        option {
            profile: serde_json::Value = None,
            status: String = None,
            last_active: String = None,
            updated_at: String = None,
            webhook_url: String = None,
        }
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
