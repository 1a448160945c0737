// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Query types for reading daemon state.

use serde::{Deserialize, Serialize};

/// Query types for reading daemon state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    /// List all tracked identities
    ListIdentities,
    /// Get one identity by id, key, or display name (exact match, then
    /// id-prefix match)
    GetIdentity { target: String },
}
