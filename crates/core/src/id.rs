// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Identity ID newtype and string helpers.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// Unique internal identifier for a tracked identity.
///
/// Assigned once at creation and never reused; distinct from the external
/// identity key the provider knows the identity by. Format is
/// `idn-{nanoid}` (23 characters, fits SmolStr inline capacity).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(pub SmolStr);

impl IdentityId {
    pub const PREFIX: &'static str = "idn-";

    /// Generate a new random ID with the type prefix.
    pub fn new() -> Self {
        Self(SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19))))
    }

    /// Create an ID from an existing string (parsing/deserialization).
    pub fn from_string(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ID without its type prefix.
    pub fn suffix(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for IdentityId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for IdentityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for IdentityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for IdentityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::borrow::Borrow<str> for IdentityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
