// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Transition detection: decide whether a sample is news.

use crate::cache::StatusCache;
use kz_adapters::StatusSample;
use kz_core::TrackedIdentity;

/// A status change worth announcing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The reference status the sample was compared against.
    pub previous: String,
    /// The new status, verbatim from the sample.
    pub status: String,
    /// RFC 3339 activity timestamp carried by the sample, if any.
    pub status_at: Option<String>,
}

/// Compare `sample` against the last status observed for `identity`.
///
/// The reference is the cache entry for the identity's key, falling back to
/// the persisted snapshot status and finally to the literal `"unknown"`, so
/// a never-before-seen identity fires once on its first real status. The
/// comparison is exact byte equality; providers that change spelling produce
/// a (harmless) extra transition.
///
/// On a change the cache is updated before returning, which makes the call
/// idempotent per sample: feeding the same sample again yields `None` even
/// if the caller's store write failed in between.
pub fn detect_transition(
    cache: &StatusCache,
    identity: &TrackedIdentity,
    sample: &StatusSample,
) -> Option<Transition> {
    if sample.status.is_empty() {
        return None;
    }

    let previous = cache
        .get(&identity.key)
        .or_else(|| identity.status.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "unknown".to_string());

    if sample.status == previous {
        return None;
    }

    cache.set(&identity.key, &sample.status);
    Some(Transition {
        previous,
        status: sample.status.clone(),
        status_at: sample.status_at.clone(),
    })
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
