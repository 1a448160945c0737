// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! In-memory last-observed-status map, keyed by provider key.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The last status this process observed per provider key.
///
/// The cache, not the persisted snapshot, is the primary dedup reference: a
/// transition updates it synchronously before the store write, so a failed
/// write cannot re-fire the same notification on the next cycle. Cloning is
/// cheap and shares the underlying map.
#[derive(Clone, Default)]
pub struct StatusCache {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed status for `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, status: &str) {
        self.inner.lock().insert(key.to_string(), status.to_string());
    }

    /// Drop the entry for `key`. Called when an identity is removed so a
    /// re-added identity starts from its persisted snapshot again.
    pub fn remove(&self, key: &str) {
        self.inner.lock().remove(key);
    }

    /// Bulk-load persisted statuses at startup, before the first cycle runs.
    pub fn seed<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = self.inner.lock();
        for (key, status) in entries {
            map.insert(key, status);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
