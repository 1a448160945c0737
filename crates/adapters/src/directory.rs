// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Profile directory lookups, used when registering an identity.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A resolved profile: the polling key plus whatever else the directory said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Stable provider key the presence stream is opened with.
    pub key: String,
    /// Status the profile reported at lookup time, if any.
    pub status: Option<String>,
    /// Full directory payload, persisted verbatim as the profile blob.
    pub raw: serde_json::Value,
}

/// Errors from directory lookups.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("directory returned HTTP {0}")]
    Endpoint(u16),

    #[error("no such user '{0}'")]
    UnknownUser(String),

    #[error("profile for '{0}' has no presence key")]
    Incomplete(String),
}

/// Adapter for resolving a username to a trackable profile.
#[async_trait]
pub trait DirectoryAdapter: Send + Sync {
    async fn lookup(&self, username: &str) -> Result<ProfileRecord, DirectoryError>;
}

/// Resolves profiles against an HTTP directory endpoint.
#[derive(Clone)]
pub struct HttpDirectoryAdapter {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpDirectoryAdapter {
    pub fn new(client: reqwest::Client, base_url: String, timeout: Duration) -> Self {
        Self { client, base_url, timeout }
    }
}

#[async_trait]
impl DirectoryAdapter for HttpDirectoryAdapter {
    async fn lookup(&self, username: &str) -> Result<ProfileRecord, DirectoryError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), username);
        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DirectoryError::UnknownUser(username.to_string()));
        }
        if !status.is_success() {
            return Err(DirectoryError::Endpoint(status.as_u16()));
        }
        let raw: serde_json::Value = response.json().await?;
        profile_from_payload(username, raw)
    }
}

/// The directory answers 200 with an empty-ish body for unknown users; a
/// profile without a user id means "no such user", one without a uuid cannot
/// be polled and is rejected outright.
fn profile_from_payload(
    username: &str,
    raw: serde_json::Value,
) -> Result<ProfileRecord, DirectoryError> {
    let exists = raw.get("userId").is_some_and(|v| !v.is_null());
    if !exists {
        return Err(DirectoryError::UnknownUser(username.to_string()));
    }
    let key = raw
        .get("uuid")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DirectoryError::Incomplete(username.to_string()))?;
    let status = raw
        .get("onlineStatus")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    Ok(ProfileRecord { key, status, raw })
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::{DirectoryAdapter, DirectoryError, ProfileRecord};

    #[derive(Default)]
    struct FakeDirectoryState {
        profiles: HashMap<String, ProfileRecord>,
        lookups: Vec<String>,
    }

    /// Fake directory with a fixed set of known profiles.
    #[derive(Clone, Default)]
    pub struct FakeDirectoryAdapter {
        inner: Arc<Mutex<FakeDirectoryState>>,
    }

    impl FakeDirectoryAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a known profile under `username`.
        pub fn insert(&self, username: &str, key: &str, status: Option<&str>) {
            let record = ProfileRecord {
                key: key.to_string(),
                status: status.map(str::to_string),
                raw: serde_json::json!({"userId": 1, "uuid": key, "username": username}),
            };
            self.inner.lock().profiles.insert(username.to_string(), record);
        }

        /// Usernames looked up so far, in call order.
        pub fn lookups(&self) -> Vec<String> {
            self.inner.lock().lookups.clone()
        }
    }

    #[async_trait]
    impl DirectoryAdapter for FakeDirectoryAdapter {
        async fn lookup(&self, username: &str) -> Result<ProfileRecord, DirectoryError> {
            let mut state = self.inner.lock();
            state.lookups.push(username.to_string());
            state
                .profiles
                .get(username)
                .cloned()
                .ok_or_else(|| DirectoryError::UnknownUser(username.to_string()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDirectoryAdapter;

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
