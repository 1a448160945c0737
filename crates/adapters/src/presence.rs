// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Presence stream sampling: one observation per connection.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Non-blank lines read from one connection before giving up. The stream
/// budget usually fires first; this guards against a fast garbage stream.
const MAX_SAMPLE_LINES: usize = 256;

/// One observed status reading from a single stream connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSample {
    /// Status exactly as the provider spelled it, never empty.
    pub status: String,
    /// Activity timestamp, normalized to RFC 3339 when the provider sent
    /// epoch milliseconds, passed through verbatim when it sent a string.
    pub status_at: Option<String>,
}

/// Errors from sampling the presence stream.
#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("presence endpoint returned HTTP {0}")]
    Endpoint(u16),

    #[error("no sample within the stream budget")]
    Timeout,

    #[error("stream ended before a sample arrived")]
    NoSample,
}

/// Adapter for obtaining one presence sample per call.
#[async_trait]
pub trait PresenceAdapter: Clone + Send + Sync + 'static {
    /// Open a stream for `key`, return the first parseable sample, close.
    async fn sample(&self, key: &str) -> Result<StatusSample, PresenceError>;
}

/// Samples a `data:`-framed event stream over HTTP.
///
/// The connection is held only until the first valid event. Malformed or
/// status-less payloads are logged and skipped without dropping the
/// connection; the whole attempt is bounded by `budget`.
#[derive(Clone)]
pub struct HttpPresenceAdapter {
    client: reqwest::Client,
    /// URL prefix the key is appended to (includes the query parameter).
    base_url: String,
    budget: Duration,
}

impl HttpPresenceAdapter {
    pub fn new(client: reqwest::Client, base_url: String, budget: Duration) -> Self {
        Self { client, base_url, budget }
    }

    async fn sample_inner(&self, key: &str) -> Result<StatusSample, PresenceError> {
        let url = format!("{}{}", self.base_url, key);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PresenceError::Endpoint(status.as_u16()));
        }

        let mut stream = response.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        let mut lines_seen = 0usize;
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = buf.drain(..=pos).collect();
                if let Some(sample) = scan_line(&raw, key, &mut lines_seen)? {
                    return Ok(sample);
                }
            }
        }
        // A final line may arrive without a trailing newline.
        if !buf.is_empty() {
            if let Some(sample) = scan_line(&buf, key, &mut lines_seen)? {
                return Ok(sample);
            }
        }
        Err(PresenceError::NoSample)
    }
}

#[async_trait]
impl PresenceAdapter for HttpPresenceAdapter {
    async fn sample(&self, key: &str) -> Result<StatusSample, PresenceError> {
        match tokio::time::timeout(self.budget, self.sample_inner(key)).await {
            Ok(result) => result,
            Err(_) => Err(PresenceError::Timeout),
        }
    }
}

/// Inspect one raw line; `Some(sample)` ends the read, `Err` aborts it.
fn scan_line(
    raw: &[u8],
    key: &str,
    lines_seen: &mut usize,
) -> Result<Option<StatusSample>, PresenceError> {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim();
    if line.is_empty() {
        return Ok(None);
    }
    *lines_seen += 1;
    if *lines_seen > MAX_SAMPLE_LINES {
        return Err(PresenceError::NoSample);
    }
    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    match parse_event(payload.trim()) {
        Some(sample) => Ok(Some(sample)),
        None => {
            warn!(key = %key, line = %kz_core::short(line, 120), "skipping malformed presence event");
            Ok(None)
        }
    }
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "statusAt")]
    status_at: Option<serde_json::Value>,
}

/// Parse a `data:` payload into a sample. Requires a non-empty status.
fn parse_event(payload: &str) -> Option<StatusSample> {
    let event: RawEvent = serde_json::from_str(payload).ok()?;
    let status = event.status.filter(|s| !s.is_empty())?;
    Some(StatusSample { status, status_at: normalize_status_at(event.status_at) })
}

/// The provider has shipped `statusAt` both as epoch milliseconds and as a
/// preformatted string; accept either, drop anything else.
fn normalize_status_at(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => n.as_u64().map(kz_core::rfc3339_from_epoch_ms),
        _ => None,
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::{PresenceAdapter, PresenceError, StatusSample};

    #[derive(Default)]
    struct FakePresenceState {
        scripted: HashMap<String, VecDeque<Result<StatusSample, ()>>>,
        sampled: Vec<String>,
    }

    /// Fake presence adapter with per-key scripted outcomes.
    ///
    /// Each `sample` call pops the next scripted outcome for the key; an
    /// exhausted (or never scripted) key yields `PresenceError::NoSample`.
    #[derive(Clone, Default)]
    pub struct FakePresenceAdapter {
        inner: Arc<Mutex<FakePresenceState>>,
    }

    impl FakePresenceAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Script a successful sample for `key`.
        pub fn push_sample(&self, key: &str, status: &str, status_at: Option<&str>) {
            self.inner.lock().scripted.entry(key.to_string()).or_default().push_back(Ok(
                StatusSample {
                    status: status.to_string(),
                    status_at: status_at.map(str::to_string),
                },
            ));
        }

        /// Script a transport failure for `key`.
        pub fn push_error(&self, key: &str) {
            self.inner.lock().scripted.entry(key.to_string()).or_default().push_back(Err(()));
        }

        /// Keys sampled so far, in call order.
        pub fn sampled(&self) -> Vec<String> {
            self.inner.lock().sampled.clone()
        }
    }

    #[async_trait]
    impl PresenceAdapter for FakePresenceAdapter {
        async fn sample(&self, key: &str) -> Result<StatusSample, PresenceError> {
            let mut state = self.inner.lock();
            state.sampled.push(key.to_string());
            match state.scripted.get_mut(key).and_then(VecDeque::pop_front) {
                Some(Ok(sample)) => Ok(sample),
                Some(Err(())) => Err(PresenceError::Endpoint(503)),
                None => Err(PresenceError::NoSample),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePresenceAdapter;

#[cfg(test)]
#[path = "presence_tests.rs"]
mod tests;
