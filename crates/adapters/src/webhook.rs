// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Webhook delivery: plain-text POST, short timeout, no retry.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("webhook did not answer in time")]
    Timeout,
}

/// Adapter for delivering transition messages to an operator-supplied URL.
#[async_trait]
pub trait WebhookAdapter: Clone + Send + Sync + 'static {
    /// POST `message` as the raw request body; returns the HTTP status code.
    ///
    /// Non-2xx codes are returned, not raised: the caller decides how loudly
    /// to log them.
    async fn deliver(&self, url: &str, message: &str) -> Result<u16, WebhookError>;
}

/// Delivers webhooks over HTTP with a per-request timeout.
#[derive(Clone)]
pub struct HttpWebhookAdapter {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpWebhookAdapter {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl WebhookAdapter for HttpWebhookAdapter {
    async fn deliver(&self, url: &str, message: &str) -> Result<u16, WebhookError> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .body(message.to_string())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebhookError::Timeout
                } else {
                    WebhookError::Transport(e)
                }
            })?;
        Ok(response.status().as_u16())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::{WebhookAdapter, WebhookError};

    /// Recorded delivery
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct WebhookCall {
        pub url: String,
        pub message: String,
    }

    struct FakeWebhookState {
        calls: Vec<WebhookCall>,
        status: u16,
        fail: bool,
    }

    /// Fake webhook adapter recording every delivery.
    #[derive(Clone)]
    pub struct FakeWebhookAdapter {
        inner: Arc<Mutex<FakeWebhookState>>,
    }

    impl Default for FakeWebhookAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeWebhookState {
                    calls: Vec::new(),
                    status: 200,
                    fail: false,
                })),
            }
        }
    }

    impl FakeWebhookAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Status code returned for subsequent deliveries.
        pub fn respond_with(&self, status: u16) {
            self.inner.lock().status = status;
        }

        /// Make subsequent deliveries time out.
        pub fn fail_deliveries(&self) {
            self.inner.lock().fail = true;
        }

        /// Get all recorded deliveries
        pub fn calls(&self) -> Vec<WebhookCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl WebhookAdapter for FakeWebhookAdapter {
        async fn deliver(&self, url: &str, message: &str) -> Result<u16, WebhookError> {
            let mut state = self.inner.lock();
            if state.fail {
                return Err(WebhookError::Timeout);
            }
            state
                .calls
                .push(WebhookCall { url: url.to_string(), message: message.to_string() });
            Ok(state.status)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWebhookAdapter, WebhookCall};

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
