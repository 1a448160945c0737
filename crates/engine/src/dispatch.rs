// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Fan-out of confirmed transitions to subscribers and webhooks.

use kz_adapters::{WebhookAdapter, WebhookError};
use kz_core::{PresenceUpdate, TrackedIdentity};
use tokio::sync::broadcast;

/// Delivers one presence update to every configured sink.
///
/// The two sinks are independent calls with their own results: a test can
/// drive `publish_update` and `deliver_webhook` separately, and `notify`
/// runs both regardless of how either turns out.
pub struct Dispatcher<W> {
    updates: broadcast::Sender<PresenceUpdate>,
    webhook: W,
}

impl<W: WebhookAdapter> Dispatcher<W> {
    pub fn new(updates: broadcast::Sender<PresenceUpdate>, webhook: W) -> Self {
        Self { updates, webhook }
    }

    /// Publish `update` to live subscribers, returning how many received it.
    ///
    /// A quiet channel is not a fault: with nobody subscribed the update is
    /// dropped and the count is zero.
    pub fn publish_update(&self, update: PresenceUpdate) -> usize {
        self.updates.send(update).unwrap_or(0)
    }

    /// POST `message` to the identity's webhook, if one is registered.
    ///
    /// `Ok(None)` means the identity has no webhook and nothing left the
    /// process. Endpoint rejections come back as `Ok(Some(code))`, same as
    /// the underlying adapter.
    pub async fn deliver_webhook(
        &self,
        identity: &TrackedIdentity,
        message: &str,
    ) -> Result<Option<u16>, WebhookError> {
        let Some(url) = identity.webhook_url.as_deref() else {
            return Ok(None);
        };
        self.webhook.deliver(url, message).await.map(Some)
    }

    /// Fan one confirmed transition out to every sink, logging each outcome.
    ///
    /// Never raises toward the poll loop; a failed webhook does not undo the
    /// publish and a quiet channel does not skip the webhook.
    pub async fn notify(&self, identity: &TrackedIdentity, update: PresenceUpdate) {
        let message = update.describe(&identity.display_name);

        let subscribers = self.publish_update(update);
        tracing::debug!(key = %identity.key, subscribers, "presence update published");

        match self.deliver_webhook(identity, &message).await {
            Ok(None) => {}
            Ok(Some(code)) if (200..300).contains(&code) => {
                tracing::debug!(name = %identity.display_name, code, "webhook delivered");
            }
            Ok(Some(code)) => {
                tracing::warn!(
                    name = %identity.display_name,
                    code,
                    "webhook endpoint rejected notification"
                );
            }
            Err(e) => {
                tracing::warn!(
                    name = %identity.display_name,
                    error = %e,
                    "webhook delivery failed"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
