// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! The watch loop: sample every pollable identity, persist and announce
//! whatever changed, sleep, repeat.

use crate::cache::StatusCache;
use crate::detect::detect_transition;
use crate::dispatch::Dispatcher;
use kz_adapters::{PresenceAdapter, WebhookAdapter};
use kz_core::{humanize_opt, rfc3339_from_epoch_ms, Clock, PresenceUpdate, TrackedIdentity};
use kz_store::{Store, StoreError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Drives presence sampling for every tracked identity.
///
/// Each cycle takes one sample per identity, in registration order. A failing
/// identity is logged and skipped; a failing store listing skips the whole
/// cycle. Either way the loop sleeps and tries again, so the poller only ever
/// exits through its cancellation token.
pub struct Poller<P, W, C> {
    store: Store,
    cache: StatusCache,
    presence: P,
    dispatcher: Dispatcher<W>,
    clock: C,
    interval: Duration,
}

impl<P, W, C> Poller<P, W, C>
where
    P: PresenceAdapter,
    W: WebhookAdapter,
    C: Clock,
{
    pub fn new(
        store: Store,
        cache: StatusCache,
        presence: P,
        dispatcher: Dispatcher<W>,
        clock: C,
        interval: Duration,
    ) -> Self {
        Self { store, cache, presence, dispatcher, clock, interval }
    }

    /// Run cycles until `cancel` fires.
    ///
    /// The loop is the only place cycle errors land: a failed listing is
    /// logged here and the next cycle starts on schedule. Cancellation is
    /// cooperative: a sample already in flight finishes (its own budget
    /// bounds how long that takes) and the loop exits before the next
    /// identity.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(interval = ?self.interval, "watch loop started");
        loop {
            if cancel.is_cancelled() {
                break;
            }
            if let Err(e) = self.cycle(&cancel).await {
                tracing::error!(error = %e, "cycle skipped: listing identities failed");
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::info!("watch loop stopped");
    }

    /// One pass over every pollable identity.
    ///
    /// Per-identity failures are contained inside `poll_identity`; the only
    /// error that escapes is a store listing failure, which forfeits the
    /// whole cycle.
    async fn cycle(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        let identities = self.store.list_pollable().await?;
        if identities.is_empty() {
            tracing::debug!("no pollable identities");
            return Ok(());
        }

        for identity in &identities {
            if cancel.is_cancelled() {
                break;
            }
            self.poll_identity(identity).await;
        }
        Ok(())
    }

    /// Sample one identity and, if its status changed, persist and fan out.
    async fn poll_identity(&self, identity: &TrackedIdentity) {
        let sample = match self.presence.sample(&identity.key).await {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!(
                    name = %identity.display_name,
                    key = %identity.key,
                    error = %e,
                    "presence sample failed"
                );
                return;
            }
        };

        let Some(transition) = detect_transition(&self.cache, identity, &sample) else {
            return;
        };
        tracing::info!(
            name = %identity.display_name,
            from = %transition.previous,
            to = %transition.status,
            "status changed"
        );

        // The cache already holds the new status, so a failed write here
        // cannot re-fire the notification next cycle. It does mean the
        // snapshot stays stale until the status changes again.
        let now_ms = self.clock.epoch_ms();
        let updated_at = rfc3339_from_epoch_ms(now_ms);
        match self
            .store
            .record_transition(
                &identity.id,
                &transition.status,
                transition.status_at.as_deref(),
                &updated_at,
            )
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(id = %identity.id, "identity removed mid-cycle, snapshot not written")
            }
            Err(e) => {
                tracing::error!(id = %identity.id, error = %e, "persisting transition failed")
            }
        }

        let update = PresenceUpdate {
            identity_id: identity.id.clone(),
            key: identity.key.clone(),
            status: transition.status.clone(),
            last_active: humanize_opt(transition.status_at.as_deref(), now_ms),
        };
        self.dispatcher.notify(identity, update).await;
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
