// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! kzd: the presence watchdog daemon.
//!
//! Owns the identity database, runs the poll loop, and serves the `kz` CLI
//! over a Unix socket in the state directory.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod listener;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use kz_adapters::{HttpDirectoryAdapter, HttpPresenceAdapter, HttpWebhookAdapter};
use kz_core::{PresenceUpdate, SystemClock};
use kz_engine::{Dispatcher, Poller};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{broadcast, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::env::PROTOCOL_VERSION;
use crate::lifecycle::{startup, Config, LifecycleError, StartupResult};
use crate::listener::{ListenCtx, Listener};

const DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("kzd: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), LifecycleError> {
    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;

    // Log to daemon.log in the state dir; KZ_LOG controls the filter
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    let (writer, _guard) = tracing_appender::non_blocking(log_file);
    let filter = EnvFilter::try_from_env("KZ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    info!(version = PROTOCOL_VERSION, "starting kzd");

    let StartupResult { mut daemon, listener } = startup(&config).await?;
    let settings = daemon.settings.clone();

    // One HTTP client behind all three adapters
    let client = reqwest::Client::new();
    let presence = HttpPresenceAdapter::new(
        client.clone(),
        settings.provider.presence_url.clone(),
        settings.stream_budget(),
    );
    let webhook = HttpWebhookAdapter::new(client.clone(), settings.webhook_timeout());
    let directory =
        HttpDirectoryAdapter::new(client, settings.provider.profile_url.clone(), DIRECTORY_TIMEOUT);

    let (updates, _) = broadcast::channel::<PresenceUpdate>(256);

    let dispatcher = Dispatcher::new(updates.clone(), webhook);
    let poller = Poller::new(
        daemon.store.clone(),
        daemon.cache.clone(),
        presence,
        dispatcher,
        SystemClock,
        settings.interval(),
    );
    let cancel = CancellationToken::new();
    let poller_task = tokio::spawn(poller.run(cancel.clone()));

    let shutdown = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        store: daemon.store.clone(),
        cache: daemon.cache.clone(),
        updates,
        directory: Arc::new(directory),
        start_time: daemon.start_time,
        shutdown: Arc::clone(&shutdown),
    });
    tokio::spawn(Listener::new(listener, ctx).run());

    // Readiness marker on stdout for `kz daemon start` to wait on
    println!("READY");

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = shutdown.notified() => info!("Shutdown requested over IPC"),
    }

    // Let the poll loop finish its current identity, then remove runtime files
    cancel.cancel();
    if let Err(e) = poller_task.await {
        warn!("Poller task did not exit cleanly: {}", e);
    }
    daemon.shutdown()?;

    Ok(())
}
