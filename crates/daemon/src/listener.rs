// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and handling
//! them without blocking the poll loop. Mutating requests go straight to the
//! store; `Subscribe` upgrades its connection into a live update stream fed
//! by the poller's broadcast channel.

use std::sync::Arc;
use std::time::Instant;

use kz_adapters::{DirectoryAdapter, DirectoryError};
use kz_core::{
    rfc3339_from_epoch_ms, Clock, IdentityId, PresenceUpdate, SystemClock, TrackedIdentity,
};
use kz_engine::StatusCache;
use kz_store::{Store, StoreError};
use kz_wire::{encode, read_request, write_message, write_response};
use kz_wire::{IdentitySummary, ProtocolError, Query, Request, Response};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixListener;
use tokio::sync::{broadcast, Notify};
use tracing::{debug, error, info, warn};

use crate::env::{ipc_timeout, PROTOCOL_VERSION};

/// Shared daemon context for all request handlers.
pub(crate) struct ListenCtx {
    pub store: Store,
    pub cache: StatusCache,
    /// Channel the poller publishes transitions on; subscribers tap it here.
    pub updates: broadcast::Sender<PresenceUpdate>,
    /// Profile directory used to resolve usernames at registration.
    pub directory: Arc<dyn DirectoryAdapter>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Listener task for accepting socket connections.
pub(crate) struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

impl Listener {
    /// Create a new listener on a bound Unix socket.
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    /// Run the listener loop until shutdown, spawning tasks for each connection.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!("Unix accept error: {}", e),
            }
        }
    }
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::ConnectionClosed => debug!("Client disconnected"),
        ProtocolError::Timeout => warn!("Connection timeout"),
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection.
///
/// Races the request handler against client disconnect detection so a client
/// that gives up early (e.g. CLI timeout) does not leave an orphaned handler
/// holding the connection.
///
/// Generic over reader/writer types so tests can drive it with in-memory
/// duplex streams.
async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx,
) -> Result<(), ProtocolError>
where
    R: AsyncRead + AsyncReadExt + Unpin + Send + 'static,
    W: AsyncWrite + AsyncWriteExt + Unpin + Send + 'static,
{
    // Read request with timeout
    let request = read_request(&mut reader, ipc_timeout()).await?;

    // Log queries at debug level (frequent polling), other requests at info
    if matches!(request, Request::Query { .. }) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    // Subscribe is a connection-upgrading request: after the acknowledgement
    // the connection becomes a one-way stream of update frames. Handle it
    // before the normal request/response dispatch.
    if matches!(request, Request::Subscribe) {
        return stream_updates(writer, ctx).await;
    }

    // Race handler against client disconnect
    let response = tokio::select! {
        response = handle_request(request, ctx) => response,
        _ = detect_client_disconnect(&mut reader) => {
            debug!("Client disconnected, dropping handler");
            return Ok(());
        }
    };

    debug!("Sending response: {:?}", response);

    // Write response with timeout
    write_response(&mut writer, &response, ipc_timeout()).await?;

    Ok(())
}

/// Detect client disconnect by reading from the socket after the request.
///
/// In the request-response protocol, the client sends one request then waits.
/// If the client disconnects early, reading returns 0 bytes (EOF).
async fn detect_client_disconnect<R: AsyncReadExt + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

/// Forward each broadcast `PresenceUpdate` to the subscriber as a frame.
///
/// The receiver is registered before the acknowledgement is written, so an
/// update published right after `Subscribed` cannot be missed. A lagged
/// receiver logs what the channel dropped and keeps going.
async fn stream_updates<W>(mut writer: W, ctx: &ListenCtx) -> Result<(), ProtocolError>
where
    W: AsyncWrite + AsyncWriteExt + Unpin + Send + 'static,
{
    let mut rx = ctx.updates.subscribe();
    write_response(&mut writer, &Response::Subscribed, ipc_timeout()).await?;
    info!("Subscriber attached");

    loop {
        match rx.recv().await {
            Ok(update) => {
                let frame = encode(&update)?;
                if let Err(e) = write_message(&mut writer, &frame).await {
                    debug!("Subscriber went away: {}", e);
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Subscriber lagging, skipped {} updates", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    Ok(())
}

/// Handle a single request and return a response.
async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => {
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::Status => handle_status(ctx).await,

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }

        Request::IdentityAdd { username, webhook } => {
            handle_identity_add(ctx, &username, webhook).await
        }

        Request::IdentityRemove { target } => handle_identity_remove(ctx, &target).await,

        Request::WebhookSet { target, url } => {
            handle_webhook_set(ctx, &target, url.as_deref()).await
        }

        Request::Query { query } => handle_query(ctx, query).await,

        // Intercepted in handle_connection before reaching handle_request
        Request::Subscribe => unreachable!(),
    }
}

async fn handle_status(ctx: &ListenCtx) -> Response {
    match ctx.store.counts().await {
        Ok((tracked, pollable)) => Response::Status {
            uptime_secs: ctx.start_time.elapsed().as_secs(),
            tracked,
            pollable,
            subscribers: ctx.updates.receiver_count(),
        },
        Err(e) => Response::Error { message: format!("status query failed: {e}") },
    }
}

/// Resolve a username against the profile directory and insert the record.
///
/// The directory payload is kept verbatim as the profile blob, and the status
/// it reports becomes the initial persisted status. The first poll cycle then
/// only announces a change that happened after registration.
async fn handle_identity_add(
    ctx: &ListenCtx,
    username: &str,
    webhook: Option<String>,
) -> Response {
    let profile = match ctx.directory.lookup(username).await {
        Ok(profile) => profile,
        Err(e @ (DirectoryError::UnknownUser(_) | DirectoryError::Incomplete(_))) => {
            return Response::Error { message: e.to_string() };
        }
        Err(e) => return Response::Error { message: format!("directory lookup failed: {e}") },
    };

    let identity = TrackedIdentity {
        id: IdentityId::new(),
        key: profile.key,
        display_name: username.to_string(),
        profile: Some(profile.raw),
        status: Some(profile.status.unwrap_or_else(|| "unknown".to_string())),
        last_active: None,
        updated_at: None,
        webhook_url: webhook,
        created_at: rfc3339_from_epoch_ms(SystemClock.epoch_ms()),
    };

    match ctx.store.insert(&identity).await {
        Ok(()) => {
            info!(identity = %identity.id, key = %identity.key, "registered identity");
            Response::IdentityAdded { identity: IdentitySummary::from(&identity) }
        }
        Err(e @ StoreError::Duplicate(_)) => Response::Error { message: e.to_string() },
        Err(e) => Response::Error { message: format!("insert failed: {e}") },
    }
}

async fn handle_identity_remove(ctx: &ListenCtx, target: &str) -> Response {
    let identity = match find_target(ctx, target).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    if let Err(e) = ctx.store.remove(&identity.id).await {
        return Response::Error { message: format!("remove failed: {e}") };
    }
    // Forget the cached status so a later re-add starts from a clean slate
    ctx.cache.remove(&identity.key);

    info!(identity = %identity.id, key = %identity.key, "removed identity");
    Response::Removed { id: identity.id, key: identity.key }
}

async fn handle_webhook_set(ctx: &ListenCtx, target: &str, url: Option<&str>) -> Response {
    let identity = match find_target(ctx, target).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    match ctx.store.set_webhook(&identity.id, url).await {
        Ok(()) => {
            match url {
                Some(_) => info!(identity = %identity.id, "webhook set"),
                None => info!(identity = %identity.id, "webhook cleared"),
            }
            Response::Ok
        }
        Err(e) => Response::Error { message: format!("webhook update failed: {e}") },
    }
}

async fn handle_query(ctx: &ListenCtx, query: Query) -> Response {
    match query {
        Query::ListIdentities => match ctx.store.list().await {
            Ok(identities) => Response::Identities {
                identities: identities.iter().map(IdentitySummary::from).collect(),
            },
            Err(e) => Response::Error { message: format!("list failed: {e}") },
        },

        Query::GetIdentity { target } => match ctx.store.find(&target).await {
            Ok(identity) => Response::Identity { identity: identity.map(Box::new) },
            Err(e @ StoreError::Ambiguous(_)) => Response::Error { message: e.to_string() },
            Err(e) => Response::Error { message: format!("lookup failed: {e}") },
        },
    }
}

/// Resolve a user-supplied target (id, key, display name, or id prefix),
/// mapping misses and ambiguity to error responses.
async fn find_target(ctx: &ListenCtx, target: &str) -> Result<TrackedIdentity, Response> {
    match ctx.store.find(target).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err(Response::Error { message: format!("no identity matches '{target}'") }),
        Err(e @ StoreError::Ambiguous(_)) => Err(Response::Error { message: e.to_string() }),
        Err(e) => Err(Response::Error { message: format!("lookup failed: {e}") }),
    }
}

#[cfg(test)]
async fn test_ctx(dir: &std::path::Path) -> (ListenCtx, kz_adapters::FakeDirectoryAdapter) {
    let store = Store::open(&dir.join("kz.db")).await.unwrap();
    let directory = kz_adapters::FakeDirectoryAdapter::new();
    let (updates, _) = broadcast::channel(16);
    let ctx = ListenCtx {
        store,
        cache: StatusCache::new(),
        updates,
        directory: Arc::new(directory.clone()),
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    };
    (ctx, directory)
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
