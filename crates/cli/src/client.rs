// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Unix-socket client for the kzd daemon.
//!
//! The daemon serves one request per connection, so every method opens a
//! fresh stream. `Subscribe` is the exception: it upgrades the connection
//! into a long-lived update stream.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use kz_core::{IdentityId, PresenceUpdate, TrackedIdentity};
use kz_wire::{decode, read_message, read_response, write_request};
use kz_wire::{IdentitySummary, ProtocolError, Query, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

use crate::env::EnvError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    NotRunning,
    #[error("failed to start daemon: {0}")]
    StartFailed(String),
    #[error("{0}")]
    Daemon(String),
    #[error("unexpected response from daemon")]
    UnexpectedResponse,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True when the failure means "no daemon behind the socket" rather than
    /// a protocol or daemon-side error.
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::NotRunning)
    }
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Connect to an existing daemon. Errors if no socket file is present.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = crate::env::socket_path()?;
        if !socket_path.exists() {
            return Err(ClientError::NotRunning);
        }
        Ok(Self { socket_path, timeout: crate::env::ipc_timeout() })
    }

    /// Connect to the daemon, starting it in the background if needed.
    ///
    /// A leftover socket file from a crashed daemon refuses connections, so
    /// liveness is probed with a real connect before deciding not to spawn.
    pub fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect() {
            if client.probe() {
                return Ok(client);
            }
        }
        spawn_daemon()?;
        Self::connect()
    }

    fn probe(&self) -> bool {
        std::os::unix::net::UnixStream::connect(&self.socket_path).is_ok()
    }

    async fn open(&self) -> Result<UnixStream, ClientError> {
        UnixStream::connect(&self.socket_path).await.map_err(|_| ClientError::NotRunning)
    }

    /// Send one request and read its response.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = self.open().await?;
        write_request(&mut stream, request, self.timeout).await?;
        match read_response(&mut stream, self.timeout).await? {
            Response::Error { message } => Err(ClientError::Daemon(message)),
            other => Ok(other),
        }
    }

    fn reject<T>(_response: Response) -> Result<T, ClientError> {
        Err(ClientError::UnexpectedResponse)
    }

    /// Liveness check
    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")).to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    /// Get daemon status: (uptime_secs, tracked, pollable, subscribers)
    pub async fn status(&self) -> Result<(u64, usize, usize, usize), ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { uptime_secs, tracked, pollable, subscribers } => {
                Ok((uptime_secs, tracked, pollable, subscribers))
            }
            other => Self::reject(other),
        }
    }

    /// Request daemon shutdown.
    ///
    /// The daemon tears down right after answering, so a connection that
    /// drops before the response arrives still counts as a successful stop.
    pub async fn stop(&self) -> Result<(), ClientError> {
        let mut stream = self.open().await?;
        write_request(&mut stream, &Request::Shutdown, self.timeout).await?;
        match read_response(&mut stream, self.timeout).await {
            Ok(Response::ShuttingDown | Response::Ok) => Ok(()),
            Err(ProtocolError::ConnectionClosed) => Ok(()),
            Ok(other) => Self::reject(other),
            Err(e) => Err(e.into()),
        }
    }

    /// Start watching a username, with an optional per-identity webhook
    pub async fn add_identity(
        &self,
        username: &str,
        webhook: Option<&str>,
    ) -> Result<IdentitySummary, ClientError> {
        let request = Request::IdentityAdd {
            username: username.to_string(),
            webhook: webhook.map(String::from),
        };
        match self.send(&request).await? {
            Response::IdentityAdded { identity } => Ok(identity),
            other => Self::reject(other),
        }
    }

    /// Stop watching an identity (by ID, ID prefix, key, or name)
    pub async fn remove_identity(
        &self,
        target: &str,
    ) -> Result<(IdentityId, String), ClientError> {
        let request = Request::IdentityRemove { target: target.to_string() };
        match self.send(&request).await? {
            Response::Removed { id, key } => Ok((id, key)),
            other => Self::reject(other),
        }
    }

    /// Set or clear an identity's webhook URL
    pub async fn set_webhook(&self, target: &str, url: Option<&str>) -> Result<(), ClientError> {
        let request =
            Request::WebhookSet { target: target.to_string(), url: url.map(String::from) };
        match self.send(&request).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Query for all tracked identities
    pub async fn list_identities(&self) -> Result<Vec<IdentitySummary>, ClientError> {
        let request = Request::Query { query: Query::ListIdentities };
        match self.send(&request).await? {
            Response::Identities { identities } => Ok(identities),
            other => Self::reject(other),
        }
    }

    /// Query for a single identity with its full stored record
    pub async fn get_identity(&self, target: &str) -> Result<Option<TrackedIdentity>, ClientError> {
        let request = Request::Query { query: Query::GetIdentity { target: target.to_string() } };
        match self.send(&request).await? {
            Response::Identity { identity } => Ok(identity.map(|b| *b)),
            other => Self::reject(other),
        }
    }

    /// Upgrade a connection into a presence-update stream
    pub async fn subscribe(&self) -> Result<UpdateStream, ClientError> {
        let mut stream = self.open().await?;
        write_request(&mut stream, &Request::Subscribe, self.timeout).await?;
        match read_response(&mut stream, self.timeout).await? {
            Response::Subscribed => Ok(UpdateStream { stream }),
            other => Self::reject(other),
        }
    }
}

/// A subscribed connection; each frame is one [`PresenceUpdate`].
pub struct UpdateStream {
    stream: UnixStream,
}

impl UpdateStream {
    /// Wait for the next update. `ConnectionClosed` means the daemon stopped.
    pub async fn next(&mut self) -> Result<PresenceUpdate, ClientError> {
        let frame = read_message(&mut self.stream).await?;
        Ok(decode(&frame)?)
    }
}

/// Stop the daemon if it is running. Returns whether it was running.
pub async fn daemon_stop() -> Result<bool, ClientError> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(ClientError::NotRunning) => return Ok(false),
        Err(e) => return Err(e),
    };
    match client.stop().await {
        Ok(()) => Ok(true),
        Err(ClientError::NotRunning) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Spawn kzd in the background and wait for its readiness marker.
fn spawn_daemon() -> Result<(), ClientError> {
    let kzd = find_kzd_binary();
    let mut child = std::process::Command::new(&kzd)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::StartFailed(format!("could not launch {}: {e}", kzd.display())))?;

    // kzd prints READY once the socket is bound; EOF first means it died
    if let Some(stdout) = child.stdout.take() {
        let mut reader = std::io::BufReader::new(stdout);
        let mut line = String::new();
        loop {
            line.clear();
            let n = reader.read_line(&mut line)?;
            if n == 0 {
                let _ = child.wait();
                return Err(ClientError::StartFailed(
                    "daemon exited before reporting ready".to_string(),
                ));
            }
            if line.trim() == "READY" {
                return Ok(());
            }
        }
    }
    Err(ClientError::StartFailed("daemon stdout was not captured".to_string()))
}

/// Locate the kzd binary: dev target dir (debug builds), then the directory
/// of the current executable, then PATH.
pub(crate) fn find_kzd_binary() -> PathBuf {
    let current_exe = std::env::current_exe().ok();

    // Only use CARGO_MANIFEST_DIR if the CLI itself is a debug build, so a
    // release install never picks up a stale dev daemon.
    let is_debug_build = current_exe
        .as_ref()
        .and_then(|p| p.to_str())
        .map(|s| s.contains("target/debug"))
        .unwrap_or(false);

    if is_debug_build {
        if let Some(manifest_dir) = crate::env::cargo_manifest_dir() {
            let dev_path = PathBuf::from(manifest_dir)
                .parent()
                .and_then(|p| p.parent())
                .map(|p| p.join("target/debug/kzd"));
            if let Some(path) = dev_path {
                if path.exists() {
                    return path;
                }
            }
        }
    }

    if let Some(ref exe) = current_exe {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("kzd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("kzd")
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
