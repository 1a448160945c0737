// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("HOME is not set and KZ_STATE_DIR was not given")]
    NoStateDir,
}

/// Resolve state directory: KZ_STATE_DIR > XDG_STATE_HOME/kz > ~/.local/state/kz
///
/// Must match the daemon's resolution, or the CLI will talk to the wrong socket.
pub fn state_dir() -> Result<PathBuf, EnvError> {
    if let Ok(dir) = std::env::var("KZ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("kz"));
    }
    let home = std::env::var("HOME").map_err(|_| EnvError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/kz"))
}

/// Path of the daemon's Unix socket.
pub fn socket_path() -> Result<PathBuf, EnvError> {
    Ok(state_dir()?.join("daemon.sock"))
}

/// Path of the daemon's log file.
pub fn log_path() -> Result<PathBuf, EnvError> {
    Ok(state_dir()?.join("daemon.log"))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    std::env::var("KZ_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// CARGO_MANIFEST_DIR at runtime, set when running under `cargo run`/`cargo test`.
pub fn cargo_manifest_dir() -> Option<String> {
    std::env::var("CARGO_MANIFEST_DIR").ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
