// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Daemon settings from `config.toml` in the state directory.
//!
//! Every key is optional; a missing file means all defaults. Unknown keys
//! are rejected so typos surface at startup instead of silently reverting
//! to a default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Settings file errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
}

/// Daemon settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub poll: PollSettings,
    pub webhook: WebhookSettings,
}

/// Upstream provider endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    /// Streaming presence endpoint; the watched key is appended verbatim.
    pub presence_url: String,
    /// Profile directory endpoint; `/{username}` is appended.
    pub profile_url: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            presence_url: "https://www.chess.com/service/presence/watch/users?ids=".to_string(),
            profile_url: "https://www.chess.com/callback/user/popup".to_string(),
        }
    }
}

/// Poll loop timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollSettings {
    /// Delay between poll cycles, in seconds.
    pub interval_secs: u64,
    /// Budget for one streaming sample (connect plus read), in seconds.
    pub stream_budget_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self { interval_secs: 5, stream_budget_secs: 30 }
    }
}

/// Webhook delivery.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookSettings {
    /// Timeout for one webhook POST, in seconds.
    pub timeout_secs: u64,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self { timeout_secs: 2 }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(SettingsError::Read(path.to_path_buf(), e)),
        };
        toml::from_str(&raw).map_err(|e| SettingsError::Parse(path.to_path_buf(), e))
    }

    /// Delay between poll cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }

    /// Budget for one streaming sample.
    pub fn stream_budget(&self) -> Duration {
        Duration::from_secs(self.poll.stream_budget_secs)
    }

    /// Timeout for one webhook POST.
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook.timeout_secs)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
