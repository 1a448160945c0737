// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Coarse relative-age formatting for "last active" timestamps.

use chrono::{DateTime, SecondsFormat, Utc};

/// Render an RFC 3339 timestamp as a coarse "N units ago" string.
///
/// Picks the largest non-zero unit by integer division: `"45 seconds ago"`,
/// `"2 minutes ago"`, `"2 hours ago"`, `"1 days ago"`. Timestamps that fail
/// to parse map to the literal `"unknown time"`; timestamps in the future
/// clamp to `"0 seconds ago"`.
pub fn humanize_since(ts: &str, now_ms: u64) -> String {
    let parsed = match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt,
        Err(_) => return "unknown time".to_string(),
    };

    let seconds = ((now_ms as i64 - parsed.timestamp_millis()).max(0) / 1000) as u64;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if minutes < 60 {
        format!("{} minutes ago", minutes)
    } else if hours < 24 {
        format!("{} hours ago", hours)
    } else {
        format!("{} days ago", days)
    }
}

/// Humanize an optional timestamp; absent maps to `"unknown"`.
pub fn humanize_opt(ts: Option<&str>, now_ms: u64) -> String {
    match ts {
        Some(ts) => humanize_since(ts, now_ms),
        None => "unknown".to_string(),
    }
}

/// Render epoch milliseconds as an RFC 3339 instant (`2024-05-01T12:00:00Z`).
///
/// Used for the engine-assigned `updated_at` stamp so stored timestamps stay
/// in the same format the provider reports `statusAt` in.
pub fn rfc3339_from_epoch_ms(epoch_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
