// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! `kz list` - List tracked identities

use std::io::Write;

use anyhow::{anyhow, Result};
use kz_core::{humanize_opt, Clock, SystemClock};

use crate::client::DaemonClient;
use crate::output::{handle_list, OutputFormat};

pub async fn list(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;
    let identities = client.list_identities().await.map_err(|e| anyhow!("{}", e))?;

    let now_ms = SystemClock.epoch_ms();
    let empty_msg = "No identities tracked. Add one with `kz add <username>`.";
    handle_list(format, &identities, empty_msg, |items, out| {
        let rows: Vec<(&str, &str, &str, String, &str)> = items
            .iter()
            .map(|i| {
                (
                    i.display_name.as_str(),
                    i.key.as_str(),
                    i.status.as_deref().unwrap_or("-"),
                    humanize_opt(i.last_active.as_deref(), now_ms),
                    i.webhook_url.as_deref().unwrap_or("-"),
                )
            })
            .collect();

        // Column widths follow the data
        let name_width =
            rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max("NAME".len());
        let key_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max("KEY".len());
        let status_width =
            rows.iter().map(|r| r.2.len()).max().unwrap_or(0).max("STATUS".len());
        let active_width =
            rows.iter().map(|r| r.3.len()).max().unwrap_or(0).max("LAST ACTIVE".len());

        let _ = writeln!(
            out,
            "{:<name_width$} {:<key_width$} {:<status_width$} {:<active_width$} WEBHOOK",
            "NAME", "KEY", "STATUS", "LAST ACTIVE"
        );
        for (name, key, status, active, webhook) in &rows {
            let _ = writeln!(
                out,
                "{:<name_width$} {:<key_width$} {:<status_width$} {:<active_width$} {}",
                name, key, status, active, webhook
            );
        }
    })
}
