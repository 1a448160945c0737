// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! `kz show` - Show one identity's full record

use anyhow::{anyhow, Result};
use kz_core::{humanize_opt, Clock, SystemClock};

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

pub async fn show(target: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;
    let identity = client.get_identity(target).await.map_err(|e| anyhow!("{}", e))?;

    let Some(identity) = identity else {
        anyhow::bail!("No identity matches '{}'", target);
    };

    let now_ms = SystemClock.epoch_ms();
    format_or_json(format, &identity, || {
        println!("ID:          {}", identity.id);
        println!("Name:        {}", identity.display_name);
        println!("Key:         {}", identity.key);
        println!("Status:      {}", identity.status.as_deref().unwrap_or("unknown"));
        println!("Last active: {}", humanize_opt(identity.last_active.as_deref(), now_ms));
        println!("Updated:     {}", identity.updated_at.as_deref().unwrap_or("-"));
        println!("Webhook:     {}", identity.webhook_url.as_deref().unwrap_or("-"));
        println!("Added:       {}", identity.created_at);
    })
}
