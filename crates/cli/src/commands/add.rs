// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! `kz add` - Start watching a username

use anyhow::{anyhow, Result};

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_or_json, OutputFormat};

pub async fn add(username: &str, webhook: Option<&str>, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;
    let identity = client.add_identity(username, webhook).await.map_err(|e| anyhow!("{}", e))?;

    format_or_json(format, &identity, || {
        println!(
            "Watching '{}' as {} ({})",
            color::header(&identity.display_name),
            identity.key,
            color::muted(identity.status.as_deref().unwrap_or("unknown")),
        );
        if let Some(url) = &identity.webhook_url {
            println!("Webhook: {}", url);
        }
    })
}
