// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! `kz webhook` - Set or clear an identity's webhook

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct WebhookArgs {
    /// Identity ID (or prefix), key, or display name
    pub target: String,

    /// Webhook URL to set
    #[arg(long, value_name = "URL", conflicts_with = "clear")]
    pub set: Option<String>,

    /// Remove the configured webhook
    #[arg(long)]
    pub clear: bool,
}

pub async fn webhook(args: WebhookArgs, format: OutputFormat) -> Result<()> {
    let url = match (&args.set, args.clear) {
        (Some(url), false) => Some(url.as_str()),
        (None, true) => None,
        _ => anyhow::bail!("pass --set <URL> or --clear"),
    };

    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;
    client.set_webhook(&args.target, url).await.map_err(|e| anyhow!("{}", e))?;

    let obj = serde_json::json!({ "target": args.target, "webhook": url });
    format_or_json(format, &obj, || match url {
        Some(url) => println!("Webhook for '{}' set to {}", color::header(&args.target), url),
        None => println!("Webhook for '{}' cleared", color::header(&args.target)),
    })
}
