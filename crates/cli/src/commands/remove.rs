// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! `kz remove` - Stop watching an identity

use anyhow::{anyhow, Result};
use kz_core::short;

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_or_json, OutputFormat};

pub async fn remove(target: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;
    let (id, key) = client.remove_identity(target).await.map_err(|e| anyhow!("{}", e))?;

    let obj = serde_json::json!({ "removed": id.as_str(), "key": key });
    format_or_json(format, &obj, || {
        println!(
            "Stopped watching '{}' ({})",
            color::header(&key),
            color::muted(short(id.as_str(), 12))
        );
    })
}
