// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! `kz watch` - Stream presence updates

use anyhow::{anyhow, Result};
use kz_wire::ProtocolError;

use crate::client::{ClientError, DaemonClient};
use crate::output::OutputFormat;

pub async fn watch(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;
    let mut updates = client.subscribe().await.map_err(|e| anyhow!("{}", e))?;

    if format == OutputFormat::Text {
        eprintln!("Watching for presence changes (Ctrl-C to stop)");
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            update = updates.next() => {
                match update {
                    // One line per update; JSON mode emits one object per line
                    Ok(update) => match format {
                        OutputFormat::Text => println!("{}", update.describe(&update.key)),
                        OutputFormat::Json => println!("{}", serde_json::to_string(&update)?),
                    },
                    Err(ClientError::Protocol(ProtocolError::ConnectionClosed)) => {
                        eprintln!("Daemon closed the stream");
                        break;
                    }
                    Err(e) => return Err(anyhow!("{}", e)),
                }
            }
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}
