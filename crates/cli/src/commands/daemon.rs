// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! `kz daemon` - Daemon management commands

use std::io::{BufRead, BufReader};

use anyhow::{anyhow, Result};
use clap::{Args, CommandFactory, Subcommand};

use crate::client::{daemon_stop, find_kzd_binary, DaemonClient};
use crate::output::{format_or_json, tail_file, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    /// Print daemon version
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<DaemonCommand>,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (foreground or background)
    Start {
        /// Run in foreground (useful for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Check daemon status
    Status,
    /// Stop and restart the daemon
    Restart,
    /// View daemon logs
    Logs {
        /// Number of recent lines to show (default: 200)
        #[arg(short = 'n', long, default_value = "200")]
        limit: usize,
        /// Show all lines (no limit)
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
        /// Follow log output
        #[arg(long, short)]
        follow: bool,
    },
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    if args.version {
        return version(format).await;
    }

    match args.command {
        Some(DaemonCommand::Start { foreground }) => start(foreground).await,
        Some(DaemonCommand::Stop) => stop().await,
        Some(DaemonCommand::Restart) => restart().await,
        Some(DaemonCommand::Status) => status(format).await,
        Some(DaemonCommand::Logs { limit, no_limit, follow }) => {
            logs(limit, no_limit, follow, format).await
        }
        None => {
            let mut cmd = crate::Cli::command();
            if let Some(sub) = cmd.find_subcommand_mut("daemon") {
                sub.print_help()?;
            }
            Ok(())
        }
    }
}

async fn version(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => return print_not_running(format),
    };

    let version = match client.hello().await {
        Ok(v) => v,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(_) => "unknown".to_string(),
    };

    let obj = serde_json::json!({ "version": version });
    format_or_json(format, &obj, || println!("kzd {}", version))
}

async fn start(foreground: bool) -> Result<()> {
    if foreground {
        // Run daemon in foreground - spawn and wait
        let kzd_path = find_kzd_binary();
        let status = std::process::Command::new(&kzd_path).status()?;
        if !status.success() {
            return Err(anyhow!("Daemon exited with status: {}", status));
        }
        return Ok(());
    }

    // Check if already running
    if let Ok(client) = DaemonClient::connect() {
        if let Ok((uptime, _, _, _)) = client.status().await {
            println!("Daemon already running (uptime: {}s)", uptime);
            return Ok(());
        }
    }

    // Start in background and verify it started
    match DaemonClient::connect_or_start() {
        Ok(_client) => {
            println!("Daemon started");
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e)),
    }
}

async fn stop() -> Result<()> {
    match daemon_stop().await {
        Ok(true) => {
            println!("Daemon stopped");
            Ok(())
        }
        Ok(false) => {
            println!("Daemon not running");
            Ok(())
        }
        Err(e) => Err(anyhow!("Failed to stop daemon: {}", e)),
    }
}

async fn restart() -> Result<()> {
    let was_running =
        daemon_stop().await.map_err(|e| anyhow!("Failed to stop daemon: {}", e))?;

    if was_running {
        // Grace period for the OS to release the Unix socket after the
        // daemon process exits.
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }

    match DaemonClient::connect_or_start() {
        Ok(_client) => {
            println!("Daemon restarted");
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e)),
    }
}

pub async fn status(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => return print_not_running(format),
    };

    // The socket file can outlive a crashed daemon
    let (uptime, tracked, pollable, subscribers) = match client.status().await {
        Ok(result) => result,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(e) => return Err(anyhow!("{}", e)),
    };
    let version = client.hello().await.unwrap_or_else(|_| "unknown".to_string());

    let obj = serde_json::json!({
        "status": "running",
        "version": version,
        "uptime_secs": uptime,
        "uptime": format_uptime(uptime),
        "tracked": tracked,
        "pollable": pollable,
        "subscribers": subscribers,
    });
    format_or_json(format, &obj, || {
        println!("Status: running");
        println!("Version: {}", version);
        println!("Uptime: {}", format_uptime(uptime));
        println!("Identities: {} tracked, {} pollable", tracked, pollable);
        println!("Subscribers: {}", subscribers);
    })
}

async fn logs(limit: usize, no_limit: bool, follow: bool, format: OutputFormat) -> Result<()> {
    let log_path = crate::env::log_path()
        .map_err(|e| anyhow!("could not determine state directory: {}", e))?;

    if !log_path.exists() {
        let empty: Vec<String> = vec![];
        let obj = serde_json::json!({
            "log_path": log_path.to_string_lossy().into_owned(),
            "lines": empty,
        });
        return format_or_json(format, &obj, || {
            println!("No log file found at {}", log_path.display())
        });
    }

    // Read the last N lines (or all lines with --no-limit)
    let content = if no_limit {
        std::fs::read_to_string(&log_path)?
    } else {
        read_last_lines(&log_path, limit)?
    };

    match format {
        OutputFormat::Text => {
            if !content.is_empty() {
                print!("{}", content);
                if !content.ends_with('\n') {
                    println!();
                }
            }
            if follow {
                tail_file(&log_path).await?;
            }
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "log_path": log_path.to_string_lossy(),
                "lines": content.lines().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
            if follow {
                eprintln!("warning: --follow is not supported with --json");
            }
        }
    }
    Ok(())
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    let obj = serde_json::json!({ "status": "not_running" });
    format_or_json(format, &obj, || println!("Daemon not running"))
}

fn read_last_lines(path: &std::path::Path, n: usize) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let lines: Vec<String> = BufReader::new(file).lines().collect::<std::io::Result<_>>()?;
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].join("\n"))
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
