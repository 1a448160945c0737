// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! kz: command-line client for the presence watchdog daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod color;
mod commands;
mod env;
mod output;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "kz",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")),
    about = "Watch online presence for a set of identities",
    styles = color::styles()
)]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the background daemon
    Daemon(commands::daemon::DaemonArgs),
    /// Start watching a username
    Add {
        /// Username to resolve and watch
        username: String,
        /// Webhook URL to notify on every presence change
        #[arg(long, value_name = "URL")]
        webhook: Option<String>,
    },
    /// List tracked identities
    List,
    /// Show one identity's full record
    Show {
        /// Identity ID (or prefix), key, or display name
        target: String,
    },
    /// Stop watching an identity
    Remove {
        /// Identity ID (or prefix), key, or display name
        target: String,
    },
    /// Set or clear an identity's webhook
    Webhook(commands::webhook::WebhookArgs),
    /// Stream presence updates until Ctrl-C
    Watch,
    /// Check daemon status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Text };

    let result = match cli.command {
        Command::Daemon(args) => commands::daemon::daemon(args, format).await,
        Command::Add { username, webhook } => {
            commands::add::add(&username, webhook.as_deref(), format).await
        }
        Command::List => commands::list::list(format).await,
        Command::Show { target } => commands::show::show(&target, format).await,
        Command::Remove { target } => commands::remove::remove(&target, format).await,
        Command::Webhook(args) => commands::webhook::webhook(args, format).await,
        Command::Watch => commands::watch::watch(format).await,
        Command::Status => commands::daemon::status(format).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
