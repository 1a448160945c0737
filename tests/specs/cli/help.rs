// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! CLI help output specs
//!
//! Verify help text displays for all commands.

use crate::prelude::*;

#[test]
fn kz_without_a_command_prints_usage() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn kz_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn kz_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("add")
        .stdout_has("list")
        .stdout_has("watch")
        .stdout_has("daemon");
}

#[test]
fn kz_add_help_shows_webhook_flag() {
    cli().args(&["add", "--help"]).passes().stdout_has("--webhook");
}

#[test]
fn kz_webhook_help_shows_set_and_clear() {
    cli().args(&["webhook", "--help"]).passes().stdout_has("--set").stdout_has("--clear");
}

#[test]
fn kz_daemon_help_shows_subcommands() {
    cli()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status")
        .stdout_has("logs");
}

#[test]
fn kz_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}
