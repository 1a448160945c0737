// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status and the state files under the state dir.

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running() {
    let temp = Project::empty();

    temp.kz().args(&["daemon", "status"]).passes().stdout_has("Daemon not running");
}

#[test]
fn top_level_status_is_an_alias() {
    let temp = Project::empty();

    temp.kz().args(&["status"]).passes().stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Project::empty();

    temp.kz().args(&["daemon", "start"]).passes().stdout_has("Daemon started");
}

#[test]
fn daemon_status_shows_running_after_start() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();

    temp.kz()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Version:")
        .stdout_has("Uptime:")
        .stdout_has("Identities: 0 tracked, 0 pollable")
        .stdout_has("Subscribers: 0");
}

#[test]
fn daemon_start_is_idempotent() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();

    temp.kz().args(&["daemon", "start"]).passes().stdout_has("Daemon already running");
}

#[test]
fn daemon_start_creates_state_files() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();

    assert!(temp.state_path().join("daemon.sock").exists(), "socket file should exist");
    assert!(temp.state_path().join("daemon.pid").exists(), "pid file should exist");
    assert!(temp.state_path().join("daemon.version").exists(), "version file should exist");
    assert!(temp.state_path().join("kz.db").exists(), "database should exist");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();

    temp.kz().args(&["daemon", "stop"]).passes().stdout_has("Daemon stopped");
}

#[test]
fn daemon_stop_without_a_daemon_reports_not_running() {
    let temp = Project::empty();

    temp.kz().args(&["daemon", "stop"]).passes().stdout_has("Daemon not running");
}

#[test]
fn daemon_status_reports_not_running_after_stop() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();
    temp.kz().args(&["daemon", "stop"]).passes();

    // Runtime file cleanup finishes just after the stop reply.
    let stopped = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.kz().args(&["daemon", "status"]).passes().stdout().contains("Daemon not running")
    });
    assert!(stopped, "daemon should report not running after stop");
}

#[test]
fn daemon_stop_keeps_the_database() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();
    temp.kz().args(&["daemon", "stop"]).passes();

    let gone = wait_for(SPEC_WAIT_MAX_MS, || {
        !temp.state_path().join("daemon.sock").exists()
            && !temp.state_path().join("daemon.pid").exists()
            && !temp.state_path().join("daemon.version").exists()
    });
    assert!(gone, "runtime files should be removed on stop");
    assert!(temp.state_path().join("kz.db").exists(), "database should survive a stop");
}

#[test]
fn daemon_restarts_after_stop() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();
    temp.kz().args(&["daemon", "stop"]).passes();

    temp.kz().args(&["daemon", "start"]).passes().stdout_has("Daemon started");
    temp.kz().args(&["daemon", "status"]).passes().stdout_has("Status: running");
}

#[test]
fn daemon_restart_command_cycles_the_daemon() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();

    temp.kz().args(&["daemon", "restart"]).passes().stdout_has("Daemon restarted");
    temp.kz().args(&["daemon", "status"]).passes().stdout_has("Status: running");
}

/// Running kzd directly when a daemon is already running must not disrupt it.
#[test]
fn second_daemon_refuses_to_start_and_leaves_the_first_alone() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();

    let output = std::process::Command::new(kzd_binary())
        .env("KZ_STATE_DIR", temp.state_path())
        .output()
        .expect("kzd should run");
    assert!(!output.status.success(), "kzd should fail while a daemon holds the lock");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already running"), "stderr should explain the lock, got: {stderr}");

    // The original daemon must still be reachable with its files intact.
    temp.kz().args(&["daemon", "status"]).passes().stdout_has("Status: running");
    assert!(temp.state_path().join("daemon.sock").exists(), "socket must survive");
    assert!(temp.state_path().join("daemon.pid").exists(), "pid file must survive");
}

#[test]
fn daemon_logs_shows_startup_lines() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();

    // The log writer flushes on its own thread, so poll briefly.
    let logged = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.kz().args(&["daemon", "logs"]).passes().stdout().contains("Daemon started")
    });
    assert!(logged, "daemon log should record startup\nlog:\n{}", temp.daemon_log());
}

#[test]
fn daemon_logs_without_a_log_file_says_so() {
    let temp = Project::empty();

    temp.kz().args(&["daemon", "logs"]).passes().stdout_has("No log file found");
}
