// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! End-to-end tracking specs against a stub provider.
//!
//! The stub serves the profile directory, the presence stream and the
//! webhook sink, so a whole add -> poll -> transition -> notify pass runs
//! without touching the real endpoints.

use std::time::Duration;

use crate::prelude::*;

const HIKARU_PROFILE: &str =
    r#"{"userId": 101, "uuid": "uuid-hikaru-1", "onlineStatus": "offline", "username": "hikaru"}"#;

const ONLINE_EVENT: &str = r#"data: {"status":"online","statusAt":1700000000000}"#;

/// Daemon settings pointing every endpoint at the stub, polling fast.
fn provider_config(stub: &StubProvider) -> String {
    format!(
        r#"[provider]
presence_url = "{presence}"
profile_url = "{profile}"

[poll]
interval_secs = 1
"#,
        presence = stub.url("/presence?ids="),
        profile = stub.url("/profile"),
    )
}

#[test]
fn add_resolves_the_profile_and_lists_it() {
    let stub = StubProvider::start();
    stub.route("/profile/hikaru", HIKARU_PROFILE);
    let temp = Project::empty();
    temp.config(&provider_config(&stub));
    temp.kz().args(&["daemon", "start"]).passes();

    temp.kz()
        .args(&["add", "hikaru"])
        .passes()
        .stdout_has("Watching 'hikaru'")
        .stdout_has("uuid-hikaru-1");

    temp.kz()
        .args(&["list"])
        .passes()
        .stdout_has("hikaru")
        .stdout_has("uuid-hikaru-1")
        .stdout_has("offline");
}

#[test]
fn add_starts_the_daemon_when_none_is_running() {
    let stub = StubProvider::start();
    stub.route("/profile/hikaru", HIKARU_PROFILE);
    let temp = Project::empty();
    temp.config(&provider_config(&stub));

    temp.kz().args(&["add", "hikaru"]).passes().stdout_has("Watching 'hikaru'");

    temp.kz().args(&["daemon", "status"]).passes().stdout_has("Status: running");
}

#[test]
fn add_rejects_an_unknown_username() {
    let stub = StubProvider::start();
    stub.route("/profile/ghost", "{}");
    let temp = Project::empty();
    temp.config(&provider_config(&stub));
    temp.kz().args(&["daemon", "start"]).passes();

    temp.kz().args(&["add", "ghost"]).fails().stderr_has("no such user 'ghost'");

    temp.kz().args(&["list"]).passes().stdout_has("No identities tracked");
}

#[test]
fn adding_the_same_user_twice_is_rejected() {
    let stub = StubProvider::start();
    stub.route("/profile/hikaru", HIKARU_PROFILE);
    let temp = Project::empty();
    temp.config(&provider_config(&stub));
    temp.kz().args(&["daemon", "start"]).passes();
    temp.kz().args(&["add", "hikaru"]).passes();

    temp.kz().args(&["add", "hikaru"]).fails().stderr_has("already tracked");
}

#[test]
fn a_transition_updates_the_record_and_fires_the_webhook() {
    let stub = StubProvider::start();
    stub.route("/profile/hikaru", HIKARU_PROFILE);
    stub.route("/presence", ONLINE_EVENT);
    stub.route("/hook", "ok");
    let temp = Project::empty();
    temp.config(&provider_config(&stub));
    temp.kz().args(&["daemon", "start"]).passes();

    temp.kz().args(&["add", "hikaru", "--webhook", &stub.url("/hook")]).passes();

    // The directory reported "offline" at registration; the first sample
    // reads "online", which is a transition.
    let fired = wait_for(SPEC_WAIT_MAX_MS * 2, || stub.hits("/hook") > 0);
    assert!(fired, "webhook should fire on the transition\ndaemon log:\n{}", temp.daemon_log());

    let post = stub
        .requests()
        .into_iter()
        .find(|r| r.path.starts_with("/hook"))
        .expect("recorded webhook request");
    assert_eq!(post.method, "POST");
    assert_eq!(post.body, "hikaru is ONLINE");

    temp.kz().args(&["show", "hikaru"]).passes().stdout_has("Status:      online");
}

#[test]
fn an_unchanged_status_is_announced_only_once() {
    let stub = StubProvider::start();
    stub.route("/profile/hikaru", HIKARU_PROFILE);
    stub.route("/presence", ONLINE_EVENT);
    stub.route("/hook", "ok");
    let temp = Project::empty();
    temp.config(&provider_config(&stub));
    temp.kz().args(&["daemon", "start"]).passes();
    temp.kz().args(&["add", "hikaru", "--webhook", &stub.url("/hook")]).passes();

    let fired = wait_for(SPEC_WAIT_MAX_MS * 2, || stub.hits("/hook") > 0);
    assert!(fired, "webhook should fire once\ndaemon log:\n{}", temp.daemon_log());

    // Let at least two more samples of the same status come and go.
    let sampled = stub.hits("/presence");
    let resampled =
        wait_for(SPEC_WAIT_MAX_MS * 2, || stub.hits("/presence") >= sampled + 2);
    assert!(resampled, "poller should keep sampling");

    assert_eq!(stub.hits("/hook"), 1, "an unchanged status must not be re-announced");
}

#[test]
fn remove_stops_watching_and_sampling() {
    let stub = StubProvider::start();
    stub.route("/profile/hikaru", HIKARU_PROFILE);
    stub.route("/presence", ONLINE_EVENT);
    let temp = Project::empty();
    temp.config(&provider_config(&stub));
    temp.kz().args(&["daemon", "start"]).passes();
    temp.kz().args(&["add", "hikaru"]).passes();

    temp.kz().args(&["remove", "hikaru"]).passes().stdout_has("Stopped watching");
    temp.kz().args(&["list"]).passes().stdout_has("No identities tracked");

    // A cycle already in flight may land one more sample, no more.
    let sampled = stub.hits("/presence");
    std::thread::sleep(Duration::from_millis(2_500));
    assert!(
        stub.hits("/presence") <= sampled + 1,
        "sampling should stop once the identity is removed"
    );
}

#[test]
fn remove_rejects_an_unknown_target() {
    let temp = Project::empty();
    temp.kz().args(&["daemon", "start"]).passes();

    temp.kz().args(&["remove", "nobody"]).fails().stderr_has("no identity matches 'nobody'");
}

#[test]
fn webhook_can_be_set_and_cleared() {
    let stub = StubProvider::start();
    stub.route("/profile/hikaru", HIKARU_PROFILE);
    let temp = Project::empty();
    temp.config(&provider_config(&stub));
    temp.kz().args(&["daemon", "start"]).passes();
    temp.kz().args(&["add", "hikaru"]).passes();

    temp.kz()
        .args(&["webhook", "hikaru", "--set", "https://hooks.example/x"])
        .passes()
        .stdout_has("Webhook for 'hikaru' set to https://hooks.example/x");
    temp.kz().args(&["show", "hikaru"]).passes().stdout_has("https://hooks.example/x");

    temp.kz()
        .args(&["webhook", "hikaru", "--clear"])
        .passes()
        .stdout_has("Webhook for 'hikaru' cleared");
    temp.kz().args(&["show", "hikaru"]).passes().stdout_lacks("hooks.example");
}

#[test]
fn list_emits_json_when_asked() {
    let stub = StubProvider::start();
    stub.route("/profile/hikaru", HIKARU_PROFILE);
    let temp = Project::empty();
    temp.config(&provider_config(&stub));
    temp.kz().args(&["daemon", "start"]).passes();
    temp.kz().args(&["add", "hikaru"]).passes();

    let out = temp.kz().args(&["list", "--json"]).passes().stdout();
    let parsed: serde_json::Value = serde_json::from_str(&out).expect("list --json parses");
    assert_eq!(parsed[0]["key"], "uuid-hikaru-1");
    assert_eq!(parsed[0]["display_name"], "hikaru");
}
