// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

use kz_core::TrackedIdentity;

use super::*;

#[test]
fn summary_drops_profile_but_keeps_state() {
    let identity = TrackedIdentity::builder()
        .key("magnus")
        .display_name("Magnus")
        .profile(serde_json::json!({"countryName": "Norway"}))
        .status("online")
        .last_active("2026-01-10T11:58:00Z")
        .webhook_url("http://localhost:9000/hook")
        .build();

    let summary = IdentitySummary::from(&identity);
    assert_eq!(summary.id, identity.id);
    assert_eq!(summary.key, "magnus");
    assert_eq!(summary.status.as_deref(), Some("online"));
    assert_eq!(summary.webhook_url.as_deref(), Some("http://localhost:9000/hook"));

    let json = serde_json::to_string(&summary).unwrap();
    assert!(!json.contains("Norway"));
}

#[test]
fn summary_omits_unset_optionals_on_wire() {
    let summary = IdentitySummary::from(&TrackedIdentity::builder().build());
    let json = serde_json::to_string(&summary).unwrap();
    assert!(!json.contains("\"status\""));
    assert!(!json.contains("\"last_active\""));
}
