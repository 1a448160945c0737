// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! Property tests for protocol serde roundtrips and DTO conversions.
//!
//! Covers every variant of Request, Response, and Query with minimal fixed
//! field values, plus TrackedIdentity→IdentitySummary field mapping.

use kz_core::TrackedIdentity;
use proptest::prelude::*;

use super::wire::{decode, encode};
use super::*;

fn s() -> String {
    String::new()
}

fn all_requests() -> Vec<Request> {
    vec![
        Request::Ping,
        Request::Hello { version: s() },
        Request::Status,
        Request::Shutdown,
        Request::IdentityAdd { username: s(), webhook: None },
        Request::IdentityAdd { username: s(), webhook: Some(s()) },
        Request::IdentityRemove { target: s() },
        Request::WebhookSet { target: s(), url: None },
        Request::WebhookSet { target: s(), url: Some(s()) },
        Request::Query { query: Query::ListIdentities },
        Request::Subscribe,
    ]
}

fn all_responses() -> Vec<Response> {
    vec![
        Response::Ok,
        Response::Pong,
        Response::Hello { version: s() },
        Response::ShuttingDown,
        Response::Status { uptime_secs: 0, tracked: 0, pollable: 0, subscribers: 0 },
        Response::Identities { identities: vec![] },
        Response::Identity { identity: None },
        Response::IdentityAdded {
            identity: IdentitySummary {
                id: kz_core::IdentityId::from("idn-prop0000000000000000"),
                key: s(),
                display_name: s(),
                status: None,
                last_active: None,
                updated_at: None,
                webhook_url: None,
            },
        },
        Response::Removed { id: kz_core::IdentityId::from("idn-prop0000000000000000"), key: s() },
        Response::Subscribed,
        Response::Error { message: s() },
    ]
}

fn all_queries() -> Vec<Query> {
    vec![Query::ListIdentities, Query::GetIdentity { target: s() }]
}

proptest! {
    #[test]
    fn request_serde_roundtrip(req in proptest::sample::select(all_requests())) {
        let encoded = encode(&req).expect("encode");
        let decoded: Request = decode(&encoded).expect("decode");
        prop_assert_eq!(decoded, req);
    }

    #[test]
    fn response_serde_roundtrip(resp in proptest::sample::select(all_responses())) {
        let encoded = encode(&resp).expect("encode");
        let decoded: Response = decode(&encoded).expect("decode");
        prop_assert_eq!(decoded, resp);
    }

    #[test]
    fn query_serde_roundtrip(query in proptest::sample::select(all_queries())) {
        let req = Request::Query { query: query.clone() };
        let encoded = encode(&req).expect("encode");
        let decoded: Request = decode(&encoded).expect("decode");
        prop_assert_eq!(decoded, Request::Query { query });
    }

    #[test]
    fn summary_preserves_record_fields(
        key in "[a-z0-9_]{1,16}",
        name in "[A-Za-z ]{1,24}",
        status in proptest::option::of("[a-z]{1,12}"),
    ) {
        let mut builder = TrackedIdentity::builder().key(key.clone()).display_name(name.clone());
        if let Some(ref st) = status {
            builder = builder.status(st.clone());
        }
        let identity = builder.build();
        let summary = IdentitySummary::from(&identity);

        prop_assert_eq!(summary.id, identity.id);
        prop_assert_eq!(summary.key, key);
        prop_assert_eq!(summary.display_name, name);
        prop_assert_eq!(summary.status, status);
    }
}
