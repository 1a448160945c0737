// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

use std::time::Duration;

use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

#[tokio::test]
async fn posts_message_as_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_string("Hikaru is ONLINE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = HttpWebhookAdapter::new(reqwest::Client::new(), Duration::from_secs(2));
    let code = adapter
        .deliver(&format!("{}/hook", server.uri()), "Hikaru is ONLINE")
        .await
        .unwrap();
    assert_eq!(code, 204);
}

#[tokio::test]
async fn non_2xx_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let adapter = HttpWebhookAdapter::new(reqwest::Client::new(), Duration::from_secs(2));
    let code = adapter.deliver(&server.uri(), "msg").await.unwrap();
    assert_eq!(code, 500);
}

#[tokio::test]
async fn slow_target_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let adapter = HttpWebhookAdapter::new(reqwest::Client::new(), Duration::from_millis(50));
    let err = adapter.deliver(&server.uri(), "msg").await.unwrap_err();
    assert!(matches!(err, WebhookError::Timeout));
}

#[tokio::test]
async fn fake_records_calls_and_scripted_status() {
    let fake = FakeWebhookAdapter::new();
    fake.respond_with(404);

    let code = fake.deliver("http://localhost:9000/hook", "gone").await.unwrap();
    assert_eq!(code, 404);
    assert_eq!(
        fake.calls(),
        vec![WebhookCall {
            url: "http://localhost:9000/hook".to_string(),
            message: "gone".to_string(),
        }]
    );

    fake.fail_deliveries();
    assert!(matches!(fake.deliver("http://x", "y").await.unwrap_err(), WebhookError::Timeout));
    assert_eq!(fake.calls().len(), 1, "failed delivery is not recorded");
}
