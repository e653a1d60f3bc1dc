//! Probe behavior against a mock completion endpoint.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chanwatch::core::http::build_client;
use chanwatch::core::probe::probe_model;

use common::fixtures::channel;
use common::logger::TestLogger;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn probe_success_on_200() {
    let log = TestLogger::new("probe_success_on_200");
    log.phase("setup");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 1,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    log.phase("execute");
    let client = build_client(Duration::from_secs(30)).unwrap();
    let ch = channel(1, "main", &server.uri());
    let outcome = probe_model(&client, &ch, "gpt-4o", PROBE_TIMEOUT).await;

    log.phase("verify");
    assert!(outcome.ok);
    assert_eq!(outcome.model, "gpt-4o");
    assert_eq!(outcome.status, Some(200));
    log.finish_ok();
}

#[tokio::test]
async fn probe_sends_minimal_payload() {
    let log = TestLogger::new("probe_sends_minimal_payload");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "Hi"}],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(Duration::from_secs(30)).unwrap();
    let ch = channel(1, "main", &server.uri());
    let outcome = probe_model(&client, &ch, "m", PROBE_TIMEOUT).await;
    assert!(outcome.ok);
    log.finish_ok();
}

#[tokio::test]
async fn probe_failure_on_non_200() {
    let log = TestLogger::new("probe_failure_on_non_200");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "invalid api key"}
        })))
        .mount(&server)
        .await;

    let client = build_client(Duration::from_secs(30)).unwrap();
    let ch = channel(1, "main", &server.uri());
    let outcome = probe_model(&client, &ch, "gpt-4o", PROBE_TIMEOUT).await;

    assert!(!outcome.ok);
    assert_eq!(outcome.status, Some(401));
    assert!(outcome.error.is_none());
    log.finish_ok();
}

#[tokio::test]
async fn probe_failure_on_timeout_is_single_attempt() {
    let log = TestLogger::new("probe_failure_on_timeout_is_single_attempt");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(Duration::from_secs(30)).unwrap();
    let ch = channel(1, "main", &server.uri());
    let outcome = probe_model(&client, &ch, "slow-model", Duration::from_millis(200)).await;

    assert!(!outcome.ok);
    assert!(outcome.status.is_none());
    assert!(outcome.error.is_some());
    log.finish_ok();
}

#[tokio::test]
async fn probe_failure_on_connection_refused() {
    let log = TestLogger::new("probe_failure_on_connection_refused");
    let client = build_client(Duration::from_secs(30)).unwrap();
    // Reserved port with nothing listening.
    let ch = channel(1, "main", "http://127.0.0.1:1");
    let outcome = probe_model(&client, &ch, "gpt-4o", PROBE_TIMEOUT).await;

    assert!(!outcome.ok);
    assert!(outcome.status.is_none());
    log.finish_ok();
}
