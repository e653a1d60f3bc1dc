//! Candidate resolution and channel fan-out against mock endpoints.

mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chanwatch::core::tester::{resolve_candidates, test_channel};

use common::fixtures::{base_config, channel, context, empty_store, seed_channel};
use common::logger::TestLogger;

async fn catalog_mock(server: &MockServer, models: &[&str]) {
    let data: Vec<_> = models.iter().map(|m| json!({"id": m})).collect();
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn candidates_come_from_catalog() {
    let log = TestLogger::new("candidates_come_from_catalog");
    let server = MockServer::start().await;
    catalog_mock(&server, &["alpha", "beta"]).await;

    let ctx = context(base_config(), empty_store());
    let ch = channel(1, "main", &server.uri());

    let candidates = resolve_candidates(&ctx, &ch).await;
    assert_eq!(candidates, vec!["alpha", "beta"]);
    log.finish_ok();
}

#[tokio::test]
async fn catalog_respects_model_exclusions() {
    let log = TestLogger::new("catalog_respects_model_exclusions");
    let server = MockServer::start().await;
    catalog_mock(&server, &["alpha", "moderation", "beta"]).await;

    let mut config = base_config();
    config.exclude_models = vec!["moderation".to_string()];
    let ctx = context(config, empty_store());
    let ch = channel(1, "main", &server.uri());

    let candidates = resolve_candidates(&ctx, &ch).await;
    assert_eq!(candidates, vec!["alpha", "beta"]);
    log.finish_ok();
}

#[tokio::test]
async fn forced_static_list_takes_precedence() {
    let log = TestLogger::new("forced_static_list_takes_precedence");
    let server = MockServer::start().await;
    // Catalog would answer, but must never be asked.
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = base_config();
    config.force_models = true;
    config.models = vec!["pinned-model".to_string()];
    let ctx = context(config, empty_store());
    let ch = channel(1, "main", &server.uri());

    let candidates = resolve_candidates(&ctx, &ch).await;
    assert_eq!(candidates, vec!["pinned-model"]);
    log.finish_ok();
}

#[tokio::test]
async fn force_inside_uses_persisted_list() {
    let log = TestLogger::new("force_inside_uses_persisted_list");
    let store = empty_store();
    seed_channel(&store, 1, "main", "http://unused", &["a", "b"]);

    let mut config = base_config();
    config.force_inside_models = true;
    let ctx = context(config, store);
    let ch = channel(1, "main", "http://unused");

    let candidates = resolve_candidates(&ctx, &ch).await;
    assert_eq!(candidates, vec!["a", "b"]);
    log.finish_ok();
}

#[tokio::test]
async fn force_inside_missing_channel_yields_empty() {
    let log = TestLogger::new("force_inside_missing_channel_yields_empty");
    let mut config = base_config();
    config.force_inside_models = true;
    let ctx = context(config, empty_store());
    let ch = channel(42, "ghost", "http://unused");

    let candidates = resolve_candidates(&ctx, &ch).await;
    assert!(candidates.is_empty());
    log.finish_ok();
}

#[tokio::test]
async fn catalog_failure_falls_back_to_static_list() {
    let log = TestLogger::new("catalog_failure_falls_back_to_static_list");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = base_config();
    config.models = vec!["fallback-model".to_string()];
    let ctx = context(config, empty_store());
    let ch = channel(1, "main", &server.uri());

    let candidates = resolve_candidates(&ctx, &ch).await;
    assert_eq!(candidates, vec!["fallback-model"]);
    log.finish_ok();
}

#[tokio::test]
async fn catalog_failure_without_fallback_yields_empty() {
    let log = TestLogger::new("catalog_failure_without_fallback_yields_empty");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ctx = context(base_config(), empty_store());
    let ch = channel(1, "main", &server.uri());

    let available = test_channel(&ctx, &ch).await;
    assert!(available.is_empty());
    log.finish_ok();
}

#[tokio::test]
async fn test_channel_collects_only_successful_probes() {
    let log = TestLogger::new("test_channel_collects_only_successful_probes");
    log.phase("setup");
    let server = MockServer::start().await;
    catalog_mock(&server, &["good-a", "bad-b", "good-c"]).await;

    for model in ["good-a", "good-c"] {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({ "model": model })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    log.phase("execute");
    let mut config = base_config();
    config.rps = 100;
    let ctx = context(config, empty_store());
    let ch = channel(1, "main", &server.uri());
    let available = test_channel(&ctx, &ch).await;

    log.phase("verify");
    assert_eq!(available, vec!["good-a", "good-c"]);
    log.finish_ok();
}

#[tokio::test]
async fn failing_probe_does_not_abort_siblings() {
    let log = TestLogger::new("failing_probe_does_not_abort_siblings");
    let server = MockServer::start().await;
    catalog_mock(&server, &["broken", "ok"]).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "model": "ok" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = base_config();
    config.rps = 100;
    let ctx = context(config, empty_store());
    let ch = channel(1, "main", &server.uri());

    let available = test_channel(&ctx, &ch).await;
    assert_eq!(available, vec!["ok"]);
    log.finish_ok();
}
