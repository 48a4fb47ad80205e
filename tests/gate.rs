//! Secret gate behavior: allow-list matching, colon splitting and the
//! fail-open degraded mode.

mod common;

use axum::http::StatusCode;
use std::sync::Arc;

use common::{
    router_with, send_json, test_router, test_settings, StubEngine, TEST_SECRET,
};

#[tokio::test]
async fn valid_secret_passes() {
    let (router, _) = test_router();
    let (status, body) = send_json(&router, "GET", "/api/v4/health", Some(TEST_SECRET), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn missing_secret_is_rejected_with_ko_envelope() {
    let (router, engine) = test_router();
    let (status, body) = send_json(&router, "GET", "/api/v4/health", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "KO");
    assert_eq!(body["message"], "Bad request");
    assert_eq!(engine.total_calls(), 0);
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let (router, _) = test_router();
    let (status, _) = send_json(&router, "GET", "/api/v4/health", Some("nope"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_part_before_the_colon_is_compared() {
    let (router, _) = test_router();

    let with_suffix = format!("{TEST_SECRET}:routing-metadata");
    let (status, _) = send_json(&router, "GET", "/api/v4/health", Some(&with_suffix), None).await;
    assert_eq!(status, StatusCode::OK);

    // The suffix alone must not pass.
    let (status, _) =
        send_json(&router, "GET", "/api/v4/health", Some("routing-metadata"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gate_rejections_are_counted_in_request_metrics() {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .unwrap();

    let (router, _) = test_router();
    let (status, _) = send_json(&router, "GET", "/api/v4/health", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let rendered = handle.render();
    assert!(rendered.contains("http_requests_total"));
    assert!(rendered.contains(r#"status="400""#));
}

#[tokio::test]
async fn unconfigured_gate_passes_everything_through() {
    let mut settings = test_settings();
    settings.gate.secret_keys.clear();
    let router = router_with(settings, Arc::new(StubEngine::new()));

    let (status, body) = send_json(&router, "GET", "/api/v4/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}
