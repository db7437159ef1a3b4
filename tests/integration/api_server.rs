//! Integration tests for the HTTP API
//!
//! Health checks, metrics, snapshot reads and forced refreshes.

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::{mock_all_upstreams, TestApp, API_KEY};

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApp::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "mafafx-signal-engine");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApp::new().await;
    let _ = app.server.get("/health").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("http_request_duration_seconds"));
    assert!(body.contains("http_requests_in_flight"));
}

#[tokio::test]
async fn snapshot_is_unavailable_before_first_cycle() {
    let app = TestApp::new().await;
    let response = app.server.get("/api/snapshot").await;
    assert_eq!(response.status_code(), 503);

    let body: Value = response.json();
    assert_eq!(body["error"], "not_ready");
}

#[tokio::test]
async fn refresh_runs_cycle_and_publishes_snapshot() {
    let upstream = MockServer::start().await;
    mock_all_upstreams(&upstream).await;
    let app = TestApp::with_upstream(upstream).await;

    let response = app.server.post("/api/refresh").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["stale"], false);
    assert_eq!(body["snapshot"]["bias"]["state"], "StrongBuy");
    assert_eq!(body["snapshot"]["bias"]["score"], 10);
    assert_eq!(body["snapshot"]["primary_asset"]["symbol"], "XAU/USD");
    assert_eq!(body["snapshot"]["proxy_asset"]["inverse"], true);
    assert_eq!(body["snapshot"]["calendar_events"].as_array().unwrap().len(), 1);

    let response = app.server.get("/api/snapshot").await;
    assert_eq!(response.status_code(), 200);
    let snapshot: Value = response.json();
    assert_eq!(snapshot["snapshot"], body["snapshot"]);
}

#[tokio::test]
async fn refresh_with_rate_limited_primary_is_unavailable() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time_series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 429,
            "message": "You have run out of API credits",
            "status": "error"
        })))
        .mount(&upstream)
        .await;
    let app = TestApp::with_upstream(upstream).await;

    let response = app.server.post("/api/refresh").await;
    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["error"], "rate_limited");

    let response = app.server.get("/api/snapshot").await;
    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["error"], "rate_limited");
}

#[tokio::test]
async fn failed_cycle_marks_previous_snapshot_stale() {
    let upstream = MockServer::start().await;
    mock_all_upstreams(&upstream).await;
    let app = TestApp::with_upstream(upstream).await;
    assert_eq!(app.server.post("/api/refresh").await.status_code(), 200);

    app.upstream.reset().await;
    assert_eq!(app.server.post("/api/refresh").await.status_code(), 503);

    let response = app.server.get("/api/snapshot").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["stale"], true);
    assert_eq!(body["last_error"]["error"], "data_unavailable");
    assert_eq!(body["snapshot"]["bias"]["state"], "StrongBuy");
}

#[tokio::test]
async fn unreachable_upstream_error_body_hides_api_key() {
    let upstream = MockServer::start().await;
    let app = TestApp::with_upstream_uri(upstream, "http://127.0.0.1:1").await;

    let response = app.server.post("/api/refresh").await;
    assert_eq!(response.status_code(), 503);
    let text = response.text();
    assert!(text.contains("data_unavailable"));
    assert!(!text.contains(API_KEY), "api key leaked: {}", text);

    let text = app.server.get("/api/snapshot").await.text();
    assert!(!text.contains(API_KEY), "api key leaked: {}", text);
}
