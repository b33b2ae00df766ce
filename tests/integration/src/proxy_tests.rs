//! Reverse-proxy integration tests
//!
//! Covers prefix routing, header propagation, pass-through of backend
//! errors, and the three synthesized gateway failures (404/503/504).

use crate::helpers::*;
use crate::mock_backends::MockBackend;
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_request_routes_to_matching_backend() {
    let auth = MockBackend::healthy("auth").await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &auth.url())
        .start()
        .await;

    let response = server.get("/api/v1/auth/login").await;
    assert_status(&response, 200);

    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["service"], "auth");
}

#[tokio::test]
async fn test_first_registered_route_wins() {
    let first = MockBackend::healthy("first").await;
    let second = MockBackend::healthy("second").await;
    let server = TestServer::builder()
        .with_route("/api/v1", &first.url())
        .with_route("/api/v1/auth", &second.url())
        .start()
        .await;

    // The broader prefix was registered first, so it shadows the narrower
    let response = server.get("/api/v1/auth/login").await;
    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["service"], "first");
}

#[tokio::test]
async fn test_unmatched_path_returns_404() {
    let auth = MockBackend::healthy("auth").await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &auth.url())
        .start()
        .await;

    let response = server.get("/api/v1/unknown").await;
    assert_status(&response, 404);

    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["detail"], "Service not found");
}

#[tokio::test]
async fn test_backend_error_passes_through() {
    let backend = MockBackend::with_status(422).await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &backend.url())
        .start()
        .await;

    // Backend 4xx is not treated as a gateway error
    let response = server.get("/api/v1/auth/login").await;
    assert_status(&response, 422);
}

#[tokio::test]
async fn test_unreachable_backend_returns_503() {
    let server = TestServer::builder()
        .with_route("/api/v1/auth", "http://127.0.0.1:1")
        .start()
        .await;

    let response = server.get("/api/v1/auth/login").await;
    assert_status(&response, 503);

    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["detail"], "Service unavailable");
}

#[tokio::test]
async fn test_slow_backend_returns_504() {
    let backend = MockBackend::slow(Duration::from_secs(5)).await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &backend.url())
        .with_timeout(Duration::from_millis(200))
        .start()
        .await;

    let response = server.get("/api/v1/auth/login").await;
    assert_status(&response, 504);

    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["detail"], "Service timeout");
}

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let server = TestServer::with_defaults().await;

    let response = server
        .get_with_headers("/health", vec![("X-Correlation-ID", "trace-me-123")])
        .await;
    assert_eq!(
        response
            .headers()
            .get("x-correlation-id")
            .and_then(|v| v.to_str().ok()),
        Some("trace-me-123")
    );
}

#[tokio::test]
async fn test_correlation_id_is_generated_when_missing() {
    let server = TestServer::with_defaults().await;

    let response = server.get("/health").await;
    let correlation = response
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .expect("correlation header");
    assert!(!correlation.is_empty());
}

#[tokio::test]
async fn test_process_time_header_present() {
    let server = TestServer::with_defaults().await;

    let response = server.get("/health").await;
    let process_time = response
        .headers()
        .get("x-process-time")
        .and_then(|v| v.to_str().ok())
        .expect("process time header");
    // Seconds with 4 decimal places
    let parsed: f64 = process_time.parse().expect("numeric process time");
    assert!(parsed >= 0.0);
    assert_eq!(process_time.split('.').nth(1).map(str::len), Some(4));
}

#[tokio::test]
async fn test_health_and_ready_endpoints() {
    let server = TestServer::with_defaults().await;

    let response = server.get("/health").await;
    assert_status(&response, 200);
    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "api-gateway");

    let response = server.get("/ready").await;
    assert_status(&response, 200);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let server = TestServer::with_defaults().await;

    // Generate at least one request so the counter exists
    let _ = server.get("/health").await;

    let response = server.get("/metrics").await;
    assert_status(&response, 200);
    let body = response.text().await.expect("text body");
    assert!(body.contains("gateway_requests_total"));
}
