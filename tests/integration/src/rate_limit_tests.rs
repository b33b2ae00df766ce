//! Rate limiting integration tests
//!
//! Covers the fixed-window lifecycle, identity-aware limits, bypass
//! paths, and fail-open behavior when the store is down.

use crate::helpers::*;
use crate::mock_backends::MockBackend;
use serde_json::Value;

#[tokio::test]
async fn test_anonymous_window_counts_down_then_429() {
    let backend = MockBackend::healthy("auth").await;
    // user limit 10 → anonymous limit 5
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &backend.url())
        .with_user_limit(10)
        .start()
        .await;

    // 5 requests from the same IP succeed with decreasing remaining
    for expected_remaining in ["4", "3", "2", "1", "0"] {
        let response = server
            .get_with_headers("/api/v1/auth/login", vec![("X-Forwarded-For", "1.2.3.4")])
            .await;
        assert_status(&response, 200);
        assert_eq!(
            response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok()),
            Some(expected_remaining)
        );
        assert_eq!(
            response
                .headers()
                .get("x-ratelimit-limit")
                .and_then(|v| v.to_str().ok()),
            Some("5")
        );
    }

    // 6th request is rejected
    let response = server
        .get_with_headers("/api/v1/auth/login", vec![("X-Forwarded-For", "1.2.3.4")])
        .await;
    assert_status(&response, 429);
    assert_eq!(
        response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok()),
        Some("60")
    );
    assert_eq!(
        response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok()),
        Some("0")
    );

    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["detail"], "Rate limit exceeded. Please try again later.");
}

#[tokio::test]
async fn test_different_ips_have_separate_windows() {
    let backend = MockBackend::healthy("auth").await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &backend.url())
        .with_user_limit(2) // anonymous limit 1
        .start()
        .await;

    let first = server
        .get_with_headers("/api/v1/auth/login", vec![("X-Forwarded-For", "1.1.1.1")])
        .await;
    assert_status(&first, 200);
    let second = server
        .get_with_headers("/api/v1/auth/login", vec![("X-Forwarded-For", "1.1.1.1")])
        .await;
    assert_status(&second, 429);

    // A different IP still has its own window
    let other = server
        .get_with_headers("/api/v1/auth/login", vec![("X-Forwarded-For", "2.2.2.2")])
        .await;
    assert_status(&other, 200);
}

#[tokio::test]
async fn test_authenticated_identity_gets_full_limit() {
    let backend = MockBackend::healthy("auth").await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &backend.url())
        .with_user_limit(100)
        .start()
        .await;

    let token = sign_test_token("user-42");
    let response = server
        .get_with_headers(
            "/api/v1/auth/me",
            vec![("Authorization", &format!("Bearer {token}"))],
        )
        .await;
    assert_status(&response, 200);
    // Full per-user limit, not the halved anonymous one
    assert_eq!(
        response
            .headers()
            .get("x-ratelimit-limit")
            .and_then(|v| v.to_str().ok()),
        Some("100")
    );
}

#[tokio::test]
async fn test_invalid_token_degrades_to_anonymous() {
    let backend = MockBackend::healthy("auth").await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &backend.url())
        .with_user_limit(100)
        .start()
        .await;

    // Garbage token: no 401, silently treated as anonymous
    let response = server
        .get_with_headers(
            "/api/v1/auth/me",
            vec![("Authorization", "Bearer not.a.token")],
        )
        .await;
    assert_status(&response, 200);
    assert_eq!(
        response
            .headers()
            .get("x-ratelimit-limit")
            .and_then(|v| v.to_str().ok()),
        Some("50")
    );
}

#[tokio::test]
async fn test_separate_paths_have_separate_windows() {
    let backend = MockBackend::healthy("auth").await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &backend.url())
        .with_user_limit(2) // anonymous limit 1
        .start()
        .await;

    let ip = vec![("X-Forwarded-For", "3.3.3.3")];
    assert_status(&server.get_with_headers("/api/v1/auth/login", ip.clone()).await, 200);
    assert_status(&server.get_with_headers("/api/v1/auth/login", ip.clone()).await, 429);

    // Same identity, different path: fresh window
    assert_status(&server.get_with_headers("/api/v1/auth/logout", ip).await, 200);
}

#[tokio::test]
async fn test_health_endpoints_bypass_rate_limiting() {
    let server = TestServer::builder().with_user_limit(2).start().await;

    // Far more requests than the limit; probes never consume a slot
    for _ in 0..20 {
        let response = server.get("/health").await;
        assert_status(&response, 200);
        assert!(response.headers().get("x-ratelimit-remaining").is_none());
    }
    for _ in 0..20 {
        assert_status(&server.get("/ready").await, 200);
        assert_status(&server.get("/metrics").await, 200);
    }
}

#[tokio::test]
async fn test_store_outage_fails_open() {
    let backend = MockBackend::healthy("auth").await;
    let server = TestServer::builder()
        .with_route("/api/v1/auth", &backend.url())
        .with_user_limit(10)
        .with_failing_rate_limit_store()
        .start()
        .await;

    // Store is down: every request is admitted with the full limit left
    for _ in 0..10 {
        let response = server
            .get_with_headers("/api/v1/auth/login", vec![("X-Forwarded-For", "1.2.3.4")])
            .await;
        assert_status(&response, 200);
        assert_eq!(
            response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok()),
            Some("5")
        );
    }
}

#[tokio::test]
async fn test_llm_endpoints_are_rate_limited() {
    let server = TestServer::builder().with_user_limit(2).start().await;

    let body = serde_json::json!({ "priority": "low" });
    let ip_header = ("X-Forwarded-For", "9.9.9.9");

    let first = server
        .client
        .post(server.url("/llm/select-model"))
        .header(ip_header.0, ip_header.1)
        .json(&body)
        .send()
        .await
        .expect("request");
    assert_status(&first, 200);

    let second = server
        .client
        .post(server.url("/llm/select-model"))
        .header(ip_header.0, ip_header.1)
        .json(&body)
        .send()
        .await
        .expect("request");
    assert_status(&second, 429);
}
