//! Request middleware: correlation/timing and rate limiting.

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_proxy::{is_bypassed, RATE_LIMIT_WINDOW};
use serde_json::json;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::extractors::ClientIp;
use crate::state::AppState;

/// Correlation identifier attached to every in-flight request.
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

/// Read-or-generate the correlation ID, echo it on the response, stamp
/// `X-Process-Time`, and record request metrics.
pub async fn correlation_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);
    request
        .extensions_mut()
        .insert(CorrelationId(correlation_id.clone()));

    let mut response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        headers.insert("x-correlation-id", value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.4}")) {
        headers.insert("x-process-time", value);
    }

    state
        .metrics
        .record_request(&method, response.status().as_u16(), elapsed);

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_secs = format!("{elapsed:.4}"),
        correlation_id = %correlation_id,
        "Request completed"
    );

    response
}

/// Enforce per-identity fixed-window rate limits.
///
/// Health/readiness/metrics probes bypass the limiter entirely, not even
/// consuming a window slot. Authenticated callers are keyed by JWT
/// subject; everyone else by client IP at half the per-user limit.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_bypassed(&path) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let identity = state.token_verifier.identify(auth_header, &client_ip);

    let limit = if identity.is_authenticated() {
        state.config.rate_limit_per_user_minute
    } else {
        state.config.anonymous_rate_limit()
    };

    let key = identity.rate_limit_key(&path);
    let decision = state
        .rate_limiter
        .check(&key, limit, RATE_LIMIT_WINDOW)
        .await;

    if decision.is_limited {
        state.metrics.record_rate_limited();
        let body = Json(json!({
            "detail": "Rate limit exceeded. Please try again later."
        }));
        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        let headers = response.headers_mut();
        headers.insert("retry-after", HeaderValue::from_static("60"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        return response;
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
        headers.insert("x-ratelimit-limit", value);
    }

    response
}
