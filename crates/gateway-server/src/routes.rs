//! Route definitions for the gateway.

use axum::http::HeaderValue;
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{handlers, middleware, state::AppState};

/// Create the main gateway router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        // Metrics endpoint (scrapers vary: GET for Prometheus, POST for
        // push-style collectors)
        .route(
            "/metrics",
            get(handlers::metrics_endpoint).post(handlers::metrics_endpoint),
        )
        // Reverse proxy to backend services
        .route("/api/*path", any(handlers::proxy_api))
        // LLM gateway endpoints
        .nest("/llm", llm_routes())
        // Middleware: rate limiting inside, correlation/timing outside so
        // 429s still carry correlation and timing headers
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::correlation_middleware,
        ))
        .layer(cors_layer(&state))
        // Add state
        .with_state(state)
}

/// LLM gateway API routes.
fn llm_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generate_content))
        .route("/select-model", post(handlers::select_model))
        .route("/providers", get(handlers::list_providers))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
