//! # SEO Platform Gateway
//!
//! Entry point for the Auto-SEO platform gateway: a reverse proxy with
//! JWT-aware rate limiting in front of the platform's microservices, plus
//! a multi-provider LLM gateway with cost-optimizing model selection.
//!
//! ## Usage
//!
//! ```bash
//! # Start with development defaults
//! seo-gateway
//!
//! # Start with environment overrides
//! PORT=9000 RATE_LIMIT_PER_USER_MINUTE=200 seo-gateway
//! ```

use gateway_config::GatewayConfig;
use gateway_server::{serve, AppState};
use gateway_telemetry::{init_tracing, TracingConfig};
use std::net::SocketAddr;
use tracing::{error, info};

/// Application entry point
#[tokio::main]
async fn main() {
    // Configuration first: logging format depends on it
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let tracing_config = TracingConfig {
        log_level: config.log_level.clone(),
        json: config.log_json,
    };
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting API Gateway"
    );

    if let Err(e) = run(config).await {
        error!(error = %e, "Application failed");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run(config: GatewayConfig) -> Result<(), anyhow::Error> {
    let host = config.host.clone();
    let port = config.port;

    let state = AppState::from_config(config).await?;

    info!(
        routes = state.forwarder.routes().len(),
        providers = state.llm_gateway.all_providers().len(),
        available_providers = ?state.llm_gateway.available_providers(),
        "Gateway state initialized"
    );

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address {host}:{port}: {e}"))?;

    serve(state, addr).await?;

    info!("Shutting down API Gateway");
    Ok(())
}
