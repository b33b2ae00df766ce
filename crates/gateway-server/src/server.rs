//! Server startup and graceful shutdown.

use gateway_core::GatewayError;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::create_router;
use crate::state::AppState;

/// Bind and serve the gateway until SIGTERM/ctrl-c.
///
/// # Errors
/// Returns an error when the listener cannot bind or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), GatewayError> {
    let router = create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::internal(format!("failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "API Gateway listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| GatewayError::internal(format!("server error: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut signal) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            signal.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
