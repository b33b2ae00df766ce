//! API error type and response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_core::GatewayError;
use serde_json::json;
use tracing::error;

/// An error ready to be rendered as an HTTP response.
///
/// The body shape is always `{"detail": "..."}`, matching what the platform
/// services emit.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status for the response.
    pub status: StatusCode,
    /// Client-facing message.
    pub message: String,
}

impl ApiError {
    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RouteNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: "Service not found".to_string(),
            },
            GatewayError::BackendTimeout { .. } => Self {
                status: StatusCode::GATEWAY_TIMEOUT,
                message: "Service timeout".to_string(),
            },
            GatewayError::BackendUnreachable { .. } => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "Service unavailable".to_string(),
            },
            GatewayError::RateLimited { .. } => Self {
                status: StatusCode::TOO_MANY_REQUESTS,
                message: "Rate limit exceeded. Please try again later.".to_string(),
            },
            GatewayError::InvalidProvider { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            GatewayError::Validation { message } => Self {
                status: StatusCode::BAD_REQUEST,
                message,
            },
            GatewayError::Provider { .. } => {
                // The upstream message is logged, not exposed to the client.
                error!(error = %err, "Provider call failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Content generation failed".to_string(),
                }
            }
            GatewayError::Configuration { .. } | GatewayError::Internal { .. } => {
                error!(error = %err, "Internal gateway error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}
