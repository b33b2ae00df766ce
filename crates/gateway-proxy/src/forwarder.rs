//! Request forwarding to backend services.

use bytes::Bytes;
use gateway_core::GatewayError;
use http::{HeaderMap, Method, StatusCode};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use crate::routes::RouteTable;

/// Correlation header propagated to backends and echoed on responses.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// A backend response carried back to the client verbatim.
#[derive(Debug)]
pub struct ProxiedResponse {
    /// Backend status code, passed through unmodified (including 4xx/5xx).
    pub status: StatusCode,
    /// Backend response headers.
    pub headers: HeaderMap,
    /// Backend response body.
    pub body: Bytes,
}

/// Forwards requests to the backend resolved from the route table.
pub struct Forwarder {
    routes: RouteTable,
    client: Client,
}

impl Forwarder {
    /// Create a forwarder with the given route table and request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(routes: RouteTable, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { routes, client })
    }

    /// The route table this forwarder resolves against.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Forward a request to the backend matching `path`.
    ///
    /// Copies all inbound headers except `Host`, attaches the correlation
    /// identifier, and preserves the method, query, and body unchanged.
    ///
    /// # Errors
    /// - `RouteNotFound` when no prefix matches
    /// - `BackendTimeout` when the backend misses the deadline
    /// - `BackendUnreachable` for connection-level failures
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        mut headers: HeaderMap,
        body: Bytes,
        correlation_id: &str,
    ) -> Result<ProxiedResponse, GatewayError> {
        let backend = self
            .routes
            .resolve(path)
            .ok_or_else(|| GatewayError::RouteNotFound {
                path: path.to_string(),
            })?;

        let mut target_url = format!("{backend}{path}");
        if let Some(query) = query {
            target_url.push('?');
            target_url.push_str(query);
        }

        // Hop-by-hop: the backend must see its own host, not ours.
        headers.remove(http::header::HOST);
        if let Ok(value) = correlation_id.parse() {
            headers.insert(CORRELATION_HEADER, value);
        }

        debug!(method = %method, target = %target_url, "Forwarding request");

        let response = self
            .client
            .request(method, &target_url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(target = %target_url, "Timeout proxying request");
                    GatewayError::BackendTimeout { url: target_url }
                } else {
                    error!(target = %target_url, error = %e, "Error proxying request");
                    GatewayError::BackendUnreachable {
                        url: target_url,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            GatewayError::BackendUnreachable {
                url: path.to_string(),
                message: format!("failed to read backend body: {e}"),
            }
        })?;

        Ok(ProxiedResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}
