//! Gateway failure taxonomy.
//!
//! Every failure that can surface while a request moves through the filter
//! chain is a [`GatewayError`]. Errors travel back up through each filter's
//! post-logic untouched and are turned into an error envelope exactly once,
//! by the entry point (see `http::response`).

use std::time::Duration;

use axum::http::StatusCode;

/// A failure raised while handling a single request.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No configured route matches the request path.
    #[error("No route found for path {path}")]
    RouteNotFound { path: String },

    /// The downstream target refused or failed the connection.
    #[error("Upstream {target} is unreachable: {reason}")]
    UpstreamUnreachable { target: String, reason: String },

    /// The downstream target did not reply within the route deadline.
    #[error("Upstream {target} did not respond within {}ms", .timeout.as_millis())]
    UpstreamTimeout { target: String, timeout: Duration },

    /// The downstream target replied with something that is not a complete
    /// HTTP response.
    #[error("Upstream {target} returned an invalid response: {reason}")]
    UpstreamError { target: String, reason: String },

    /// The inbound body exceeds the configured limit.
    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    /// The inbound request could not be read.
    #[error("Malformed request: {reason}")]
    BadRequest { reason: String },
}

impl GatewayError {
    /// HTTP status the error maps to at the outer boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable name, used as a log and metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RouteNotFound { .. } => "route_not_found",
            GatewayError::UpstreamUnreachable { .. } => "upstream_unreachable",
            GatewayError::UpstreamTimeout { .. } => "upstream_timeout",
            GatewayError::UpstreamError { .. } => "upstream_error",
            GatewayError::PayloadTooLarge { .. } => "payload_too_large",
            GatewayError::BadRequest { .. } => "bad_request",
        }
    }
}
