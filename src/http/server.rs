//! HTTP server setup and the gateway entry point.
//!
//! # Responsibilities
//! - Build the route table, dispatcher and filter chain from configuration
//! - Create the Axum router with a single catch-all handler
//! - Buffer each request, run it through the chain, send the outcome
//! - Convert unhandled failures into error envelopes
//! - Record request metrics
//! - Serve until the shutdown signal, then drain
//!
//! # Design Decisions
//! - Errors become envelopes here and nowhere else
//! - No tower-level timeout layer; deadlines belong to routes so that a
//!   timeout is reported as an envelope like every other failure
//! - A client disconnect drops the handler future, abandoning the dispatch

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, FilterKind, GatewayConfig};
use crate::filter::registry::build_filters;
use crate::filter::FilterChain;
use crate::http::request::{GatewayRequest, RequestId, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{HttpDispatcher, MatchedRoute, RouteTable};
use crate::security::headers::apply_security_headers;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<FilterChain>,
    pub max_request_body_bytes: usize,
    /// The security headers filter is registered, so error envelopes built
    /// here carry the same headers as replies that passed through it.
    pub security_headers: bool,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Validate `config` and assemble the full request pipeline.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let routes = RouteTable::from_config(
            &config.routes,
            Duration::from_millis(config.timeouts.upstream_ms),
        )
        .map_err(|e| ConfigError::Validation(vec![e]))?;

        tracing::info!(routes = routes.len(), "Route table compiled");

        let dispatcher = HttpDispatcher::new(Arc::new(routes), &config);
        let chain = FilterChain::new(build_filters(&config.filters), Arc::new(dispatcher));

        Ok(Self::from_chain(chain, config))
    }

    /// Serve an already assembled chain. Only the listener and limits
    /// sections of `config` are used.
    pub fn from_chain(chain: FilterChain, config: GatewayConfig) -> Self {
        let security_headers = chain
            .filters()
            .iter()
            .any(|(name, _)| *name == FilterKind::SecurityHeaders.as_str());
        let state = AppState {
            chain: Arc::new(chain),
            max_request_body_bytes: config.limits.max_request_body_bytes,
            security_headers,
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Accept connections on `listener` until `shutdown` fires, then stop
    /// accepting and wait for in-flight requests to finish. A shutdown
    /// triggered before the call stops the server straight away.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every path and method enters the filter chain.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let mut gateway_request =
        match GatewayRequest::from_http(request, state.max_request_body_bytes).await {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(method = %method, error = %e, "Request rejected before filter chain");
                let mut response = e.into_response();
                if state.security_headers {
                    apply_security_headers(response.headers_mut());
                }
                metrics::record_request(&method, response.status().as_u16(), "none", start);
                return response;
            }
        };

    let response = match state.chain.execute(&mut gateway_request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            let mut response = e.into_response();
            if let Some(RequestId(id)) = gateway_request.attributes.get::<RequestId>() {
                if let Ok(value) = HeaderValue::from_str(id) {
                    response.headers_mut().insert(X_REQUEST_ID, value);
                }
            }
            if state.security_headers {
                apply_security_headers(response.headers_mut());
            }
            response
        }
    };

    let route = gateway_request
        .attributes
        .get::<MatchedRoute>()
        .map(|r| r.0.as_str())
        .unwrap_or("none");
    metrics::record_request(&method, response.status().as_u16(), route, start);

    response
}
