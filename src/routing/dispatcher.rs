//! Downstream dispatch.
//!
//! # Responsibilities
//! - Resolve the request path against the route table
//! - Rewrite the path and build the outbound request
//! - Forward it with the route deadline and buffer the reply
//! - Classify failures (unreachable, timeout, invalid reply)
//!
//! # Design Decisions
//! - Single attempt, no retries; dispatch has no side effects beyond the
//!   one outbound call
//! - The deadline covers both sending and reading the downstream body
//! - Downstream status, headers and body are returned verbatim, minus
//!   hop-by-hop headers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Uri},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::filter::FilterResult;
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;
use crate::resilience::timeouts::{with_deadline, DeadlineExceeded};
use crate::routing::router::{Route, RouteTable};
use crate::security::headers::{forwarded_headers, strip_hop_by_hop};
use crate::security::limits::collect_limited;

/// Terminal step of the filter chain: hand the request to a downstream
/// target and return what it answered.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, request: &mut GatewayRequest) -> FilterResult;
}

/// Id of the route that served the request, recorded as an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute(pub String);

/// Dispatcher forwarding over HTTP/1.1 with a pooled hyper client.
pub struct HttpDispatcher {
    routes: Arc<RouteTable>,
    client: Client<HttpConnector, Body>,
    internal_prefix: String,
    max_response_body_bytes: usize,
}

impl HttpDispatcher {
    pub fn new(routes: Arc<RouteTable>, config: &GatewayConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(config.timeouts.connect_ms)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            routes,
            client,
            internal_prefix: config.headers.internal_prefix.to_ascii_lowercase(),
            max_response_body_bytes: config.limits.max_response_body_bytes,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    fn upstream_request(&self, route: &Route, request: &GatewayRequest) -> Result<Request<Body>, GatewayError> {
        let path = route.rewrite_path(request.path());
        let path_and_query = match request.uri.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };

        let uri: Uri = format!("http://{}{}", route.target.authority(), path_and_query)
            .parse()
            .map_err(|e| GatewayError::UpstreamError {
                target: route.target.authority(),
                reason: format!("invalid upstream URI: {}", e),
            })?;

        let mut upstream = Request::new(Body::from(request.body.clone()));
        *upstream.method_mut() = request.method.clone();
        *upstream.uri_mut() = uri;
        *upstream.headers_mut() =
            forwarded_headers(&request.headers, &self.internal_prefix, request.remote_addr);
        Ok(upstream)
    }
}

#[async_trait]
impl Dispatch for HttpDispatcher {
    async fn dispatch(&self, request: &mut GatewayRequest) -> FilterResult {
        let route = self
            .routes
            .resolve(request.path())
            .ok_or_else(|| GatewayError::RouteNotFound {
                path: request.path().to_string(),
            })?;
        request.attributes.insert(MatchedRoute(route.id.clone()));

        let target = route.target.authority();
        let upstream = self.upstream_request(route, request)?;

        tracing::debug!(
            route = %route.id,
            method = %request.method,
            upstream = %upstream.uri(),
            timeout_ms = route.timeout.as_millis() as u64,
            "Forwarding request"
        );

        let exchange = async {
            let response = self
                .client
                .request(upstream)
                .await
                .map_err(|e| classify(e, &target))?;

            let (parts, body) = response.into_parts();
            let body = collect_limited(body, self.max_response_body_bytes)
                .await
                .map_err(|e| GatewayError::UpstreamError {
                    target: target.clone(),
                    reason: e.to_string(),
                })?;

            let mut headers = parts.headers;
            strip_hop_by_hop(&mut headers);
            Ok::<_, GatewayError>(GatewayResponse::new(parts.status, headers, body))
        };

        match with_deadline(route.timeout, exchange).await {
            Ok(result) => result,
            Err(DeadlineExceeded { deadline }) => Err(GatewayError::UpstreamTimeout {
                target,
                timeout: deadline,
            }),
        }
    }
}

fn classify(error: hyper_util::client::legacy::Error, target: &str) -> GatewayError {
    let reason = error_chain(&error);
    if error.is_connect() {
        GatewayError::UpstreamUnreachable {
            target: target.to_string(),
            reason,
        }
    } else {
        GatewayError::UpstreamError {
            target: target.to_string(),
            reason,
        }
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
