//! Request handling and transformation.
//!
//! # Responsibilities
//! - Turn an inbound axum request into a fully buffered [`GatewayRequest`]
//! - Carry the per-request attribute bag filters use to hand state forward
//! - Define the request ID attribute and header
//!
//! # Design Decisions
//! - Body size limit enforced while buffering, before the chain runs
//! - The attribute bag is owned by exactly one request; nothing in it is
//!   shared with other in-flight requests

use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{Extensions, HeaderMap, HeaderName, Method, Request, Uri},
};

use crate::error::GatewayError;
use crate::security::limits::{collect_limited, BodyReadError};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID attribute set by the `request-id` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound request as seen by filters and the dispatcher.
#[derive(Debug)]
pub struct GatewayRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub remote_addr: Option<SocketAddr>,
    pub body: Bytes,
    /// Per-request state, keyed by type.
    pub attributes: Extensions,
}

impl GatewayRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            remote_addr: None,
            body: Bytes::new(),
            attributes: Extensions::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Buffer an axum request, enforcing `max_body_bytes`.
    ///
    /// The peer address comes from axum's `ConnectInfo` when the server was
    /// started with connect info.
    pub async fn from_http(
        request: Request<Body>,
        max_body_bytes: usize,
    ) -> Result<Self, GatewayError> {
        let (parts, body) = request.into_parts();
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);

        let body = collect_limited(body, max_body_bytes)
            .await
            .map_err(|e| match e {
                BodyReadError::TooLarge { limit } => GatewayError::PayloadTooLarge { limit },
                BodyReadError::Failed(reason) => GatewayError::BadRequest { reason },
            })?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            remote_addr,
            body,
            attributes: Extensions::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_http() {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login?next=%2F")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"userName":"admin","password":"x"}"#))
            .unwrap();
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let gateway_request = GatewayRequest::from_http(request, 1024).await.unwrap();

        assert_eq!(gateway_request.method, Method::POST);
        assert_eq!(gateway_request.path(), "/api/auth/login");
        assert_eq!(gateway_request.uri.query(), Some("next=%2F"));
        assert_eq!(gateway_request.remote_addr, Some(peer));
        assert_eq!(&gateway_request.body[..], br#"{"userName":"admin","password":"x"}"#);
    }

    #[tokio::test]
    async fn test_from_http_rejects_large_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .body(Body::from(vec![0u8; 2048]))
            .unwrap();

        let err = GatewayRequest::from_http(request, 1024).await.unwrap_err();
        assert!(matches!(err, GatewayError::PayloadTooLarge { limit: 1024 }));
    }
}
