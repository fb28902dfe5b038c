//! Request correlation ids.
//!
//! Reuses a caller-supplied `x-request-id` or mints a UUID v4, makes it
//! visible to later filters through the attribute bag, forwards it
//! downstream and echoes it on the reply.

use async_trait::async_trait;
use axum::http::HeaderValue;
use uuid::Uuid;

use crate::config::FilterKind;
use crate::filter::{Filter, FilterResult, Next};
use crate::http::request::{GatewayRequest, RequestId, X_REQUEST_ID};

pub struct RequestIdFilter {
    priority: i32,
}

impl RequestIdFilter {
    pub fn new() -> Self {
        Self::with_priority(FilterKind::RequestId.default_priority())
    }

    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for RequestIdFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// An incoming id is kept only if it is printable and reasonably short.
fn incoming_id(value: &HeaderValue) -> Option<String> {
    let id = value.to_str().ok()?.trim();
    if id.is_empty() || id.len() > 128 {
        return None;
    }
    Some(id.to_string())
}

#[async_trait]
impl Filter for RequestIdFilter {
    fn name(&self) -> &str {
        FilterKind::RequestId.as_str()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn filter(&self, request: &mut GatewayRequest, next: Next<'_>) -> FilterResult {
        let id = request
            .headers
            .get(&X_REQUEST_ID)
            .and_then(incoming_id)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Minted ids are always valid header values; incoming ones were
        // parsed from a header.
        let value = HeaderValue::from_str(&id).ok();
        if let Some(value) = &value {
            request.headers.insert(X_REQUEST_ID, value.clone());
        }
        request.attributes.insert(RequestId(id));

        let mut response = next.run(request).await?;
        if let Some(value) = value {
            response.headers.entry(X_REQUEST_ID).or_insert(value);
        }
        Ok(response)
    }
}
