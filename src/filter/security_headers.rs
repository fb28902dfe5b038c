//! Adds baseline security headers to successful replies, leaving any the
//! downstream service already set. Runs innermost by default so the headers
//! are in place before the outer filters observe the response. Errors do
//! not pass through here; the entry point adds the same headers to their
//! envelopes when this filter is registered.

use async_trait::async_trait;

use crate::config::FilterKind;
use crate::filter::{Filter, FilterResult, Next};
use crate::http::request::GatewayRequest;
use crate::security::headers::apply_security_headers;

pub struct SecurityHeadersFilter {
    priority: i32,
}

impl SecurityHeadersFilter {
    pub fn new() -> Self {
        Self::with_priority(FilterKind::SecurityHeaders.default_priority())
    }

    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for SecurityHeadersFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Filter for SecurityHeadersFilter {
    fn name(&self) -> &str {
        FilterKind::SecurityHeaders.as_str()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn filter(&self, request: &mut GatewayRequest, next: Next<'_>) -> FilterResult {
        let mut response = next.run(request).await?;
        apply_security_headers(&mut response.headers);
        Ok(response)
    }
}
