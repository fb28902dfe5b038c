//! Filter subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayRequest
//!     → chain.rs (filters sorted by priority, stable)
//!     → filter 1 pre-logic → filter 2 pre-logic → … → Dispatch
//!     ← filter 1 post-logic ← filter 2 post-logic ← … ← response / error
//! ```
//!
//! A filter is handed the request and a [`Next`] continuation standing for
//! every filter after it plus the dispatcher. Whatever it does after
//! `next.run(request).await` is its post-logic, and it sees the outcome of
//! the rest of the chain whether that outcome is a response or an error.
//! Returning without calling `next` short-circuits: later filters and the
//! dispatcher never run.
//!
//! # Design Decisions
//! - Filters are shared by all in-flight requests; they hold configuration
//!   only. Per-request state goes in `GatewayRequest::attributes`
//! - The request is passed by `&mut`, so the attribute bag outlives the
//!   continuation and post-logic can read what pre-logic stored

pub mod chain;
pub mod logging;
pub mod registry;
pub mod request_id;
pub mod security_headers;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;
use crate::routing::Dispatch;

pub use chain::FilterChain;
pub use logging::{LoggingFilter, RequestTiming};
pub use request_id::RequestIdFilter;
pub use security_headers::SecurityHeadersFilter;

/// Outcome of running (part of) the chain.
pub type FilterResult = Result<GatewayResponse, GatewayError>;

/// A named, ordered unit of request/response interception.
#[async_trait]
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    /// Lower values run earlier on the inbound path.
    fn priority(&self) -> i32;

    async fn filter(&self, request: &mut GatewayRequest, next: Next<'_>) -> FilterResult;
}

/// The remainder of the chain after the current filter.
pub struct Next<'a> {
    filters: &'a [Arc<dyn Filter>],
    dispatcher: &'a dyn Dispatch,
}

impl<'a> Next<'a> {
    pub(crate) fn new(filters: &'a [Arc<dyn Filter>], dispatcher: &'a dyn Dispatch) -> Self {
        Self {
            filters,
            dispatcher,
        }
    }

    /// Run the remaining filters and then the dispatcher.
    pub async fn run(self, request: &mut GatewayRequest) -> FilterResult {
        match self.filters.split_first() {
            Some((current, rest)) => {
                let next = Next::new(rest, self.dispatcher);
                current.filter(request, next).await
            }
            None => self.dispatcher.dispatch(request).await,
        }
    }
}
