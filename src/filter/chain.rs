//! Filter chain execution.
//!
//! # Responsibilities
//! - Order filters by priority once, at construction
//! - Run a request through every filter and the dispatcher
//!
//! # Design Decisions
//! - Stable sort: equal priorities keep registration order
//! - Immutable after construction; shared via `Arc` across requests

use std::sync::Arc;

use crate::filter::{Filter, FilterResult, Next};
use crate::http::request::GatewayRequest;
use crate::routing::Dispatch;

/// Ordered filters plus the dispatcher at the end.
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
    dispatcher: Arc<dyn Dispatch>,
}

impl FilterChain {
    pub fn new(mut filters: Vec<Arc<dyn Filter>>, dispatcher: Arc<dyn Dispatch>) -> Self {
        // `sort_by_key` is stable.
        filters.sort_by_key(|f| f.priority());

        for (position, filter) in filters.iter().enumerate() {
            tracing::debug!(
                position,
                filter = filter.name(),
                priority = filter.priority(),
                "Filter registered"
            );
        }

        Self {
            filters,
            dispatcher,
        }
    }

    /// `(name, priority)` of each filter in inbound execution order.
    pub fn filters(&self) -> Vec<(&str, i32)> {
        self.filters
            .iter()
            .map(|f| (f.name(), f.priority()))
            .collect()
    }

    pub async fn execute(&self, request: &mut GatewayRequest) -> FilterResult {
        Next::new(&self.filters, self.dispatcher.as_ref())
            .run(request)
            .await
    }
}
