//! Builds the configured filter list.

use std::sync::Arc;

use crate::config::{FilterConfig, FilterKind};
use crate::filter::{Filter, LoggingFilter, RequestIdFilter, SecurityHeadersFilter};

/// Instantiate every enabled filter registration, in configuration order.
/// Ordering by priority is left to [`FilterChain`](crate::filter::FilterChain).
pub fn build_filters(configs: &[FilterConfig]) -> Vec<Arc<dyn Filter>> {
    configs
        .iter()
        .filter(|config| {
            if !config.enabled {
                tracing::info!(filter = %config.name, "Filter disabled by configuration");
            }
            config.enabled
        })
        .map(|config| build(config.name, config.effective_priority()))
        .collect()
}

fn build(kind: FilterKind, priority: i32) -> Arc<dyn Filter> {
    match kind {
        FilterKind::Logging => Arc::new(LoggingFilter::with_priority(priority)),
        FilterKind::RequestId => Arc::new(RequestIdFilter::with_priority(priority)),
        FilterKind::SecurityHeaders => Arc::new(SecurityHeadersFilter::with_priority(priority)),
    }
}
