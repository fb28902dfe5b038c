//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route patterns, targets and rewrite rules
//! - Validate value ranges (timeouts > 0, ports valid, limits > 0)
//! - Detect duplicate route ids and filter registrations
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::{FilterKind, GatewayConfig, PathRewrite};
use crate::routing::matcher::PathPattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener bind address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("route #{index} has an empty id")]
    EmptyRouteId { index: usize },

    #[error("route id {0:?} is defined more than once")]
    DuplicateRouteId(String),

    #[error("route {route:?}: invalid path pattern: {reason}")]
    InvalidPattern { route: String, reason: String },

    #[error("route {route:?}: host must not be empty")]
    EmptyHost { route: String },

    #[error("route {route:?}: port must be non-zero")]
    ZeroPort { route: String },

    #[error("route {route:?}: invalid rewrite: {reason}")]
    InvalidRewrite { route: String, reason: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(String),

    #[error("filter {0} is registered more than once")]
    DuplicateFilter(FilterKind),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let mut route_ids = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.id.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteId { index });
        } else if !route_ids.insert(route.id.as_str()) {
            errors.push(ValidationError::DuplicateRouteId(route.id.clone()));
        }

        if let Err(e) = PathPattern::parse(&route.path) {
            errors.push(ValidationError::InvalidPattern {
                route: route.id.clone(),
                reason: e.to_string(),
            });
        }

        if route.host.trim().is_empty() || route.host.contains(char::is_whitespace) {
            errors.push(ValidationError::EmptyHost {
                route: route.id.clone(),
            });
        }

        if route.port == 0 {
            errors.push(ValidationError::ZeroPort {
                route: route.id.clone(),
            });
        }

        if let PathRewrite::ReplacePrefix { prefix } = &route.rewrite {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::InvalidRewrite {
                    route: route.id.clone(),
                    reason: format!("replacement prefix {:?} must start with '/'", prefix),
                });
            }
        }

        if route.timeout_ms == Some(0) {
            errors.push(ValidationError::ZeroValue(format!(
                "routes.{}.timeout_ms",
                route.id
            )));
        }
    }

    let mut filters = HashSet::new();
    for filter in &config.filters {
        if !filters.insert(filter.name) {
            errors.push(ValidationError::DuplicateFilter(filter.name));
        }
    }

    let positive = [
        ("timeouts.connect_ms", config.timeouts.connect_ms as usize),
        ("timeouts.upstream_ms", config.timeouts.upstream_ms as usize),
        ("limits.max_request_body_bytes", config.limits.max_request_body_bytes),
        ("limits.max_response_body_bytes", config.limits.max_response_body_bytes),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ValidationError::ZeroValue(name.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
