//! Route table and lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Resolve a request path by longest-prefix match
//! - Rewrite the path for the matched downstream target
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan (acceptable for typical route counts)
//! - Ties keep configuration order, so resolution is deterministic
//! - Explicit `None` for no match rather than a silent default

use std::net::Ipv6Addr;
use std::time::Duration;

use crate::config::schema::{PathRewrite, RouteConfig};
use crate::config::validation::ValidationError;
use crate::routing::matcher::PathPattern;

/// A downstream service address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    /// `host:port`, as used in the upstream URI. IPv6 literals are
    /// bracketed.
    pub fn authority(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    pub pattern: PathPattern,
    pub target: Target,
    pub rewrite: PathRewrite,
    pub timeout: Duration,
}

impl Route {
    pub fn from_config(config: &RouteConfig, default_timeout: Duration) -> Result<Self, ValidationError> {
        let pattern = PathPattern::parse(&config.path).map_err(|e| ValidationError::InvalidPattern {
            route: config.id.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            id: config.id.clone(),
            pattern,
            target: Target {
                host: config.host.clone(),
                port: config.port,
            },
            rewrite: config.rewrite.clone(),
            timeout: config
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(default_timeout),
        })
    }

    /// Path to request from the downstream target.
    ///
    /// `path` must be one this route matches.
    pub fn rewrite_path(&self, path: &str) -> String {
        match &self.rewrite {
            PathRewrite::None => path.to_string(),
            PathRewrite::StripPrefix { parts } => {
                // The remainder after the stripped segments is kept byte for byte.
                let mut rest = path;
                for _ in 0..*parts {
                    let segment = rest.trim_start_matches('/');
                    rest = segment.find('/').map_or("", |end| &segment[end..]);
                }
                if rest.is_empty() {
                    "/".to_string()
                } else {
                    rest.to_string()
                }
            }
            PathRewrite::ReplacePrefix { prefix } => {
                let rest = path.strip_prefix(self.pattern.literal()).unwrap_or(path);
                let rewritten = format!("{}{}", prefix.trim_end_matches('/'), rest);
                if rewritten.is_empty() {
                    "/".to_string()
                } else {
                    rewritten
                }
            }
        }
    }
}

/// Immutable set of routes, resolved per request.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Compile the configured routes, keeping their order.
    pub fn from_config(configs: &[RouteConfig], default_timeout: Duration) -> Result<Self, ValidationError> {
        let routes = configs
            .iter()
            .map(|config| Route::from_config(config, default_timeout))
            .collect::<Result<Vec<_>, _>>()?;

        for route in &routes {
            tracing::debug!(
                route = %route.id,
                pattern = %route.pattern,
                target = %route.target.authority(),
                timeout_ms = route.timeout.as_millis() as u64,
                "Route compiled"
            );
        }

        Ok(Self { routes })
    }

    /// Longest-prefix match. Among equally specific patterns the one
    /// configured first wins.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let mut best: Option<&Route> = None;
        for route in self.routes.iter().filter(|r| r.pattern.matches(path)) {
            match best {
                Some(current) if current.pattern.specificity() >= route.pattern.specificity() => {}
                _ => best = Some(route),
            }
        }
        best
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
