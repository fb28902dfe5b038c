//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route table mapping path patterns to downstream targets.
    pub routes: Vec<RouteConfig>,

    /// Filter registration list. Order in the file is the tie-breaker for
    /// filters sharing a priority.
    pub filters: Vec<FilterConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Header forwarding policy.
    pub headers: HeaderConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routes: Vec::new(),
            filters: vec![
                FilterConfig::new(FilterKind::Logging),
                FilterConfig::new(FilterKind::RequestId),
            ],
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            headers: HeaderConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A single route: path pattern → downstream target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub id: String,

    /// Path pattern, e.g. `/api/auth/**` or `/hello`.
    pub path: String,

    /// Downstream host name or IP.
    pub host: String,

    /// Downstream port.
    pub port: u16,

    /// How the path is rewritten before forwarding.
    #[serde(default)]
    pub rewrite: PathRewrite,

    /// Per-route deadline; falls back to `timeouts.upstream_ms`.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Path rewrite rule applied before forwarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathRewrite {
    /// Forward the path unchanged.
    #[default]
    None,
    /// Drop the first `parts` path segments.
    StripPrefix { parts: usize },
    /// Replace the pattern's literal prefix with `prefix`.
    ReplacePrefix { prefix: String },
}

/// Built-in filters that can be registered from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    Logging,
    RequestId,
    SecurityHeaders,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Logging => "logging",
            FilterKind::RequestId => "request-id",
            FilterKind::SecurityHeaders => "security-headers",
        }
    }

    /// Priority used when the registration does not set one.
    pub fn default_priority(&self) -> i32 {
        match self {
            FilterKind::Logging => -1,
            FilterKind::RequestId => 0,
            FilterKind::SecurityHeaders => 10,
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the filter registration list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    pub name: FilterKind,

    /// Overrides the filter's default priority (lower runs earlier).
    #[serde(default)]
    pub priority: Option<i32>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl FilterConfig {
    pub fn new(name: FilterKind) -> Self {
        Self {
            name,
            priority: None,
            enabled: true,
        }
    }

    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or_else(|| self.name.default_priority())
    }
}

fn default_enabled() -> bool {
    true
}

/// Timeout configuration for downstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Default deadline for a whole downstream exchange in milliseconds.
    pub upstream_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            upstream_ms: 30_000,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound request body in bytes.
    pub max_request_body_bytes: usize,

    /// Maximum downstream response body in bytes.
    pub max_response_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_body_bytes: 2 * 1024 * 1024, // 2MB
            max_response_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Header forwarding policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Request headers starting with this prefix never leave the gateway.
    pub internal_prefix: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            internal_prefix: "x-gateway-internal-".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty output for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
