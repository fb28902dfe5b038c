//! API gateway: an ordered filter chain in front of a prefix router.

pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::{Envelope, HttpServer};
pub use lifecycle::Shutdown;
