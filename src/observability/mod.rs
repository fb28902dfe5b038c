//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Filters, dispatcher and entry point produce:
//!     → logging.rs (structured log events, access records)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the chain as an attribute and a header
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
