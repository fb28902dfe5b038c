//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (buffer body, reject oversized payloads)
//!     → filter chain
//!     → headers.rs (strip hop-by-hop/internal headers, add X-Forwarded-*)
//!     → downstream target
//!
//! Downstream response:
//!     → limits.rs (bounded buffering)
//!     → headers.rs (strip hop-by-hop, optional security headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: an oversized body never reaches the chain
//! - No trust in client-supplied gateway-internal headers

pub mod headers;
pub mod limits;
