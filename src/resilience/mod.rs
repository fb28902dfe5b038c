//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to downstream:
//!     → timeouts.rs (enforce the route deadline over send + body read)
//!     → On expiry: UpstreamTimeout, unwound through every filter
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every downstream call has a deadline
//! - Dispatch is a single attempt; retries would be a filter concern

pub mod timeouts;
