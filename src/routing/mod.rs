//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request reaching the end of the filter chain
//!     → dispatcher.rs (Dispatch::dispatch)
//!     → router.rs (longest-prefix lookup, path rewrite)
//!     → matcher.rs (segment-aware pattern match)
//!     → outbound call to the route's target
//!     → GatewayResponse or GatewayError back up the chain
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Compile patterns
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - Longest literal prefix wins; ties go to the earlier route

pub mod dispatcher;
pub mod matcher;
pub mod router;

pub use dispatcher::{Dispatch, HttpDispatcher, MatchedRoute};
pub use matcher::{PathPattern, PatternError};
pub use router::{Route, RouteTable, Target};
