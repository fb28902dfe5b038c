//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (buffer body within limits, attribute bag)
//!     → [filter chain + dispatch]
//!     → response.rs (GatewayResponse, envelope on failure)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{GatewayRequest, RequestId, X_REQUEST_ID};
pub use response::{Envelope, GatewayResponse};
pub use server::HttpServer;
