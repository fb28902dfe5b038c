//! Request and response body limits.
//!
//! # Responsibilities
//! - Buffer a body completely, refusing to grow past a byte limit
//! - Tell an over-limit body apart from a transport failure
//!
//! # Design Decisions
//! - Bodies are buffered before anything is forwarded or written, so an
//!   oversized payload is rejected before the filter chain runs
//! - Over-limit inbound bodies become 413 envelopes; over-limit downstream
//!   bodies are treated as an invalid upstream reply

use axum::body::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};

/// Why a body could not be buffered.
#[derive(Debug, thiserror::Error)]
pub enum BodyReadError {
    #[error("body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read body: {0}")]
    Failed(String),
}

/// Collect `body` into memory, failing once more than `limit` bytes arrive.
pub async fn collect_limited<B>(body: B, limit: usize) -> Result<Bytes, BodyReadError>
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(BodyReadError::TooLarge { limit })
        }
        Err(e) => Err(BodyReadError::Failed(e.to_string())),
    }
}
