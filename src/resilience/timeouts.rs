//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap downstream calls with a deadline
//! - Cancel the wrapped operation cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the inner future is dropped on expiry
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

/// The wrapped operation did not finish before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {}ms exceeded", .deadline.as_millis())]
pub struct DeadlineExceeded {
    pub deadline: Duration,
}

/// Run `future`, giving up after `deadline`.
pub async fn with_deadline<F>(deadline: Duration, future: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(deadline, future)
        .await
        .map_err(|_| DeadlineExceeded { deadline })
}
