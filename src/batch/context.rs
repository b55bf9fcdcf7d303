//! Batch Context
//!
//! Carries cancellation and an optional deadline into a batch run.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::BatchError;

// == Batch Context ==
/// Cancellation handle plus optional deadline for one batch call.
///
/// Consulted only while an operation waits for a permit; remote calls
/// already in flight are never interrupted.
#[derive(Debug, Clone, Default)]
pub struct BatchContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl BatchContext {
    /// Context that is never cancelled unless [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context expiring `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Context expiring at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Context driven by an existing token, e.g. one shared with a shutdown path.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the context error, if the context is already done.
    ///
    /// Explicit cancellation takes precedence over an elapsed deadline.
    pub fn err(&self) -> Option<BatchError> {
        if self.token.is_cancelled() {
            return Some(BatchError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(BatchError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> BatchError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => BatchError::Cancelled,
                    _ = sleep_until(deadline) => BatchError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                BatchError::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_context_has_no_error() {
        let ctx = BatchContext::new();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[tokio::test]
    async fn test_cancel_is_observed() {
        let ctx = BatchContext::new();
        let clone = ctx.clone();

        clone.cancel();

        assert!(matches!(ctx.err(), Some(BatchError::Cancelled)));
        assert!(matches!(ctx.done().await, BatchError::Cancelled));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let ctx = BatchContext::with_timeout(Duration::from_millis(20));
        assert!(ctx.err().is_none());

        assert!(matches!(ctx.done().await, BatchError::DeadlineExceeded));
        assert!(matches!(ctx.err(), Some(BatchError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_shared_token() {
        let token = CancellationToken::new();
        let ctx = BatchContext::with_token(token.clone());

        token.cancel();

        assert!(matches!(ctx.err(), Some(BatchError::Cancelled)));
    }
}
