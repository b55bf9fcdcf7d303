//! Error types for the batch subsystem
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Batch Error Enum ==
/// Unified error type for the cache, processor and optimizer.
///
/// Cloneable so that one outcome can be shared by every duplicate of an
/// operation.
#[derive(Error, Debug, Clone)]
pub enum BatchError {
    /// Invalid construction parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation rejected before dispatch
    #[error("Invalid operation {id}: {reason}")]
    InvalidOperation { id: String, reason: String },

    /// Method not known to the remote executor
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Context was cancelled while waiting for a permit
    #[error("Operation cancelled")]
    Cancelled,

    /// Context deadline passed while waiting for a permit
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Error returned by the remote executor, passed through as-is
    #[error("{0}")]
    Remote(Arc<anyhow::Error>),

    /// Worker task failed to produce an outcome
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for BatchError {
    fn from(err: anyhow::Error) -> Self {
        BatchError::Remote(Arc::new(err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the batch subsystem.
pub type Result<T> = std::result::Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_passes_message_through() {
        let err: BatchError = anyhow::anyhow!("API rate limit exceeded").into();
        assert_eq!(err.to_string(), "API rate limit exceeded");
        assert!(matches!(err, BatchError::Remote(_)));
    }

    #[test]
    fn test_context_error_messages() {
        assert_eq!(BatchError::Cancelled.to_string(), "Operation cancelled");
        assert_eq!(BatchError::DeadlineExceeded.to_string(), "Deadline exceeded");
    }

    #[test]
    fn test_invalid_operation_message() {
        let err = BatchError::InvalidOperation {
            id: "op-1".to_string(),
            reason: "owner is required".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid operation op-1: owner is required");
    }
}
