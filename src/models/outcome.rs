//! Batch outcome
//!
//! Per-operation result of a batch run.

use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::BatchError;

/// Result of one operation, correlated to its request by `id`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Identifier of the originating operation
    pub id: String,
    /// Remote result, absent on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure reason, absent on success
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<BatchError>,
    /// Time from task start to completion
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// True when served from the cache without a remote call
    pub cached: bool,
}

impl BatchOutcome {
    /// Creates a successful outcome.
    pub fn success(id: impl Into<String>, result: Value, elapsed: Duration) -> Self {
        Self {
            id: id.into(),
            result: Some(result),
            error: None,
            elapsed,
            cached: false,
        }
    }

    /// Creates a failed outcome.
    pub fn failure(id: impl Into<String>, error: BatchError, elapsed: Duration) -> Self {
        Self {
            id: id.into(),
            result: None,
            error: Some(error),
            elapsed,
            cached: false,
        }
    }

    /// Creates an outcome served from the cache.
    pub fn from_cache(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            result: Some(result),
            error: None,
            elapsed: Duration::ZERO,
            cached: true,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Copy of this outcome answering a duplicate operation.
    pub fn relabel(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<BatchError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}
