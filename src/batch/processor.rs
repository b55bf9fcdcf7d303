//! Batch Processor
//!
//! Runs a list of operations concurrently against the remote executor, never
//! allowing more than `max_concurrency` remote calls in flight.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::batch::{BatchContext, RemoteExecutor};
use crate::error::BatchError;
use crate::models::{BatchOperation, BatchOutcome};

// == Processed Batch ==
/// Outcomes of a batch plus the batch-level context error, if any.
///
/// Outcomes are always returned, even when `error` is set.
#[derive(Debug, Clone, Default)]
pub struct ProcessedBatch {
    /// One outcome per submitted operation, in no particular order
    pub outcomes: Vec<BatchOutcome>,
    /// Set when the context had expired or been cancelled by the end of the run
    pub error: Option<BatchError>,
}

impl ProcessedBatch {
    /// Finds the outcome for an operation identifier.
    pub fn outcome(&self, id: &str) -> Option<&BatchOutcome> {
        self.outcomes.iter().find(|outcome| outcome.id == id)
    }

    /// Number of outcomes carrying an error.
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }
}

// == Batch Processor ==
/// Bounded-concurrency fan-out over a [`RemoteExecutor`].
#[derive(Clone)]
pub struct BatchProcessor {
    executor: Arc<dyn RemoteExecutor>,
    permits: Arc<Semaphore>,
    max_concurrency: usize,
}

impl BatchProcessor {
    // == Constructor ==
    /// Creates a processor; a `max_concurrency` of zero is raised to one.
    pub fn new(executor: Arc<dyn RemoteExecutor>, max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            executor,
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    /// Effective permit count after clamping.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    // == Process Batch ==
    /// Executes every operation and returns one outcome per operation.
    ///
    /// Each operation runs in its own task. A failure in one operation is
    /// reported only in its outcome. Operations still waiting for a permit
    /// when `ctx` ends fail with the context error; running ones complete.
    pub async fn process_batch(
        &self,
        ctx: &BatchContext,
        operations: Vec<BatchOperation>,
    ) -> ProcessedBatch {
        if operations.is_empty() {
            return ProcessedBatch::default();
        }

        let total = operations.len();
        info!(
            operations = total,
            max_concurrency = self.max_concurrency,
            "processing batch"
        );

        let mut handles = Vec::with_capacity(total);
        for operation in operations {
            let id = operation.id.clone();
            let executor = Arc::clone(&self.executor);
            let permits = Arc::clone(&self.permits);
            let ctx = ctx.clone();

            let handle = tokio::spawn(async move {
                run_operation(operation, executor, permits, ctx).await
            });
            handles.push((id, handle));
        }

        let mut outcomes = Vec::with_capacity(total);
        for (id, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!(id = %id, error = %err, "batch operation task failed");
                    outcomes.push(BatchOutcome::failure(
                        id,
                        BatchError::Internal(err.to_string()),
                        Default::default(),
                    ));
                }
            }
        }

        let processed = ProcessedBatch {
            outcomes,
            error: ctx.err(),
        };
        let failures = processed.failures();
        match &processed.error {
            Some(err) => warn!(operations = total, failures, error = %err, "batch finished after context ended"),
            None => info!(operations = total, failures, "batch finished"),
        }

        processed
    }
}

/// Validates, waits for a permit, then executes a single operation.
async fn run_operation(
    operation: BatchOperation,
    executor: Arc<dyn RemoteExecutor>,
    permits: Arc<Semaphore>,
    ctx: BatchContext,
) -> BatchOutcome {
    let start = Instant::now();

    if let Err(err) = operation.validate_target() {
        debug!(id = %operation.id, error = %err, "rejected batch operation");
        return BatchOutcome::failure(operation.id, err, start.elapsed());
    }
    if !executor.supports(&operation.method) {
        debug!(id = %operation.id, method = %operation.method, "unsupported method");
        let err = BatchError::UnsupportedMethod(operation.method.clone());
        return BatchOutcome::failure(operation.id, err, start.elapsed());
    }

    // Context first so an ended context never dispatches new calls
    let permit = tokio::select! {
        biased;
        err = ctx.done() => {
            debug!(id = %operation.id, error = %err, "context ended while waiting for permit");
            return BatchOutcome::failure(operation.id, err, start.elapsed());
        }
        permit = permits.acquire_owned() => permit,
    };
    let _permit = match permit {
        Ok(permit) => permit,
        Err(err) => {
            let err = BatchError::Internal(err.to_string());
            return BatchOutcome::failure(operation.id, err, start.elapsed());
        }
    };

    match executor.execute(&operation).await {
        Ok(result) => {
            debug!(id = %operation.id, method = %operation.method, "remote call succeeded");
            BatchOutcome::success(operation.id, result, start.elapsed())
        }
        Err(err) => {
            warn!(id = %operation.id, method = %operation.method, error = %err, "remote call failed");
            BatchOutcome::failure(operation.id, err.into(), start.elapsed())
        }
    }
}
