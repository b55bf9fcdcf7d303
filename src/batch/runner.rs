//! Batch Runner
//!
//! One-call pipeline: optimize, dispatch the residue, cache what succeeded
//! and hand every input operation its own outcome.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::batch::{BatchContext, BatchOptimizer, BatchProcessor, ProcessedBatch, RemoteExecutor};
use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::{BatchOperation, BatchOutcome};

// == Batch Runner ==
/// Optimizer and processor wired together.
#[derive(Clone)]
pub struct BatchRunner {
    /// Dedup and result cache
    optimizer: BatchOptimizer,
    /// Bounded fan-out to the remote executor
    processor: BatchProcessor,
}

impl BatchRunner {
    // == Constructor ==
    /// Creates a runner from an optimizer and a processor.
    pub fn new(optimizer: BatchOptimizer, processor: BatchProcessor) -> Self {
        Self {
            optimizer,
            processor,
        }
    }

    // == From Config ==
    /// Builds the cache and processor from configuration.
    ///
    /// Fails with `InvalidArgument` when the cache size or TTL is zero.
    pub fn from_config(config: &Config, executor: Arc<dyn RemoteExecutor>) -> Result<Self> {
        let optimizer = BatchOptimizer::new(config.cache_max_size, config.cache_ttl_duration())?;
        let processor = BatchProcessor::new(executor, config.max_concurrency);
        Ok(Self::new(optimizer, processor))
    }

    // == Cache ==
    /// Returns the result cache shared with the optimizer.
    pub fn cache(&self) -> &TtlCache<Value> {
        self.optimizer.cache()
    }

    // == Run ==
    /// Runs `operations` and returns exactly one outcome per input operation.
    ///
    /// Cached keys produce outcomes flagged `cached`. Duplicates receive a
    /// copy of their representative's outcome under their own identifier.
    pub async fn run(&self, ctx: &BatchContext, operations: Vec<BatchOperation>) -> ProcessedBatch {
        if operations.is_empty() {
            return ProcessedBatch::default();
        }

        let plan = self.optimizer.optimize_batch(&operations).await;
        let processed = self
            .processor
            .process_batch(ctx, plan.to_dispatch.clone())
            .await;
        self.optimizer
            .cache_results(&plan, &processed.outcomes)
            .await;

        let mut outcomes: Vec<BatchOutcome> = Vec::with_capacity(operations.len());
        for (key, value) in &plan.cached {
            for id in plan.ids_for(key) {
                outcomes.push(BatchOutcome::from_cache(id.clone(), value.clone()));
            }
        }
        for outcome in processed.outcomes {
            match plan.key_for(&outcome.id) {
                Some(key) => {
                    for id in plan.ids_for(key) {
                        outcomes.push(outcome.relabel(id.clone()));
                    }
                }
                None => outcomes.push(outcome),
            }
        }

        let stats = self.cache().stats().await;
        info!(
            operations = operations.len(),
            dispatched = plan.to_dispatch.len(),
            from_cache = plan.cached.len(),
            cache_size = stats.size,
            cache_hit_rate = stats.hit_rate(),
            "batch run complete"
        );

        ProcessedBatch {
            outcomes,
            error: processed.error,
        }
    }
}
