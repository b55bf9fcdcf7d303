//! Repo Batch - batching layer for remote repository operations
//!
//! Deduplicates identical calls, serves repeats from a bounded TTL cache and
//! runs the rest with bounded concurrency against a caller-supplied executor.

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use batch::{
    BatchContext, BatchOptimizer, BatchProcessor, BatchRunner, OptimizedBatch, ProcessedBatch,
    RemoteExecutor,
};
pub use cache::{generate_key, CacheStats, Filters, TtlCache};
pub use config::Config;
pub use error::{BatchError, Result};
pub use models::{BatchOperation, BatchOutcome};
pub use tasks::spawn_cleanup_task;
