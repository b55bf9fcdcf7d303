//! Batch Module
//!
//! Concurrent execution of remote repository operations with deduplication
//! and result caching.
//!
//! # Components
//! - Processor: bounded-concurrency fan-out to the remote executor
//! - Optimizer: dedup and cache lookup before dispatch, write-back after
//! - Runner: both of the above as a single call

mod context;
mod executor;
mod optimizer;
mod processor;
mod runner;

pub use context::BatchContext;
pub use executor::{RemoteExecutor, KNOWN_METHODS};
pub use optimizer::{BatchOptimizer, OptimizedBatch};
pub use processor::{BatchProcessor, ProcessedBatch};
pub use runner::BatchRunner;
