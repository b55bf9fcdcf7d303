//! Batch data model
//!
//! Operation descriptors submitted by callers and the outcomes returned to them.

pub mod operation;
pub mod outcome;

// Re-export commonly used types
pub use operation::BatchOperation;
pub use outcome::BatchOutcome;
