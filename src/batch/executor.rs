//! Remote executor port
//!
//! The batch subsystem reaches the remote repository host exclusively through
//! this trait. Argument translation, authentication and transport belong to
//! the implementor.

use async_trait::async_trait;
use serde_json::Value;

use crate::models::BatchOperation;

/// Read methods the repository client exposes.
pub const KNOWN_METHODS: &[&str] = &[
    "get_issue",
    "list_issues",
    "search_issues",
    "get_issue_comments",
    "get_pull_request",
    "list_pull_requests",
    "get_pull_request_files",
    "get_pull_request_status",
    "get_pull_request_comments",
    "get_pull_request_reviews",
];

/// Executes one remote operation.
///
/// Called once per dispatched operation, possibly from many tasks at once.
/// Errors are passed back to the caller unchanged and never retried here.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Returns true if `method` can be executed.
    fn supports(&self, method: &str) -> bool {
        KNOWN_METHODS.contains(&method)
    }

    /// Performs the call and returns its opaque result.
    async fn execute(&self, operation: &BatchOperation) -> anyhow::Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl RemoteExecutor for Echo {
        async fn execute(&self, operation: &BatchOperation) -> anyhow::Result<Value> {
            Ok(json!({ "method": operation.method }))
        }
    }

    #[tokio::test]
    async fn test_default_supported_methods() {
        let executor = Echo;
        assert!(executor.supports("list_issues"));
        assert!(executor.supports("get_pull_request"));
        assert!(!executor.supports("delete_repository"));
        assert!(!executor.supports(""));

        let op = BatchOperation::new("1", "list_issues", "o", "r");
        assert_eq!(executor.execute(&op).await.unwrap()["method"], "list_issues");
    }
}
