//! Batch operation descriptor
//!
//! One logical remote call submitted as part of a batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{generate_key, Filters};
use crate::error::{BatchError, Result};

/// A single remote repository operation.
///
/// # Fields
/// - `id`: caller-assigned identifier echoed back on the outcome
/// - `method`: remote method name, e.g. `list_issues`
/// - `owner` / `repo`: target repository
/// - `filters`: method parameters, also part of the cache key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOperation {
    pub id: String,
    pub method: String,
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub filters: Filters,
}

impl BatchOperation {
    /// Creates an operation with no filters.
    pub fn new(
        id: impl Into<String>,
        method: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            owner: owner.into(),
            repo: repo.into(),
            filters: Filters::new(),
        }
    }

    /// Adds or replaces one filter.
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Semantic identity of this operation; equal for duplicates.
    pub fn cache_key(&self) -> String {
        generate_key(&self.method, &self.owner, &self.repo, Some(&self.filters))
    }

    /// Checks that owner and repo are present.
    pub fn validate_target(&self) -> Result<()> {
        if self.owner.is_empty() {
            return Err(self.invalid("owner is required"));
        }
        if self.repo.is_empty() {
            return Err(self.invalid("repo is required"));
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> BatchError {
        BatchError::InvalidOperation {
            id: self.id.clone(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_deserialize_without_filters() {
        let json = r#"{"id": "1", "method": "get_issue", "owner": "o", "repo": "r"}"#;
        let op: BatchOperation = serde_json::from_str(json).unwrap();
        assert_eq!(op.method, "get_issue");
        assert!(op.filters.is_empty());
    }

    #[test]
    fn test_operation_deserialize_with_filters() {
        let json = r#"{"id": "1", "method": "list_issues", "owner": "o", "repo": "r",
                       "filters": {"state": "open", "per_page": 50}}"#;
        let op: BatchOperation = serde_json::from_str(json).unwrap();
        assert_eq!(op.filters["state"], json!("open"));
        assert_eq!(op.filters["per_page"], json!(50));
    }

    #[test]
    fn test_cache_key_ignores_id() {
        let a = BatchOperation::new("a", "list_issues", "o", "r").with_filter("state", "open");
        let b = BatchOperation::new("b", "list_issues", "o", "r").with_filter("state", "open");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_validate_target() {
        assert!(BatchOperation::new("1", "get_issue", "o", "r").validate_target().is_ok());

        let missing_owner = BatchOperation::new("2", "get_issue", "", "r").validate_target();
        assert!(matches!(
            missing_owner,
            Err(BatchError::InvalidOperation { ref id, .. }) if id == "2"
        ));

        let missing_repo = BatchOperation::new("3", "get_issue", "o", "").validate_target();
        assert!(missing_repo.is_err());
    }
}
