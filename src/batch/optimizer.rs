//! Batch Optimizer
//!
//! Collapses duplicate operations and answers what it can from the result
//! cache so only the remaining unique operations reach the remote host.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::TtlCache;
use crate::error::Result;
use crate::models::{BatchOperation, BatchOutcome};

// == Optimized Batch ==
/// Plan produced by [`BatchOptimizer::optimize_batch`].
///
/// Every unique cache key of the input is either in `cached` or represented
/// by exactly one operation in `to_dispatch`, never both.
#[derive(Debug, Clone, Default)]
pub struct OptimizedBatch {
    /// First operation seen for each uncached key, in input order.
    /// Identifiers are unique; a colliding one gets a `#n` suffix.
    pub to_dispatch: Vec<BatchOperation>,
    /// Cached results keyed by cache key
    pub cached: HashMap<String, Value>,
    /// Identifiers of every input operation, grouped by cache key
    groups: HashMap<String, Vec<String>>,
    /// Cache key of each dispatched representative, by dispatch identifier
    dispatch_keys: HashMap<String, String>,
}

impl OptimizedBatch {
    /// Cache key answered by the dispatched operation `id`.
    pub fn key_for(&self, id: &str) -> Option<&str> {
        self.dispatch_keys.get(id).map(String::as_str)
    }

    /// Identifiers of all input operations sharing `key`.
    pub fn ids_for(&self, key: &str) -> &[String] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct cache keys in the input.
    pub fn unique_keys(&self) -> usize {
        self.groups.len()
    }

    /// Returns `id`, or `id#n` with the smallest free `n` when `id` already
    /// names a dispatched representative.
    fn unique_dispatch_id(&self, id: &str) -> String {
        if !self.dispatch_keys.contains_key(id) {
            return id.to_string();
        }
        (1u64..)
            .map(|n| format!("{}#{}", id, n))
            .find(|candidate| !self.dispatch_keys.contains_key(candidate))
            .unwrap_or_else(|| id.to_string())
    }

    /// Number of input operations collapsed into another.
    pub fn duplicates(&self) -> usize {
        self.groups.values().map(|ids| ids.len() - 1).sum()
    }
}

// == Batch Optimizer ==
/// Deduplicates batches and reads/writes the shared result cache.
#[derive(Debug, Clone)]
pub struct BatchOptimizer {
    cache: TtlCache<Value>,
}

impl BatchOptimizer {
    /// Creates an optimizer with its own cache.
    pub fn new(max_size: usize, ttl: Duration) -> Result<Self> {
        Ok(Self::with_cache(TtlCache::new(max_size, ttl)?))
    }

    /// Creates an optimizer over an existing, possibly shared, cache.
    pub fn with_cache(cache: TtlCache<Value>) -> Self {
        Self { cache }
    }

    /// Returns the result cache.
    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    // == Optimize Batch ==
    /// Splits `operations` into cache hits and unique operations to dispatch.
    ///
    /// Operations are grouped by their cache key; the first one per key
    /// represents the group. Each unique key is looked up in the cache once.
    ///
    /// Representatives with the same identifier but different keys are
    /// dispatched under distinct identifiers, so each result is cached under
    /// the key of the operation that produced it. Outcomes relabelled through
    /// [`OptimizedBatch::ids_for`] carry the caller's original identifiers.
    pub async fn optimize_batch(&self, operations: &[BatchOperation]) -> OptimizedBatch {
        let mut plan = OptimizedBatch::default();
        if operations.is_empty() {
            return plan;
        }

        for operation in operations {
            let key = operation.cache_key();
            if let Some(ids) = plan.groups.get_mut(&key) {
                ids.push(operation.id.clone());
                continue;
            }
            plan.groups.insert(key.clone(), vec![operation.id.clone()]);

            match self.cache.get(&key).await {
                Some(value) => {
                    plan.cached.insert(key, value);
                }
                None => {
                    let mut representative = operation.clone();
                    representative.id = plan.unique_dispatch_id(&operation.id);
                    plan.dispatch_keys.insert(representative.id.clone(), key);
                    plan.to_dispatch.push(representative);
                }
            }
        }

        debug!(
            operations = operations.len(),
            unique = plan.unique_keys(),
            cached = plan.cached.len(),
            dispatch = plan.to_dispatch.len(),
            "optimized batch"
        );
        plan
    }

    // == Cache Results ==
    /// Stores successful results under the cache key of the operation they answer.
    ///
    /// Outcomes with an error, without a result, or not belonging to `plan`
    /// are skipped. Returns the number of results stored.
    pub async fn cache_results(&self, plan: &OptimizedBatch, outcomes: &[BatchOutcome]) -> usize {
        let mut stored = 0;
        for outcome in outcomes {
            if outcome.error.is_some() {
                continue;
            }
            let (Some(result), Some(key)) = (&outcome.result, plan.key_for(&outcome.id)) else {
                continue;
            };
            self.cache.set(key, result.clone()).await;
            stored += 1;
        }

        debug!(stored, "cached batch results");
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::error::BatchError;

    fn optimizer() -> BatchOptimizer {
        BatchOptimizer::new(100, Duration::from_secs(300)).unwrap()
    }

    fn issues(id: &str) -> BatchOperation {
        BatchOperation::new(id, "list_issues", "o", "r").with_filter("state", "open")
    }

    #[tokio::test]
    async fn test_construct_validates() {
        assert!(matches!(
            BatchOptimizer::new(0, Duration::from_secs(1)),
            Err(BatchError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let plan = optimizer().optimize_batch(&[]).await;
        assert!(plan.to_dispatch.is_empty());
        assert!(plan.cached.is_empty());
        assert_eq!(plan.unique_keys(), 0);
    }

    #[tokio::test]
    async fn test_identical_operations_dispatch_once() {
        let ops = vec![issues("a"), issues("b"), issues("c")];

        let plan = optimizer().optimize_batch(&ops).await;

        assert_eq!(plan.to_dispatch.len(), 1);
        assert_eq!(plan.to_dispatch[0].id, "a");
        assert_eq!(plan.duplicates(), 2);

        let key = plan.key_for("a").unwrap();
        assert_eq!(plan.ids_for(key), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_distinct_operations_all_dispatched() {
        let ops = vec![
            issues("a"),
            BatchOperation::new("b", "list_issues", "o", "r").with_filter("state", "closed"),
            BatchOperation::new("c", "list_pull_requests", "o", "r"),
        ];

        let plan = optimizer().optimize_batch(&ops).await;

        let ids: Vec<&str> = plan.to_dispatch.iter().map(|op| op.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(plan.duplicates(), 0);
    }

    #[tokio::test]
    async fn test_cached_key_not_dispatched() {
        let optimizer = optimizer();
        let op = issues("a");
        optimizer.cache().set(op.cache_key(), json!(["cached"])).await;

        let plan = optimizer.optimize_batch(&[op.clone(), issues("b")]).await;

        assert!(plan.to_dispatch.is_empty());
        assert_eq!(plan.cached.get(&op.cache_key()), Some(&json!(["cached"])));
        assert_eq!(plan.ids_for(&op.cache_key()), ["a", "b"]);
        assert_eq!(optimizer.cache().stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_cache_results_uses_semantic_key() {
        let optimizer = optimizer();
        let plan = optimizer.optimize_batch(&[issues("first")]).await;

        let outcomes = vec![BatchOutcome::success("first", json!([1]), Duration::ZERO)];
        assert_eq!(optimizer.cache_results(&plan, &outcomes).await, 1);

        // Stored under the operation identity, not the caller's identifier
        assert!(!optimizer.cache().contains("first").await);
        assert!(optimizer.cache().contains(&issues("x").cache_key()).await);

        let next = optimizer.optimize_batch(&[issues("second")]).await;
        assert!(next.to_dispatch.is_empty());
        assert_eq!(next.cached.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_results_skips_failures_and_unknown_ids() {
        let optimizer = optimizer();
        let plan = optimizer
            .optimize_batch(&[issues("a"), BatchOperation::new("b", "get_issue", "o", "r")])
            .await;

        let outcomes = vec![
            BatchOutcome::failure("a", BatchError::Cancelled, Duration::ZERO),
            BatchOutcome::success("stranger", json!(1), Duration::ZERO),
            BatchOutcome {
                result: None,
                ..BatchOutcome::success("b", json!(null), Duration::ZERO)
            },
        ];

        assert_eq!(optimizer.cache_results(&plan, &outcomes).await, 0);
        assert_eq!(optimizer.cache().stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_shared_identifier_results_cached_under_own_keys() {
        let optimizer = optimizer();
        let alpha = BatchOperation::new("x", "list_issues", "o", "alpha");
        let beta = BatchOperation::new("x", "list_issues", "o", "beta");

        let plan = optimizer.optimize_batch(&[alpha.clone(), beta.clone()]).await;

        let ids: Vec<&str> = plan.to_dispatch.iter().map(|op| op.id.as_str()).collect();
        assert_eq!(ids, ["x", "x#1"]);
        assert_eq!(plan.key_for("x"), Some(alpha.cache_key().as_str()));
        assert_eq!(plan.key_for("x#1"), Some(beta.cache_key().as_str()));
        assert_eq!(plan.ids_for(&beta.cache_key()), ["x"]);

        // The beta call fails; only alpha's result may be cached
        let outcomes = vec![
            BatchOutcome::success("x", json!({"repo": "alpha"}), Duration::ZERO),
            BatchOutcome::failure("x#1", BatchError::Cancelled, Duration::ZERO),
        ];
        assert_eq!(optimizer.cache_results(&plan, &outcomes).await, 1);
        assert!(optimizer.cache().contains(&alpha.cache_key()).await);
        assert!(!optimizer.cache().contains(&beta.cache_key()).await);
    }

    #[tokio::test]
    async fn test_dispatch_ids_stay_unique_against_literal_suffix() {
        let ops = vec![
            BatchOperation::new("x", "get_issue", "o", "a"),
            BatchOperation::new("x", "get_issue", "o", "b"),
            BatchOperation::new("x#1", "get_issue", "o", "c"),
        ];

        let plan = optimizer().optimize_batch(&ops).await;

        let ids: Vec<&str> = plan.to_dispatch.iter().map(|op| op.id.as_str()).collect();
        assert_eq!(ids, ["x", "x#1", "x#1#1"]);
        assert_eq!(plan.ids_for(&ops[2].cache_key()), ["x#1"]);
    }
}
