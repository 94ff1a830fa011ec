//! In-memory index: useful for testing and offline sessions.

use async_trait::async_trait;
use cvagent_core::error::IndexError;
use cvagent_core::index::{IndexMatch, IndexQuery, IndexRecord, VectorIndex};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::vector::rank_records;

/// A namespace-partitioned index that keeps records in memory and ranks them
/// by cosine similarity.
pub struct InMemoryIndex {
    namespaces: Arc<RwLock<HashMap<String, Vec<IndexRecord>>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            namespaces: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of records stored in `namespace`.
    pub async fn count(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, |records| records.len())
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<IndexMatch>, IndexError> {
        let namespaces = self.namespaces.read().await;
        let Some(records) = namespaces.get(&query.namespace) else {
            debug!(namespace = %query.namespace, "Query against empty namespace");
            return Ok(Vec::new());
        };

        if let Some(first) = records.first() {
            if first.values.len() != query.vector.len() {
                return Err(IndexError::DimensionMismatch {
                    expected: first.values.len(),
                    actual: query.vector.len(),
                });
            }
        }

        Ok(rank_records(records, &query.vector, query.top_k))
    }

    async fn upsert(&self, namespace: &str, records: Vec<IndexRecord>) -> Result<usize, IndexError> {
        let mut namespaces = self.namespaces.write().await;

        // The whole batch must share the namespace's dimension before anything is written.
        let expected = namespaces
            .get(namespace)
            .and_then(|stored| stored.first())
            .or(records.first())
            .map(|r| r.values.len());
        if let Some(expected) = expected {
            if let Some(bad) = records.iter().find(|r| r.values.len() != expected) {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: bad.values.len(),
                });
            }
        }

        let stored = namespaces.entry(namespace.to_string()).or_default();
        let written = records.len();
        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }

        Ok(written)
    }

    async fn contains_namespace(&self, namespace: &str) -> Result<bool, IndexError> {
        Ok(self.count(namespace).await > 0)
    }
}
