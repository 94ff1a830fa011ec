//! Vector index trait: namespaced similarity search over résumé chunks.
//!
//! Each subject's document chunks live in their own namespace, so a query
//! never mixes passages from different people.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::IndexError;

/// A query against one namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexQuery {
    /// Namespace to search (e.g., "cv-claudio-barril")
    pub namespace: String,

    /// Query embedding
    pub vector: Vec<f32>,

    /// Maximum number of matches
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    3
}

/// A single ranked match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    /// Chunk text stored alongside the vector (empty when absent)
    #[serde(default)]
    pub text: String,
}

/// A record to store in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub text: String,
}

/// The core VectorIndex trait.
///
/// Implementations: Pinecone (HTTP), in-memory (tests and offline runs).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// The backend name (e.g., "pinecone", "in_memory").
    fn name(&self) -> &str;

    /// Return the `top_k` closest records in `query.namespace`, best first.
    async fn query(&self, query: IndexQuery) -> std::result::Result<Vec<IndexMatch>, IndexError>;

    /// Insert or replace records in a namespace. Returns the number written.
    async fn upsert(&self, namespace: &str, records: Vec<IndexRecord>) -> std::result::Result<usize, IndexError>;

    /// Whether `namespace` holds any records.
    ///
    /// Remote backends answer `true` and let [`query`](Self::query) decide.
    async fn contains_namespace(&self, _namespace: &str) -> std::result::Result<bool, IndexError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_top_k_defaults_to_three() {
        let query: IndexQuery = serde_json::from_value(serde_json::json!({
            "namespace": "cv-lara-rosenberg",
            "vector": [0.1, 0.2],
        }))
        .unwrap();
        assert_eq!(query.top_k, 3);
    }

    #[test]
    fn match_text_defaults_to_empty() {
        let m: IndexMatch = serde_json::from_value(serde_json::json!({
            "id": "chunk-1",
            "score": 0.8,
        }))
        .unwrap();
        assert!(m.text.is_empty());
    }
}
