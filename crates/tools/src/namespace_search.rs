//! Namespace search: the retrieval capability bound to one subject.
//!
//! Embeds the question, pulls the `top_k` closest chunks from the subject's
//! namespace and returns their texts joined by newlines.

use async_trait::async_trait;
use cvagent_core::error::{IndexError, RetrievalError};
use cvagent_core::index::{IndexQuery, VectorIndex};
use cvagent_core::provider::{EmbeddingRequest, Provider};
use cvagent_core::retrieval::RetrievalCapability;
use cvagent_core::subject::{Subject, capability_name};
use std::sync::Arc;
use tracing::debug;

pub struct NamespaceSearchTool {
    name: String,
    description: String,
    namespace: String,
    embedder: Arc<dyn Provider>,
    embedding_model: String,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl NamespaceSearchTool {
    pub fn new(
        namespace: impl Into<String>,
        display_name: &str,
        embedder: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        let namespace = namespace.into();
        Self {
            name: capability_name(&namespace),
            description: format!("Search for information in {display_name}'s CV."),
            namespace,
            embedder,
            embedding_model: embedding_model.into(),
            index,
            top_k: 3,
        }
    }

    /// Build the capability for a configured subject.
    pub fn for_subject(
        subject: &Subject,
        embedder: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self::new(&subject.namespace_id, &subject.display_name, embedder, embedding_model, index)
    }

    /// Set how many passages are retrieved per call.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RetrievalError> {
        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![query.to_string()],
            })
            .await?;

        response
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or(RetrievalError::EmptyEmbedding)
    }

    fn index_error(&self, source: IndexError) -> RetrievalError {
        RetrievalError::Index {
            namespace: self.namespace.clone(),
            source,
        }
    }
}

#[async_trait]
impl RetrievalCapability for NamespaceSearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, query: &str) -> Result<String, RetrievalError> {
        let populated = self
            .index
            .contains_namespace(&self.namespace)
            .await
            .map_err(|source| self.index_error(source))?;
        if !populated {
            debug!(namespace = %self.namespace, "Namespace has no records, skipping search");
            return Ok(String::new());
        }

        let vector = self.embed_query(query).await?;

        let matches = self
            .index
            .query(IndexQuery {
                namespace: self.namespace.clone(),
                vector,
                top_k: self.top_k,
            })
            .await
            .map_err(|source| self.index_error(source))?;

        debug!(
            capability = %self.name,
            namespace = %self.namespace,
            matches = matches.len(),
            "Retrieved passages"
        );

        Ok(matches
            .into_iter()
            .map(|m| m.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
