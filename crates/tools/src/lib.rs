//! Retrieval capabilities for cvagent.
//!
//! One [`NamespaceSearchTool`] per configured subject, each bound to that
//! subject's namespace in a [`CapabilityRegistry`].

pub mod namespace_search;

use std::sync::Arc;
use cvagent_config::AppConfig;
use cvagent_core::error::{Error, Result};
use cvagent_core::index::VectorIndex;
use cvagent_core::provider::Provider;
use cvagent_core::retrieval::CapabilityRegistry;
use cvagent_core::subject::Subject;
use cvagent_index::{InMemoryIndex, PineconeIndex};
use tracing::{info, warn};

pub use namespace_search::NamespaceSearchTool;

/// Create a registry with one search capability per subject.
///
/// Fails when two subjects would share a capability name, since the second
/// registration would replace the first and both namespaces would search
/// the same résumé.
pub fn subject_registry(
    subjects: &[Subject],
    embedder: Arc<dyn Provider>,
    embedding_model: &str,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
) -> Result<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();
    for subject in subjects {
        let name = subject.capability_name();
        if registry.get(&name).is_some() {
            return Err(Error::config(format!(
                "subject '{}' maps to capability '{name}', which is already registered",
                subject.namespace_id
            )));
        }
        let tool = NamespaceSearchTool::for_subject(
            subject,
            Arc::clone(&embedder),
            embedding_model,
            Arc::clone(&index),
        )
        .with_top_k(top_k);
        registry.register_for(&subject.namespace_id, Box::new(tool));
    }
    Ok(registry)
}

/// Build the vector index described by the `[retrieval]` section.
///
/// Without an index host, an empty in-process index is returned, so every
/// search comes back empty.
pub fn index_from_config(config: &AppConfig) -> Arc<dyn VectorIndex> {
    match &config.retrieval.index_host {
        Some(host) => {
            let api_key = config.retrieval.index_api_key.clone().unwrap_or_default();
            if api_key.is_empty() {
                warn!("No index API key configured; Pinecone requests will be rejected");
            }
            info!(host = %host, "Using Pinecone index");
            Arc::new(PineconeIndex::new(host, api_key))
        }
        None => {
            warn!("No index host configured; using an empty in-memory index");
            Arc::new(InMemoryIndex::new())
        }
    }
}

/// Build the capability registry for every configured subject.
pub fn registry_from_config(
    config: &AppConfig,
    embedder: Arc<dyn Provider>,
    index: Arc<dyn VectorIndex>,
) -> Result<CapabilityRegistry> {
    subject_registry(
        &config.subjects(),
        embedder,
        &config.retrieval.embedding_model,
        index,
        config.retrieval.top_k,
    )
}
