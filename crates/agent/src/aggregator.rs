//! Context aggregation.
//!
//! Runs the retrieval capability of every resolved subject against the raw
//! question and labels each result with the subject's display name.

use cvagent_core::error::RetrievalError;
use cvagent_core::retrieval::CapabilityRegistry;
use cvagent_core::subject::Subject;
use serde::Serialize;
use tracing::debug;

/// Retrieved text for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextBlock {
    pub namespace: String,
    pub display_name: String,
    pub text: String,
}

impl ContextBlock {
    /// `Information about <display_name>:` followed by the text.
    pub fn render(&self) -> String {
        format!("Information about {}:\n{}", self.display_name, self.text)
    }
}

/// Blocks in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedContext {
    blocks: Vec<ContextBlock>,
}

impl AggregatedContext {
    pub fn blocks(&self) -> &[ContextBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.display_name.clone()).collect()
    }

    /// Rendered blocks separated by a blank line. Empty when there are none.
    pub fn render(&self) -> String {
        self.blocks
            .iter()
            .map(ContextBlock::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Turns resolved subjects into labeled context.
pub struct ContextAggregator {
    capabilities: CapabilityRegistry,
}

impl ContextAggregator {
    pub fn new(capabilities: CapabilityRegistry) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    /// Query each subject's capability in order.
    ///
    /// Subjects without a bound capability are skipped. The first retrieval
    /// failure aborts the whole aggregation.
    pub async fn aggregate(
        &self,
        subjects: &[&Subject],
        query: &str,
    ) -> Result<AggregatedContext, RetrievalError> {
        let mut blocks = Vec::with_capacity(subjects.len());

        for subject in subjects {
            let Some(capability) = self.capabilities.for_namespace(&subject.namespace_id) else {
                debug!(namespace = %subject.namespace_id, "No capability bound; skipping");
                continue;
            };

            let text = capability.invoke(query).await?;
            debug!(
                capability = capability.name(),
                namespace = %subject.namespace_id,
                chars = text.len(),
                "Capability returned context"
            );

            blocks.push(ContextBlock {
                namespace: subject.namespace_id.clone(),
                display_name: subject.display_name.clone(),
                text,
            });
        }

        Ok(AggregatedContext { blocks })
    }
}
