//! Retrieval capability trait: "search this subject's résumé".
//!
//! A capability takes the raw user question and returns an opaque text blob
//! (already-concatenated top-k passages). Ranking and concatenation belong to
//! the implementation, not to the agent.

use async_trait::async_trait;
use std::collections::HashMap;
use crate::error::RetrievalError;

/// The core RetrievalCapability trait.
///
/// Each capability is registered under a unique name in the
/// [`CapabilityRegistry`] and bound to exactly one subject namespace.
#[async_trait]
pub trait RetrievalCapability: Send + Sync {
    /// The unique name of this capability (e.g., "search_cv_claudio_barril").
    fn name(&self) -> &str;

    /// A description of what this capability searches.
    fn description(&self) -> &str;

    /// Search for passages relevant to `query`.
    async fn invoke(&self, query: &str) -> std::result::Result<String, RetrievalError>;
}

/// A static registry of retrieval capabilities.
///
/// Two mappings, both built before the agent is constructed:
/// 1. capability name → capability
/// 2. namespace id → capability name
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Box<dyn RetrievalCapability>>,
    bindings: HashMap<String, String>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
            bindings: HashMap::new(),
        }
    }

    /// Register a capability. Replaces any existing capability with the same name.
    pub fn register(&mut self, capability: Box<dyn RetrievalCapability>) {
        let name = capability.name().to_string();
        self.capabilities.insert(name, capability);
    }

    /// Bind a namespace to a capability name. Rebinding replaces the old name.
    pub fn bind(&mut self, namespace: impl Into<String>, capability_name: impl Into<String>) {
        self.bindings.insert(namespace.into(), capability_name.into());
    }

    /// Register a capability and bind it to `namespace` in one step.
    pub fn register_for(&mut self, namespace: impl Into<String>, capability: Box<dyn RetrievalCapability>) {
        self.bind(namespace, capability.name().to_string());
        self.register(capability);
    }

    /// Get a capability by name.
    pub fn get(&self, name: &str) -> Option<&dyn RetrievalCapability> {
        self.capabilities.get(name).map(|c| c.as_ref())
    }

    /// Look up the capability bound to a namespace.
    ///
    /// `None` when the namespace is unbound or bound to a name that was never
    /// registered.
    pub fn for_namespace(&self, namespace: &str) -> Option<&dyn RetrievalCapability> {
        let name = self.bindings.get(namespace)?;
        self.get(name)
    }

    /// The capability name bound to a namespace, if any.
    pub fn binding(&self, namespace: &str) -> Option<&str> {
        self.bindings.get(namespace).map(|s| s.as_str())
    }

    /// List all registered capability names.
    pub fn names(&self) -> Vec<&str> {
        self.capabilities.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
