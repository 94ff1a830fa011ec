//! Provider router: selects the correct LLM provider based on config.
//!
//! Handles provider creation and lookup of the chat and embedding backends.

use std::collections::HashMap;
use std::sync::Arc;
use cvagent_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
    embedding_provider: Option<String>,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
            embedding_provider: None,
        }
    }

    /// Use a different provider for query embeddings.
    pub fn with_embedding_provider(mut self, name: impl Into<String>) -> Self {
        self.embedding_provider = Some(name.into());
        self
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default (chat) provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get the provider used for embeddings, falling back to the default.
    pub fn embedding(&self) -> Option<Arc<dyn Provider>> {
        match &self.embedding_provider {
            Some(name) => self.get(name),
            None => self.default(),
        }
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &cvagent_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);
    if let Some(name) = &config.retrieval.embedding_provider {
        router = router.with_embedding_provider(name);
    }

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key)),
        );
    }

    // Ensure the default and embedding providers exist (even if not explicitly configured)
    let implicit = std::iter::once(&config.default_provider)
        .chain(config.retrieval.embedding_provider.as_ref());
    for name in implicit {
        if router.get(name).is_none() {
            let api_key = config.api_key.clone().unwrap_or_default();
            router.register(
                name.clone(),
                Arc::new(OpenAiCompatProvider::new(name, default_base_url(name), api_key)),
            );
        }
    }

    router
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "groq" => "https://api.groq.com/openai/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "huggingface" => "https://router.huggingface.co/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
