//! Shared test helpers for agent tests.

use async_trait::async_trait;
use cvagent_core::error::{ProviderError, RetrievalError};
use cvagent_core::message::Message;
use cvagent_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use cvagent_core::retrieval::RetrievalCapability;
use std::sync::{Arc, Mutex};

/// A mock provider that returns a sequence of scripted responses and
/// records every request it receives.
///
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer each call with the next text.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_text_response(t))).collect())
    }

    /// Shared handle to the recorded requests.
    pub fn requests(&self) -> Arc<Mutex<Vec<ProviderRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut responses = self.responses.lock().unwrap();

        if responses.is_empty() {
            panic!(
                "SequentialMockProvider: no more responses (call #{})",
                requests.len()
            );
        }

        requests.push(request);
        responses.remove(0)
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Capability that always returns the same text and records its queries.
pub struct StaticCapability {
    name: String,
    text: String,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticCapability {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn queries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }
}

#[async_trait]
impl RetrievalCapability for StaticCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "static test capability"
    }

    async fn invoke(&self, query: &str) -> Result<String, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.text.clone())
    }
}

/// Capability whose every invocation fails.
pub struct FailingCapability {
    name: String,
}

impl FailingCapability {
    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl RetrievalCapability for FailingCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "always fails"
    }

    async fn invoke(&self, _query: &str) -> Result<String, RetrievalError> {
        Err(RetrievalError::CapabilityFailed {
            capability: self.name.clone(),
            reason: "index unreachable".into(),
        })
    }
}
