//! End-to-end integration tests for cvagent.
//!
//! These tests wire the real resolver, namespace search tools, in-memory
//! index and routing agent together, with only the language model and the
//! embedding endpoint mocked.

use std::sync::{Arc, Mutex};

use cvagent_agent::{ATTRIBUTION_INSTRUCTION, RoutingAgent};
use cvagent_config::{AppConfig, SubjectConfig};
use cvagent_core::error::{Error, IndexError, ProviderError, RetrievalError};
use cvagent_core::index::{IndexMatch, IndexQuery, IndexRecord, VectorIndex};
use cvagent_core::message::{Message, Role};
use cvagent_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use cvagent_index::InMemoryIndex;
use cvagent_tools::{registry_from_config, subject_registry};

// ── Mock Provider ────────────────────────────────────────────────────────

/// Scripted chat responses plus a tiny keyword embedder.
///
/// Questions about work embed to `[1, 0]`, everything else to `[0, 1]`.
struct ScriptedProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!("ScriptedProvider exhausted");
        }
        self.requests.lock().unwrap().push(request);
        responses.remove(0)
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let embeddings = request
            .inputs
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                if lower.contains("trabaj") || lower.contains("experiencia") {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect();
        Ok(EmbeddingResponse {
            embeddings,
            model: request.model,
            usage: None,
        })
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
    }
}

struct UnreachableIndex;

#[async_trait::async_trait]
impl VectorIndex for UnreachableIndex {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn query(&self, _query: IndexQuery) -> Result<Vec<IndexMatch>, IndexError> {
        Err(IndexError::Request("connection refused".into()))
    }

    async fn upsert(&self, _namespace: &str, _records: Vec<IndexRecord>) -> Result<usize, IndexError> {
        Err(IndexError::Request("connection refused".into()))
    }
}

fn record(id: &str, values: [f32; 2], text: &str) -> IndexRecord {
    IndexRecord {
        id: id.into(),
        values: values.to_vec(),
        text: text.into(),
    }
}

/// An index with two chunks per default subject: one about work, one about studies.
async fn seeded_index() -> Arc<InMemoryIndex> {
    let index = Arc::new(InMemoryIndex::new());
    let seed = [
        ("cv-claudio-barril", "Claudio trabaja en X", "Claudio estudió en la UBA"),
        ("cv-victoria-teran", "Victoria trabaja en Y", "Victoria estudió en la UNC"),
        ("cv-lara-rosenberg", "Lara trabaja en Z", "Lara estudió en la UNR"),
    ];
    for (namespace, work, studies) in seed {
        index
            .upsert(
                namespace,
                vec![
                    record(&format!("{namespace}-0"), [1.0, 0.0], work),
                    record(&format!("{namespace}-1"), [0.0, 1.0], studies),
                ],
            )
            .await
            .unwrap();
    }
    index
}

async fn build_agent(
    provider: ScriptedProvider,
) -> (RoutingAgent, Arc<Mutex<Vec<ProviderRequest>>>) {
    let requests = Arc::clone(&provider.requests);
    let provider: Arc<dyn Provider> = Arc::new(provider);

    let mut config = AppConfig::default();
    config.retrieval.top_k = 1;

    let capabilities = registry_from_config(&config, Arc::clone(&provider), seeded_index().await).unwrap();
    let agent = RoutingAgent::from_config(&config, provider, capabilities).unwrap();
    (agent, requests)
}

fn prompt_of(requests: &Arc<Mutex<Vec<ProviderRequest>>>, call: usize) -> String {
    let requests = requests.lock().unwrap();
    requests[call].messages.last().unwrap().content.clone()
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_single_subject_question() {
    let (mut agent, requests) = build_agent(ScriptedProvider::texts(&["Claudio trabaja en X."])).await;

    let answer = agent.run("¿Dónde trabaja Claudio?").await.unwrap();

    assert_eq!(answer, "Claudio trabaja en X.");
    let prompt = prompt_of(&requests, 0);
    assert!(prompt.starts_with("Pregunta: ¿Dónde trabaja Claudio?\n\n"));
    assert!(prompt.contains("Information about Claudio:\nClaudio trabaja en X"));
    assert!(!prompt.contains("UBA"), "top_k = 1 keeps only the closest chunk");
    assert!(prompt.ends_with(ATTRIBUTION_INSTRUCTION));
    assert_eq!(agent.history().len(), 1);
}

#[tokio::test]
async fn e2e_multi_subject_question() {
    let (mut agent, requests) = build_agent(ScriptedProvider::texts(&["No, estudiaron en lugares distintos."])).await;

    let result = agent
        .run_detailed("¿Estudiaron Victoria y Lara en la misma universidad?")
        .await
        .unwrap();

    assert_eq!(result.namespaces, vec!["cv-victoria-teran", "cv-lara-rosenberg"]);
    let prompt = prompt_of(&requests, 0);
    let expected_context = "Information about Victoria:\nVictoria estudió en la UNC\n\n\
                            Information about Lara:\nLara estudió en la UNR";
    assert!(prompt.contains(expected_context), "prompt was: {prompt}");
    assert!(!prompt.contains("Claudio"));
}

#[tokio::test]
async fn e2e_default_subject_fallback() {
    let (mut agent, requests) = build_agent(ScriptedProvider::texts(&["Claudio."])).await;

    let result = agent.run_detailed("¿Quién sabe Python?").await.unwrap();

    assert_eq!(result.namespaces, vec!["cv-claudio-barril"]);
    assert_eq!(result.context_subjects, vec!["Claudio"]);
    let prompt = prompt_of(&requests, 0);
    assert!(prompt.contains("Information about Claudio:"));
    assert!(!prompt.contains("Information about Victoria:"));
    assert!(!prompt.contains("Information about Lara:"));
}

#[tokio::test]
async fn e2e_accent_insensitive_routing() {
    let (mut agent, requests) = build_agent(ScriptedProvider::texts(&["a1", "a2"])).await;

    agent.run("Experiencia de Terán").await.unwrap();
    agent.run("Experiencia de TERAN").await.unwrap();

    for call in 0..2 {
        assert!(prompt_of(&requests, call).contains("Information about Victoria:\nVictoria trabaja en Y"));
    }
}

#[tokio::test]
async fn e2e_memory_window_of_two() {
    let (agent, requests) = build_agent(ScriptedProvider::texts(&["a1", "a2", "a3"])).await;
    let mut agent = agent.with_memory_window(2);

    agent.run("q1 Claudio").await.unwrap();
    agent.run("q2 Claudio").await.unwrap();
    agent.run("q3 Claudio").await.unwrap();

    let requests = requests.lock().unwrap();
    let third = &requests[2].messages;
    assert_eq!(third[0].role, Role::System);
    let history: Vec<_> = third[1..third.len() - 1].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(history, vec!["q1 Claudio", "a1", "q2 Claudio", "a2"]);

    let kept: Vec<_> = agent.history().recent().map(|t| t.human_input.as_str()).collect();
    assert_eq!(kept, vec!["q2 Claudio", "q3 Claudio"]);
}

#[tokio::test]
async fn e2e_model_failure_keeps_memory() {
    let provider = ScriptedProvider::new(vec![
        Ok(text_response("a1")),
        Err(ProviderError::RateLimited { retry_after_secs: 30 }),
    ]);
    let (mut agent, _) = build_agent(provider).await;

    agent.run("Hola Claudio").await.unwrap();
    let err = agent.run("¿Y Lara?").await.unwrap_err();

    assert!(matches!(err, Error::Provider(ProviderError::RateLimited { .. })));
    assert_eq!(agent.history().len(), 1);
}

#[tokio::test]
async fn e2e_index_failure_propagates() {
    let provider = ScriptedProvider::texts(&["unused"]);
    let requests = Arc::clone(&provider.requests);
    let provider: Arc<dyn Provider> = Arc::new(provider);

    let config = AppConfig::default();
    let capabilities = subject_registry(
        &config.subjects(),
        Arc::clone(&provider),
        "e5",
        Arc::new(UnreachableIndex),
        3,
    )
    .unwrap();
    let mut agent = RoutingAgent::from_config(&config, provider, capabilities).unwrap();

    let err = agent.run("¿Dónde trabaja Lara?").await.unwrap_err();

    match err {
        Error::Retrieval(RetrievalError::Index { namespace, .. }) => {
            assert_eq!(namespace, "cv-lara-rosenberg");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(requests.lock().unwrap().is_empty());
    assert!(agent.history().is_empty());
}

#[tokio::test]
async fn e2e_shared_display_name_stays_in_own_namespace() {
    let provider = ScriptedProvider::texts(&["Ana López trabaja en Z."]);
    let requests = Arc::clone(&provider.requests);
    let provider: Arc<dyn Provider> = Arc::new(provider);

    let mut config = AppConfig::default();
    config.subjects = vec![
        SubjectConfig::new("cv-ana-garcia", "Ana", &["garcía"]),
        SubjectConfig::new("cv-ana-lopez", "Ana", &["lópez"]),
    ];
    config.default_subject = "cv-ana-garcia".into();
    config.validate().unwrap();

    let index = Arc::new(InMemoryIndex::new());
    index
        .upsert("cv-ana-garcia", vec![record("g-0", [1.0, 0.0], "Ana García trabaja en Y")])
        .await
        .unwrap();
    index
        .upsert("cv-ana-lopez", vec![record("l-0", [1.0, 0.0], "Ana López trabaja en Z")])
        .await
        .unwrap();

    let capabilities = registry_from_config(&config, Arc::clone(&provider), index).unwrap();
    let mut agent = RoutingAgent::from_config(&config, provider, capabilities).unwrap();

    let result = agent.run_detailed("¿Dónde trabaja Ana López?").await.unwrap();

    assert_eq!(result.namespaces, vec!["cv-ana-lopez"]);
    let prompt = prompt_of(&requests, 0);
    assert!(prompt.contains("Information about Ana:\nAna López trabaja en Z"));
    assert!(!prompt.contains("García"));
}
