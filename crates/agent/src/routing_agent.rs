//! Routing agent: one question in, one grounded answer out.
//!
//! # Flow
//!
//! 1. Resolve which subjects the question mentions
//! 2. Run each subject's retrieval capability with the raw question
//! 3. Build the prompt: system instruction, prior turns, then the question
//!    with the labeled context and the attribution instruction
//! 4. Call the model once
//! 5. Record the turn in conversation memory
//!
//! Any failure leaves memory untouched.

use std::sync::Arc;
use cvagent_config::AppConfig;
use cvagent_core::error::{Error, Result};
use cvagent_core::message::Message;
use cvagent_core::provider::{Provider, ProviderRequest, Usage};
use cvagent_core::retrieval::CapabilityRegistry;
use cvagent_core::subject::Subject;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::ContextAggregator;
use crate::conversation::{ConversationMemory, ConversationTurn};
use crate::resolver::SubjectResolver;

/// Appended to every question so multi-subject answers keep facts apart.
pub const ATTRIBUTION_INSTRUCTION: &str = "Responde la pregunta organizando la información por persona. \
Si la información corresponde a varias personas, indica claramente a quién pertenece cada dato.";

pub const DEFAULT_MEMORY_WINDOW: usize = 5;

pub struct RoutingAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system: Option<String>,
    resolver: SubjectResolver,
    aggregator: ContextAggregator,
    memory: ConversationMemory,
}

/// Outcome of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingResult {
    /// The model's answer, verbatim.
    pub answer: String,
    /// Resolved namespaces, in resolution order.
    pub namespaces: Vec<String>,
    /// Display names of the subjects that contributed context.
    pub context_subjects: Vec<String>,
    pub usage: Option<Usage>,
}

impl RoutingAgent {
    /// Create an agent over `subjects`, falling back to `default_subject`
    /// when a question names nobody.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        subjects: Vec<Subject>,
        default_subject: &str,
        capabilities: CapabilityRegistry,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            system: None,
            resolver: SubjectResolver::new(subjects, default_subject)?,
            aggregator: ContextAggregator::new(capabilities),
            memory: ConversationMemory::new(DEFAULT_MEMORY_WINDOW),
        })
    }

    /// Build an agent from the application config.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        capabilities: CapabilityRegistry,
    ) -> Result<Self> {
        let mut agent = Self::new(
            provider,
            &config.default_model,
            config.subjects(),
            &config.default_subject,
            capabilities,
        )?
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens)
        .with_memory_window(config.memory.window);

        if let Some(system) = config.system_instruction() {
            agent = agent.with_system(system);
        }
        Ok(agent)
    }

    /// Set the system instruction sent first on every call.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the number of turns kept in memory. Discards existing history.
    pub fn with_memory_window(mut self, window: usize) -> Self {
        self.memory = ConversationMemory::new(window);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Answer a question and return the model's text verbatim.
    pub async fn run(&mut self, user_input: &str) -> Result<String> {
        Ok(self.run_detailed(user_input).await?.answer)
    }

    /// Answer a question and report which subjects were consulted.
    pub async fn run_detailed(&mut self, user_input: &str) -> Result<RoutingResult> {
        if user_input.trim().is_empty() {
            return Err(Error::InvalidInput("question is empty".into()));
        }

        // ── Step 1: Resolve subjects ──
        let subjects = self.resolver.resolve_subjects(user_input);
        let namespaces: Vec<String> = subjects.iter().map(|s| s.namespace_id.clone()).collect();
        info!(namespaces = ?namespaces, "Resolved subjects");

        // ── Step 2: Retrieve context ──
        let context = self.aggregator.aggregate(&subjects, user_input).await?;
        debug!(blocks = context.blocks().len(), "Context aggregated");

        // ── Step 3: Assemble prompt ──
        let messages = self.build_messages(user_input, &context.render());

        // ── Step 4: Generate ──
        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response = self.provider.complete(request).await?;
        let answer = response.message.content;

        // ── Step 5: Remember ──
        self.memory.append(ConversationTurn::new(user_input, answer.clone()));

        info!(
            provider = self.provider.name(),
            answer_len = answer.len(),
            turns = self.memory.len(),
            "Answer generated"
        );

        Ok(RoutingResult {
            answer,
            namespaces,
            context_subjects: context.display_names(),
            usage: response.usage,
        })
    }

    /// System instruction, prior turns oldest first, then the augmented question.
    fn build_messages(&self, user_input: &str, context: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2 + self.memory.len() * 2);
        if let Some(system) = &self.system {
            messages.push(Message::system(system));
        }
        messages.extend(self.memory.to_messages());
        messages.push(Message::user(final_prompt(user_input, context)));
        messages
    }

    /// Forget all prior turns.
    pub fn reset(&mut self) {
        self.memory.clear();
        debug!("Conversation memory cleared");
    }

    pub fn history(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn resolver(&self) -> &SubjectResolver {
        &self.resolver
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        self.aggregator.capabilities()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// `Pregunta: <question>`, the context, then the attribution instruction.
pub fn final_prompt(user_input: &str, context: &str) -> String {
    format!("Pregunta: {user_input}\n\n{context}\n\n{ATTRIBUTION_INSTRUCTION}")
}

// ── Tests ─────────────────────────────────────────────────────────────────
