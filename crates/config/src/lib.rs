//! Configuration loading, validation, and management for cvagent.
//!
//! Loads configuration from `~/.cvagent/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use cvagent_core::{Subject, capability_name};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Upper bound for the conversation window.
pub const MAX_MEMORY_WINDOW: usize = 50;

/// Providers that serve chat completions but no `/embeddings` endpoint.
pub const CHAT_ONLY_PROVIDERS: &[&str] = &["groq"];

/// Default system instruction sent before every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Eres un asistente experto en responder preguntas sobre los CVs cargados.
Usa el contexto proporcionado para dar una respuesta clara, asertiva y precisa.
Si la pregunta involucra a más de una persona, combina la información de todos los CVs relevantes.
Evita frases como \"según el CV\".
Si no hay información suficiente, dilo directamente.";

/// The root configuration structure.
///
/// Maps directly to `~/.cvagent/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// System instruction; an empty string disables it
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Namespace used when a question names nobody
    #[serde(default = "default_subject")]
    pub default_subject: String,

    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Vector index and embedding configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Subjects whose résumés are indexed
    #[serde(default = "default_subjects")]
    pub subjects: Vec<SubjectConfig>,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama3-8b-8192".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}
fn default_subject() -> String {
    "cv-claudio-barril".into()
}

fn default_subjects() -> Vec<SubjectConfig> {
    vec![
        SubjectConfig::new("cv-claudio-barril", "Claudio", &["claudio", "barril"]),
        SubjectConfig::new("cv-victoria-teran", "Victoria", &["victoria", "terán"]),
        SubjectConfig::new("cv-lara-rosenberg", "Lara", &["lara", "rosenberg"]),
    ]
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("system_prompt", &self.system_prompt)
            .field("memory", &self.memory)
            .field("retrieval", &self.retrieval)
            .field("subjects", &self.subjects)
            .field("default_subject", &self.default_subject)
            .field("providers", &self.providers)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of past turns replayed into every prompt
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_window() -> usize {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { window: default_window() }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Index host URL (e.g., "https://cvs-index-abc123.svc.pinecone.io").
    /// When unset, an empty in-process index is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_host: Option<String>,

    /// Index API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_api_key: Option<String>,

    /// Provider used to embed questions (defaults to the chat provider).
    /// Required whenever `index_host` is set and the chat provider is chat-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_provider: Option<String>,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Passages retrieved per subject
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_embedding_model() -> String {
    "intfloat/multilingual-e5-base".into()
}
fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_host: None,
            index_api_key: None,
            embedding_provider: None,
            embedding_model: default_embedding_model(),
            top_k: default_top_k(),
        }
    }
}

impl std::fmt::Debug for RetrievalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalConfig")
            .field("index_host", &self.index_host)
            .field("index_api_key", &redact(&self.index_api_key))
            .field("embedding_provider", &self.embedding_provider)
            .field("embedding_model", &self.embedding_model)
            .field("top_k", &self.top_k)
            .finish()
    }
}

/// One `[[subjects]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectConfig {
    pub namespace: String,
    pub display_name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl SubjectConfig {
    pub fn new(namespace: &str, display_name: &str, patterns: &[&str]) -> Self {
        Self {
            namespace: namespace.into(),
            display_name: display_name.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn to_subject(&self) -> Subject {
        Subject::new(&self.namespace, &self.display_name, self.patterns.iter().cloned())
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cvagent/config.toml).
    ///
    /// Also checks environment variables:
    /// - `CVAGENT_API_KEY`, `GROQ_API_KEY`, `OPENAI_API_KEY` (in that order)
    /// - `PINECONE_API_KEY`, `PINECONE_INDEX_HOST`
    /// - `CVAGENT_PROVIDER`, `CVAGENT_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup("CVAGENT_API_KEY")
                .or_else(|| lookup("GROQ_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }

        if self.retrieval.index_api_key.is_none() {
            self.retrieval.index_api_key = lookup("PINECONE_API_KEY");
        }

        if let Some(host) = lookup("PINECONE_INDEX_HOST") {
            self.retrieval.index_host = Some(host);
        }

        if let Some(provider) = lookup("CVAGENT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("CVAGENT_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cvagent")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.memory.window == 0 || self.memory.window > MAX_MEMORY_WINDOW {
            return Err(ConfigError::ValidationError(format!(
                "memory.window must be between 1 and {MAX_MEMORY_WINDOW}"
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be > 0".into(),
            ));
        }

        if self.subjects.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[subjects]] entry is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        let mut capabilities = HashSet::new();
        for subject in &self.subjects {
            if !seen.insert(subject.namespace.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate subject namespace '{}'",
                    subject.namespace
                )));
            }
            let capability = capability_name(&subject.namespace);
            if !capabilities.insert(capability.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "subject '{}' maps to capability '{capability}', already used by another subject",
                    subject.namespace
                )));
            }
            if subject.patterns.iter().all(|p| p.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "subject '{}' has no match patterns",
                    subject.namespace
                )));
            }
        }

        if !seen.contains(self.default_subject.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "default_subject '{}' is not a configured subject",
                self.default_subject
            )));
        }

        if self.retrieval.index_host.is_some() && !self.can_embed() {
            return Err(ConfigError::ValidationError(format!(
                "'{}' has no /embeddings endpoint; set retrieval.embedding_provider \
                 to a provider serving '{}'",
                self.embedding_provider(),
                self.retrieval.embedding_model
            )));
        }

        Ok(())
    }

    /// Provider that embeds questions: `retrieval.embedding_provider`, else the chat provider.
    pub fn embedding_provider(&self) -> &str {
        self.retrieval
            .embedding_provider
            .as_deref()
            .unwrap_or(&self.default_provider)
    }

    /// Whether the embedding provider is known to serve embeddings.
    pub fn can_embed(&self) -> bool {
        !CHAT_ONLY_PROVIDERS.contains(&self.embedding_provider())
    }

    /// Configured subjects as domain values, in configuration order.
    pub fn subjects(&self) -> Vec<Subject> {
        self.subjects.iter().map(SubjectConfig::to_subject).collect()
    }

    /// The system instruction, if one is configured.
    pub fn system_instruction(&self) -> Option<&str> {
        let prompt = self.system_prompt.trim();
        (!prompt.is_empty()).then_some(prompt)
    }

    /// Check if an LLM API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            memory: MemoryConfig::default(),
            retrieval: RetrievalConfig::default(),
            subjects: default_subjects(),
            default_subject: default_subject(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
