//! Error types for the cvagent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum so callers can tell a
//! failed retrieval apart from a failed model call.

use thiserror::Error;

/// The top-level error type for all cvagent operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Language model errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Vector index errors ---
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Caller errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("Index request failed: {0}")]
    Request(String),

    #[error("Index API error: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Failed to parse index response: {0}")]
    Parse(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Query embedding failed: {0}")]
    EmbeddingFailed(#[from] ProviderError),

    #[error("Embedding provider returned no vector for the query")]
    EmptyEmbedding,

    #[error("Index lookup failed in namespace {namespace}: {source}")]
    Index {
        namespace: String,
        #[source]
        source: IndexError,
    },

    #[error("Capability {capability} failed: {reason}")]
    CapabilityFailed { capability: String, reason: String },
}
