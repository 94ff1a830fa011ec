//! # cvagent Core
//!
//! Domain types, traits, and error definitions for the cvagent résumé
//! question-answering agent. This crate has **no framework dependencies**;
//! it defines the domain model that every other crate implements against.
//!
//! ## Design
//!
//! Each external collaborator is a trait here, with implementations in
//! their own crates:
//! - [`Provider`]: the language model (`cvagent-providers`)
//! - [`VectorIndex`]: the namespaced similarity index (`cvagent-index`)
//! - [`RetrievalCapability`]: "search this subject's résumé" (`cvagent-tools`)

pub mod error;
pub mod index;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod subject;

// Re-export key types at crate root for ergonomics
pub use error::{Error, IndexError, ProviderError, Result, RetrievalError};
pub use index::{IndexMatch, IndexQuery, IndexRecord, VectorIndex};
pub use message::{Message, Role};
pub use provider::{EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage};
pub use retrieval::{CapabilityRegistry, RetrievalCapability};
pub use subject::{Subject, capability_name};
