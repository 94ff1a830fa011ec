//! Vector index backends for cvagent.

pub mod in_memory;
pub mod pinecone;
pub mod vector;

pub use in_memory::InMemoryIndex;
pub use pinecone::PineconeIndex;
pub use vector::{cosine_similarity, rank_records};
