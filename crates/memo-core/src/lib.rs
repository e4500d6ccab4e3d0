//! ============================================================================
//! MEMO-CORE: Agent Memory
//! ============================================================================
//! Three independent memory stores for agents:
//! - Semantic memory: embeddings in Qdrant, searched by meaning
//! - Fact memory: exact key/value recall in an embedded redb database
//! - Note memory: markdown documents on disk
//! ============================================================================

pub mod config;
pub mod error;
pub mod facts;
pub mod memory;
pub mod notes;

// Re-export main types for convenience
pub use config::MemoConfig;
pub use error::{MemoError, Result};
pub use facts::{Fact, FactStore};
pub use memory::{
    Embedder, EmbeddingService, InMemoryIndex, Payload, QdrantIndex, SearchResult,
    SemanticMemory, VectorIndex,
};
pub use notes::NoteStore;
