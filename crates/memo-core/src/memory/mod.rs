//! ============================================================================
//! Memory Module - Semantic memory for agents
//! ============================================================================
//! Stores text as vector embeddings in a Qdrant-style index and finds it again
//! by meaning.
//!
//! ## Features
//! - Content-addressed identities (same text, same point)
//! - Self-healing collection config (size / on-disk drift triggers a rebuild)
//! - Nearest-neighbour search shaped as a one-query result table
//! - Forget by id or by nearest match, manual snapshots
//!
//! ## Architecture
//! ```text
//! remember(text) → ensure collection → Embed → identity(text) → Upsert(wait)
//! search(query)  → ensure collection → Embed → top-k → SearchResult
//! forget_by_query(query) → ensure collection → Embed → top-1 → Delete
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use memo_core::memory::{EmbeddingService, QdrantIndex, SemanticMemory};
//!
//! let embedder = Arc::new(EmbeddingService::from_config(&config));
//! let index = Arc::new(QdrantIndex::from_config(&config)?);
//! let memory = SemanticMemory::new(embedder, index, &config.collection);
//!
//! let id = memory.remember("User prefers concise responses", Default::default()).await?;
//! let hits = memory.search("how should I respond", 5).await?;
//! ```
//! ============================================================================

mod embeddings;
mod engine;
mod identity;
mod index;
mod qdrant;
mod types;

pub use embeddings::{normalize, Embedder, EmbeddingService};
#[cfg(feature = "local-embeddings")]
pub use embeddings::LocalEmbedder;
pub use engine::{CollectionExpectation, SemanticMemory, UNNAMED_SNAPSHOT};
pub use identity::memory_id;
pub use index::{InMemoryIndex, VectorIndex};
pub use qdrant::QdrantIndex;
pub use types::{
    CollectionConfig, MemoryPoint, Payload, ScoredPoint, SearchResult, DOCUMENT_KEY,
    TIMESTAMP_KEY,
};
