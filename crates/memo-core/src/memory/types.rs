//! ============================================================================
//! Memory Types - Points, collection settings and search results
//! ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload key holding the remembered text
pub const DOCUMENT_KEY: &str = "document";
/// Payload key holding the write time (seconds since epoch, fractional)
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Arbitrary JSON object attached to a point
pub type Payload = Map<String, Value>;

/// A unit stored in the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPoint {
    /// Content-addressed identity (UUID-shaped)
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

/// Live or expected configuration of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub vector_size: u64,
    /// Vectors persisted to storage instead of kept in RAM
    pub on_disk: bool,
}

/// A search hit as returned by the index, best match first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    /// Cosine similarity, higher is better
    pub score: f32,
    #[serde(default)]
    pub payload: Payload,
}

/// Table-shaped search result: parallel arrays wrapped in a one-query batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub ids: Vec<Vec<String>>,
    pub documents: Vec<Vec<Option<String>>>,
    pub metadatas: Vec<Vec<Payload>>,
    /// Serialized as `distances` to keep the tool output shape
    #[serde(rename = "distances")]
    pub scores: Vec<Vec<f32>>,
}

impl SearchResult {
    /// Reshape ranked hits for a single query, keeping the index order
    pub fn from_hits(hits: Vec<ScoredPoint>) -> Self {
        let mut ids = Vec::with_capacity(hits.len());
        let mut documents = Vec::with_capacity(hits.len());
        let mut metadatas = Vec::with_capacity(hits.len());
        let mut scores = Vec::with_capacity(hits.len());

        for hit in hits {
            let mut metadata = hit.payload;
            let document = match metadata.remove(DOCUMENT_KEY) {
                Some(Value::String(text)) => Some(text),
                _ => None,
            };
            ids.push(hit.id);
            documents.push(document);
            metadatas.push(metadata);
            scores.push(hit.score);
        }

        Self {
            ids: vec![ids],
            documents: vec![documents],
            metadatas: vec![metadatas],
            scores: vec![scores],
        }
    }

    /// Number of hits in the first (only) query
    pub fn len(&self) -> usize {
        self.ids.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
