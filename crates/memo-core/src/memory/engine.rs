//! ============================================================================
//! Semantic Memory Engine - Remember, search and forget by meaning
//! ============================================================================
//! Orchestrates the embedding provider and the vector index:
//! - keeps the live collection in line with the expected configuration,
//!   rebuilding it (destructively) on drift
//! - derives content-addressed identities so identical text overwrites
//! - reshapes ranked hits into a one-query `SearchResult` table
//! ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::embeddings::Embedder;
use super::identity::memory_id;
use super::index::VectorIndex;
use super::types::{
    CollectionConfig, MemoryPoint, Payload, SearchResult, DOCUMENT_KEY, TIMESTAMP_KEY,
};
use crate::error::{MemoError, Result};

/// Placeholder returned when the index names no snapshot
pub const UNNAMED_SNAPSHOT: &str = "unnamed_snapshot";

/// What the engine expects the live collection to look like.
///
/// The vector size starts at the provider's nominal dimension and is
/// corrected once the first embedding shows otherwise; it never reverts.
#[derive(Debug)]
pub struct CollectionExpectation {
    vector_size: AtomicU64,
    on_disk: bool,
}

impl CollectionExpectation {
    pub fn new(vector_size: u64) -> Self {
        Self {
            vector_size: AtomicU64::new(vector_size),
            on_disk: true,
        }
    }

    pub fn current(&self) -> CollectionConfig {
        CollectionConfig {
            vector_size: self.vector_size.load(Ordering::SeqCst),
            on_disk: self.on_disk,
        }
    }

    /// Record an observed embedding length. Returns the previous size when it changed.
    fn observe(&self, observed: u64) -> Option<u64> {
        let previous = self.vector_size.swap(observed, Ordering::SeqCst);
        (previous != observed).then_some(previous)
    }
}

/// Semantic memory over an embedding provider and a vector index
pub struct SemanticMemory {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    collection: String,
    expected: CollectionExpectation,
    ensure_lock: Mutex<()>,
}

impl SemanticMemory {
    /// Create an engine. Nothing is contacted until the first operation.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        collection: impl Into<String>,
    ) -> Self {
        let nominal = embedder.nominal_dimension() as u64;
        Self {
            embedder,
            index,
            collection: collection.into(),
            expected: CollectionExpectation::new(nominal),
            ensure_lock: Mutex::new(()),
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Configuration the next lifecycle check will enforce
    pub fn expected_config(&self) -> CollectionConfig {
        self.expected.current()
    }

    /// Make sure the collection exists and matches the expectation,
    /// recreating it (dropping its points) if it drifted
    pub(crate) async fn ensure_collection(&self) -> Result<()> {
        let _guard = self.ensure_lock.lock().await;
        let expected = self.expected.current();

        let names = self.index.list_collections().await?;
        if !names.iter().any(|n| n == &self.collection) {
            return self.create_collection(expected).await;
        }

        let live = self.index.collection_config(&self.collection).await?;
        if live.vector_size == expected.vector_size && live.on_disk == expected.on_disk {
            debug!("Collection {} matches expected config", self.collection);
            return Ok(());
        }

        warn!(
            "Collection {} config mismatch (live: size {} on_disk {}, expected: size {} on_disk {}). Recreating, existing points are dropped",
            self.collection, live.vector_size, live.on_disk, expected.vector_size, expected.on_disk
        );
        self.index.delete_collection(&self.collection).await?;
        self.create_collection(expected).await
    }

    async fn create_collection(&self, config: CollectionConfig) -> Result<()> {
        match self.index.create_collection(&self.collection, config).await {
            Ok(()) => {
                info!("Collection {} ready ({:?})", self.collection, config);
                Ok(())
            }
            Err(e) if e.is_collection_exists() => {
                debug!("Collection {} was created concurrently", self.collection);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Embed text, correcting the expected vector size if the provider disagrees
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.ensure_ready().await?;
        let embedding = self.embedder.embed(text).await?;

        if let Some(previous) = self.expected.observe(embedding.len() as u64) {
            warn!(
                "Embedding size mismatch: expected {}, got {}. Using {} from now on",
                previous,
                embedding.len(),
                embedding.len()
            );
        }

        Ok(embedding)
    }

    /// Store text (plus metadata) under its content-derived identity.
    /// Returns the identity.
    pub async fn remember(&self, text: &str, metadata: Payload) -> Result<String> {
        if text.is_empty() {
            return Err(MemoError::invalid_input("text must not be empty"));
        }

        self.ensure_collection().await?;
        let vector = self.embed(text).await?;
        let id = memory_id(text);
        let payload = build_payload(text, metadata, unix_timestamp());

        debug!("Remembering {} ({} dims)", id, vector.len());

        self.index
            .upsert(
                &self.collection,
                vec![MemoryPoint {
                    id: id.clone(),
                    vector,
                    payload,
                }],
                true,
            )
            .await?;

        Ok(id)
    }

    /// Nearest memories to a query, best first
    pub async fn search(&self, query: &str, results_count: u64) -> Result<SearchResult> {
        if results_count == 0 {
            return Err(MemoError::invalid_input("results_count must be positive"));
        }

        self.ensure_collection().await?;
        let vector = self.embed(query).await?;

        let hits = self
            .index
            .search(&self.collection, vector, results_count, true)
            .await?;

        debug!("Search returned {} hits", hits.len());
        Ok(SearchResult::from_hits(hits))
    }

    /// Delete a memory by identity. Unknown ids are not an error.
    pub async fn forget(&self, id: &str) -> Result<()> {
        self.ensure_collection().await?;
        self.index
            .delete_points(&self.collection, vec![id.to_string()])
            .await
    }

    /// Delete the single nearest memory to a query, whatever its score.
    /// Returns the number of deleted points (0 or 1).
    pub async fn forget_by_query(&self, query: &str) -> Result<u64> {
        self.ensure_collection().await?;
        let vector = self.embed(query).await?;

        let nearest = self
            .index
            .search(&self.collection, vector, 1, true)
            .await?
            .into_iter()
            .next();

        match nearest {
            Some(hit) => {
                info!("Forgetting nearest memory {} (score {:.3})", hit.id, hit.score);
                self.index
                    .delete_points(&self.collection, vec![hit.id])
                    .await?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    /// Trigger a point-in-time snapshot of the collection
    pub async fn create_snapshot(&self) -> Result<String> {
        let name = self
            .index
            .create_snapshot(&self.collection)
            .await?
            .unwrap_or_else(|| UNNAMED_SNAPSHOT.to_string());

        info!("Snapshot of {} created: {}", self.collection, name);
        Ok(name)
    }
}

/// Caller metadata plus the reserved fields. Reserved keys always win.
fn build_payload(text: &str, metadata: Payload, timestamp: f64) -> Payload {
    let mut payload = metadata;

    for reserved in [DOCUMENT_KEY, TIMESTAMP_KEY] {
        if payload.contains_key(reserved) {
            warn!("Ignoring caller metadata key `{}` (reserved)", reserved);
        }
    }

    payload.insert(DOCUMENT_KEY.to_string(), Value::String(text.to_string()));
    payload.insert(
        TIMESTAMP_KEY.to_string(),
        serde_json::Number::from_f64(timestamp)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    );
    payload
}

fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::embeddings::normalize;
    use crate::memory::types::ScoredPoint;
    use crate::memory::index::InMemoryIndex;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    /// Bag-of-words hashing embedder: texts sharing words score higher
    struct HashingEmbedder {
        nominal: usize,
        actual: usize,
        ready_calls: AtomicUsize,
    }

    impl HashingEmbedder {
        fn new(dim: usize) -> Self {
            Self::with_actual(dim, dim)
        }

        fn with_actual(nominal: usize, actual: usize) -> Self {
            Self {
                nominal,
                actual,
                ready_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for HashingEmbedder {
        async fn ensure_ready(&self) -> Result<()> {
            self.ready_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0f32; self.actual];
            for word in text.to_lowercase().split_whitespace() {
                let word: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
                if word.is_empty() {
                    continue;
                }
                let bucket = word
                    .bytes()
                    .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
                v[bucket % self.actual] += 1.0;
            }
            normalize(&mut v);
            Ok(v)
        }

        fn nominal_dimension(&self) -> usize {
            self.nominal
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(MemoError::embedding("provider offline"))
        }

        fn nominal_dimension(&self) -> usize {
            8
        }
    }

    /// Wraps the in-memory index with the failure modes a shared
    /// Qdrant server can show
    #[derive(Default)]
    struct FaultyIndex {
        inner: InMemoryIndex,
        stale_listing: bool,
        unnamed_snapshots: bool,
        fail_list: bool,
        fail_upsert: bool,
    }

    #[async_trait]
    impl VectorIndex for FaultyIndex {
        async fn list_collections(&self) -> Result<Vec<String>> {
            if self.fail_list {
                return Err(MemoError::index("list unavailable"));
            }
            if self.stale_listing {
                return Ok(Vec::new());
            }
            self.inner.list_collections().await
        }

        async fn create_collection(&self, name: &str, config: CollectionConfig) -> Result<()> {
            self.inner.create_collection(name, config).await
        }

        async fn collection_config(&self, name: &str) -> Result<CollectionConfig> {
            self.inner.collection_config(name).await
        }

        async fn delete_collection(&self, name: &str) -> Result<()> {
            self.inner.delete_collection(name).await
        }

        async fn upsert(
            &self,
            collection: &str,
            points: Vec<MemoryPoint>,
            wait: bool,
        ) -> Result<()> {
            if self.fail_upsert {
                return Err(MemoError::index("upsert rejected"));
            }
            self.inner.upsert(collection, points, wait).await
        }

        async fn search(
            &self,
            collection: &str,
            vector: Vec<f32>,
            limit: u64,
            with_payload: bool,
        ) -> Result<Vec<ScoredPoint>> {
            self.inner
                .search(collection, vector, limit, with_payload)
                .await
        }

        async fn delete_points(&self, collection: &str, ids: Vec<String>) -> Result<()> {
            self.inner.delete_points(collection, ids).await
        }

        async fn create_snapshot(&self, collection: &str) -> Result<Option<String>> {
            if self.unnamed_snapshots {
                self.inner.create_snapshot(collection).await?;
                return Ok(None);
            }
            self.inner.create_snapshot(collection).await
        }
    }

    fn engine_over(index: Arc<FaultyIndex>) -> SemanticMemory {
        SemanticMemory::new(Arc::new(HashingEmbedder::new(16)), index, "memories")
    }

    fn engine_with(embedder: Arc<dyn Embedder>) -> (SemanticMemory, Arc<InMemoryIndex>) {
        let index = Arc::new(InMemoryIndex::new());
        let engine = SemanticMemory::new(embedder, index.clone(), "memories");
        (engine, index)
    }

    fn engine(dim: usize) -> (SemanticMemory, Arc<InMemoryIndex>) {
        engine_with(Arc::new(HashingEmbedder::new(dim)))
    }

    fn meta(value: serde_json::Value) -> Payload {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_remember_and_search_example() {
        let (engine, index) = engine(64);

        let id = engine
            .remember(
                "Paris is the capital of France",
                meta(json!({"topic": "geography"})),
            )
            .await
            .unwrap();
        engine
            .remember("Rust has a borrow checker", Payload::new())
            .await
            .unwrap();

        assert_eq!(id, memory_id("Paris is the capital of France"));
        let stored = index.get_point("memories", &id).await.unwrap();
        assert_eq!(stored.vector.len(), 64);
        assert_eq!(stored.payload["document"], json!("Paris is the capital of France"));
        assert_eq!(stored.payload["topic"], json!("geography"));
        assert!(stored.payload["timestamp"].as_f64().unwrap() > 1_600_000_000.0);

        let result = engine.search("capital of France", 1).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.ids[0][0], id);
        assert_eq!(
            result.documents[0][0].as_deref(),
            Some("Paris is the capital of France")
        );
        assert_eq!(result.metadatas[0][0]["topic"], json!("geography"));
        assert!(!result.metadatas[0][0].contains_key("document"));
    }

    #[tokio::test]
    async fn test_remember_same_text_overwrites() {
        let (engine, index) = engine(32);

        let first = engine
            .remember("same text", meta(json!({"v": 1})))
            .await
            .unwrap();
        let second = engine
            .remember("same text", meta(json!({"v": 2})))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(index.point_count("memories").await, 1);
        let stored = index.get_point("memories", &first).await.unwrap();
        assert_eq!(stored.payload["v"], json!(2));
    }

    #[tokio::test]
    async fn test_reserved_keys_win_over_metadata() {
        let (engine, index) = engine(16);

        let id = engine
            .remember(
                "real text",
                meta(json!({"document": "spoofed", "timestamp": "yesterday", "k": "v"})),
            )
            .await
            .unwrap();

        let stored = index.get_point("memories", &id).await.unwrap();
        assert_eq!(stored.payload["document"], json!("real text"));
        assert!(stored.payload["timestamp"].is_f64());
        assert_eq!(stored.payload["k"], json!("v"));
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_backend() {
        let (engine, index) = engine(16);
        let err = engine.remember("", Payload::new()).await.unwrap_err();
        assert!(matches!(err, MemoError::InvalidInput(_)));
        assert!(index.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collection_created_lazily_with_expectation() {
        let (engine, index) = engine(24);
        assert!(index.list_collections().await.unwrap().is_empty());

        engine.forget("00000000-0000-0000-0000-000000000000").await.unwrap();

        let live = index.collection_config("memories").await.unwrap();
        assert_eq!(live, engine.expected_config());
        assert_eq!(
            live,
            CollectionConfig {
                vector_size: 24,
                on_disk: true
            }
        );
    }

    #[tokio::test]
    async fn test_drift_recreates_collection() {
        let (engine, index) = engine(16);

        // Wrong size, data inside
        index
            .create_collection(
                "memories",
                CollectionConfig {
                    vector_size: 3,
                    on_disk: true,
                },
            )
            .await
            .unwrap();
        index
            .upsert(
                "memories",
                vec![MemoryPoint {
                    id: "old".into(),
                    vector: vec![1.0, 0.0, 0.0],
                    payload: Payload::new(),
                }],
                true,
            )
            .await
            .unwrap();

        let result = engine.search("anything", 5).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(
            index.collection_config("memories").await.unwrap(),
            engine.expected_config()
        );
        assert_eq!(index.point_count("memories").await, 0);
    }

    #[tokio::test]
    async fn test_persistence_flag_drift_recreates_collection() {
        let (engine, index) = engine(16);
        index
            .create_collection(
                "memories",
                CollectionConfig {
                    vector_size: 16,
                    on_disk: false,
                },
            )
            .await
            .unwrap();

        engine.forget_by_query("anything").await.unwrap();

        let live = index.collection_config("memories").await.unwrap();
        assert!(live.on_disk);
        assert_eq!(live.vector_size, 16);
    }

    #[tokio::test]
    async fn test_matching_collection_is_kept() {
        let (engine, index) = engine(16);
        engine.remember("keep me", Payload::new()).await.unwrap();
        engine.search("keep", 3).await.unwrap();
        assert_eq!(index.point_count("memories").await, 1);
    }

    #[tokio::test]
    async fn test_vector_size_correction_fixes_forward() {
        // Provider claims 8 dims but produces 12
        let (engine, index) = engine_with(Arc::new(HashingEmbedder::with_actual(8, 12)));

        // Collection is created at the nominal size, the upsert then fails
        let err = engine.remember("first", Payload::new()).await.unwrap_err();
        assert!(matches!(err, MemoError::Index(_)));
        assert_eq!(engine.expected_config().vector_size, 12);
        assert_eq!(index.collection_config("memories").await.unwrap().vector_size, 8);

        // Next lifecycle check rebuilds at the observed size
        engine.remember("second", Payload::new()).await.unwrap();
        assert_eq!(index.collection_config("memories").await.unwrap().vector_size, 12);
        assert_eq!(index.point_count("memories").await, 1);
    }

    #[tokio::test]
    async fn test_search_returns_k_best_first() {
        let (engine, _index) = engine(64);
        for text in [
            "the cat sat on the mat",
            "dogs chase cats",
            "stock markets fell today",
            "the cat and the mat",
        ] {
            engine.remember(text, Payload::new()).await.unwrap();
        }

        let result = engine.search("cat mat", 3).await.unwrap();
        assert_eq!(result.len(), 3);
        let scores = &result.scores[0];
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(result.ids.len(), 1);
        assert_eq!(result.documents[0].len(), 3);
        assert_eq!(result.metadatas[0].len(), 3);
    }

    #[tokio::test]
    async fn test_search_empty_collection() {
        let (engine, _index) = engine(16);
        let result = engine.search("nothing here", 5).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.ids, vec![Vec::<String>::new()]);
    }

    #[tokio::test]
    async fn test_search_zero_results_rejected() {
        let (engine, _index) = engine(16);
        assert!(matches!(
            engine.search("q", 0).await,
            Err(MemoError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_forget_by_id() {
        let (engine, index) = engine(16);
        let id = engine.remember("forget me", Payload::new()).await.unwrap();
        engine.remember("keep me", Payload::new()).await.unwrap();

        engine.forget(&id).await.unwrap();
        assert!(index.get_point("memories", &id).await.is_none());
        assert_eq!(index.point_count("memories").await, 1);

        // Unknown id is a no-op
        engine.forget(&id).await.unwrap();
        assert_eq!(index.point_count("memories").await, 1);
    }

    #[tokio::test]
    async fn test_forget_by_query() {
        let (engine, index) = engine(64);
        let paris = engine
            .remember("Paris is the capital of France", Payload::new())
            .await
            .unwrap();
        engine
            .remember("Rust has a borrow checker", Payload::new())
            .await
            .unwrap();

        let deleted = engine.forget_by_query("capital of France").await.unwrap();
        assert_eq!(deleted, 1);
        assert!(index.get_point("memories", &paris).await.is_none());
        assert_eq!(index.point_count("memories").await, 1);

        // Still deletes the nearest even without a real match
        assert_eq!(engine.forget_by_query("unrelated words").await.unwrap(), 1);
        assert_eq!(index.point_count("memories").await, 0);
    }

    #[tokio::test]
    async fn test_forget_by_query_empty_collection() {
        let (engine, _index) = engine(16);
        assert_eq!(engine.forget_by_query("anything").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_snapshot() {
        let (engine, _index) = engine(16);
        engine.remember("snap", Payload::new()).await.unwrap();
        let name = engine.create_snapshot().await.unwrap();
        assert!(name.starts_with("memories-"));
    }

    #[tokio::test]
    async fn test_create_racing_another_writer_is_not_fatal() {
        // Listing never shows the collection, so every call tries to create it
        let index = Arc::new(FaultyIndex {
            stale_listing: true,
            ..Default::default()
        });
        let engine = engine_over(index.clone());

        let first = engine.remember("first memory", Payload::new()).await.unwrap();
        let second = engine.remember("second memory", Payload::new()).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(index.inner.point_count("memories").await, 2);
    }

    #[tokio::test]
    async fn test_snapshot_without_name_uses_placeholder() {
        let index = Arc::new(FaultyIndex {
            unnamed_snapshots: true,
            ..Default::default()
        });
        let engine = engine_over(index);
        engine.remember("snap", Payload::new()).await.unwrap();

        let name = engine.create_snapshot().await.unwrap();
        assert_eq!(name, UNNAMED_SNAPSHOT);
        assert_eq!(name, "unnamed_snapshot");
    }

    #[tokio::test]
    async fn test_index_list_failure_propagates() {
        let index = Arc::new(FaultyIndex {
            fail_list: true,
            ..Default::default()
        });
        let engine = engine_over(index.clone());

        let err = engine.remember("text", Payload::new()).await.unwrap_err();
        assert!(matches!(err, MemoError::Index(_)));
        assert!(matches!(
            engine.search("text", 1).await,
            Err(MemoError::Index(_))
        ));
        assert!(index.inner.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_upsert_failure_propagates() {
        let index = Arc::new(FaultyIndex {
            fail_upsert: true,
            ..Default::default()
        });
        let engine = engine_over(index.clone());

        let err = engine.remember("text", Payload::new()).await.unwrap_err();
        assert!(matches!(err, MemoError::Index(_)));
        assert_eq!(index.inner.point_count("memories").await, 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let (engine, index) = engine_with(Arc::new(FailingEmbedder));
        let err = engine.remember("text", Payload::new()).await.unwrap_err();
        assert!(matches!(err, MemoError::Embedding(_)));
        assert_eq!(index.point_count("memories").await, 0);
        assert!(engine.search("text", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_provider_readied_before_each_embed() {
        let embedder = Arc::new(HashingEmbedder::new(16));
        let (engine, _index) = engine_with(embedder.clone());
        engine.remember("a", Payload::new()).await.unwrap();
        engine.search("a", 1).await.unwrap();
        engine.forget("missing").await.unwrap();
        assert_eq!(embedder.ready_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_collection() {
        let (engine, index) = engine(16);
        let engine = Arc::new(engine);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .remember(&format!("memory number {}", i), Payload::new())
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(index.point_count("memories").await, 8);
    }

    #[tokio::test]
    async fn test_engines_hold_independent_expectations() {
        let index = Arc::new(InMemoryIndex::new());
        let a = SemanticMemory::new(
            Arc::new(HashingEmbedder::with_actual(8, 12)),
            index.clone(),
            "a",
        );
        let b = SemanticMemory::new(Arc::new(HashingEmbedder::new(8)), index.clone(), "b");

        let _ = a.remember("x", Payload::new()).await;
        assert_eq!(a.expected_config().vector_size, 12);
        assert_eq!(b.expected_config().vector_size, 8);
    }

    #[test]
    fn test_build_payload() {
        let payload = build_payload("text", meta(json!({"a": 1})), 12.5);
        assert_eq!(payload["document"], json!("text"));
        assert_eq!(payload["timestamp"], json!(12.5));
        assert_eq!(payload["a"], json!(1));
        assert_eq!(payload.len(), 3);
    }
}
