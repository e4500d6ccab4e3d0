//! ============================================================================
//! Vector Index - Collection and point operations the engine relies on
//! ============================================================================
//! `VectorIndex` is the seam between the semantic engine and the index
//! service. `QdrantIndex` is the production backend; `InMemoryIndex` keeps
//! everything in process with the same contract (cosine ranking, dimension
//! checks on upsert, duplicate-create errors) for tests and offline use.
//! ============================================================================

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::{CollectionConfig, MemoryPoint, Payload, ScoredPoint};
use crate::error::{MemoError, Result};

/// Operations of an external vector index service
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Names of all collections
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Create a cosine-distance collection. Fails with
    /// `MemoError::CollectionExists` when the name is taken.
    async fn create_collection(&self, name: &str, config: CollectionConfig) -> Result<()>;

    /// Live configuration of a collection
    async fn collection_config(&self, name: &str) -> Result<CollectionConfig>;

    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert or overwrite points; `wait` blocks until the write is durable
    async fn upsert(&self, collection: &str, points: Vec<MemoryPoint>, wait: bool) -> Result<()>;

    /// Nearest neighbours, best first
    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>>;

    /// Delete points by id; unknown ids are ignored
    async fn delete_points(&self, collection: &str, ids: Vec<String>) -> Result<()>;

    /// Trigger a snapshot, returning its name if the service assigned one
    async fn create_snapshot(&self, collection: &str) -> Result<Option<String>>;
}

#[derive(Debug)]
struct LocalCollection {
    config: CollectionConfig,
    points: BTreeMap<String, (Vec<f32>, Payload)>,
}

/// Process-local vector index
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, LocalCollection>>,
    snapshots: AtomicU64,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points in a collection (0 if it does not exist)
    pub async fn point_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.points.len())
            .unwrap_or(0)
    }

    /// Stored vector and payload for a point
    pub async fn get_point(&self, collection: &str, id: &str) -> Option<MemoryPoint> {
        let collections = self.collections.read().await;
        let (vector, payload) = collections.get(collection)?.points.get(id)?;
        Some(MemoryPoint {
            id: id.to_string(),
            vector: vector.clone(),
            payload: payload.clone(),
        })
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn not_found(name: &str) -> MemoError {
    MemoError::index(format!("Collection `{}` doesn't exist", name))
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_collection(&self, name: &str, config: CollectionConfig) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(MemoError::CollectionExists(name.to_string()));
        }
        collections.insert(
            name.to_string(),
            LocalCollection {
                config,
                points: BTreeMap::new(),
            },
        );
        debug!("Created local collection {} ({:?})", name, config);
        Ok(())
    }

    async fn collection_config(&self, name: &str) -> Result<CollectionConfig> {
        self.collections
            .read()
            .await
            .get(name)
            .map(|c| c.config)
            .ok_or_else(|| not_found(name))
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<MemoryPoint>, _wait: bool) -> Result<()> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;

        // Validate the whole batch before touching anything
        let expected = target.config.vector_size as usize;
        if let Some(bad) = points.iter().find(|p| p.vector.len() != expected) {
            return Err(MemoError::index(format!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                expected,
                bad.vector.len()
            )));
        }

        for point in points {
            target.points.insert(point.id, (point.vector, point.payload));
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>> {
        let collections = self.collections.read().await;
        let target = collections
            .get(collection)
            .ok_or_else(|| not_found(collection))?;

        if vector.len() != target.config.vector_size as usize {
            return Err(MemoError::index(format!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                target.config.vector_size,
                vector.len()
            )));
        }

        let mut hits: Vec<ScoredPoint> = target
            .points
            .iter()
            .map(|(id, (stored, payload))| ScoredPoint {
                id: id.clone(),
                score: cosine_similarity(&vector, stored),
                payload: if with_payload {
                    payload.clone()
                } else {
                    Payload::new()
                },
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn delete_points(&self, collection: &str, ids: Vec<String>) -> Result<()> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;
        for id in ids {
            target.points.remove(&id);
        }
        Ok(())
    }

    async fn create_snapshot(&self, collection: &str) -> Result<Option<String>> {
        if !self.collections.read().await.contains_key(collection) {
            return Err(not_found(collection));
        }
        let seq = self.snapshots.fetch_add(1, Ordering::SeqCst) + 1;
        let stamp = chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S");
        Ok(Some(format!("{}-{}-{}.snapshot", collection, seq, stamp)))
    }
}
