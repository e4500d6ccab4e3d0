//! ============================================================================
//! Qdrant Index - Vector index backed by a Qdrant server
//! ============================================================================
//! Thin translation layer: engine types in, qdrant-client builders out.
//! Every call is a single round trip; no retries here.
//! ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, vectors_config::Config as VectorsConfigKind,
    CreateCollectionBuilder, DeletePointsBuilder, Distance, Memory, PointId, PointStruct,
    PointsIdsList, SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParams,
    VectorParamsBuilder,
};
use qdrant_client::{Payload as QdrantPayload, Qdrant};
use tracing::{debug, info, warn};

use super::index::VectorIndex;
use super::types::{CollectionConfig, MemoryPoint, Payload, ScoredPoint};
use crate::config::MemoConfig;
use crate::error::{MemoError, Result};

/// Vector index talking to Qdrant over gRPC
pub struct QdrantIndex {
    client: Qdrant,
}

impl QdrantIndex {
    /// Build a client for the given URL. Does not contact the server.
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self> {
        debug!("Creating Qdrant client for {}", url);

        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| MemoError::index(format!("Failed to create Qdrant client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &MemoConfig) -> Result<Self> {
        Self::new(&config.qdrant_url, config.qdrant_api_key.clone())
    }

    /// Check if the server answers
    pub async fn health_check(&self) -> bool {
        match self.client.health_check().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Qdrant health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .list_collections()
            .await
            .map_err(|e| MemoError::index(format!("Failed to list collections: {}", e)))?;

        Ok(response.collections.into_iter().map(|c| c.name).collect())
    }

    async fn create_collection(&self, name: &str, config: CollectionConfig) -> Result<()> {
        info!(
            "Creating collection {} (size: {}, on_disk: {})",
            name, config.vector_size, config.on_disk
        );

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name).vectors_config(
                    VectorParamsBuilder::new(config.vector_size, Distance::Cosine)
                        .on_disk(config.on_disk),
                ),
            )
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.contains("already exists") {
                    MemoError::CollectionExists(name.to_string())
                } else {
                    MemoError::index(format!("Failed to create collection: {}", message))
                }
            })?;

        Ok(())
    }

    async fn collection_config(&self, name: &str) -> Result<CollectionConfig> {
        let info = self
            .client
            .collection_info(name)
            .await
            .map_err(|e| MemoError::index(format!("Failed to get collection info: {}", e)))?;

        let vectors = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config);

        // Named multi-vector layouts never match our single unnamed vector,
        // so report them as an impossible size to force a rebuild
        let config = match vectors {
            Some(VectorsConfigKind::Params(params)) => CollectionConfig {
                vector_size: params.size,
                on_disk: serves_from_disk(&params),
            },
            _ => CollectionConfig {
                vector_size: 0,
                on_disk: false,
            },
        };

        debug!("Collection {} live config: {:?}", name, config);
        Ok(config)
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        info!("Deleting collection {}", name);

        self.client
            .delete_collection(name)
            .await
            .map_err(|e| MemoError::index(format!("Failed to delete collection: {}", e)))?;

        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<MemoryPoint>, wait: bool) -> Result<()> {
        let points = points
            .into_iter()
            .map(|p| {
                let payload = QdrantPayload::try_from(serde_json::Value::Object(p.payload))
                    .map_err(|e| MemoError::Serialization(format!("Invalid payload: {}", e)))?;
                Ok(PointStruct::new(p.id, p.vector, payload))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Upserting {} points into {}", points.len(), collection);

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(wait))
            .await
            .map_err(|e| MemoError::index(format!("Failed to upsert points: {}", e)))?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector, limit).with_payload(with_payload),
            )
            .await
            .map_err(|e| MemoError::index(format!("Failed to search points: {}", e)))?;

        let hits = response
            .result
            .into_iter()
            .filter_map(|point| {
                Some(ScoredPoint {
                    id: point_id_to_string(point.id?)?,
                    score: point.score,
                    payload: payload_to_json(point.payload),
                })
            })
            .collect();

        Ok(hits)
    }

    async fn delete_points(&self, collection: &str, ids: Vec<String>) -> Result<()> {
        debug!("Deleting {} points from {}", ids.len(), collection);

        let ids: Vec<PointId> = ids.into_iter().map(PointId::from).collect();
        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(PointsIdsList { ids })
                    .wait(true),
            )
            .await
            .map_err(|e| MemoError::index(format!("Failed to delete points: {}", e)))?;

        Ok(())
    }

    async fn create_snapshot(&self, collection: &str) -> Result<Option<String>> {
        let response = self
            .client
            .create_snapshot(collection)
            .await
            .map_err(|e| MemoError::index(format!("Failed to create snapshot: {}", e)))?;

        Ok(response
            .snapshot_description
            .map(|d| d.name)
            .filter(|name| !name.is_empty()))
    }
}

/// Servers from 1.19 report placement in `memory`; older ones only set `on_disk`
#[allow(deprecated)]
fn serves_from_disk(params: &VectorParams) -> bool {
    match params.memory {
        Some(m) if m == Memory::Cold as i32 || m == Memory::Cached as i32 => true,
        Some(m) if m == Memory::Pinned as i32 => false,
        _ => params.on_disk.unwrap_or(false),
    }
}

fn point_id_to_string(point_id: PointId) -> Option<String> {
    match point_id.point_id_options? {
        PointIdOptions::Uuid(uuid) => Some(uuid),
        PointIdOptions::Num(num) => Some(num.to_string()),
    }
}

fn payload_to_json(payload: HashMap<String, Value>) -> Payload {
    payload
        .into_iter()
        .map(|(k, v)| (k, value_to_json(v)))
        .collect()
}

fn value_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(st)) => serde_json::Value::Object(payload_to_json(st.fields)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_id_conversion() {
        let uuid = PointId::from("ba7816bf-8f01-cfea-4141-40de5dae2223".to_string());
        assert_eq!(
            point_id_to_string(uuid).as_deref(),
            Some("ba7816bf-8f01-cfea-4141-40de5dae2223")
        );
        assert_eq!(point_id_to_string(PointId::from(42u64)).as_deref(), Some("42"));
    }

    #[test]
    #[allow(deprecated)]
    fn test_disk_placement_from_memory_or_legacy_flag() {
        let legacy = VectorParams {
            size: 384,
            on_disk: Some(true),
            ..Default::default()
        };
        assert!(serves_from_disk(&legacy));

        // Newer servers may leave the legacy flag empty
        let cold = VectorParams {
            size: 384,
            memory: Some(Memory::Cold as i32),
            ..Default::default()
        };
        assert!(serves_from_disk(&cold));

        let cached = VectorParams {
            memory: Some(Memory::Cached as i32),
            ..Default::default()
        };
        assert!(serves_from_disk(&cached));

        let pinned = VectorParams {
            on_disk: Some(true),
            memory: Some(Memory::Pinned as i32),
            ..Default::default()
        };
        assert!(!serves_from_disk(&pinned));

        assert!(!serves_from_disk(&VectorParams::default()));
    }

    #[test]
    fn test_payload_round_trip_through_qdrant_values() {
        let original = json!({
            "document": "Paris is the capital of France",
            "topic": "geography",
            "rank": 3,
            "timestamp": 1700000000.25,
            "tags": ["a", "b"],
            "nested": {"ok": true, "none": null}
        });
        let qdrant_payload = QdrantPayload::try_from(original.clone()).unwrap();
        let fields: HashMap<String, Value> = qdrant_payload.into();
        let back = serde_json::Value::Object(payload_to_json(fields));
        assert_eq!(back, original);
    }

    #[test]
    fn test_client_builds_without_server() {
        assert!(QdrantIndex::new("http://localhost:6334", None).is_ok());
    }

    #[tokio::test]
    async fn test_health_check_false_when_unreachable() {
        let index = QdrantIndex::new("http://127.0.0.1:9", None).unwrap();
        assert!(!index.health_check().await);
    }

    // Integration tests require a running Qdrant instance
    #[tokio::test]
    #[ignore]
    async fn test_collection_lifecycle_against_server() {
        let index = QdrantIndex::new("http://localhost:6334", None).unwrap();
        let name = "memo_core_it";
        let _ = index.delete_collection(name).await;

        let config = CollectionConfig {
            vector_size: 4,
            on_disk: true,
        };
        index.create_collection(name, config).await.unwrap();
        assert!(index
            .create_collection(name, config)
            .await
            .unwrap_err()
            .is_collection_exists());
        assert_eq!(index.collection_config(name).await.unwrap(), config);
        index.delete_collection(name).await.unwrap();
    }
}
