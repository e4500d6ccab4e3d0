//! ============================================================================
//! Embedding Providers - Text to unit-length vectors
//! ============================================================================
//! `EmbeddingService` talks to any OpenAI-compatible /embeddings endpoint
//! (OpenAI, text-embeddings-inference, Ollama, LocalAI). With the
//! `local-embeddings` feature, `LocalEmbedder` runs all-MiniLM-L6-v2 in
//! process. Output is always L2-normalized so cosine scores are meaningful.
//! ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MemoConfig;
use crate::error::{MemoError, Result};

/// Source of embedding vectors for the semantic engine
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Idempotent one-time initialization (model load, connection setup)
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Embed a single text into a normalized vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Vector size the provider claims before anything is embedded
    fn nominal_dimension(&self) -> usize;
}

/// Scale a vector to unit length in place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Embedding service backed by an OpenAI-compatible HTTP API
pub struct EmbeddingService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    model: Option<String>,
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct EmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl EmbeddingService {
    /// Create with explicit endpoint, model and nominal dimension
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        dimension: usize,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
        }
    }

    /// Create from the service configuration
    pub fn from_config(config: &MemoConfig) -> Self {
        Self::new(
            config.embed_api_url.clone(),
            config.embed_model.clone(),
            config.embed_api_key.clone(),
            config.embed_dim,
        )
    }

    /// Generate normalized embeddings for several texts, in input order
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
        };

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MemoError::embedding(format!("Failed to send embedding request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MemoError::embedding(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(MemoError::embedding(format!(
                    "Embedding API error ({}): {}",
                    status, error.error.message
                )));
            }
            return Err(MemoError::embedding(format!(
                "Embedding API error ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body).map_err(|e| {
            MemoError::embedding(format!("Failed to parse embedding response: {} - body: {}", e, body))
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Embedding tokens used: {} (model: {})",
                usage.total_tokens,
                parsed.model.as_deref().unwrap_or(&self.model)
            );
        }

        let mut embeddings: Vec<(usize, Vec<f32>)> = parsed
            .data
            .into_iter()
            .map(|d| (d.index, d.embedding))
            .collect();
        embeddings.sort_by_key(|(idx, _)| *idx);

        if embeddings.len() != texts.len() {
            return Err(MemoError::embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings
            .into_iter()
            .map(|(_, mut e)| {
                normalize(&mut e);
                e
            })
            .collect())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self
            .embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoError::embedding("No embedding returned"))?;
        if embedding.is_empty() {
            return Err(MemoError::embedding("Provider returned an empty embedding"));
        }
        Ok(embedding)
    }

    fn nominal_dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use tokio::sync::OnceCell;
    use tracing::info;

    use super::{normalize, Embedder};
    use crate::config::DEFAULT_EMBED_DIM;
    use crate::error::{MemoError, Result};

    /// In-process all-MiniLM-L6-v2 (mean pooled, normalized), loaded on first use
    pub struct LocalEmbedder {
        model: OnceCell<Arc<Mutex<TextEmbedding>>>,
    }

    impl LocalEmbedder {
        pub fn new() -> Self {
            Self {
                model: OnceCell::new(),
            }
        }

        async fn model(&self) -> Result<Arc<Mutex<TextEmbedding>>> {
            let model = self
                .model
                .get_or_try_init(|| async {
                    info!("Loading local embedding model all-MiniLM-L6-v2");
                    let model = tokio::task::spawn_blocking(|| {
                        TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
                    })
                    .await
                    .map_err(|e| MemoError::embedding(format!("Model loader panicked: {}", e)))?
                    .map_err(|e| {
                        MemoError::embedding(format!("Failed to load embedding model: {}", e))
                    })?;
                    Ok::<_, MemoError>(Arc::new(Mutex::new(model)))
                })
                .await?;
            Ok(model.clone())
        }
    }

    impl Default for LocalEmbedder {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Embedder for LocalEmbedder {
        async fn ensure_ready(&self) -> Result<()> {
            self.model().await.map(|_| ())
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let model = self.model().await?;
            let text = text.to_string();

            // Inference is CPU bound, keep it off the runtime workers
            let mut embedding = tokio::task::spawn_blocking(move || {
                let mut guard = model
                    .lock()
                    .map_err(|_| MemoError::embedding("Embedding model lock poisoned"))?;
                guard
                    .embed(vec![text], None)
                    .map_err(|e| MemoError::embedding(format!("Embedding failed: {}", e)))?
                    .into_iter()
                    .next()
                    .ok_or_else(|| MemoError::embedding("No embedding returned"))
            })
            .await
            .map_err(|e| MemoError::embedding(format!("Embedding task panicked: {}", e)))??;

            normalize(&mut embedding);
            Ok(embedding)
        }

        fn nominal_dimension(&self) -> usize {
            DEFAULT_EMBED_DIM
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_creation() {
        let service = EmbeddingService::new("http://localhost:8080/v1/", "mini", None, 384);
        assert_eq!(service.base_url(), "http://localhost:8080/v1");
        assert_eq!(service.model(), "mini");
        assert_eq!(service.nominal_dimension(), 384);
    }

    #[test]
    fn test_from_config() {
        let config = MemoConfig::default();
        let service = EmbeddingService::from_config(&config);
        assert_eq!(service.model(), config.embed_model);
        assert_eq!(service.nominal_dimension(), config.embed_dim);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let service = EmbeddingService::new("http://localhost:8080/v1", "mini", None, 384);
        let result = service.embed_batch(&[]).await;
        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_embedding_error() {
        // Port 9 (discard) is not an HTTP server
        let service = EmbeddingService::new("http://127.0.0.1:9/v1", "mini", None, 384);
        let result = service.embed("hello").await;
        assert!(matches!(result, Err(MemoError::Embedding(_))));
    }

    // Downloads the model on first run
    #[cfg(feature = "local-embeddings")]
    #[tokio::test(flavor = "current_thread")]
    #[ignore]
    async fn test_local_inference_leaves_runtime_free() {
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::sync::Arc;

        let embedder = LocalEmbedder::new();
        embedder.ensure_ready().await.unwrap();

        let ticks = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicBool::new(false));
        let ticker = {
            let ticks = ticks.clone();
            let done = done.clone();
            tokio::spawn(async move {
                while !done.load(Ordering::SeqCst) {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        let text = "Paris is the capital of France. ".repeat(20);
        let embedding = embedder.embed(&text).await.unwrap();
        done.store(true, Ordering::SeqCst);
        ticker.await.unwrap();

        assert_eq!(embedding.len(), 384);
        // Single worker thread: the ticker only runs if inference yielded it
        assert!(ticks.load(Ordering::SeqCst) > 0);
    }
}
