//! ============================================================================
//! Configuration - Environment-driven settings for all memory stores
//! ============================================================================
//! Values come from the process environment (optionally seeded from a .env
//! file). Every setting has a default so a bare `memo` run works against a
//! local Qdrant and embedding server.
//! ============================================================================

use std::path::PathBuf;

use crate::error::{MemoError, Result};

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION: &str = "memories";
pub const DEFAULT_EMBED_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_EMBED_API_URL: &str = "http://localhost:8080/v1";
/// Output size of all-MiniLM-L6-v2
pub const DEFAULT_EMBED_DIM: usize = 384;
pub const DEFAULT_NOTES_DIR: &str = "./agent_notes";

/// Runtime configuration for the memo service
#[derive(Debug, Clone)]
pub struct MemoConfig {
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub collection: String,
    pub embed_model: String,
    pub embed_api_url: String,
    pub embed_api_key: Option<String>,
    /// Nominal vector size; corrected at runtime if the provider disagrees
    pub embed_dim: usize,
    pub notes_dir: PathBuf,
    /// None means ~/.memo/facts.redb
    pub facts_db_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            qdrant_api_key: None,
            collection: DEFAULT_COLLECTION.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            embed_api_url: DEFAULT_EMBED_API_URL.to_string(),
            embed_api_key: None,
            embed_dim: DEFAULT_EMBED_DIM,
            notes_dir: PathBuf::from(DEFAULT_NOTES_DIR),
            facts_db_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl MemoConfig {
    /// Load a .env file if present, then read the environment
    pub fn load() -> Result<Self> {
        // A missing .env is normal
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Build a config from the current process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env, test maps)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let embed_dim = match get("EMBED_DIM") {
            Some(raw) => {
                let dim: usize = raw
                    .trim()
                    .parse()
                    .map_err(|e| MemoError::Config(format!("EMBED_DIM '{}': {}", raw, e)))?;
                if dim == 0 {
                    return Err(MemoError::Config("EMBED_DIM must be positive".into()));
                }
                dim
            }
            None => defaults.embed_dim,
        };

        let log_level = match get("LOG_LEVEL") {
            Some(level) => {
                let level = level.to_lowercase();
                if !matches!(level.as_str(), "debug" | "info" | "warn" | "error") {
                    return Err(MemoError::Config(format!(
                        "LOG_LEVEL '{}' (expected debug, info, warn or error)",
                        level
                    )));
                }
                level
            }
            None => defaults.log_level,
        };

        Ok(Self {
            qdrant_url: get("QDRANT_URL").unwrap_or(defaults.qdrant_url),
            qdrant_api_key: get("QDRANT_API_KEY"),
            collection: get("QDRANT_COLLECTION").unwrap_or(defaults.collection),
            embed_model: get("EMBED_MODEL").unwrap_or(defaults.embed_model),
            embed_api_url: get("EMBED_API_URL").unwrap_or(defaults.embed_api_url),
            embed_api_key: get("EMBED_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            embed_dim,
            notes_dir: get("NOTES_DIR").map(PathBuf::from).unwrap_or(defaults.notes_dir),
            facts_db_path: get("FACTS_DB_PATH").map(PathBuf::from),
            log_level,
        })
    }

    /// Resolve the fact database path, creating ~/.memo when defaulted
    pub fn resolve_facts_db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.facts_db_path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| MemoError::Config("Cannot determine home directory".into()))?;
        let memo_dir = home.join(".memo");
        std::fs::create_dir_all(&memo_dir)?;
        Ok(memo_dir.join("facts.redb"))
    }
}
