//! ============================================================================
//! Error Types - Structured failures for all memory stores
//! ============================================================================
//! The core never renders errors for users; the command layer does.
//! ============================================================================

use thiserror::Error;

/// Result alias used across memo-core
pub type Result<T> = std::result::Result<T, MemoError>;

/// Errors produced by the semantic, fact and note stores
#[derive(Debug, Error)]
pub enum MemoError {
    /// Embedding provider failed or returned something unusable
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index service failed
    #[error("Vector index error: {0}")]
    Index(String),

    /// Collection creation raced with another creator
    #[error("Collection already exists: {0}")]
    CollectionExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Embedded fact database failure
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MemoError {
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True when a collection create hit an existing collection
    pub fn is_collection_exists(&self) -> bool {
        matches!(self, Self::CollectionExists(_))
    }
}

impl From<serde_json::Error> for MemoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for MemoError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
