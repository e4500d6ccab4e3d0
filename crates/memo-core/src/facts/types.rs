//! ============================================================================
//! Fact Types - Serializable records for redb storage
//! ============================================================================

use serde::{Deserialize, Serialize};

/// A single key/value fact with its last write time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub value: String,
    /// RFC 3339, UTC
    pub updated_at: String,
}

impl Fact {
    /// New fact stamped with the current time
    pub fn now(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            updated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}
