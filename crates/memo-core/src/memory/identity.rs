//! Content-addressed point identities.
//!
//! The first 128 bits of the SHA-256 digest of the raw text, rendered as
//! lowercase hex in 8-4-4-4-12 groups. Identical text always maps to the same
//! point, so remembering twice overwrites instead of duplicating.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derive the point identity for a piece of text
pub fn memory_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    // Raw digest bytes, no version/variant bits rewritten
    Uuid::from_bytes(bytes).hyphenated().to_string()
}
