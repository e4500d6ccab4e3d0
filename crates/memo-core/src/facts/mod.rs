// ============================================================================
// FactStore — Embedded Database (redb)
// ============================================================================
// Exact-recall key/value facts. One table, key = fact key, value = bincode
// encoded `Fact`. Default path: ~/.memo/facts.redb (override via FACTS_DB_PATH)
// ============================================================================

pub mod types;

pub use types::Fact;

use redb::{Database, TableDefinition};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{MemoError, Result};

const FACTS: TableDefinition<&str, &[u8]> = TableDefinition::new("facts");

/// Embedded fact database
pub struct FactStore {
    db: Database,
    path: PathBuf,
}

impl FactStore {
    /// Open (or create) the database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening fact database at: {}", db_path.display());

        let db = Database::create(&db_path)
            .map_err(|e| MemoError::storage(format!("Failed to open database: {}", e)))?;

        // Ensure the table exists by doing a write transaction
        let write_txn = db
            .begin_write()
            .map_err(|e| MemoError::storage(format!("Failed to begin write: {}", e)))?;
        {
            let _ = write_txn
                .open_table(FACTS)
                .map_err(|e| MemoError::storage(format!("Failed to create facts table: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| MemoError::storage(format!("Failed to commit init: {}", e)))?;

        Ok(Self { db, path: db_path })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store or overwrite a fact
    pub fn remember(&self, key: &str, value: &str) -> Result<Fact> {
        validate_key(key)?;
        let fact = Fact::now(value);
        let encoded = bincode::serialize(&fact)?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| MemoError::storage(format!("Failed to begin write: {}", e)))?;
        {
            let mut table = write_txn
                .open_table(FACTS)
                .map_err(|e| MemoError::storage(format!("Failed to open facts table: {}", e)))?;
            table
                .insert(key, encoded.as_slice())
                .map_err(|e| MemoError::storage(format!("Failed to insert fact: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| MemoError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Stored fact: {}", key);
        Ok(fact)
    }

    pub fn recall(&self, key: &str) -> Result<Option<Fact>> {
        validate_key(key)?;

        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| MemoError::storage(format!("Failed to begin read: {}", e)))?;
        let table = read_txn
            .open_table(FACTS)
            .map_err(|e| MemoError::storage(format!("Failed to open facts table: {}", e)))?;

        match table
            .get(key)
            .map_err(|e| MemoError::storage(format!("Failed to get fact: {}", e)))?
        {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }

    /// Delete a fact. Returns whether it existed; missing keys are not an error.
    pub fn forget(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| MemoError::storage(format!("Failed to begin write: {}", e)))?;
        let removed;
        {
            let mut table = write_txn
                .open_table(FACTS)
                .map_err(|e| MemoError::storage(format!("Failed to open facts table: {}", e)))?;
            removed = table
                .remove(key)
                .map_err(|e| MemoError::storage(format!("Failed to remove fact: {}", e)))?
                .is_some();
        }
        write_txn
            .commit()
            .map_err(|e| MemoError::storage(format!("Failed to commit delete: {}", e)))?;

        if removed {
            debug!("Deleted fact: {}", key);
        }
        Ok(removed)
    }

    /// All facts, ordered by key
    pub fn list(&self) -> Result<BTreeMap<String, Fact>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| MemoError::storage(format!("Failed to begin read: {}", e)))?;
        let table = read_txn
            .open_table(FACTS)
            .map_err(|e| MemoError::storage(format!("Failed to open facts table: {}", e)))?;

        let mut results = BTreeMap::new();
        let iter = table
            .range::<&str>(..)
            .map_err(|e| MemoError::storage(format!("Failed to iterate facts: {}", e)))?;
        for entry in iter {
            let (key, value) =
                entry.map_err(|e| MemoError::storage(format!("Failed to read entry: {}", e)))?;
            let fact: Fact = bincode::deserialize(value.value())?;
            results.insert(key.value().to_string(), fact);
        }
        Ok(results)
    }

    /// Write a JSON export of every fact next to the database.
    /// Returns the checkpoint file path.
    pub fn checkpoint(&self) -> Result<PathBuf> {
        let facts = self.list()?;
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join("checkpoints");
        std::fs::create_dir_all(&dir)?;

        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let file = dir.join(format!("facts-{}.json", stamp));
        std::fs::write(&file, serde_json::to_vec_pretty(&facts)?)?;

        info!("Checkpointed {} facts to {}", facts.len(), file.display());
        Ok(file)
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(MemoError::invalid_input("fact key must not be empty"));
    }
    Ok(())
}
