//! ============================================================================
//! Note Store - Markdown documents organized in folders
//! ============================================================================
//! Layout: `<base>/<folder>/<name>.md`. Folder and name are caller supplied,
//! so both are restricted to plain path components before touching disk.
//! ============================================================================

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{MemoError, Result};

const NOTE_EXTENSION: &str = "md";

/// File-backed note memory
#[derive(Debug, Clone)]
pub struct NoteStore {
    base: PathBuf,
}

impl NoteStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Create or replace a note
    pub async fn write(&self, folder: &str, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.note_path(folder, name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        debug!("Note saved: {}", path.display());
        Ok(path)
    }

    /// Read a note; missing notes are `None`
    pub async fn read(&self, folder: &str, name: &str) -> Result<Option<String>> {
        let path = self.note_path(folder, name)?;
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Note names in a folder, sorted, without extension. Missing folder is empty.
    pub async fn list(&self, folder: &str) -> Result<Vec<String>> {
        let dir = self.folder_path(folder)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(NOTE_EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a note. Returns whether it existed; missing notes are not an error.
    pub async fn delete(&self, folder: &str, name: &str) -> Result<bool> {
        let path = self.note_path(folder, name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn folder_path(&self, folder: &str) -> Result<PathBuf> {
        let relative = Path::new(folder);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(MemoError::InvalidPath("Path traversal detected".into()));
        }
        Ok(self.base.join(relative))
    }

    fn note_path(&self, folder: &str, name: &str) -> Result<PathBuf> {
        let dir = self.folder_path(folder)?;
        let plain_name = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && matches!(
                Path::new(name).components().collect::<Vec<_>>().as_slice(),
                [Component::Normal(_)]
            );
        if !plain_name {
            return Err(MemoError::InvalidPath("Path traversal detected".into()));
        }
        Ok(dir.join(format!("{}.{}", name, NOTE_EXTENSION)))
    }
}
