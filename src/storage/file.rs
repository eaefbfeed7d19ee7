//! File-backed store: one JSON object per state directory.
//!
//! Writes go to `state.json.tmp` first and are renamed into place, so a crash
//! mid-write leaves the previous state intact.

use crate::storage::{KeyValueStore, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const STATE_FILE: &str = "state.json";

/// Persistent store rooted in a directory (default `~/.focusshell`).
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store inside `dir`. The directory is created lazily on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STATE_FILE),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Current entries for a read-modify-write. An unparseable file is set
    /// aside as `state.json.corrupt` and replaced by the next write.
    async fn read_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all().await {
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(
                    "State file {} is corrupt ({}); starting fresh",
                    self.path.display(),
                    e
                );
                let backup = self.path.with_extension("json.corrupt");
                if let Err(e) = tokio::fs::copy(&self.path, &backup).await {
                    tracing::warn!("Could not keep a copy of the corrupt state file: {}", e);
                }
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_for_update().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let current = self.read_all().await;
        if matches!(current, Err(StorageError::Serialization(_))) {
            let entries = self.read_for_update().await?;
            return self.write_all(&entries).await;
        }
        let mut entries = current?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}
