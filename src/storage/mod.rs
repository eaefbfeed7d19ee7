//! Durable key-value storage for small string blobs.
//!
//! Every component persists through the `KeyValueStore` trait. Writes issued
//! by the shell are fire-and-forget: `best_effort` runs them and drops any
//! failure after logging it, so storage problems never reach the user or block
//! a navigation decision.

pub mod file;
pub mod keys;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Failures from the persistence layer. Always recovered locally.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored payload is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Async string-to-string store.
/// Implementations must give upsert semantics for `set` and treat removing a
/// missing key as success.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Read several keys at once. Missing keys come back as `None`.
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }
}

/// A pending write produced by a state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOp {
    Set { key: String, value: String },
    Remove { key: String },
}

impl StoreOp {
    pub fn set(key: &str, value: impl Into<String>) -> Self {
        StoreOp::Set {
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn remove(key: &str) -> Self {
        StoreOp::Remove {
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StoreOp::Set { key, .. } | StoreOp::Remove { key } => key,
        }
    }
}

/// Execute a write against the store.
pub async fn apply(store: &dyn KeyValueStore, op: &StoreOp) -> Result<(), StorageError> {
    match op {
        StoreOp::Set { key, value } => store.set(key, value).await,
        StoreOp::Remove { key } => store.remove(key).await,
    }
}

/// Execute a write and swallow any failure.
pub async fn best_effort(store: &dyn KeyValueStore, op: StoreOp) {
    if let Err(e) = apply(store, &op).await {
        tracing::warn!("Ignoring failed write to {}: {}", op.key(), e);
    }
}

/// Read a key, treating any failure as absence.
pub async fn read_or_none(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Ignoring failed read of {}: {}", key, e);
            None
        }
    }
}
