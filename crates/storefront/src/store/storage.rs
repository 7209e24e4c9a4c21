//! Key-value storage port used by the shopper stores.
//!
//! Reads and writes are synchronous. Implementations use interior mutability
//! so stores can share one handle.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised by a [`Storage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would exceed the backend's size limit.
    #[error("storage quota exceeded writing '{key}' ({size} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },

    /// The value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend cannot be used.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous string key-value storage.
pub trait Storage: Send + Sync {
    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be stored.
    fn write(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, optionally with a per-value size limit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unlimited storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage that rejects values larger than `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: Mutex::default(),
            quota: Some(limit),
        }
    }

    /// Raw value under `key`, for inspection.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        if let Some(limit) = self.quota
            && value.len() > limit
        {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                limit,
            });
        }

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Serialize `value` as JSON and write it under `key`.
///
/// Failures are logged and swallowed.
pub(crate) fn persist<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| storage.write(key, json));

    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Failed to persist state; keeping in-memory copy");
    }
}

/// Read and decode the JSON value under `key`.
///
/// Missing, unreadable, or corrupt values yield `None` (logged).
pub(crate) fn restore<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = match storage.read(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read persisted state");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding corrupt persisted state");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.read("cart").unwrap().is_none());

        storage.write("cart", "[]".to_string()).unwrap();
        assert_eq!(storage.read("cart").unwrap().as_deref(), Some("[]"));

        storage.remove("cart").unwrap();
        assert!(storage.read("cart").unwrap().is_none());
    }

    #[test]
    fn test_quota_rejects_large_values() {
        let storage = MemoryStorage::with_quota(4);
        storage.write("k", "1234".to_string()).unwrap();

        let err = storage.write("k", "12345".to_string()).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { size: 5, limit: 4, .. }));
        assert_eq!(storage.get("k").as_deref(), Some("1234"));
    }

    #[test]
    fn test_persist_swallows_errors() {
        let storage = MemoryStorage::with_quota(1);
        persist(&storage, "k", &vec![1, 2, 3]);
        assert!(storage.get("k").is_none());
    }

    #[test]
    fn test_restore_discards_corrupt_values() {
        let storage = MemoryStorage::new();
        storage.write("k", "{not json".to_string()).unwrap();
        assert!(restore::<Vec<u32>>(&storage, "k").is_none());

        storage.write("k", "[1,2]".to_string()).unwrap();
        assert_eq!(restore::<Vec<u32>>(&storage, "k"), Some(vec![1, 2]));
    }
}
