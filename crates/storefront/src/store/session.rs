//! [`Storage`] staged over a tower-sessions [`Session`].
//!
//! The session API is async while stores persist synchronously, so values are
//! loaded up front, mutated in memory, and written back with [`SessionStorage::flush`]
//! once the handler is done.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use tower_sessions::Session;

use crate::store::storage::{Storage, StorageError};

#[derive(Debug, Default)]
struct Staged {
    values: HashMap<String, String>,
    dirty: HashSet<String>,
}

/// Session-backed storage for one request.
#[derive(Debug, Default)]
pub struct SessionStorage {
    staged: Mutex<Staged>,
}

impl SessionStorage {
    /// Stage the current session values under `keys`.
    ///
    /// Keys that cannot be read start out absent.
    pub async fn load(session: &Session, keys: &[&str]) -> Self {
        let mut values = HashMap::with_capacity(keys.len());

        for &key in keys {
            match session.get::<String>(key).await {
                Ok(Some(value)) => {
                    values.insert(key.to_string(), value);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(key, error = %e, "Failed to read session value");
                }
            }
        }

        Self {
            staged: Mutex::new(Staged {
                values,
                dirty: HashSet::new(),
            }),
        }
    }

    /// Write changed keys back to `session`.
    ///
    /// Failures are logged; the request still succeeds.
    pub async fn flush(&self, session: &Session) {
        let pending: Vec<(String, Option<String>)> = {
            let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
            let dirty = std::mem::take(&mut staged.dirty);
            dirty
                .into_iter()
                .map(|key| {
                    let value = staged.values.get(&key).cloned();
                    (key, value)
                })
                .collect()
        };

        for (key, value) in pending {
            let result = match value {
                Some(value) => session.insert(&key, value).await,
                None => session.remove::<String>(&key).await.map(|_| ()),
            };

            if let Err(e) = result {
                tracing::warn!(key = %key, error = %e, "Failed to write session value");
            }
        }
    }

    /// Whether there are writes not yet flushed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dirty
            .is_empty()
    }
}

impl Storage for SessionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values
            .get(key)
            .cloned())
    }

    fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        staged.values.insert(key.to_string(), value);
        staged.dirty.insert(key.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        staged.values.remove(key);
        staged.dirty.insert(key.to_string());
        Ok(())
    }
}
