//! Per-key in-flight tracking.
//!
//! Used to reject a second toggle or submit while the first is still running.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

/// Set of keys with an operation in progress.
#[derive(Debug)]
pub struct InFlight<K> {
    keys: Arc<Mutex<HashSet<K>>>,
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl<K> Clone for InFlight<K> {
    fn clone(&self) -> Self {
        Self {
            keys: Arc::clone(&self.keys),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as in flight.
    ///
    /// Returns `None` if it already is. The key is released when the guard drops.
    #[must_use]
    pub fn try_acquire(&self, key: K) -> Option<InFlightGuard<K>> {
        let inserted = self
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());

        inserted.then(|| InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct InFlightGuard<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
    key: K,
}

impl<K: Eq + Hash> Drop for InFlightGuard<K> {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
