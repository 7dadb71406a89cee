//! Store implementation
//!
//! HashMap-based table with RwLock for concurrency.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

/// In-memory key-value table
///
/// ## Concurrency:
/// - `get`, `len`: shared read lock, many in parallel
/// - `set`, `delete`, `flush`, `mset`: exclusive write lock
/// - No method holds the lock across anything but the map operation
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<HashMap<String, Bytes>>,
}

impl Store {
    /// Create a new empty Store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.data.read().get(key).cloned()
    }

    /// Insert or overwrite a key (write lock)
    ///
    /// Always succeeds; returns the number of keys written (1).
    pub fn set(&self, key: String, value: Bytes) -> usize {
        self.data.write().insert(key, value);
        1
    }

    /// Remove a key (write lock)
    ///
    /// Returns 1 if the key existed, 0 otherwise.
    pub fn delete(&self, key: &str) -> usize {
        match self.data.write().remove(key) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// Remove every key (write lock)
    ///
    /// Returns the number of entries present before the flush.
    pub fn flush(&self) -> usize {
        let old = std::mem::take(&mut *self.data.write());
        // Old map is dropped outside the critical section
        old.len()
    }

    /// Apply every pair in order under one write lock
    ///
    /// Later pairs win over earlier ones with the same key. Returns the
    /// number of pairs written.
    pub fn mset(&self, pairs: Vec<(String, Bytes)>) -> usize {
        let written = pairs.len();
        let mut data = self.data.write();
        for (key, value) in pairs {
            data.insert(key, value);
        }
        written
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}
