//! In-process `KeyValueStore`.

use super::{DbError, DbResult, KeyValueStore};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Volatile store with the same byte-level contract as `LevelDbStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values().map_or(0, |values| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn values(&self) -> DbResult<MutexGuard<'_, BTreeMap<Vec<u8>, Vec<u8>>>> {
        self.values.lock().map_err(|_| DbError::Backend {
            operation: "lock",
            message: "memory store mutex poisoned".to_string(),
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        Ok(self.values()?.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> DbResult<()> {
        self.values()?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
