//! Nullable store: a thread-safe in-memory state store for testing.

use ouro_store::{CommitBatch, StateStore, StoreError, Versioned};
use ouro_types::Address;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// An in-memory versioned store.
///
/// Commits validate and apply under a single lock, so concurrent
/// transactions observe the same compare-and-swap semantics as LMDB.
#[derive(Debug, Default)]
pub struct NullStore {
    records: Mutex<HashMap<Address, Versioned>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<Address, Versioned>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }

    /// Current version of `key` (0 if absent). Test helper.
    pub fn version_of(&self, key: &Address) -> u64 {
        self.records()
            .ok()
            .and_then(|r| r.get(key).map(|v| v.version))
            .unwrap_or(0)
    }
}

impl StateStore for NullStore {
    fn get(&self, key: &Address) -> Result<Option<Versioned>, StoreError> {
        Ok(self.records()?.get(key).cloned())
    }

    fn commit(&self, batch: CommitBatch) -> Result<(), StoreError> {
        let mut records = self.records()?;
        batch.validate(|key| Ok(records.get(key).map(|v| v.version).unwrap_or(0)))?;

        for (key, bytes) in batch.writes() {
            let version = records.get(key).map(|v| v.version).unwrap_or(0) + 1;
            records.insert(
                *key,
                Versioned {
                    version,
                    bytes: bytes.clone(),
                },
            );
        }
        Ok(())
    }

    fn len(&self) -> Result<u64, StoreError> {
        Ok(self.records()?.len() as u64)
    }
}
