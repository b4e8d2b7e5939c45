//! Optimistic transaction overlay.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use ouro_store::{CommitBatch, StateStore, Versioned};
use ouro_types::Address;

use crate::LedgerError;

/// A unit of work against a [`StateStore`].
///
/// The first read of a key is fetched from the store and pinned: later reads
/// in the same transaction see the pinned value (or the transaction's own
/// write), never a concurrent commit. Dropping a transaction discards it.
pub struct Transaction<'a, S: StateStore + ?Sized> {
    store: &'a S,
    reads: BTreeMap<Address, Option<Versioned>>,
    writes: BTreeMap<Address, Vec<u8>>,
}

impl<'a, S: StateStore + ?Sized> Transaction<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
        }
    }

    fn observe(&mut self, key: &Address) -> Result<Option<&Versioned>, LedgerError> {
        if !self.reads.contains_key(key) {
            let value = self.store.get(key)?;
            self.reads.insert(*key, value);
        }
        Ok(self.reads.get(key).and_then(Option::as_ref))
    }

    fn raw(&mut self, key: &Address) -> Result<Option<Vec<u8>>, LedgerError> {
        if let Some(bytes) = self.writes.get(key) {
            return Ok(Some(bytes.clone()));
        }
        Ok(self.observe(key)?.map(|v| v.bytes.clone()))
    }

    /// Load and decode the record at `key`, if any.
    pub fn load<T: DeserializeOwned>(&mut self, key: &Address) -> Result<Option<T>, LedgerError> {
        match self.raw(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn exists(&mut self, key: &Address) -> Result<bool, LedgerError> {
        if self.writes.contains_key(key) {
            return Ok(true);
        }
        Ok(self.observe(key)?.is_some())
    }

    /// Stage a write of `value` at `key`.
    pub fn store<T: Serialize>(&mut self, key: &Address, value: &T) -> Result<(), LedgerError> {
        let bytes = bincode::serialize(value)?;
        self.observe(key)?;
        self.writes.insert(*key, bytes);
        Ok(())
    }

    /// Stage a write of a new record, failing with [`LedgerError::AlreadyExists`].
    pub fn create<T: Serialize>(&mut self, key: &Address, value: &T) -> Result<(), LedgerError> {
        if self.exists(key)? {
            return Err(LedgerError::AlreadyExists(*key));
        }
        self.store(key, value)
    }

    /// Validate every observed version and apply the writes atomically.
    pub fn commit(self) -> Result<(), LedgerError> {
        let mut batch = CommitBatch::new();
        for (key, value) in &self.reads {
            batch.expect(*key, value.as_ref().map(|v| v.version).unwrap_or(0));
        }
        for (key, bytes) in self.writes {
            let observed = batch.expected_version(&key).unwrap_or(0);
            batch.write(key, observed, bytes);
        }
        self.store.commit(batch)?;
        Ok(())
    }
}
