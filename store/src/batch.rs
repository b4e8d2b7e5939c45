//! Versioned values and compare-and-swap commit batches.

use std::collections::BTreeMap;

use ouro_types::Address;
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// A stored value together with its write version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned {
    pub version: u64,
    pub bytes: Vec<u8>,
}

/// The read-set and write-set of one transaction, ready to commit.
///
/// Every written key also appears in `expected`, so a commit can never
/// overwrite a value the transaction did not observe.
#[derive(Clone, Debug, Default)]
pub struct CommitBatch {
    expected: BTreeMap<Address, u64>,
    writes: BTreeMap<Address, Vec<u8>>,
}

impl CommitBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the transaction observed `key` at `version` (0 = absent).
    ///
    /// The first observation wins; later calls for the same key are ignored.
    pub fn expect(&mut self, key: Address, version: u64) {
        self.expected.entry(key).or_insert(version);
    }

    /// Stage a write. `observed_version` is recorded if the key was not read before.
    pub fn write(&mut self, key: Address, observed_version: u64, bytes: Vec<u8>) {
        self.expect(key, observed_version);
        self.writes.insert(key, bytes);
    }

    pub fn writes(&self) -> impl Iterator<Item = (&Address, &Vec<u8>)> {
        self.writes.iter()
    }

    pub fn expected_version(&self, key: &Address) -> Option<u64> {
        self.expected.get(key).copied()
    }

    /// True if the batch writes nothing (a read-only transaction).
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Compare every expected version against the backend's current one.
    ///
    /// `current` returns the stored version of a key (0 if absent). Backends
    /// call this while holding their write lock.
    pub fn validate<F>(&self, mut current: F) -> Result<(), StoreError>
    where
        F: FnMut(&Address) -> Result<u64, StoreError>,
    {
        for (key, &expected) in &self.expected {
            let found = current(key)?;
            if found != expected {
                return Err(StoreError::Conflict {
                    key: *key,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_wins() {
        let key = Address::from_seed(1);
        let mut batch = CommitBatch::new();
        batch.expect(key, 3);
        batch.write(key, 7, vec![1]);
        assert_eq!(batch.expected_version(&key), Some(3));
    }

    #[test]
    fn validate_reports_the_moved_key() {
        let a = Address::from_seed(1);
        let b = Address::from_seed(2);
        let mut batch = CommitBatch::new();
        batch.expect(a, 1);
        batch.expect(b, 0);

        let err = batch
            .validate(|k| Ok(if *k == a { 1 } else { 4 }))
            .unwrap_err();
        match err {
            StoreError::Conflict { key, expected, found } => {
                assert_eq!(key, b);
                assert_eq!(expected, 0);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn read_only_batches_have_no_writes() {
        let mut batch = CommitBatch::new();
        batch.expect(Address::from_seed(9), 2);
        assert!(batch.is_read_only());
        batch.write(Address::from_seed(9), 2, vec![0]);
        assert!(!batch.is_read_only());
    }
}
