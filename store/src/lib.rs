//! Abstract storage traits for the Ouroboros ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements
//! [`StateStore`]. The rest of the codebase depends only on the trait.
//!
//! The store is a flat map from [`Address`](ouro_types::Address) to a
//! versioned byte value. Version 0 means "absent"; every committed write bumps
//! the key's version by one. Commits are compare-and-swap: a
//! [`CommitBatch`] carries the version the transaction observed for every key
//! it read or wrote, and the backend applies it only if none of them moved.

pub mod batch;
pub mod error;

pub use batch::{CommitBatch, Versioned};
pub use error::StoreError;

use ouro_types::Address;

/// A versioned key/value store with atomic compare-and-swap commits.
pub trait StateStore: Send + Sync {
    /// Read the current value and version of `key`.
    fn get(&self, key: &Address) -> Result<Option<Versioned>, StoreError>;

    /// Atomically validate every expected version in `batch` and apply its writes.
    ///
    /// Returns [`StoreError::Conflict`] without applying anything if any
    /// expected version differs from the stored one.
    fn commit(&self, batch: CommitBatch) -> Result<(), StoreError>;

    /// Number of records currently stored.
    fn len(&self) -> Result<u64, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
