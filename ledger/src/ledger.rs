//! The ledger: a state store plus transaction entry points.

use serde::de::DeserializeOwned;

use ouro_store::StateStore;
use ouro_types::Address;

use crate::{LedgerError, Transaction};

/// Owns a [`StateStore`] and runs all-or-nothing transactions against it.
pub struct Ledger<S: StateStore> {
    store: S,
}

impl<S: StateStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a transaction. It takes effect only when committed.
    pub fn begin(&self) -> Transaction<'_, S> {
        Transaction::new(&self.store)
    }

    /// Run `f` in a fresh transaction and commit it if `f` succeeds.
    ///
    /// An error from `f` discards every staged write. A commit conflict
    /// surfaces as `E::from(LedgerError::Conflict { .. })`; nothing is retried.
    pub fn transact<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_, S>) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut txn = self.begin();
        let output = f(&mut txn)?;
        txn.commit()?;
        Ok(output)
    }

    /// Read a single committed record outside any transaction.
    pub fn read<T: DeserializeOwned>(&self, key: &Address) -> Result<Option<T>, LedgerError> {
        self.begin().load(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ouro_nullables::NullStore;

    #[derive(Debug)]
    enum TestError {
        Ledger(LedgerError),
        Rejected,
    }

    impl From<LedgerError> for TestError {
        fn from(e: LedgerError) -> Self {
            TestError::Ledger(e)
        }
    }

    #[test]
    fn transact_commits_on_success() {
        let ledger = Ledger::new(NullStore::new());
        let key = Address::from_seed(1);
        let out: Result<u8, TestError> = ledger.transact(|txn| {
            txn.store(&key, &7u32)?;
            Ok(3)
        });
        assert_eq!(out.unwrap(), 3);
        assert_eq!(ledger.read::<u32>(&key).unwrap(), Some(7));
    }

    #[test]
    fn transact_discards_on_error() {
        let ledger = Ledger::new(NullStore::new());
        let key = Address::from_seed(1);
        let out: Result<(), TestError> = ledger.transact(|txn| {
            txn.store(&key, &7u32)?;
            Err(TestError::Rejected)
        });
        assert!(matches!(out, Err(TestError::Rejected)));
        assert_eq!(ledger.read::<u32>(&key).unwrap(), None);
        assert!(ledger.store().is_empty().unwrap());
    }

    #[test]
    fn transact_surfaces_conflicts() {
        let ledger = Ledger::new(NullStore::new());
        let key = Address::from_seed(1);
        let out: Result<(), TestError> = ledger.transact(|txn| {
            let _ = txn.load::<u32>(&key)?;
            // A concurrent writer commits between our read and our commit.
            let mut other = Transaction::new(ledger.store());
            other.store(&key, &1u32)?;
            other.commit()?;
            txn.store(&key, &2u32)?;
            Ok(())
        });
        assert!(matches!(
            out,
            Err(TestError::Ledger(LedgerError::Conflict { .. }))
        ));
        assert_eq!(ledger.read::<u32>(&key).unwrap(), Some(1));
    }
}
