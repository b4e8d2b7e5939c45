//! LMDB implementation of StateStore.

use heed::types::Bytes;
use heed::{Database, Env};

use ouro_store::{CommitBatch, StateStore, StoreError, Versioned};
use ouro_types::Address;

use crate::LmdbError;

pub struct LmdbStateStore {
    env: Env,
    state_db: Database<Bytes, Bytes>,
}

impl LmdbStateStore {
    pub(crate) fn new(env: Env, state_db: Database<Bytes, Bytes>) -> Self {
        Self { env, state_db }
    }
}

fn decode(bytes: &[u8]) -> Result<Versioned, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

impl StateStore for LmdbStateStore {
    fn get(&self, key: &Address) -> Result<Option<Versioned>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = self
            .state_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        match value {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    fn commit(&self, batch: CommitBatch) -> Result<(), StoreError> {
        // LMDB allows a single writer, so validating inside the write
        // transaction makes the compare-and-swap atomic.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let state_db = &self.state_db;
        batch.validate(|key| {
            let current = state_db
                .get(&wtxn, key.as_bytes())
                .map_err(LmdbError::from)?;
            match current {
                Some(bytes) => Ok(decode(bytes)?.version),
                None => Ok(0),
            }
        })?;

        if batch.is_read_only() {
            return Ok(());
        }

        for (key, bytes) in batch.writes() {
            let version = match state_db
                .get(&wtxn, key.as_bytes())
                .map_err(LmdbError::from)?
            {
                Some(existing) => decode(existing)?.version + 1,
                None => 1,
            };
            let encoded = bincode::serialize(&Versioned {
                version,
                bytes: bytes.clone(),
            })
            .map_err(LmdbError::from)?;
            state_db
                .put(&mut wtxn, key.as_bytes(), &encoded)
                .map_err(LmdbError::from)?;
        }

        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!("committed state batch");
        Ok(())
    }

    fn len(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.state_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;

    fn open() -> (tempfile::TempDir, LmdbStateStore) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 4, 10 * 1024 * 1024).unwrap();
        (dir, env.state_store())
    }

    #[test]
    fn put_and_read_back() {
        let (_dir, store) = open();
        let key = Address::from_seed(1);

        let mut batch = CommitBatch::new();
        batch.write(key, 0, vec![1, 2, 3]);
        store.commit(batch).unwrap();

        let value = store.get(&key).unwrap().unwrap();
        assert_eq!(value.version, 1);
        assert_eq!(value.bytes, vec![1, 2, 3]);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn stale_commit_is_rejected() {
        let (_dir, store) = open();
        let key = Address::from_seed(1);

        let mut first = CommitBatch::new();
        first.write(key, 0, vec![1]);
        store.commit(first).unwrap();

        let mut stale = CommitBatch::new();
        stale.write(key, 0, vec![2]);
        let err = store.commit(stale).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { found: 1, .. }));
        assert_eq!(store.get(&key).unwrap().unwrap().bytes, vec![1]);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = Address::from_seed(7);
        {
            let env = LmdbEnvironment::open(dir.path(), 4, 10 * 1024 * 1024).unwrap();
            let store = env.state_store();
            let mut batch = CommitBatch::new();
            batch.write(key, 0, vec![9]);
            store.commit(batch).unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 4, 10 * 1024 * 1024).unwrap();
        let value = env.state_store().get(&key).unwrap().unwrap();
        assert_eq!(value.bytes, vec![9]);
    }
}
