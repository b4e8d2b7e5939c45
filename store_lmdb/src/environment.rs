//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::state::LmdbStateStore;
use crate::LmdbError;

/// Name of the database holding every state record.
const STATE_DB: &str = "state";

/// Wraps the LMDB environment and its database handles.
pub struct LmdbEnvironment {
    env: Env,
    state_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path by this process and
        // the directory is not shared with another LMDB user.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let state_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(STATE_DB))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self { env, state_db })
    }

    /// The state store backed by this environment.
    pub fn state_store(&self) -> LmdbStateStore {
        LmdbStateStore::new(self.env.clone(), self.state_db.clone())
    }
}
