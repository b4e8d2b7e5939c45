//! LMDB storage backend for the Ouroboros ledger.
//!
//! Implements [`StateStore`](ouro_store::StateStore) using the `heed` LMDB
//! bindings. All state records live in one named database inside a single
//! environment; each value is a bincode-encoded
//! [`Versioned`](ouro_store::Versioned).

pub mod environment;
pub mod error;
pub mod state;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use state::LmdbStateStore;
