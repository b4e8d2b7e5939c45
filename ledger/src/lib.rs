//! Transactional state ledger.
//!
//! Every protocol operation runs inside one [`Transaction`]: reads go to the
//! versioned [`StateStore`](ouro_store::StateStore) and are remembered with
//! their version, writes are buffered in an overlay, and commit is a single
//! compare-and-swap. Two transactions that touch the same record cannot both
//! commit; the second one fails with [`LedgerError::Conflict`].
//!
//! The [`token`] module layers mints and token accounts on top, so balance
//! movements join the same atomic transaction as the state they accompany.

pub mod error;
pub mod ledger;
pub mod token;
pub mod transaction;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use token::{mint_address, token_account_address, Mint, TokenAccount};
pub use transaction::Transaction;
