//! Replay guards for fee collection.

use serde::{Deserialize, Serialize};

use ouro_types::{Address, Timestamp};

/// Proof that a locker collected a snapshot. Its existence is the guard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub locker: Address,
    pub mint: Address,
    pub snapshot_index: u64,
    pub amount: u128,
    pub claimed_at: Timestamp,
}
