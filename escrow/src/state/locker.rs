//! Lockers: principal deposits that carry voting power.

use serde::{Deserialize, Serialize};

use ouro_types::{Address, RegistryId, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockerStatus {
    Locked,
    /// Principal returned; terminal.
    Withdrawn,
}

/// How a locker left the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Registry withdrawal count before this one.
    pub sequence: u64,
    /// Receipt holder that withdrew; fees still owed to the locker go here.
    pub holder: Address,
    pub at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locker {
    pub registry: RegistryId,
    pub id: Address,
    /// The principal that created the locker. Control follows the receipt.
    pub owner: Address,
    /// Position in creation order within the registry.
    pub serial: u64,
    pub amount: u128,
    pub votes: u128,
    pub created_at: Timestamp,
    pub unlock_timestamp: Timestamp,
    /// Payout account of the beneficiary the votes are cast for.
    pub beneficiary: Option<Address>,
    pub status: LockerStatus,
    pub withdrawal: Option<Withdrawal>,
}

impl Locker {
    pub fn is_withdrawn(&self) -> bool {
        self.status == LockerStatus::Withdrawn
    }

    pub fn is_unlocked(&self, now: Timestamp) -> bool {
        now >= self.unlock_timestamp
    }

    /// Seconds left until unlock, zero once unlocked.
    pub fn remaining_lock(&self, now: Timestamp) -> u64 {
        now.elapsed_since(self.unlock_timestamp)
    }
}
