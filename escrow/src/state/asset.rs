//! Per reward-asset ledgers.

use serde::{Deserialize, Serialize};

use ouro_types::{Address, RegistryId, Timestamp};

use crate::math::checked_add;
use crate::EscrowError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLedger {
    pub registry: RegistryId,
    pub mint: Address,
    /// Owner of the custody token account.
    pub authority: Address,
    /// Token account holding deposited rewards.
    pub custody: Address,
    /// Cumulative amount ever deposited.
    pub reward_height: u128,
    pub last_update: Timestamp,
    pub last_snapshot_index: u64,
}

impl AssetLedger {
    /// Record a deposit into period `index`.
    ///
    /// Fails with [`EscrowError::StaleSnapshot`] if a later period has
    /// already been opened.
    pub fn record_deposit(
        &mut self,
        index: u64,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), EscrowError> {
        if index < self.last_snapshot_index {
            return Err(EscrowError::StaleSnapshot(index));
        }
        self.reward_height = checked_add(self.reward_height, amount)?;
        self.last_snapshot_index = index;
        self.last_update = now;
        Ok(())
    }
}
