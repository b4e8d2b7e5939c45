//! Per-period reward snapshots.

use serde::{Deserialize, Serialize};

use ouro_types::{Address, RegistryId, Timestamp};

use crate::math::{checked_add, ratio};
use crate::state::Locker;
use crate::EscrowError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub registry: RegistryId,
    pub mint: Address,
    pub index: u64,
    /// Registry total votes when the period's first deposit arrived.
    pub votes: u128,
    /// Rewards deposited during the period.
    pub rewards: u128,
    pub created_at: Timestamp,
    /// Registry locker count when `votes` was captured.
    pub lockers_at_capture: u64,
    /// Registry withdrawal count when `votes` was captured.
    pub withdrawals_at_capture: u64,
}

impl Snapshot {
    pub fn add_rewards(&mut self, amount: u128) -> Result<(), EscrowError> {
        self.rewards = checked_add(self.rewards, amount)?;
        Ok(())
    }

    /// Whether the locker with `serial` was counted in `votes`.
    pub fn covers(&self, serial: u64) -> bool {
        serial < self.lockers_at_capture
    }

    /// Votes of `locker` included in `votes`, or `None` if it was withdrawn
    /// before the capture or created after it.
    pub fn captured_votes(&self, locker: &Locker) -> Option<u128> {
        if !self.covers(locker.serial) {
            return None;
        }
        match locker.withdrawal {
            None => Some(locker.votes),
            Some(withdrawal) if withdrawal.sequence >= self.withdrawals_at_capture => {
                Some(locker.amount)
            }
            Some(_) => None,
        }
    }

    /// `votes * rewards / self.votes`, floored.
    pub fn share_of(&self, votes: u128) -> Result<u128, EscrowError> {
        if self.votes == 0 {
            return Err(EscrowError::StaleSnapshot(self.index));
        }
        ratio(&[votes, self.rewards], &[self.votes])
    }
}
