//! Beneficiaries: recipients of emission, weighted by the votes cast for them.

use serde::{Deserialize, Serialize};

use ouro_types::{Address, RegistryId, Timestamp, EMISSION_PRECISION, SCALE};

use crate::math::{checked_add, ratio};
use crate::state::Registry;
use crate::EscrowError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub registry: RegistryId,
    pub payout: Address,
    pub votes: u128,
    /// Weight accrued since the last successful claim.
    pub weight: u128,
    pub last_update: Timestamp,
    /// Registry emission index at the last settlement.
    pub emission_checkpoint: u128,
    /// Emission earned but not yet minted.
    pub pending_emission: u128,
    pub total_claimed: u128,
}

impl Beneficiary {
    pub fn new(registry: &Registry, payout: Address, now: Timestamp) -> Self {
        Self {
            registry: registry.id,
            payout,
            votes: 0,
            weight: 0,
            last_update: now,
            emission_checkpoint: registry.emission_per_vote,
            pending_emission: 0,
            total_claimed: 0,
        }
    }

    /// Accrue weight and emission up to `now`.
    ///
    /// `registry` must already be accrued to `now`. The only place weight
    /// changes apart from the claim reset.
    pub fn settle(&mut self, registry: &Registry, now: Timestamp) -> Result<(), EscrowError> {
        let elapsed = self.last_update.elapsed_since(now);
        if elapsed > 0 && self.votes > 0 {
            let gained = ratio(
                &[self.votes, elapsed as u128, registry.time_multiplier as u128],
                &[SCALE],
            )?;
            self.weight = checked_add(self.weight, gained)?;
        }

        let index_delta = registry
            .emission_per_vote
            .saturating_sub(self.emission_checkpoint);
        if index_delta > 0 && self.votes > 0 {
            let earned = ratio(&[self.votes, index_delta], &[EMISSION_PRECISION])?;
            self.pending_emission = checked_add(self.pending_emission, earned)?;
        }

        self.emission_checkpoint = registry.emission_per_vote;
        if now > self.last_update {
            self.last_update = now;
        }
        Ok(())
    }

    /// Take the pending emission if any weight has been earned.
    ///
    /// Resets weight and pending emission on success. With zero weight
    /// nothing is paid and pending emission is kept.
    pub fn take_claimable(&mut self) -> Result<u128, EscrowError> {
        if self.weight == 0 {
            return Ok(0);
        }
        let amount = self.pending_emission;
        self.total_claimed = checked_add(self.total_claimed, amount)?;
        self.pending_emission = 0;
        self.weight = 0;
        Ok(amount)
    }
}
