//! The registry: protocol parameters, vote totals and the emission index.

use serde::{Deserialize, Serialize};

use ouro_types::{Address, RegistryId, RegistryParams, Timestamp, EMISSION_PRECISION, SCALE};

use crate::math::{checked_add, ratio};
use crate::EscrowError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub id: RegistryId,
    pub creator: Address,
    /// Mint authority of the native token.
    pub authority: Address,
    pub native_mint: Address,

    /// Σ votes of all lockers.
    pub total_votes: u128,
    /// Σ votes of all beneficiaries (locked votes that have been cast).
    pub directed_votes: u128,
    /// Lockers created so far; the next locker's serial.
    pub locker_count: u64,
    /// Lockers withdrawn so far; the next withdrawal's sequence.
    pub withdrawal_count: u64,

    pub period_length: u64,
    pub start_timestamp: Timestamp,
    pub expansion_rate: u64,
    pub time_multiplier: u64,

    /// Start of the current emission period.
    pub last_period_timestamp: Timestamp,
    /// Emission budget of the current period.
    pub period_emission: u128,
    /// Cumulative emission per directed vote, scaled by `EMISSION_PRECISION`.
    pub emission_per_vote: u128,
    /// Emission and weight have been allocated up to this instant.
    pub last_accrual: Timestamp,
    /// Weight accrued by all beneficiaries since `start_timestamp`.
    pub total_weight: u128,
    /// Emission minted to beneficiaries so far.
    pub total_emitted: u128,
}

impl Registry {
    pub fn new(
        id: RegistryId,
        creator: Address,
        authority: Address,
        native_mint: Address,
        params: &RegistryParams,
    ) -> Result<Self, EscrowError> {
        Ok(Self {
            id,
            creator,
            authority,
            native_mint,
            total_votes: 0,
            directed_votes: 0,
            locker_count: 0,
            withdrawal_count: 0,
            period_length: params.period_length,
            start_timestamp: params.start_timestamp,
            expansion_rate: params.expansion_rate,
            time_multiplier: params.time_multiplier,
            last_period_timestamp: params.start_timestamp,
            period_emission: ratio(
                &[params.initial_supply, params.expansion_rate as u128],
                &[SCALE],
            )?,
            emission_per_vote: 0,
            last_accrual: params.start_timestamp,
            total_weight: 0,
            total_emitted: 0,
        })
    }

    pub fn period_end(&self) -> Result<Timestamp, EscrowError> {
        self.last_period_timestamp
            .checked_add_secs(self.period_length)
            .ok_or(EscrowError::ArithmeticOverflow)
    }

    /// Native supply not held in locker vaults.
    pub fn circulating_supply(&self, native_supply: u128) -> u128 {
        native_supply.saturating_sub(self.total_votes)
    }

    /// Index of the period containing `now`, counted from `start_timestamp`.
    pub fn period_index_at(&self, now: Timestamp) -> u64 {
        self.start_timestamp.elapsed_since(now) / self.period_length
    }

    /// Emission budget `native_supply` would support right now.
    pub fn circulating_budget(&self, native_supply: u128) -> Result<u128, EscrowError> {
        ratio(
            &[self.circulating_supply(native_supply), self.expansion_rate as u128],
            &[SCALE],
        )
    }

    /// Bring emission and weight allocation up to `now`.
    ///
    /// `native_supply` is the supply that held since the last accrual. The
    /// current budget is first lowered to what that circulating supply
    /// supports; it never rises within a period. If one or more period
    /// boundaries have passed, the current period is allocated up to its end,
    /// the registry jumps forward by whole periods and the new budget is taken
    /// from the current circulating supply.
    /// Must run before any change to `total_votes`, `directed_votes` or the
    /// native supply.
    pub fn accrue(&mut self, now: Timestamp, native_supply: u128) -> Result<(), EscrowError> {
        if now <= self.last_accrual {
            return Ok(());
        }
        let budget = self.circulating_budget(native_supply)?;
        self.period_emission = self.period_emission.min(budget);

        let end = self.period_end()?;
        if now >= end {
            self.allocate(end)?;
            let periods = self.last_period_timestamp.elapsed_since(now) / self.period_length;
            let advance = periods
                .checked_mul(self.period_length)
                .ok_or(EscrowError::ArithmeticOverflow)?;
            self.last_period_timestamp = self
                .last_period_timestamp
                .checked_add_secs(advance)
                .ok_or(EscrowError::ArithmeticOverflow)?;
            self.period_emission = budget;
            tracing::debug!(
                registry = %self.id,
                periods,
                period_start = %self.last_period_timestamp,
                budget = self.period_emission,
                "emission period rolled over"
            );
        }
        self.allocate(now)
    }

    fn allocate(&mut self, until: Timestamp) -> Result<(), EscrowError> {
        let elapsed = self.last_accrual.elapsed_since(until);
        if elapsed == 0 {
            return Ok(());
        }
        if self.directed_votes > 0 {
            let index_delta = ratio(
                &[self.period_emission, elapsed as u128, EMISSION_PRECISION],
                &[self.period_length as u128, self.directed_votes],
            )?;
            self.emission_per_vote = checked_add(self.emission_per_vote, index_delta)?;
            let weight = ratio(
                &[self.directed_votes, elapsed as u128, self.time_multiplier as u128],
                &[SCALE],
            )?;
            self.total_weight = checked_add(self.total_weight, weight)?;
        }
        self.last_accrual = until;
        Ok(())
    }
}
