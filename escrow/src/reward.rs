//! The interface offered to external fee sources.

use ouro_store::StateStore;
use ouro_types::{Address, Clock, RegistryId};

use crate::state::Snapshot;
use crate::{EscrowEngine, EscrowError};

/// Accepts per-period reward deposits from a fee-generating collaborator.
///
/// Callers deposit with a non-decreasing period index; the amount is moved
/// from the depositor's token account in the same transaction that records it.
pub trait RewardSink {
    fn deposit(
        &self,
        registry: RegistryId,
        depositor: Address,
        mint: Address,
        amount: u128,
        period_index: u64,
    ) -> Result<Snapshot, EscrowError>;

    /// Period the sink is currently in.
    fn period_index(&self, registry: RegistryId) -> Result<u64, EscrowError>;
}

impl<S: StateStore, C: Clock> RewardSink for EscrowEngine<S, C> {
    fn deposit(
        &self,
        registry: RegistryId,
        depositor: Address,
        mint: Address,
        amount: u128,
        period_index: u64,
    ) -> Result<Snapshot, EscrowError> {
        self.deposit_reward(registry, depositor, mint, amount, period_index)
    }

    fn period_index(&self, registry: RegistryId) -> Result<u64, EscrowError> {
        self.current_period_index(registry)
    }
}
