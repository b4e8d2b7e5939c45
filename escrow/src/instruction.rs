//! Serialisable operation requests.
//!
//! A host that receives encoded requests decodes an [`Instruction`] and hands
//! it to [`EscrowEngine::process`] together with the authenticated signer.

use serde::{Deserialize, Serialize};

use ouro_store::StateStore;
use ouro_types::{Address, Clock, RegistryId, RegistryParams};

use crate::state::{Beneficiary, Locker, Registry, Snapshot};
use crate::{EscrowEngine, EscrowError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    InitializeRegistry {
        id: RegistryId,
        params: RegistryParams,
    },
    CreateBeneficiary {
        registry: RegistryId,
        payout: Address,
    },
    CreateLocker {
        registry: RegistryId,
        locker: Address,
        amount: u128,
        lock_duration: u64,
    },
    CastVote {
        registry: RegistryId,
        locker: Address,
        new_beneficiary: Address,
        old_beneficiary: Option<Address>,
    },
    ClaimIncentives {
        registry: RegistryId,
        payout: Address,
    },
    DepositReward {
        registry: RegistryId,
        mint: Address,
        amount: u128,
        period_index: u64,
    },
    CollectFees {
        registry: RegistryId,
        locker: Address,
        mint: Address,
        previous_snapshot: u64,
        current_snapshot: u64,
    },
    Withdraw {
        registry: RegistryId,
        locker: Address,
        current_beneficiary: Option<Address>,
    },
    IssueAsset {
        mint: Address,
        decimals: u8,
    },
    MintAsset {
        mint: Address,
        to: Address,
        amount: u128,
    },
    Transfer {
        mint: Address,
        to: Address,
        amount: u128,
    },
}

impl Instruction {
    pub fn encode(&self) -> Result<Vec<u8>, EscrowError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EscrowError> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instruction::InitializeRegistry { .. } => "initialize_registry",
            Instruction::CreateBeneficiary { .. } => "create_beneficiary",
            Instruction::CreateLocker { .. } => "create_locker",
            Instruction::CastVote { .. } => "cast_vote",
            Instruction::ClaimIncentives { .. } => "claim_incentives",
            Instruction::DepositReward { .. } => "deposit_reward",
            Instruction::CollectFees { .. } => "collect_fees",
            Instruction::Withdraw { .. } => "withdraw",
            Instruction::IssueAsset { .. } => "issue_asset",
            Instruction::MintAsset { .. } => "mint_asset",
            Instruction::Transfer { .. } => "transfer",
        }
    }
}

/// Outcome of a processed instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Receipt {
    RegistryInitialized(Registry),
    BeneficiaryCreated(Beneficiary),
    LockerCreated(Locker),
    VoteCast(Locker),
    IncentivesClaimed { amount: u128 },
    RewardDeposited(Snapshot),
    FeesCollected { amount: u128 },
    Withdrawn { amount: u128 },
    AssetIssued { mint: Address },
    AssetMinted,
    Transferred,
}

impl<S: StateStore, C: Clock> EscrowEngine<S, C> {
    /// Execute `instruction` on behalf of `signer`.
    pub fn process(&self, signer: Address, instruction: Instruction) -> Result<Receipt, EscrowError> {
        match instruction {
            Instruction::InitializeRegistry { id, params } => self
                .initialize_registry(signer, id, params)
                .map(Receipt::RegistryInitialized),
            Instruction::CreateBeneficiary { registry, payout } => self
                .create_beneficiary(registry, payout)
                .map(Receipt::BeneficiaryCreated),
            Instruction::CreateLocker {
                registry,
                locker,
                amount,
                lock_duration,
            } => self
                .create_locker(registry, signer, locker, amount, lock_duration)
                .map(Receipt::LockerCreated),
            Instruction::CastVote {
                registry,
                locker,
                new_beneficiary,
                old_beneficiary,
            } => self
                .cast_vote(registry, signer, locker, new_beneficiary, old_beneficiary)
                .map(Receipt::VoteCast),
            Instruction::ClaimIncentives { registry, payout } => self
                .claim_incentives(registry, payout)
                .map(|amount| Receipt::IncentivesClaimed { amount }),
            Instruction::DepositReward {
                registry,
                mint,
                amount,
                period_index,
            } => self
                .deposit_reward(registry, signer, mint, amount, period_index)
                .map(Receipt::RewardDeposited),
            Instruction::CollectFees {
                registry,
                locker,
                mint,
                previous_snapshot,
                current_snapshot,
            } => self
                .collect_fees(registry, signer, locker, mint, previous_snapshot, current_snapshot)
                .map(|amount| Receipt::FeesCollected { amount }),
            Instruction::Withdraw {
                registry,
                locker,
                current_beneficiary,
            } => self
                .withdraw(registry, signer, locker, current_beneficiary)
                .map(|amount| Receipt::Withdrawn { amount }),
            Instruction::IssueAsset { mint, decimals } => self
                .issue_asset(signer, mint, decimals)
                .map(|m| Receipt::AssetIssued { mint: m.id }),
            Instruction::MintAsset { mint, to, amount } => self
                .mint_asset(signer, mint, to, amount)
                .map(|()| Receipt::AssetMinted),
            Instruction::Transfer { mint, to, amount } => self
                .transfer(signer, mint, to, amount)
                .map(|()| Receipt::Transferred),
        }
    }

    /// Decode a bincode-encoded [`Instruction`] and execute it.
    pub fn process_encoded(&self, signer: Address, bytes: &[u8]) -> Result<Receipt, EscrowError> {
        let instruction = Instruction::decode(bytes)?;
        tracing::debug!(%signer, op = instruction.name(), "processing encoded instruction");
        self.process(signer, instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ouro_types::Timestamp;

    #[test]
    fn instructions_survive_encoding() {
        let instruction = Instruction::CastVote {
            registry: RegistryId::new(5),
            locker: Address::from_seed(1),
            new_beneficiary: Address::from_seed(2),
            old_beneficiary: None,
        };
        let bytes = instruction.encode().unwrap();
        assert_eq!(Instruction::decode(&bytes).unwrap(), instruction);
    }

    #[test]
    fn params_are_carried_verbatim() {
        let params = RegistryParams {
            initial_supply: 10_000_000_000,
            period_length: 5,
            start_timestamp: Timestamp::new(1_000),
            expansion_rate: 10_000,
            time_multiplier: 10_000,
        };
        let instruction = Instruction::InitializeRegistry {
            id: RegistryId::new(5),
            params: params.clone(),
        };
        match Instruction::decode(&instruction.encode().unwrap()).unwrap() {
            Instruction::InitializeRegistry { params: decoded, .. } => assert_eq!(decoded, params),
            other => panic!("decoded to {}", other.name()),
        }
    }

    #[test]
    fn garbage_is_a_codec_error() {
        assert!(matches!(
            Instruction::decode(&[0xff, 0xff, 0xff, 0xff]),
            Err(EscrowError::Codec(_))
        ));
    }
}
