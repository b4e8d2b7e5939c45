//! The escrow engine.
//!
//! Each public operation is one ledger transaction. The timestamp comes from
//! the engine's [`Clock`]; callers never supply it. Operations that touch
//! votes or the native supply first bring the registry's emission accrual up
//! to `now`, then settle every beneficiary they modify.

use tracing::{debug, info, warn};

use ouro_crypto::encode_address;
use ouro_ledger::{Ledger, Mint, Transaction};
use ouro_store::StateStore;
use ouro_types::{Address, Clock, RegistryId, RegistryParams, Timestamp};
use ouro_utils::format_duration;

use crate::addresses;
use crate::math::{checked_add, checked_sub};
use crate::state::{
    AssetLedger, Beneficiary, ClaimEntry, Locker, LockerStatus, Registry, Snapshot, Withdrawal,
};
use crate::{EscrowError, NATIVE_DECIMALS};

pub struct EscrowEngine<S: StateStore, C: Clock> {
    ledger: Ledger<S>,
    clock: C,
}

impl<S: StateStore, C: Clock> EscrowEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            ledger: Ledger::new(store),
            clock,
        }
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn execute<T, F>(&self, op: &'static str, f: F) -> Result<T, EscrowError>
    where
        F: FnOnce(&mut Transaction<'_, S>, Timestamp) -> Result<T, EscrowError>,
    {
        let now = self.clock.now();
        let result = self.ledger.transact(|txn| f(txn, now));
        if let Err(EscrowError::WriteConflict(key)) = &result {
            warn!(op, %key, "transaction rejected by write conflict");
        }
        result
    }

    // ── Registry ────────────────────────────────────────────────────────

    /// Create a registry and issue the initial native supply to `creator`.
    pub fn initialize_registry(
        &self,
        creator: Address,
        id: RegistryId,
        params: RegistryParams,
    ) -> Result<Registry, EscrowError> {
        params.validate()?;
        let registry = self.execute("initialize_registry", |txn, _now| {
            let key = addresses::registry(id);
            if txn.exists(&key)? {
                return Err(EscrowError::DuplicateRegistry(id));
            }
            let authority = addresses::authority(id);
            let native_mint = addresses::native_mint(id);
            txn.create_mint(native_mint, authority, NATIVE_DECIMALS)?;
            txn.mint_to(&native_mint, &authority, &creator, params.initial_supply)?;

            let registry = Registry::new(id, creator, authority, native_mint, &params)?;
            txn.create(&key, &registry)?;
            Ok(registry)
        })?;
        info!(
            registry = %id,
            creator = %encode_address(&creator),
            supply = params.initial_supply,
            period = %format_duration(params.period_length),
            "registry initialized"
        );
        Ok(registry)
    }

    // ── Beneficiaries ───────────────────────────────────────────────────

    pub fn create_beneficiary(
        &self,
        id: RegistryId,
        payout: Address,
    ) -> Result<Beneficiary, EscrowError> {
        let beneficiary = self.execute("create_beneficiary", |txn, now| {
            let registry = load_registry(txn, id)?;
            let key = addresses::beneficiary(id, &payout);
            if txn.exists(&key)? {
                return Err(EscrowError::DuplicateBeneficiary(payout));
            }
            let beneficiary = Beneficiary::new(&registry, payout, now);
            txn.create(&key, &beneficiary)?;
            Ok(beneficiary)
        })?;
        info!(registry = %id, payout = %encode_address(&payout), "beneficiary created");
        Ok(beneficiary)
    }

    /// Settle a beneficiary and mint its pending emission to the payout account.
    ///
    /// Returns the amount minted. Nothing is minted while the beneficiary's
    /// weight is zero.
    pub fn claim_incentives(&self, id: RegistryId, payout: Address) -> Result<u128, EscrowError> {
        let amount = self.execute("claim_incentives", |txn, now| {
            let mut registry = accrued_registry(txn, id, now)?;
            let key = addresses::beneficiary(id, &payout);
            let mut beneficiary = load_beneficiary(txn, id, &payout)?;
            beneficiary.settle(&registry, now)?;

            let amount = beneficiary.take_claimable()?;
            if amount > 0 {
                txn.mint_to(&registry.native_mint, &registry.authority, &payout, amount)?;
                registry.total_emitted = checked_add(registry.total_emitted, amount)?;
            }
            txn.store(&key, &beneficiary)?;
            txn.store(&addresses::registry(id), &registry)?;
            Ok(amount)
        })?;
        info!(
            registry = %id,
            payout = %encode_address(&payout),
            amount,
            "incentives claimed"
        );
        Ok(amount)
    }

    /// Emission `claim_incentives` would mint if it ran now.
    pub fn preview_incentives(&self, id: RegistryId, payout: Address) -> Result<u128, EscrowError> {
        let now = self.clock.now();
        let mut txn = self.ledger.begin();
        let registry = accrued_registry(&mut txn, id, now)?;
        let mut beneficiary = load_beneficiary(&mut txn, id, &payout)?;
        beneficiary.settle(&registry, now)?;
        beneficiary.take_claimable()
    }

    // ── Lockers ─────────────────────────────────────────────────────────

    /// Lock `amount` of the native token from `owner` for `lock_duration` seconds.
    ///
    /// The owner receives the locker receipt; whoever holds it controls the
    /// locker's votes, fee collection and withdrawal.
    pub fn create_locker(
        &self,
        id: RegistryId,
        owner: Address,
        locker_id: Address,
        amount: u128,
        lock_duration: u64,
    ) -> Result<Locker, EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidParameter("locker amount must be non-zero"));
        }
        if lock_duration == 0 {
            return Err(EscrowError::InvalidParameter("lock duration must be non-zero"));
        }
        let locker = self.execute("create_locker", |txn, now| {
            let mut registry = accrued_registry(txn, id, now)?;
            let key = addresses::locker(id, &locker_id);
            if txn.exists(&key)? {
                return Err(EscrowError::DuplicateLocker(locker_id));
            }
            let unlock_timestamp = now
                .checked_add_secs(lock_duration)
                .ok_or(EscrowError::ArithmeticOverflow)?;

            let vault = addresses::locker_vault(id, &locker_id);
            txn.transfer(&registry.native_mint, &owner, &vault, amount)?;
            txn.create_mint(key, vault, 0)?;
            txn.mint_to(&key, &vault, &owner, 1)?;

            let locker = Locker {
                registry: id,
                id: locker_id,
                owner,
                serial: registry.locker_count,
                amount,
                votes: amount,
                created_at: now,
                unlock_timestamp,
                beneficiary: None,
                status: LockerStatus::Locked,
                withdrawal: None,
            };
            registry.locker_count = registry
                .locker_count
                .checked_add(1)
                .ok_or(EscrowError::ArithmeticOverflow)?;
            registry.total_votes = checked_add(registry.total_votes, amount)?;

            txn.create(&key, &locker)?;
            txn.store(&addresses::registry(id), &registry)?;
            Ok(locker)
        })?;
        info!(
            registry = %id,
            locker = %locker_id,
            owner = %encode_address(&owner),
            amount,
            lock = %format_duration(lock_duration),
            "locker created"
        );
        Ok(locker)
    }

    /// Point a locker's votes at `new_beneficiary`.
    ///
    /// `old_beneficiary` must equal the locker's current target (`None` for a
    /// first vote). Re-pointing at the same beneficiary only settles it.
    pub fn cast_vote(
        &self,
        id: RegistryId,
        signer: Address,
        locker_id: Address,
        new_beneficiary: Address,
        old_beneficiary: Option<Address>,
    ) -> Result<Locker, EscrowError> {
        let locker = self.execute("cast_vote", |txn, now| {
            let mut registry = accrued_registry(txn, id, now)?;
            let mut locker = load_locker(txn, id, &locker_id)?;
            if locker.is_withdrawn() {
                return Err(EscrowError::LockerWithdrawn(locker_id));
            }
            authorize(txn, id, &locker, &signer)?;
            if locker.beneficiary != old_beneficiary {
                return Err(EscrowError::BeneficiaryMismatch {
                    recorded: locker.beneficiary,
                    supplied: old_beneficiary,
                });
            }

            let mut target = load_beneficiary(txn, id, &new_beneficiary)?;
            target.settle(&registry, now)?;
            match old_beneficiary {
                Some(previous) if previous == new_beneficiary => {}
                Some(previous) => {
                    let mut source = load_beneficiary(txn, id, &previous)?;
                    source.settle(&registry, now)?;
                    source.votes = checked_sub(source.votes, locker.votes)?;
                    target.votes = checked_add(target.votes, locker.votes)?;
                    txn.store(&addresses::beneficiary(id, &previous), &source)?;
                }
                None => {
                    target.votes = checked_add(target.votes, locker.votes)?;
                    registry.directed_votes = checked_add(registry.directed_votes, locker.votes)?;
                }
            }
            debug!(
                beneficiary = %new_beneficiary,
                votes = target.votes,
                weight = target.weight,
                pending = target.pending_emission,
                "beneficiary settled"
            );

            locker.beneficiary = Some(new_beneficiary);
            txn.store(&addresses::beneficiary(id, &new_beneficiary), &target)?;
            txn.store(&addresses::locker(id, &locker_id), &locker)?;
            txn.store(&addresses::registry(id), &registry)?;
            Ok(locker)
        })?;
        info!(
            registry = %id,
            locker = %locker_id,
            beneficiary = %new_beneficiary,
            votes = locker.votes,
            "vote cast"
        );
        Ok(locker)
    }

    /// Return an unlocked locker's principal to the receipt holder.
    ///
    /// `current_beneficiary` must equal the locker's current target. Its votes
    /// are removed from the beneficiary and the registry. The receipt is burned;
    /// the holder keeps the right to collect snapshots captured before now.
    pub fn withdraw(
        &self,
        id: RegistryId,
        signer: Address,
        locker_id: Address,
        current_beneficiary: Option<Address>,
    ) -> Result<u128, EscrowError> {
        let amount = self.execute("withdraw", |txn, now| {
            let mut registry = accrued_registry(txn, id, now)?;
            let key = addresses::locker(id, &locker_id);
            let mut locker = load_locker(txn, id, &locker_id)?;
            if locker.is_withdrawn() {
                return Err(EscrowError::LockerWithdrawn(locker_id));
            }
            authorize(txn, id, &locker, &signer)?;
            if !locker.is_unlocked(now) {
                debug!(
                    locker = %locker_id,
                    remaining = %format_duration(locker.remaining_lock(now)),
                    "withdrawal before unlock"
                );
                return Err(EscrowError::LockerStillLocked {
                    unlock_at: locker.unlock_timestamp,
                });
            }
            if locker.beneficiary != current_beneficiary {
                return Err(EscrowError::BeneficiaryMismatch {
                    recorded: locker.beneficiary,
                    supplied: current_beneficiary,
                });
            }

            if let Some(payout) = current_beneficiary {
                let mut beneficiary = load_beneficiary(txn, id, &payout)?;
                beneficiary.settle(&registry, now)?;
                beneficiary.votes = checked_sub(beneficiary.votes, locker.votes)?;
                registry.directed_votes = checked_sub(registry.directed_votes, locker.votes)?;
                txn.store(&addresses::beneficiary(id, &payout), &beneficiary)?;
            }
            registry.total_votes = checked_sub(registry.total_votes, locker.votes)?;

            let vault = addresses::locker_vault(id, &locker_id);
            txn.transfer(&registry.native_mint, &vault, &signer, locker.amount)?;
            txn.burn(&key, &signer, 1)?;

            locker.votes = 0;
            locker.beneficiary = None;
            locker.status = LockerStatus::Withdrawn;
            locker.withdrawal = Some(Withdrawal {
                sequence: registry.withdrawal_count,
                holder: signer,
                at: now,
            });
            registry.withdrawal_count = registry
                .withdrawal_count
                .checked_add(1)
                .ok_or(EscrowError::ArithmeticOverflow)?;
            txn.store(&key, &locker)?;
            txn.store(&addresses::registry(id), &registry)?;
            Ok(locker.amount)
        })?;
        info!(
            registry = %id,
            locker = %locker_id,
            holder = %encode_address(&signer),
            amount,
            "locker withdrawn"
        );
        Ok(amount)
    }

    // ── Rewards ─────────────────────────────────────────────────────────

    /// Deposit `amount` of reward asset `mint` from `depositor` into period `period_index`.
    pub fn deposit_reward(
        &self,
        id: RegistryId,
        depositor: Address,
        mint: Address,
        amount: u128,
        period_index: u64,
    ) -> Result<Snapshot, EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidParameter("deposit amount must be non-zero"));
        }
        let snapshot = self.execute("deposit_reward", |txn, now| {
            let registry = load_registry(txn, id)?;
            let asset_key = addresses::asset(id, &mint);
            let mut asset = match txn.load::<AssetLedger>(&asset_key)? {
                Some(asset) => asset,
                None => {
                    let authority = addresses::asset_authority(id, &mint);
                    AssetLedger {
                        registry: id,
                        mint,
                        authority,
                        custody: ouro_ledger::token_account_address(&mint, &authority),
                        reward_height: 0,
                        last_update: now,
                        last_snapshot_index: period_index,
                    }
                }
            };
            asset.record_deposit(period_index, amount, now)?;

            let snapshot_key = addresses::snapshot(id, &mint, period_index);
            let snapshot = match txn.load::<Snapshot>(&snapshot_key)? {
                Some(mut snapshot) => {
                    snapshot.add_rewards(amount)?;
                    snapshot
                }
                None => Snapshot {
                    registry: id,
                    mint,
                    index: period_index,
                    votes: registry.total_votes,
                    rewards: amount,
                    created_at: now,
                    lockers_at_capture: registry.locker_count,
                    withdrawals_at_capture: registry.withdrawal_count,
                },
            };

            txn.transfer(&mint, &depositor, &asset.authority, amount)?;
            txn.store(&snapshot_key, &snapshot)?;
            txn.store(&asset_key, &asset)?;
            Ok(snapshot)
        })?;
        info!(
            registry = %id,
            %mint,
            depositor = %encode_address(&depositor),
            amount,
            period = period_index,
            snapshot_votes = snapshot.votes,
            "reward deposited"
        );
        Ok(snapshot)
    }

    /// Collect a locker's share of snapshot `current_snapshot` of asset `mint`.
    ///
    /// `previous_snapshot` must be `current_snapshot` or the period before it.
    /// Each (locker, asset, snapshot) triple pays out once. A withdrawn locker
    /// is paid on its principal, to the holder that withdrew it, for snapshots
    /// captured before the withdrawal.
    pub fn collect_fees(
        &self,
        id: RegistryId,
        signer: Address,
        locker_id: Address,
        mint: Address,
        previous_snapshot: u64,
        current_snapshot: u64,
    ) -> Result<u128, EscrowError> {
        if previous_snapshot != current_snapshot
            && previous_snapshot.checked_add(1) != Some(current_snapshot)
        {
            return Err(EscrowError::InvalidSnapshotRange {
                previous: previous_snapshot,
                current: current_snapshot,
            });
        }
        let share = self.execute("collect_fees", |txn, now| {
            let locker = load_locker(txn, id, &locker_id)?;
            authorize(txn, id, &locker, &signer)?;

            let asset: AssetLedger = txn
                .load(&addresses::asset(id, &mint))?
                .ok_or(EscrowError::AssetNotFound(mint))?;
            load_snapshot(txn, id, &mint, previous_snapshot)?;
            let snapshot = load_snapshot(txn, id, &mint, current_snapshot)?;

            let claim_key = addresses::claim(id, &mint, &locker_id, current_snapshot);
            if txn.exists(&claim_key)? {
                return Err(EscrowError::AlreadyClaimed {
                    locker: locker_id,
                    index: current_snapshot,
                });
            }
            if snapshot.votes == 0 {
                return Err(EscrowError::StaleSnapshot(current_snapshot));
            }
            if !snapshot.covers(locker.serial) {
                return Err(EscrowError::IneligibleLocker(locker_id));
            }
            let votes = snapshot
                .captured_votes(&locker)
                .ok_or(EscrowError::LockerWithdrawn(locker_id))?;

            let share = snapshot.share_of(votes)?;
            if share > 0 {
                txn.transfer(&mint, &asset.authority, &signer, share)?;
            }
            txn.create(
                &claim_key,
                &ClaimEntry {
                    locker: locker_id,
                    mint,
                    snapshot_index: current_snapshot,
                    amount: share,
                    claimed_at: now,
                },
            )?;
            Ok(share)
        })?;
        info!(
            registry = %id,
            locker = %locker_id,
            holder = %encode_address(&signer),
            %mint,
            snapshot = current_snapshot,
            amount = share,
            "fees collected"
        );
        Ok(share)
    }

    // ── Token plumbing for collaborators ────────────────────────────────

    /// Register a reward asset mint with `signer` as its authority.
    pub fn issue_asset(&self, signer: Address, mint: Address, decimals: u8) -> Result<Mint, EscrowError> {
        let issued = self.execute("issue_asset", |txn, _now| {
            Ok(txn.create_mint(mint, signer, decimals)?)
        })?;
        info!(%mint, authority = %encode_address(&signer), decimals, "asset issued");
        Ok(issued)
    }

    pub fn mint_asset(
        &self,
        signer: Address,
        mint: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), EscrowError> {
        self.execute("mint_asset", |txn, _now| {
            Ok(txn.mint_to(&mint, &signer, &to, amount)?)
        })?;
        info!(%mint, to = %encode_address(&to), amount, "asset minted");
        Ok(())
    }

    /// Move tokens held by `signer`. Moving a locker receipt hands over control of the locker.
    pub fn transfer(
        &self,
        signer: Address,
        mint: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidParameter("transfer amount must be non-zero"));
        }
        self.execute("transfer", |txn, _now| {
            Ok(txn.transfer(&mint, &signer, &to, amount)?)
        })?;
        info!(
            %mint,
            from = %encode_address(&signer),
            to = %encode_address(&to),
            amount,
            "tokens transferred"
        );
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn registry(&self, id: RegistryId) -> Result<Registry, EscrowError> {
        self.ledger
            .read(&addresses::registry(id))?
            .ok_or(EscrowError::RegistryNotFound(id))
    }

    pub fn locker(&self, id: RegistryId, locker_id: Address) -> Result<Locker, EscrowError> {
        self.ledger
            .read(&addresses::locker(id, &locker_id))?
            .ok_or(EscrowError::LockerNotFound(locker_id))
    }

    pub fn beneficiary(&self, id: RegistryId, payout: Address) -> Result<Beneficiary, EscrowError> {
        self.ledger
            .read(&addresses::beneficiary(id, &payout))?
            .ok_or(EscrowError::BeneficiaryNotFound(payout))
    }

    pub fn asset(&self, id: RegistryId, mint: Address) -> Result<AssetLedger, EscrowError> {
        self.ledger
            .read(&addresses::asset(id, &mint))?
            .ok_or(EscrowError::AssetNotFound(mint))
    }

    pub fn snapshot(&self, id: RegistryId, mint: Address, index: u64) -> Result<Snapshot, EscrowError> {
        self.ledger
            .read(&addresses::snapshot(id, &mint, index))?
            .ok_or(EscrowError::SnapshotNotFound(index))
    }

    pub fn claim(
        &self,
        id: RegistryId,
        mint: Address,
        locker_id: Address,
        index: u64,
    ) -> Result<Option<ClaimEntry>, EscrowError> {
        Ok(self.ledger.read(&addresses::claim(id, &mint, &locker_id, index))?)
    }

    pub fn balance(&self, mint: Address, owner: Address) -> Result<u128, EscrowError> {
        Ok(self.ledger.begin().balance(&mint, &owner)?)
    }

    pub fn native_balance(&self, id: RegistryId, owner: Address) -> Result<u128, EscrowError> {
        self.balance(addresses::native_mint(id), owner)
    }

    pub fn native_supply(&self, id: RegistryId) -> Result<u128, EscrowError> {
        Ok(self.ledger.begin().mint(&addresses::native_mint(id))?.supply)
    }

    /// Period index at the engine's current time, for reward depositors.
    pub fn current_period_index(&self, id: RegistryId) -> Result<u64, EscrowError> {
        Ok(self.registry(id)?.period_index_at(self.clock.now()))
    }
}

fn load_registry<S: StateStore + ?Sized>(
    txn: &mut Transaction<'_, S>,
    id: RegistryId,
) -> Result<Registry, EscrowError> {
    txn.load(&addresses::registry(id))?
        .ok_or(EscrowError::RegistryNotFound(id))
}

/// Load the registry with emission accrued up to `now`.
fn accrued_registry<S: StateStore + ?Sized>(
    txn: &mut Transaction<'_, S>,
    id: RegistryId,
    now: Timestamp,
) -> Result<Registry, EscrowError> {
    let mut registry = load_registry(txn, id)?;
    let supply = txn.mint(&registry.native_mint)?.supply;
    registry.accrue(now, supply)?;
    Ok(registry)
}

fn load_locker<S: StateStore + ?Sized>(
    txn: &mut Transaction<'_, S>,
    id: RegistryId,
    locker_id: &Address,
) -> Result<Locker, EscrowError> {
    txn.load(&addresses::locker(id, locker_id))?
        .ok_or(EscrowError::LockerNotFound(*locker_id))
}

fn load_beneficiary<S: StateStore + ?Sized>(
    txn: &mut Transaction<'_, S>,
    id: RegistryId,
    payout: &Address,
) -> Result<Beneficiary, EscrowError> {
    txn.load(&addresses::beneficiary(id, payout))?
        .ok_or(EscrowError::BeneficiaryNotFound(*payout))
}

fn load_snapshot<S: StateStore + ?Sized>(
    txn: &mut Transaction<'_, S>,
    id: RegistryId,
    mint: &Address,
    index: u64,
) -> Result<Snapshot, EscrowError> {
    txn.load(&addresses::snapshot(id, mint, index))?
        .ok_or(EscrowError::SnapshotNotFound(index))
}

/// The signer must hold the locker's receipt, or have held it when the
/// locker was withdrawn.
fn authorize<S: StateStore + ?Sized>(
    txn: &mut Transaction<'_, S>,
    id: RegistryId,
    locker: &Locker,
    signer: &Address,
) -> Result<(), EscrowError> {
    let permitted = match locker.withdrawal {
        Some(withdrawal) => withdrawal.holder == *signer,
        None => txn.balance(&addresses::locker(id, &locker.id), signer)? == 1,
    };
    if permitted {
        Ok(())
    } else {
        Err(EscrowError::Unauthorized(*signer))
    }
}
