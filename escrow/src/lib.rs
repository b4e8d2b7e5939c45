//! Vote-escrow engine.
//!
//! Principals lock the native token in a [`Locker`] for a fixed duration and
//! direct its votes at a [`Beneficiary`]. Beneficiaries accrue weight lazily
//! and receive newly minted emission in proportion to the votes they held
//! over time. An external fee source deposits reward assets per period into
//! an [`AssetLedger`]; each deposit fills a [`Snapshot`] that lockers later
//! collect from exactly once, guarded by a [`ClaimEntry`].
//!
//! Every operation on [`EscrowEngine`] is one optimistic ledger transaction:
//! it either commits entirely or leaves no trace.

pub mod addresses;
pub mod config;
pub mod engine;
pub mod error;
pub mod instruction;
pub mod math;
pub mod reward;
pub mod state;

pub use config::{AnyStore, EngineConfig, StorageBackend};
pub use engine::EscrowEngine;
pub use error::EscrowError;
pub use instruction::{Instruction, Receipt};
pub use reward::RewardSink;
pub use state::{
    AssetLedger, Beneficiary, ClaimEntry, Locker, LockerStatus, Registry, Snapshot, Withdrawal,
};

/// Decimals of the native token mint.
pub const NATIVE_DECIMALS: u8 = 9;
