//! Persisted escrow records.

pub mod asset;
pub mod beneficiary;
pub mod claim;
pub mod locker;
pub mod registry;
pub mod snapshot;

pub use asset::AssetLedger;
pub use beneficiary::Beneficiary;
pub use claim::ClaimEntry;
pub use locker::{Locker, LockerStatus, Withdrawal};
pub use registry::Registry;
pub use snapshot::Snapshot;
