//! Derived addresses of every escrow record.
//!
//! All addresses are rooted in the registry id, so any client can recompute
//! them from public inputs.

use ouro_crypto::{derive_address, RoleTag};
use ouro_types::{Address, RegistryId};

pub fn registry(id: RegistryId) -> Address {
    derive_address(RoleTag::Registry, &[&id.to_seed()])
}

/// The registry's signing authority: mint authority of the native token.
pub fn authority(id: RegistryId) -> Address {
    derive_address(RoleTag::Authority, &[&id.to_seed()])
}

/// Mint id of the registry's native token.
pub fn native_mint(id: RegistryId) -> Address {
    derive_address(RoleTag::NativeMint, &[&id.to_seed()])
}

/// The locker record. Also serves as the mint id of the locker's receipt.
pub fn locker(id: RegistryId, locker_id: &Address) -> Address {
    derive_address(RoleTag::Locker, &[&id.to_seed(), locker_id.as_bytes()])
}

/// Owner of the token account holding a locker's principal.
pub fn locker_vault(id: RegistryId, locker_id: &Address) -> Address {
    derive_address(RoleTag::LockerVault, &[&id.to_seed(), locker_id.as_bytes()])
}

pub fn beneficiary(id: RegistryId, payout: &Address) -> Address {
    derive_address(RoleTag::Beneficiary, &[&id.to_seed(), payout.as_bytes()])
}

pub fn asset(id: RegistryId, mint: &Address) -> Address {
    derive_address(RoleTag::Asset, &[&id.to_seed(), mint.as_bytes()])
}

/// Owner of the token account holding an asset's deposited rewards.
pub fn asset_authority(id: RegistryId, mint: &Address) -> Address {
    derive_address(RoleTag::AssetAuthority, &[&id.to_seed(), mint.as_bytes()])
}

pub fn snapshot(id: RegistryId, mint: &Address, index: u64) -> Address {
    derive_address(
        RoleTag::Snapshot,
        &[&id.to_seed(), mint.as_bytes(), &index.to_le_bytes()],
    )
}

/// Replay guard for one (locker, asset, snapshot) collection.
pub fn claim(id: RegistryId, mint: &Address, locker_id: &Address, index: u64) -> Address {
    derive_address(
        RoleTag::Claim,
        &[
            &id.to_seed(),
            mint.as_bytes(),
            locker_id.as_bytes(),
            &index.to_le_bytes(),
        ],
    )
}
