//! Deterministic address derivation.
//!
//! Every state record lives at `Blake2b-256(tag ‖ 0x00 ‖ seed₀ ‖ seed₁ ‖ …)`.
//! Seeds are fixed-width for a given tag (registry ids are 8 little-endian
//! bytes, addresses 32 bytes, snapshot indexes 8 little-endian bytes), so the
//! encoding is unambiguous without length prefixes. Any client can recompute
//! an address from the same inputs; there is no directory.

use ouro_types::Address;

use crate::hash::blake2b_256_multi;

/// The role a derived address plays in the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleTag {
    Registry,
    Authority,
    NativeMint,
    Locker,
    LockerVault,
    Beneficiary,
    Asset,
    AssetAuthority,
    Snapshot,
    Claim,
    Mint,
    TokenAccount,
}

impl RoleTag {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            RoleTag::Registry => b"registry",
            RoleTag::Authority => b"authority",
            RoleTag::NativeMint => b"native",
            RoleTag::Locker => b"locker",
            RoleTag::LockerVault => b"locker_vault",
            RoleTag::Beneficiary => b"beneficiary",
            RoleTag::Asset => b"asset",
            RoleTag::AssetAuthority => b"asset_authority",
            RoleTag::Snapshot => b"snapshot",
            RoleTag::Claim => b"claim",
            RoleTag::Mint => b"mint",
            RoleTag::TokenAccount => b"token_account",
        }
    }
}

/// Derive the address of a record from its role tag and seeds.
pub fn derive_address(tag: RoleTag, seeds: &[&[u8]]) -> Address {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 2);
    parts.push(tag.as_bytes());
    parts.push(&[0u8]);
    parts.extend_from_slice(seeds);
    Address::new(blake2b_256_multi(&parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let id = 5u64.to_le_bytes();
        assert_eq!(
            derive_address(RoleTag::Registry, &[&id]),
            derive_address(RoleTag::Registry, &[&id])
        );
    }

    #[test]
    fn tags_separate_key_spaces() {
        let id = 5u64.to_le_bytes();
        assert_ne!(
            derive_address(RoleTag::Registry, &[&id]),
            derive_address(RoleTag::Authority, &[&id])
        );
    }

    #[test]
    fn seeds_change_the_address() {
        let a = 1u64.to_le_bytes();
        let b = 2u64.to_le_bytes();
        let owner = [9u8; 32];
        assert_ne!(
            derive_address(RoleTag::Locker, &[&a, &owner]),
            derive_address(RoleTag::Locker, &[&b, &owner])
        );
    }

    #[test]
    fn every_tag_is_unique() {
        let tags = [
            RoleTag::Registry,
            RoleTag::Authority,
            RoleTag::NativeMint,
            RoleTag::Locker,
            RoleTag::LockerVault,
            RoleTag::Beneficiary,
            RoleTag::Asset,
            RoleTag::AssetAuthority,
            RoleTag::Snapshot,
            RoleTag::Claim,
            RoleTag::Mint,
            RoleTag::TokenAccount,
        ];
        let mut seen = std::collections::HashSet::new();
        for tag in tags {
            assert!(seen.insert(tag.as_bytes()), "duplicate tag {:?}", tag);
        }
    }
}
