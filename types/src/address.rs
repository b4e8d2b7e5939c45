//! Ledger address and registry identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte address in the ledger key space.
///
/// Principals (owners, payout accounts, depositors), token mints and every
/// derived state record are addressed the same way. Derived addresses are
/// produced by `ouro_crypto::derive_address`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address([u8; 32]);

impl Address {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build an address from a short seed. Intended for tests and fixtures.
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&seed.to_le_bytes());
        bytes[31] = 0x01;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &self.to_hex()[..8])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Identifier of a registry. Every derived address is rooted in one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistryId(u64);

impl RegistryId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Little-endian seed bytes used in address derivation.
    pub fn to_seed(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_hex() {
        let text = Address::from_seed(42).to_string();
        assert_eq!(text.len(), 64);
        assert!(text.starts_with("2a00000000000000"));
        assert!(text.ends_with("01"));
    }

    #[test]
    fn seeded_addresses_are_distinct_and_non_zero() {
        assert_ne!(Address::from_seed(1), Address::from_seed(2));
        assert_ne!(Address::from_seed(0), Address::ZERO);
    }

    #[test]
    fn registry_seed_is_little_endian() {
        assert_eq!(RegistryId::new(5).to_seed(), [5, 0, 0, 0, 0, 0, 0, 0]);
    }
}
