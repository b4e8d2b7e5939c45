//! Cryptographic primitives for the Ouroboros protocol.
//!
//! - **Blake2b** for hashing
//! - Deterministic address derivation from (role tag, registry id, entity id)
//! - Address text encoding with `ouro_` prefix and base32

pub mod address;
pub mod derive;
pub mod hash;

pub use address::encode_address;
pub use derive::{derive_address, RoleTag};
pub use hash::{blake2b_256, blake2b_256_multi};
