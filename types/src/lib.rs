//! Fundamental types for the Ouroboros protocol.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! ledger addresses, registry identifiers, timestamps and the clock abstraction,
//! and the protocol parameters fixed at registry creation.

pub mod address;
pub mod error;
pub mod params;
pub mod time;

pub use address::{Address, RegistryId};
pub use error::TypesError;
pub use params::{RegistryParams, EMISSION_PRECISION, SCALE};
pub use time::{Clock, SystemClock, Timestamp};
