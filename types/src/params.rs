//! Registry parameters, fixed at creation, never amended afterwards.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::time::Timestamp;

/// Basis-point denominator for `expansion_rate` and `time_multiplier`.
pub const SCALE: u128 = 10_000;

/// Fixed-point precision of the per-vote emission index.
pub const EMISSION_PRECISION: u128 = 1_000_000_000_000;

/// Parameters supplied to `initialize registry`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryParams {
    /// Native supply issued to the creator. The only uncontrolled mint.
    pub initial_supply: u128,

    /// Emission period length in seconds.
    pub period_length: u64,

    /// Start of the first emission period.
    pub start_timestamp: Timestamp,

    /// Fraction of circulating supply emitted per period (basis points of `SCALE`).
    pub expansion_rate: u64,

    /// Weight accrued per vote per second (basis points of `SCALE`).
    pub time_multiplier: u64,
}

impl RegistryParams {
    /// Reject zero values and values whose first-period arithmetic would overflow.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.initial_supply == 0 {
            return Err(TypesError::InvalidParameter("initial supply must be non-zero"));
        }
        if self.period_length == 0 {
            return Err(TypesError::InvalidParameter("period length must be non-zero"));
        }
        if self.start_timestamp == Timestamp::EPOCH {
            return Err(TypesError::InvalidParameter("start timestamp must be non-zero"));
        }
        if self.expansion_rate == 0 {
            return Err(TypesError::InvalidParameter("expansion rate must be non-zero"));
        }
        if self.time_multiplier == 0 {
            return Err(TypesError::InvalidParameter("time multiplier must be non-zero"));
        }
        if self
            .start_timestamp
            .checked_add_secs(self.period_length)
            .is_none()
        {
            return Err(TypesError::InvalidParameter("first period end overflows"));
        }
        if self
            .initial_supply
            .checked_mul(self.expansion_rate as u128)
            .is_none()
        {
            return Err(TypesError::InvalidParameter("initial emission overflows"));
        }
        Ok(())
    }
}
