//! Checked fixed-point arithmetic.
//!
//! Accrual formulas multiply up to three `u128`-range factors before
//! dividing, so intermediates are carried in 256 bits and only the final
//! quotient must fit in a `u128`.

use primitive_types::U256;

use crate::EscrowError;

/// `floor(Π numer / Π denom)` with 256-bit intermediates.
///
/// Fails with [`EscrowError::ArithmeticOverflow`] if either product exceeds
/// 256 bits or the quotient exceeds `u128::MAX`, and with
/// [`EscrowError::DivisionByZero`] if any denominator factor is zero.
pub fn ratio(numer: &[u128], denom: &[u128]) -> Result<u128, EscrowError> {
    let denominator = product(denom)?;
    if denominator.is_zero() {
        return Err(EscrowError::DivisionByZero);
    }
    let numerator = product(numer)?;
    let quotient = numerator / denominator;
    if quotient > U256::from(u128::MAX) {
        return Err(EscrowError::ArithmeticOverflow);
    }
    Ok(quotient.low_u128())
}

fn product(factors: &[u128]) -> Result<U256, EscrowError> {
    factors.iter().try_fold(U256::one(), |acc, &f| {
        acc.checked_mul(U256::from(f))
            .ok_or(EscrowError::ArithmeticOverflow)
    })
}

pub fn checked_add(a: u128, b: u128) -> Result<u128, EscrowError> {
    a.checked_add(b).ok_or(EscrowError::ArithmeticOverflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, EscrowError> {
    a.checked_sub(b).ok_or(EscrowError::ArithmeticOverflow)
}
