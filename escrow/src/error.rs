//! Escrow engine errors.

use ouro_ledger::LedgerError;
use ouro_types::{Address, RegistryId, Timestamp, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EscrowError {
    #[error("registry {0} already exists")]
    DuplicateRegistry(RegistryId),

    #[error("locker {0} already exists")]
    DuplicateLocker(Address),

    #[error("beneficiary for payout account {0} already exists")]
    DuplicateBeneficiary(Address),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("beneficiary mismatch: locker points at {recorded:?}, caller supplied {supplied:?}")]
    BeneficiaryMismatch {
        recorded: Option<Address>,
        supplied: Option<Address>,
    },

    #[error("snapshot {0} is stale")]
    StaleSnapshot(u64),

    #[error("locker {locker} already collected snapshot {index}")]
    AlreadyClaimed { locker: Address, index: u64 },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("registry {0} not found")]
    RegistryNotFound(RegistryId),

    #[error("locker {0} not found")]
    LockerNotFound(Address),

    #[error("no beneficiary for payout account {0}")]
    BeneficiaryNotFound(Address),

    #[error("no asset ledger for mint {0}")]
    AssetNotFound(Address),

    #[error("snapshot {0} not found")]
    SnapshotNotFound(u64),

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("signer {0} does not hold the locker receipt")]
    Unauthorized(Address),

    #[error("locker is locked until {unlock_at}")]
    LockerStillLocked { unlock_at: Timestamp },

    #[error("locker {0} has been withdrawn")]
    LockerWithdrawn(Address),

    #[error("locker {0} was created after the snapshot captured its votes")]
    IneligibleLocker(Address),

    #[error("snapshot range {previous}..{current} is not a single period step")]
    InvalidSnapshotRange { previous: u64, current: u64 },

    #[error("write conflict on {0}; resubmit the transaction")]
    WriteConflict(Address),

    #[error("token error: {0}")]
    Token(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("config error: {0}")]
    Config(String),
}

impl EscrowError {
    /// Stable numeric code for each failure kind.
    pub fn code(&self) -> u32 {
        match self {
            EscrowError::DuplicateRegistry(_) => 1,
            EscrowError::DuplicateLocker(_) => 2,
            EscrowError::DuplicateBeneficiary(_) => 3,
            EscrowError::InsufficientFunds { .. } => 4,
            EscrowError::BeneficiaryMismatch { .. } => 5,
            EscrowError::StaleSnapshot(_) => 6,
            EscrowError::AlreadyClaimed { .. } => 7,
            EscrowError::ArithmeticOverflow => 8,
            EscrowError::DivisionByZero => 9,
            EscrowError::RegistryNotFound(_) => 10,
            EscrowError::LockerNotFound(_) => 11,
            EscrowError::BeneficiaryNotFound(_) => 12,
            EscrowError::AssetNotFound(_) => 13,
            EscrowError::SnapshotNotFound(_) => 14,
            EscrowError::InvalidParameter(_) => 15,
            EscrowError::Unauthorized(_) => 16,
            EscrowError::LockerStillLocked { .. } => 17,
            EscrowError::LockerWithdrawn(_) => 18,
            EscrowError::IneligibleLocker(_) => 19,
            EscrowError::InvalidSnapshotRange { .. } => 20,
            EscrowError::WriteConflict(_) => 21,
            EscrowError::Token(_) => 22,
            EscrowError::Storage(_) => 23,
            EscrowError::Codec(_) => 24,
            EscrowError::Config(_) => 25,
        }
    }

    /// Whether resubmitting the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EscrowError::WriteConflict(_))
    }
}

impl From<LedgerError> for EscrowError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientFunds { needed, available } => {
                EscrowError::InsufficientFunds { needed, available }
            }
            LedgerError::Conflict { key } => EscrowError::WriteConflict(key),
            LedgerError::Overflow => EscrowError::ArithmeticOverflow,
            LedgerError::Codec(msg) => EscrowError::Codec(msg),
            LedgerError::Storage(err) => EscrowError::Storage(err.to_string()),
            other @ (LedgerError::AlreadyExists(_)
            | LedgerError::MintNotFound(_)
            | LedgerError::MintAuthorityMismatch { .. }) => EscrowError::Token(other.to_string()),
        }
    }
}

impl From<TypesError> for EscrowError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::InvalidParameter(reason) => EscrowError::InvalidParameter(reason),
        }
    }
}

impl From<bincode::Error> for EscrowError {
    fn from(e: bincode::Error) -> Self {
        EscrowError::Codec(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            EscrowError::DuplicateRegistry(RegistryId::new(1)),
            EscrowError::DuplicateLocker(Address::ZERO),
            EscrowError::DuplicateBeneficiary(Address::ZERO),
            EscrowError::InsufficientFunds { needed: 1, available: 0 },
            EscrowError::BeneficiaryMismatch { recorded: None, supplied: None },
            EscrowError::StaleSnapshot(0),
            EscrowError::AlreadyClaimed { locker: Address::ZERO, index: 0 },
            EscrowError::ArithmeticOverflow,
            EscrowError::DivisionByZero,
            EscrowError::RegistryNotFound(RegistryId::new(1)),
            EscrowError::LockerNotFound(Address::ZERO),
            EscrowError::BeneficiaryNotFound(Address::ZERO),
            EscrowError::AssetNotFound(Address::ZERO),
            EscrowError::SnapshotNotFound(0),
            EscrowError::InvalidParameter("x"),
            EscrowError::Unauthorized(Address::ZERO),
            EscrowError::LockerStillLocked { unlock_at: Timestamp::EPOCH },
            EscrowError::LockerWithdrawn(Address::ZERO),
            EscrowError::IneligibleLocker(Address::ZERO),
            EscrowError::InvalidSnapshotRange { previous: 0, current: 2 },
            EscrowError::WriteConflict(Address::ZERO),
            EscrowError::Token(String::new()),
            EscrowError::Storage(String::new()),
            EscrowError::Codec(String::new()),
            EscrowError::Config(String::new()),
        ];
        let mut codes: Vec<u32> = errors.iter().map(EscrowError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn ledger_conflicts_become_write_conflicts() {
        let key = Address::from_seed(4);
        let err = EscrowError::from(LedgerError::Conflict { key });
        assert!(matches!(err, EscrowError::WriteConflict(k) if k == key));
        assert!(err.is_retryable());
    }

    #[test]
    fn ledger_overdraft_keeps_amounts() {
        let err = EscrowError::from(LedgerError::InsufficientFunds { needed: 9, available: 2 });
        assert!(matches!(err, EscrowError::InsufficientFunds { needed: 9, available: 2 }));
    }
}
