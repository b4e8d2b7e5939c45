use ouro_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("record already exists: {0}")]
    AlreadyExists(Address),

    #[error("write conflict on {key}: the record changed since it was read")]
    Conflict { key: Address },

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("mint {0} does not exist")]
    MintNotFound(Address),

    #[error("signer is not the authority of mint {mint}")]
    MintAuthorityMismatch { mint: Address },

    #[error("token amount overflow")]
    Overflow,

    #[error("codec error: {0}")]
    Codec(String),

    #[error("storage error: {0}")]
    Storage(ouro_store::StoreError),
}

impl From<ouro_store::StoreError> for LedgerError {
    fn from(e: ouro_store::StoreError) -> Self {
        match e {
            ouro_store::StoreError::Conflict { key, .. } => LedgerError::Conflict { key },
            other => LedgerError::Storage(other),
        }
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        LedgerError::Codec(e.to_string())
    }
}
