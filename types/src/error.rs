//! Errors raised while constructing or parsing fundamental types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid registry parameter: {0}")]
    InvalidParameter(&'static str),
}
