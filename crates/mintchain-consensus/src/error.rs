//! Errors for the proof-of-work consensus primitive.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PowError {
    #[error("transaction error while hashing block: {0}")]
    Transaction(#[from] mintchain_core::error::TransactionError),
    #[error("nonce space exhausted without finding a valid hash")]
    NonceSpaceExhausted,
}
