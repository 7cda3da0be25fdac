//! Errors for the persistent chain store and UTXO index.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
    #[error("database already exists at {0}")]
    DatabaseExists(String),
    #[error("database does not exist at {0}")]
    DatabaseMissing(String),
    #[error("corrupt encoding: {0}")]
    CorruptEncoding(String),
    #[error("storage backend: {0}")]
    Backend(String),
    #[error(transparent)]
    Transaction(#[from] mintchain_core::error::TransactionError),
    #[error(transparent)]
    Address(#[from] mintchain_core::error::AddressError),
    #[error(transparent)]
    Pow(#[from] mintchain_consensus::PowError),
}

impl From<rocksdb::Error> for StoreError {
    fn from(err: rocksdb::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
