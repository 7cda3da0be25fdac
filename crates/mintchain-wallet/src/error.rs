//! Errors for wallet key management and file persistence.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("no wallet for address {0}")]
    UnknownAddress(String),
    #[error(transparent)]
    Address(#[from] mintchain_core::error::AddressError),
    #[error(transparent)]
    Crypto(#[from] mintchain_core::error::CryptoError),
    #[error("wallet file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("wallet file encoding: {0}")]
    Encoding(String),
}
