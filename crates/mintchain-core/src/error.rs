//! Error types for the mintchain protocol.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("previous transaction not found: {0}")]
    MissingPrevTx(String),
    #[error("serialization: {0}")]
    Serialization(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")]
    InvalidPublicKey,
    #[error("invalid signature bytes")]
    InvalidSignature,
    #[error("signature verification failed")]
    VerificationFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 encoding")]
    InvalidEncoding,
    #[error("invalid address length")]
    InvalidLength,
    #[error("checksum mismatch")]
    ChecksumMismatch,
    #[error("unsupported address version: {0}")]
    UnsupportedVersion(u8),
}

/// Aggregated error type for the core crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Address(#[from] AddressError),
}
