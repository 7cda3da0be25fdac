//! # mintchain-consensus
//!
//! Proof-of-work: target derivation, nonce search, validation, and the
//! block-construction helpers that mine a candidate block before it is
//! handed to the chain store.

pub mod block_builder;
pub mod error;
pub mod pow;

pub use block_builder::{new_block, new_genesis_block};
pub use error::PowError;
