//! # mintchain-core
//!
//! Foundation types for the mintchain protocol: blocks, transactions,
//! Merkle commitments, addresses, and the ECDSA primitives that bind them
//! together. Proof-of-work and persistent storage live in sibling crates
//! that depend on these types.

pub mod address;
pub mod block;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod merkle;
pub mod tx;

pub use address::{hash_pubkey, PubkeyHash};
pub use block::Block;
pub use error::CoreError;
pub use hash::Hash256;
pub use tx::{Transaction, TxInput, TxOutput, TxOutputs};
