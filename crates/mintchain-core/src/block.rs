//! Blocks: header fields, transactions, and the Merkle commitment over them.
//!
//! Mining (finding the nonce and hash that satisfy proof-of-work) lives in
//! `mintchain-consensus`, which depends on this crate's [`Block`] type; this
//! crate only knows how to assemble the pieces a miner needs and how to
//! recompute the commitment a validator checks.

use serde::{Deserialize, Serialize};

use crate::error::TransactionError;
use crate::hash::Hash256;
use crate::merkle;
use crate::tx::Transaction;

/// An immutable, linked block: a timestamp, a winning nonce, an ordered
/// list of transactions (first is the coinbase), the previous block's
/// hash, this block's own hash, and its height in the chain.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub timestamp: i64,
    pub nonce: i64,
    pub transactions: Vec<Transaction>,
    pub prev_block_hash: Hash256,
    pub hash: Hash256,
    pub height: u64,
}

impl Block {
    /// Merkle root over each transaction's canonical serialisation.
    pub fn hash_transactions(&self) -> Result<Hash256, TransactionError> {
        let leaves: Result<Vec<Vec<u8>>, TransactionError> =
            self.transactions.iter().map(|tx| tx.serialize()).collect();
        Ok(merkle::merkle_root(&leaves?))
    }

    /// The block's coinbase transaction (its first transaction), if any.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Whether this is the genesis block: empty (zero) previous hash and
    /// height zero.
    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash.is_zero() && self.height == 0
    }

    /// Deterministic byte encoding used as the chain store's stored value.
    pub fn serialize(&self) -> Result<Vec<u8>, TransactionError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, TransactionError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(block, _)| block)
            .map_err(|e| TransactionError::Serialization(e.to_string()))
    }
}
