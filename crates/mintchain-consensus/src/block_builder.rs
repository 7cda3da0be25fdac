//! Block construction: assemble a candidate block and mine it.

use std::time::{SystemTime, UNIX_EPOCH};

use mintchain_core::block::Block;
use mintchain_core::hash::Hash256;
use mintchain_core::tx::Transaction;

use crate::error::PowError;
use crate::pow;

fn now_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Assemble a candidate block over `transactions` extending `prev_hash` at
/// `height`, then mine it: run proof-of-work to fix the nonce and hash.
pub fn new_block(
    transactions: Vec<Transaction>,
    prev_hash: Hash256,
    height: u64,
) -> Result<Block, PowError> {
    let mut block = Block {
        timestamp: now_seconds(),
        nonce: 0,
        transactions,
        prev_block_hash: prev_hash,
        hash: Hash256::ZERO,
        height,
    };
    let (nonce, hash) = pow::run(&block)?;
    block.nonce = nonce;
    block.hash = hash;
    tracing::debug!(height = block.height, nonce, "mined block");
    Ok(block)
}

/// `NewGenesisBlock`: `new_block([coinbase], empty, 0)`.
pub fn new_genesis_block(coinbase: Transaction) -> Result<Block, PowError> {
    new_block(vec![coinbase], Hash256::ZERO, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintchain_core::address::hash_pubkey;

    #[test]
    fn genesis_block_is_height_zero_with_empty_prev_hash() {
        let coinbase = Transaction::new_coinbase(hash_pubkey(b"miner"), b"x".to_vec()).unwrap();
        let genesis = new_genesis_block(coinbase).unwrap();
        assert_eq!(genesis.height, 0);
        assert!(genesis.prev_block_hash.is_zero());
        assert!(genesis.is_genesis());
    }

    #[test]
    fn mined_block_satisfies_pow() {
        let coinbase = Transaction::new_coinbase(hash_pubkey(b"miner"), b"x".to_vec()).unwrap();
        let genesis = new_genesis_block(coinbase).unwrap();
        assert!(pow::validate(&genesis).unwrap());
    }

    #[test]
    fn child_block_extends_parent() {
        let coinbase = Transaction::new_coinbase(hash_pubkey(b"miner"), b"x".to_vec()).unwrap();
        let genesis = new_genesis_block(coinbase).unwrap();

        let next_coinbase = Transaction::new_coinbase(hash_pubkey(b"miner2"), b"y".to_vec()).unwrap();
        let child = new_block(vec![next_coinbase], genesis.hash, genesis.height + 1).unwrap();
        assert_eq!(child.prev_block_hash, genesis.hash);
        assert_eq!(child.height, genesis.height + 1);
    }
}
