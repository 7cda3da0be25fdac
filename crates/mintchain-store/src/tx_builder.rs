//! `NewUTXOTransaction`: assembles a spend transaction from the UTXO
//! index and signs it through the chain store, which resolves the
//! prevouts the signature preimage needs.

use std::collections::HashMap;

use mintchain_core::address::{self, PubkeyHash};
use mintchain_core::crypto::PrivateKey;
use mintchain_core::hash::Hash256;
use mintchain_core::tx::{Transaction, TxInput, TxOutput};

use crate::chain::ChainStore;
use crate::error::StoreError;
use crate::utxo::UtxoIndex;

/// Build and sign a transaction spending `amount` from `from_pubkey_hash`
/// to `to_address`, using `utxo` to select inputs and `chain` to resolve
/// prevouts for signing.
pub fn new_utxo_transaction(
    private_key: &PrivateKey,
    from_pubkey_hash: &PubkeyHash,
    to_address: &str,
    amount: u64,
    utxo: &UtxoIndex,
    chain: &ChainStore,
) -> Result<Transaction, StoreError> {
    let (_version, to_pubkey_hash) = address::decode(to_address)?;

    let (accumulated, spendable) = utxo.find_spendable_outputs(from_pubkey_hash, amount)?;
    if accumulated < amount {
        return Err(StoreError::InsufficientFunds {
            have: accumulated,
            need: amount,
        });
    }

    let pubkey = private_key.public_key().to_xy_bytes();
    let mut vin = Vec::new();
    for (txid, indices) in &spendable {
        for &index in indices {
            vin.push(TxInput {
                prev_txid: *txid,
                prev_vout: index,
                signature: Vec::new(),
                pubkey: pubkey.clone(),
            });
        }
    }

    let mut vout = vec![TxOutput::new(amount, to_pubkey_hash)];
    if accumulated > amount {
        vout.push(TxOutput::new(accumulated - amount, *from_pubkey_hash));
    }

    let mut tx = Transaction {
        id: Hash256::ZERO,
        vin,
        vout,
    };
    tx.id = tx.hash()?;

    let mut prev_txs = HashMap::new();
    for input in &tx.vin {
        if !prev_txs.contains_key(&input.prev_txid) {
            let prev = chain.find_transaction(&input.prev_txid)?;
            prev_txs.insert(input.prev_txid, prev);
        }
    }
    tx.sign(private_key, &prev_txs)?;

    Ok(tx)
}
