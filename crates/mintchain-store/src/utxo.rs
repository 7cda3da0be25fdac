//! UTXO index: a derived, rebuildable cache over the `chainstate` bucket
//! that lets spend selection and balance queries avoid walking the whole
//! chain on every call.

use std::collections::HashMap;
use std::sync::Arc;

use rocksdb::{WriteBatch, DB};

use mintchain_core::address::PubkeyHash;
use mintchain_core::block::Block;
use mintchain_core::constants::CHAINSTATE_BUCKET;
use mintchain_core::hash::Hash256;
use mintchain_core::tx::{TxOutput, TxOutputs};

use crate::chain::ChainStore;
use crate::error::StoreError;

/// Unspent-output cache keyed by txid, stored in the `chainstate` column
/// family. Rebuilt wholesale by [`UtxoIndex::reindex`] and kept current
/// incrementally by [`UtxoIndex::update`] as each block is mined or added.
pub struct UtxoIndex {
    db: Arc<DB>,
}

impl UtxoIndex {
    /// Open a UTXO index sharing the database handle backing `chain`.
    pub fn new(chain: &ChainStore) -> Self {
        Self { db: chain.db() }
    }

    fn chainstate_cf(&self) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(CHAINSTATE_BUCKET)
            .ok_or_else(|| StoreError::Backend("missing chainstate column family".into()))
    }

    /// Rebuild the index from scratch by re-deriving every UTXO from the
    /// chain store. Clears the existing `chainstate` contents first so a
    /// reindex always reflects the chain store exactly, never a merge of
    /// old and new state.
    pub fn reindex(&self, chain: &ChainStore) -> Result<(), StoreError> {
        let cf = self.chainstate_cf()?;

        let mut batch = WriteBatch::default();
        let mut iter = self.db.raw_iterator_cf(cf);
        iter.seek_to_first();
        let mut keys = Vec::new();
        while iter.valid() {
            if let Some(key) = iter.key() {
                keys.push(key.to_vec());
            }
            iter.next();
        }
        for key in keys {
            batch.delete_cf(cf, key);
        }

        let utxo = chain.find_utxo()?;
        for (txid, outs) in &utxo {
            batch.put_cf(cf, txid.as_bytes(), encode_outputs(outs)?);
        }
        self.db.write(batch)?;

        tracing::info!(transactions = utxo.len(), "reindexed utxo set");
        Ok(())
    }

    /// Incrementally fold a newly appended block into the index: drop the
    /// outputs its transactions spend, add the outputs it creates.
    pub fn update(&self, block: &Block) -> Result<(), StoreError> {
        let cf = self.chainstate_cf()?;
        let mut batch = WriteBatch::default();

        for tx in &block.transactions {
            if !tx.is_coinbase() {
                for input in &tx.vin {
                    let Some(bytes) = self.db.get_cf(cf, input.prev_txid.as_bytes())? else {
                        continue;
                    };
                    let outs = decode_outputs(&bytes)?;
                    let remaining: Vec<TxOutput> = outs
                        .0
                        .into_iter()
                        .enumerate()
                        .filter(|(index, _)| *index as i64 != input.prev_vout)
                        .map(|(_, out)| out)
                        .collect();
                    if remaining.is_empty() {
                        batch.delete_cf(cf, input.prev_txid.as_bytes());
                    } else {
                        batch.put_cf(cf, input.prev_txid.as_bytes(), encode_outputs(&TxOutputs(remaining))?);
                    }
                }
            }

            if !tx.vout.is_empty() {
                batch.put_cf(cf, tx.id.as_bytes(), encode_outputs(&TxOutputs(tx.vout.clone()))?);
            }
        }

        self.db.write(batch)?;
        Ok(())
    }

    /// Every unspent output currently indexed, keyed by txid.
    pub fn all_utxo(&self) -> Result<HashMap<Hash256, TxOutputs>, StoreError> {
        let cf = self.chainstate_cf()?;
        let mut out = HashMap::new();
        let mut iter = self.db.raw_iterator_cf(cf);
        iter.seek_to_first();
        while iter.valid() {
            let (Some(key), Some(value)) = (iter.key(), iter.value()) else {
                break;
            };
            let txid = key
                .try_into()
                .map(Hash256)
                .map_err(|_| StoreError::CorruptEncoding("chainstate key is not 32 bytes".into()))?;
            out.insert(txid, decode_outputs(value)?);
            iter.next();
        }
        Ok(out)
    }

    /// Outputs locked to `pubkey_hash` whose combined value is at least
    /// `amount`. Stops scanning early once enough value is accumulated.
    pub fn find_spendable_outputs(
        &self,
        pubkey_hash: &PubkeyHash,
        amount: u64,
    ) -> Result<(u64, HashMap<Hash256, Vec<i64>>), StoreError> {
        let mut accumulated = 0u64;
        let mut unspent_outputs: HashMap<Hash256, Vec<i64>> = HashMap::new();

        for (txid, outs) in self.all_utxo()? {
            if accumulated >= amount {
                break;
            }
            for (index, out) in outs.0.iter().enumerate() {
                if out.is_locked_with(pubkey_hash) && accumulated < amount {
                    accumulated += out.value;
                    unspent_outputs.entry(txid).or_default().push(index as i64);
                }
            }
        }

        Ok((accumulated, unspent_outputs))
    }

    /// Unspent outputs locked to `pubkey_hash`, for balance queries.
    pub fn find_utxo(&self, pubkey_hash: &PubkeyHash) -> Result<Vec<TxOutput>, StoreError> {
        let mut result = Vec::new();
        for (_txid, outs) in self.all_utxo()? {
            for out in outs.0 {
                if out.is_locked_with(pubkey_hash) {
                    result.push(out);
                }
            }
        }
        Ok(result)
    }

    /// Number of transactions currently represented in the index.
    pub fn count_transactions(&self) -> Result<usize, StoreError> {
        let cf = self.chainstate_cf()?;
        let mut count = 0;
        let mut iter = self.db.raw_iterator_cf(cf);
        iter.seek_to_first();
        while iter.valid() {
            count += 1;
            iter.next();
        }
        Ok(count)
    }
}

fn encode_outputs(outs: &TxOutputs) -> Result<Vec<u8>, StoreError> {
    bincode::serde::encode_to_vec(outs, bincode::config::standard())
        .map_err(|e| StoreError::CorruptEncoding(e.to_string()))
}

fn decode_outputs(bytes: &[u8]) -> Result<TxOutputs, StoreError> {
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map(|(outs, _)| outs)
        .map_err(|e| StoreError::CorruptEncoding(e.to_string()))
}
