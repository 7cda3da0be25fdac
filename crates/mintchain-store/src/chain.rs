//! Persistent block store: the `blocks` bucket (block hash → block, plus
//! the reserved tip pointer) and the operations that keep the tip pointer
//! and the block it names consistent.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rocksdb::{WriteBatch, DB};

use mintchain_consensus::new_block;
use mintchain_core::address;
use mintchain_core::block::Block;
use mintchain_core::constants::{BLOCKS_BUCKET, GENESIS_COINBASE_DATA, TIP_KEY};
use mintchain_core::hash::Hash256;
use mintchain_core::tx::{Transaction, TxOutputs};

use crate::db;
use crate::error::StoreError;

/// Persistent, append-only block store with a tip pointer.
///
/// Every operation that touches the tip (`add_block`, `mine_block`,
/// `create_blockchain`) writes the block and advances the tip in a single
/// [`WriteBatch`], so readers never observe a tip pointing at a block that
/// isn't yet durable.
pub struct ChainStore {
    db: Arc<DB>,
}

impl ChainStore {
    fn blocks_cf(&self) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(BLOCKS_BUCKET)
            .ok_or_else(|| StoreError::Backend("missing blocks column family".into()))
    }

    /// `CreateBlockchain`: fails if the database file already exists.
    /// Mints a coinbase to `address` carrying the genesis phrase, mines
    /// the genesis block, and writes it with the tip pointer in one batch.
    pub fn create_blockchain(node_id: &str, address: &str) -> Result<Self, StoreError> {
        Self::create_blockchain_at(db::db_path(node_id), address)
    }

    /// Same as [`Self::create_blockchain`] but at an arbitrary path, for
    /// tests that want an isolated, disposable database directory.
    pub fn create_blockchain_at(path: impl AsRef<std::path::Path>, address: &str) -> Result<Self, StoreError> {
        let (_version, pubkey_hash) = address::decode(address)?;
        let db = db::create_new(path)?;
        let store = Self { db };

        let coinbase = Transaction::new_coinbase(pubkey_hash, GENESIS_COINBASE_DATA.as_bytes().to_vec())?;
        let genesis = mintchain_consensus::new_genesis_block(coinbase)?;

        let cf = store.blocks_cf()?;
        let mut batch = WriteBatch::default();
        batch.put_cf(cf, genesis.hash.as_bytes(), genesis.serialize()?);
        batch.put_cf(cf, TIP_KEY, genesis.hash.as_bytes());
        store.db.write(batch)?;

        tracing::info!(height = genesis.height, hash = %genesis.hash, "created blockchain genesis block");
        Ok(store)
    }

    /// `NewBlockchain`: fails if the database file is absent.
    pub fn open(node_id: &str) -> Result<Self, StoreError> {
        Self::open_at(db::db_path(node_id))
    }

    /// Same as [`Self::open`] but at an arbitrary path.
    pub fn open_at(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let db = db::open_existing(path)?;
        Ok(Self { db })
    }

    /// Open a chain store backed by an already-open database handle
    /// (shared with a [`crate::utxo::UtxoIndex`] over the same file).
    pub fn from_db(db: Arc<DB>) -> Self {
        Self { db }
    }

    pub(crate) fn db(&self) -> Arc<DB> {
        Arc::clone(&self.db)
    }

    /// Current tip block hash (the block with maximum height known).
    pub fn tip_hash(&self) -> Result<Hash256, StoreError> {
        let cf = self.blocks_cf()?;
        let bytes = self
            .db
            .get_cf(cf, TIP_KEY)?
            .ok_or_else(|| StoreError::NotFound("tip pointer".into()))?;
        to_hash(&bytes)
    }

    /// `GetBestHeight`: the tip block's height.
    pub fn get_best_height(&self) -> Result<u64, StoreError> {
        Ok(self.get_block(&self.tip_hash()?)?.height)
    }

    /// `GetBlock`: returns the block at `hash` or `NotFound`.
    pub fn get_block(&self, hash: &Hash256) -> Result<Block, StoreError> {
        let cf = self.blocks_cf()?;
        let bytes = self
            .db
            .get_cf(cf, hash.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(hash.to_string()))?;
        Block::deserialize(&bytes).map_err(|e| StoreError::CorruptEncoding(e.to_string()))
    }

    /// `AddBlock`, used by the replicator receiving a block from a peer.
    ///
    /// Idempotent: does nothing if the block is already present. Otherwise
    /// persists it, then advances the tip only if the new block's height
    /// exceeds the current tip's height.
    pub fn add_block(&self, block: &Block) -> Result<(), StoreError> {
        let cf = self.blocks_cf()?;
        if self.db.get_cf(cf, block.hash.as_bytes())?.is_some() {
            return Ok(());
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(cf, block.hash.as_bytes(), block.serialize()?);

        let tip_height = match self.tip_hash() {
            Ok(tip) => self.get_block(&tip)?.height,
            Err(StoreError::NotFound(_)) => {
                batch.put_cf(cf, TIP_KEY, block.hash.as_bytes());
                self.db.write(batch)?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if block.height > tip_height {
            batch.put_cf(cf, TIP_KEY, block.hash.as_bytes());
        }
        self.db.write(batch)?;
        Ok(())
    }

    /// `MineBlock`: verify every transaction's signatures against its
    /// prevouts, then mine and persist a new block extending the tip.
    pub fn mine_block(&self, transactions: Vec<Transaction>) -> Result<Block, StoreError> {
        for tx in &transactions {
            if !tx.is_coinbase() {
                let prev_txs = self.gather_prev_txs(tx)?;
                if !tx.verify(&prev_txs) {
                    return Err(StoreError::InvalidTransaction(format!(
                        "signature verification failed for tx {}",
                        tx.id
                    )));
                }
            }
        }

        let tip_hash = self.tip_hash()?;
        let tip_height = self.get_block(&tip_hash)?.height;

        let block = new_block(transactions, tip_hash, tip_height + 1)?;

        let cf = self.blocks_cf()?;
        let mut batch = WriteBatch::default();
        batch.put_cf(cf, block.hash.as_bytes(), block.serialize()?);
        batch.put_cf(cf, TIP_KEY, block.hash.as_bytes());
        self.db.write(batch)?;

        tracing::info!(height = block.height, hash = %block.hash, "mined block");
        Ok(block)
    }

    fn gather_prev_txs(&self, tx: &Transaction) -> Result<HashMap<Hash256, Transaction>, StoreError> {
        let mut prev_txs = HashMap::new();
        for input in &tx.vin {
            if !prev_txs.contains_key(&input.prev_txid) {
                let prev = self.find_transaction(&input.prev_txid)?;
                prev_txs.insert(input.prev_txid, prev);
            }
        }
        Ok(prev_txs)
    }

    /// A cursor starting at the tip and walking back to genesis.
    pub fn iterator(&self) -> ChainIterator<'_> {
        ChainIterator {
            store: self,
            cursor: self.tip_hash().ok(),
        }
    }

    /// `FindTransaction`: linear walk tip→genesis returning the first
    /// transaction whose id matches.
    pub fn find_transaction(&self, id: &Hash256) -> Result<Transaction, StoreError> {
        let mut iter = self.iterator();
        while let Some(block) = iter.next_block()? {
            for tx in &block.transactions {
                if &tx.id == id {
                    return Ok(tx.clone());
                }
            }
            if block.prev_block_hash.is_zero() {
                break;
            }
        }
        Err(StoreError::NotFound(id.to_string()))
    }

    /// `GetBlockHashes`: all hashes from tip to genesis, in that order.
    pub fn get_block_hashes(&self) -> Result<Vec<Hash256>, StoreError> {
        let mut hashes = Vec::new();
        let mut iter = self.iterator();
        while let Some(block) = iter.next_block()? {
            hashes.push(block.hash);
            if block.prev_block_hash.is_zero() {
                break;
            }
        }
        Ok(hashes)
    }

    /// `Blockchain.FindUTXO`: walk tip→genesis once, collecting the
    /// unspent outputs of every transaction (newest-first handles
    /// arbitrary spend ordering within the pass).
    pub fn find_utxo(&self) -> Result<HashMap<Hash256, TxOutputs>, StoreError> {
        let mut spent: HashMap<Hash256, HashSet<i64>> = HashMap::new();
        let mut unspent: HashMap<Hash256, TxOutputs> = HashMap::new();

        let mut iter = self.iterator();
        while let Some(block) = iter.next_block()? {
            for tx in &block.transactions {
                let spent_indices = spent.get(&tx.id);
                let filtered = TxOutputs(
                    tx.vout
                        .iter()
                        .enumerate()
                        .filter(|(index, _)| {
                            !spent_indices
                                .map(|s| s.contains(&(*index as i64)))
                                .unwrap_or(false)
                        })
                        .map(|(_, out)| out.clone())
                        .collect(),
                );
                if !filtered.0.is_empty() {
                    unspent.insert(tx.id, filtered);
                }

                if !tx.is_coinbase() {
                    for input in &tx.vin {
                        spent.entry(input.prev_txid).or_default().insert(input.prev_vout);
                    }
                }
            }
            if block.prev_block_hash.is_zero() {
                break;
            }
        }

        Ok(unspent)
    }
}

fn to_hash(bytes: &[u8]) -> Result<Hash256, StoreError> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| StoreError::CorruptEncoding("tip pointer is not 32 bytes".into()))?;
    Ok(Hash256(arr))
}

/// Stateful cursor over the chain, from the tip back to genesis.
///
/// Single-threaded, non-restartable; does not follow tip advances that
/// happen after the iterator is created.
pub struct ChainIterator<'a> {
    store: &'a ChainStore,
    cursor: Option<Hash256>,
}

impl<'a> ChainIterator<'a> {
    /// Read the block at the cursor and advance to its parent. Returns
    /// `None` once the cursor runs past genesis.
    pub fn next_block(&mut self) -> Result<Option<Block>, StoreError> {
        let Some(hash) = self.cursor else {
            return Ok(None);
        };
        let block = self.store.get_block(&hash)?;
        self.cursor = if block.prev_block_hash.is_zero() {
            None
        } else {
            Some(block.prev_block_hash)
        };
        Ok(Some(block))
    }
}
