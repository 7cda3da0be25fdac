//! Shared RocksDB handle opening for the chain store and UTXO index.
//!
//! Both logical buckets the spec describes (`blocks`, `chainstate`) live as
//! column families in a single database file, so [`ChainStore`](crate::chain::ChainStore)
//! and [`UtxoIndex`](crate::utxo::UtxoIndex) can share one `Arc<DB>` handle
//! and still compose the one-writer-many-readers guarantees RocksDB gives
//! for free.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rocksdb::{ColumnFamilyDescriptor, Options, DB};

use mintchain_core::constants::{BLOCKS_BUCKET, CHAINSTATE_BUCKET};

use crate::error::StoreError;

/// Path to the database file for a given node identifier.
pub fn db_path(node_id: &str) -> PathBuf {
    PathBuf::from(format!("blockchain_{node_id}.db"))
}

/// Open an existing database, failing if it is absent.
pub fn open_existing(path: impl AsRef<Path>) -> Result<Arc<DB>, StoreError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StoreError::DatabaseMissing(path.display().to_string()));
    }
    open_inner(path, false)
}

/// Create a new database, failing if one already exists.
pub fn create_new(path: impl AsRef<Path>) -> Result<Arc<DB>, StoreError> {
    let path = path.as_ref();
    if path.exists() {
        return Err(StoreError::DatabaseExists(path.display().to_string()));
    }
    open_inner(path, true)
}

fn open_inner(path: &Path, create: bool) -> Result<Arc<DB>, StoreError> {
    let mut opts = Options::default();
    opts.create_if_missing(create);
    opts.create_missing_column_families(create);

    let cfs = vec![
        ColumnFamilyDescriptor::new(BLOCKS_BUCKET, Options::default()),
        ColumnFamilyDescriptor::new(CHAINSTATE_BUCKET, Options::default()),
    ];

    let db = DB::open_cf_descriptors(&opts, path, cfs)?;
    Ok(Arc::new(db))
}
