//! Persistent chain store and UTXO index.
//!
//! [`chain::ChainStore`] owns the `blocks` bucket (every block plus the
//! tip pointer); [`utxo::UtxoIndex`] owns the derived `chainstate` bucket.
//! Both share a single RocksDB handle opened via [`db`], so the database
//! itself provides the one-writer-many-readers guarantee neither type
//! needs to reimplement with a lock.

pub mod chain;
pub mod db;
pub mod error;
pub mod tx_builder;
pub mod utxo;

pub use chain::ChainStore;
pub use error::StoreError;
pub use tx_builder::new_utxo_transaction;
pub use utxo::UtxoIndex;
