//! Minimal wallet: one P-256 keypair per address, file-backed persistence.

pub mod error;
pub mod wallet;

pub use error::WalletError;
pub use wallet::{Wallet, WalletStore};
