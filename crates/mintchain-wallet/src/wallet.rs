//! A single keypair and the Base58Check address derived from it, plus a
//! file-backed collection of them keyed by address.
//!
//! Deliberately minimal: one P-256 keypair per wallet, no HD derivation,
//! no mnemonic recovery phrase, no at-rest encryption. A node's wallet
//! file is only as safe as its filesystem permissions.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mintchain_core::address::{self, hash_pubkey, PubkeyHash};
use mintchain_core::crypto::PrivateKey;

use crate::error::WalletError;

/// A P-256 keypair and the address it locks outputs to.
pub struct Wallet {
    private_key: PrivateKey,
    address: String,
}

impl Wallet {
    /// `NewWallet`: generate a fresh keypair and derive its address.
    pub fn new() -> Self {
        let private_key = PrivateKey::generate();
        let pubkey_hash = hash_pubkey(&private_key.public_key().to_xy_bytes());
        let address = address::encode(&pubkey_hash);
        Self { private_key, address }
    }

    fn from_private_key(private_key: PrivateKey) -> Self {
        let pubkey_hash = hash_pubkey(&private_key.public_key().to_xy_bytes());
        let address = address::encode(&pubkey_hash);
        Self { private_key, address }
    }

    /// `GetAddress`: this wallet's Base58Check address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Pubkey hash locking outputs owned by this wallet.
    pub fn pubkey_hash(&self) -> PubkeyHash {
        hash_pubkey(&self.private_key.public_key().to_xy_bytes())
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk representation: address -> raw 32-byte secret scalar. Keyed by
/// address rather than by an opaque index so lookups mirror how the CLI
/// and `mine_block`'s signer both address a wallet.
#[derive(Serialize, Deserialize, Default)]
struct WalletFile {
    keys: HashMap<String, [u8; 32]>,
}

/// `Wallets`: every keypair known to this node, persisted to
/// `wallet_<node_id>.dat`.
pub struct WalletStore {
    keys: HashMap<String, [u8; 32]>,
}

impl WalletStore {
    fn path(node_id: &str) -> PathBuf {
        PathBuf::from(format!("wallet_{node_id}.dat"))
    }

    /// `NewWallets`: load the node's wallet file, or start empty if it
    /// doesn't exist yet.
    pub fn open(node_id: &str) -> Result<Self, WalletError> {
        Self::open_at(Self::path(node_id))
    }

    /// Same as [`Self::open`] but at an arbitrary path, for tests.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self { keys: HashMap::new() });
        }
        let bytes = fs::read(path)?;
        let (file, _): (WalletFile, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| WalletError::Encoding(e.to_string()))?;
        Ok(Self { keys: file.keys })
    }

    /// `SaveToFile`: persist this store to `wallet_<node_id>.dat`.
    pub fn save(&self, node_id: &str) -> Result<(), WalletError> {
        self.save_at(Self::path(node_id))
    }

    /// Same as [`Self::save`] but at an arbitrary path.
    pub fn save_at(&self, path: impl AsRef<Path>) -> Result<(), WalletError> {
        let file = WalletFile { keys: self.keys.clone() };
        let bytes = bincode::serde::encode_to_vec(&file, bincode::config::standard())
            .map_err(|e| WalletError::Encoding(e.to_string()))?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// `CreateWallet`: generate a new keypair, add it to the store, and
    /// return its address.
    pub fn create_wallet(&mut self) -> String {
        let wallet = Wallet::new();
        let address = wallet.address().to_string();
        self.keys.insert(address.clone(), wallet.private_key.to_bytes());
        address
    }

    /// `GetAddresses`: every address this store holds a key for.
    pub fn addresses(&self) -> Vec<String> {
        self.keys.keys().cloned().collect()
    }

    /// `GetWallet`: reconstruct the wallet for `address`.
    pub fn get_wallet(&self, address: &str) -> Result<Wallet, WalletError> {
        let bytes = self
            .keys
            .get(address)
            .ok_or_else(|| WalletError::UnknownAddress(address.to_string()))?;
        let private_key = PrivateKey::from_bytes(bytes)?;
        Ok(Wallet::from_private_key(private_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wallet_address_validates() {
        let wallet = Wallet::new();
        assert!(address::validate_address(wallet.address()));
    }

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open_at(dir.path().join("missing.dat")).unwrap();
        assert!(store.addresses().is_empty());
    }

    #[test]
    fn create_wallet_then_get_wallet_round_trips() {
        let mut store = WalletStore::open_at("/nonexistent-for-test.dat").unwrap();
        let address = store.create_wallet();
        let wallet = store.get_wallet(&address).unwrap();
        assert_eq!(wallet.address(), address);
    }

    #[test]
    fn save_then_open_preserves_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet_test.dat");

        let mut store = WalletStore::open_at(&path).unwrap();
        let a1 = store.create_wallet();
        let a2 = store.create_wallet();
        store.save_at(&path).unwrap();

        let reopened = WalletStore::open_at(&path).unwrap();
        let mut addrs = reopened.addresses();
        addrs.sort();
        let mut expected = vec![a1, a2];
        expected.sort();
        assert_eq!(addrs, expected);
    }

    #[test]
    fn get_wallet_signs_with_same_key_each_time() {
        let mut store = WalletStore::open_at("/nonexistent-for-test-2.dat").unwrap();
        let address = store.create_wallet();
        let w1 = store.get_wallet(&address).unwrap();
        let w2 = store.get_wallet(&address).unwrap();
        assert_eq!(w1.private_key().to_bytes(), w2.private_key().to_bytes());
    }

    #[test]
    fn unknown_address_is_rejected() {
        let store = WalletStore::open_at("/nonexistent-for-test-3.dat").unwrap();
        assert!(matches!(
            store.get_wallet("not-a-real-address"),
            Err(WalletError::UnknownAddress(_))
        ));
    }
}
