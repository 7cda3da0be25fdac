//! Transactions: inputs, outputs, canonical serialisation, and ECDSA
//! signing/verification.
//!
//! # Signing preimage
//!
//! Each input is signed independently over a message built like this:
//!
//! 1. Start from [`Transaction::trimmed_copy`] (signatures and pubkeys
//!    cleared on every input, outputs copied verbatim).
//! 2. For the input being signed, set its `pubkey` field to the
//!    `pubkey_hash` of the output it spends.
//! 3. Serialise the whole trimmed transaction in that mutated state, hex
//!    encode the bytes, append a newline. That text is the ECDSA message.
//! 4. Clear the `pubkey` field again before moving to the next input.
//!
//! Preserving the hex-of-serialised-trimmed-tx shape (rather than hashing
//! the raw bytes) is load-bearing: it's what every verifier must
//! reconstruct byte-for-byte to check a signature.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::PubkeyHash;
use crate::constants::SUBSIDY;
use crate::crypto::{PrivateKey, PublicKey};
use crate::error::TransactionError;
use crate::hash::Hash256;

/// An input spending a previous output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// Id of the transaction containing the spent output. Zero for coinbase.
    pub prev_txid: Hash256,
    /// Index of the spent output. `-1` for coinbase.
    pub prev_vout: i64,
    /// `r || s` ECDSA signature. Empty for coinbase.
    pub signature: Vec<u8>,
    /// `X || Y` public key. For coinbase, arbitrary extranonce data.
    pub pubkey: Vec<u8>,
}

impl TxInput {
    /// Whether this is the sentinel coinbase input (no real previous output).
    pub fn is_coinbase(&self) -> bool {
        self.prev_txid.is_zero() && self.prev_vout == -1
    }
}

/// An output, creating a new spendable UTXO locked to a pubkey hash.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Value in native units.
    pub value: u64,
    /// Owner of this output.
    pub pubkey_hash: PubkeyHash,
}

impl TxOutput {
    pub fn new(value: u64, pubkey_hash: PubkeyHash) -> Self {
        Self { value, pubkey_hash }
    }

    pub fn is_locked_with(&self, pubkey_hash: &PubkeyHash) -> bool {
        self.pubkey_hash == *pubkey_hash
    }
}

/// The serialised value stored per transaction id in the UTXO index: the
/// still-unspent outputs of that transaction, in their original positions.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TxOutputs(pub Vec<TxOutput>);

/// A transaction: a set of inputs spending previous outputs and a set of
/// new outputs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Hash256,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
}

impl Transaction {
    /// A transaction is a coinbase iff it has exactly one input and that
    /// input carries the coinbase sentinel outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].is_coinbase()
    }

    /// Canonical, deterministic byte encoding. Round-trips exactly; equal
    /// transactions always serialise identically.
    pub fn serialize(&self) -> Result<Vec<u8>, TransactionError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, TransactionError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(tx, _)| tx)
            .map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    /// Compute the transaction id: clone with `id` cleared, serialise,
    /// `SHA-256` the bytes.
    pub fn hash(&self) -> Result<Hash256, TransactionError> {
        let mut clone = self.clone();
        clone.id = Hash256::ZERO;
        let bytes = clone.serialize()?;
        Ok(Hash256::sha256(&bytes))
    }

    /// A copy with every input's signature and pubkey cleared; outputs
    /// copied verbatim. The scaffold over which signing preimages are built.
    pub fn trimmed_copy(&self) -> Self {
        let vin = self
            .vin
            .iter()
            .map(|input| TxInput {
                prev_txid: input.prev_txid,
                prev_vout: input.prev_vout,
                signature: Vec::new(),
                pubkey: Vec::new(),
            })
            .collect();
        Self {
            id: self.id,
            vin,
            vout: self.vout.clone(),
        }
    }

    /// Signing preimage for input `index`: hex-encode the serialised
    /// trimmed copy (with that input's `pubkey` set to the spent output's
    /// pubkey hash) followed by a newline.
    fn signing_message(
        trimmed: &mut Transaction,
        index: usize,
        prev_pubkey_hash: &PubkeyHash,
    ) -> Result<Vec<u8>, TransactionError> {
        trimmed.vin[index].pubkey = prev_pubkey_hash.as_bytes().to_vec();
        let bytes = trimmed.serialize()?;
        let mut message = hex::encode(bytes).into_bytes();
        message.push(b'\n');
        trimmed.vin[index].pubkey.clear();
        Ok(message)
    }

    /// Sign every input against the previous transactions it spends.
    ///
    /// No-op for coinbase. Fails with [`TransactionError::MissingPrevTx`] if
    /// any referenced previous transaction is absent from `prev_txs`.
    pub fn sign(
        &mut self,
        private_key: &PrivateKey,
        prev_txs: &HashMap<Hash256, Transaction>,
    ) -> Result<(), TransactionError> {
        if self.is_coinbase() {
            return Ok(());
        }

        for input in &self.vin {
            if !prev_txs.contains_key(&input.prev_txid) {
                return Err(TransactionError::MissingPrevTx(input.prev_txid.to_string()));
            }
        }

        let mut trimmed = self.trimmed_copy();
        let mut signatures = Vec::with_capacity(self.vin.len());
        for (index, input) in self.vin.iter().enumerate() {
            let prev_tx = &prev_txs[&input.prev_txid];
            let prev_out = &prev_tx.vout[input.prev_vout as usize];
            let message = Self::signing_message(&mut trimmed, index, &prev_out.pubkey_hash)?;
            signatures.push(private_key.sign(&message));
        }

        for (input, signature) in self.vin.iter_mut().zip(signatures) {
            input.signature = signature;
        }
        Ok(())
    }

    /// Verify every input's signature against the previous transactions it
    /// spends. Returns `true` for coinbase. Returns `false` if any previous
    /// transaction is missing or any signature fails to verify.
    pub fn verify(&self, prev_txs: &HashMap<Hash256, Transaction>) -> bool {
        if self.is_coinbase() {
            return true;
        }

        for input in &self.vin {
            if !prev_txs.contains_key(&input.prev_txid) {
                return false;
            }
        }

        let mut trimmed = self.trimmed_copy();
        for (index, input) in self.vin.iter().enumerate() {
            let prev_tx = &prev_txs[&input.prev_txid];
            let Some(prev_out) = prev_tx.vout.get(input.prev_vout as usize) else {
                return false;
            };
            let message = match Self::signing_message(&mut trimmed, index, &prev_out.pubkey_hash) {
                Ok(m) => m,
                Err(_) => return false,
            };
            let Ok(pubkey) = PublicKey::from_xy_bytes(&input.pubkey) else {
                return false;
            };
            if pubkey.verify(&message, &input.signature).is_err() {
                return false;
            }
        }
        true
    }

    /// Build a coinbase transaction paying the fixed subsidy to
    /// `to_pubkey_hash`. If `data` is empty, 20 random bytes are used
    /// instead (hex-encoded extranonce).
    pub fn new_coinbase(to_pubkey_hash: PubkeyHash, data: Vec<u8>) -> Result<Self, TransactionError> {
        let data = if data.is_empty() {
            let mut bytes = [0u8; 20];
            use rand::RngCore;
            rand::rngs::OsRng.fill_bytes(&mut bytes);
            hex::encode(bytes).into_bytes()
        } else {
            data
        };

        let mut tx = Transaction {
            id: Hash256::ZERO,
            vin: vec![TxInput {
                prev_txid: Hash256::ZERO,
                prev_vout: -1,
                signature: Vec::new(),
                pubkey: data,
            }],
            vout: vec![TxOutput::new(SUBSIDY, to_pubkey_hash)],
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }
}
