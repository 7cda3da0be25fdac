//! Base58Check address encoding.
//!
//! An address is `Base58(version(1) || pubkey_hash(20) || checksum(4))`.
//! The checksum is the first 4 bytes of `SHA-256(SHA-256(version ||
//! pubkey_hash))` — the same double-hash checksum scheme as the wider
//! Base58Check family this crate's `bs58`/`sha2`/`ripemd` dependency trio
//! is drawn from.

use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::constants::{ADDRESS_CHECKSUM_LEN, ADDRESS_VERSION, PUBKEY_HASH_LEN};
use crate::error::AddressError;

/// A 20-byte `RIPEMD-160(SHA-256(pubkey))` hash identifying the owner of an
/// output.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PubkeyHash(pub [u8; PUBKEY_HASH_LEN]);

impl PubkeyHash {
    pub fn as_bytes(&self) -> &[u8; PUBKEY_HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for PubkeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// `RIPEMD-160(SHA-256(pubkey))`.
pub fn hash_pubkey(pubkey: &[u8]) -> PubkeyHash {
    let sha = Sha256::digest(pubkey);
    let ripemd = Ripemd160::digest(sha);
    let mut out = [0u8; PUBKEY_HASH_LEN];
    out.copy_from_slice(&ripemd);
    PubkeyHash(out)
}

/// First [`ADDRESS_CHECKSUM_LEN`] bytes of `SHA-256(SHA-256(payload))`.
fn checksum(payload: &[u8]) -> [u8; ADDRESS_CHECKSUM_LEN] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; ADDRESS_CHECKSUM_LEN];
    out.copy_from_slice(&second[..ADDRESS_CHECKSUM_LEN]);
    out
}

/// Encode a pubkey hash into a Base58Check address string.
pub fn encode(pubkey_hash: &PubkeyHash) -> String {
    let mut payload = Vec::with_capacity(1 + PUBKEY_HASH_LEN + ADDRESS_CHECKSUM_LEN);
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(&pubkey_hash.0);
    let sum = checksum(&payload);
    payload.extend_from_slice(&sum);
    bs58::encode(payload).into_string()
}

/// Decode a Base58Check address into its version byte and pubkey hash,
/// verifying the checksum and the version byte.
pub fn decode(address: &str) -> Result<(u8, PubkeyHash), AddressError> {
    let full = bs58::decode(address)
        .into_vec()
        .map_err(|_| AddressError::InvalidEncoding)?;

    if full.len() != 1 + PUBKEY_HASH_LEN + ADDRESS_CHECKSUM_LEN {
        return Err(AddressError::InvalidLength);
    }

    let payload = &full[..1 + PUBKEY_HASH_LEN];
    let given_checksum = &full[1 + PUBKEY_HASH_LEN..];
    if checksum(payload) != given_checksum {
        return Err(AddressError::ChecksumMismatch);
    }

    let version = full[0];
    if version != ADDRESS_VERSION {
        return Err(AddressError::UnsupportedVersion(version));
    }

    let mut hash = [0u8; PUBKEY_HASH_LEN];
    hash.copy_from_slice(&full[1..1 + PUBKEY_HASH_LEN]);
    Ok((version, PubkeyHash(hash)))
}

/// `ValidateAddress`: decode, recomputing the checksum and version byte.
pub fn validate_address(address: &str) -> bool {
    decode(address).is_ok()
}
