//! Proof-of-work: target derivation, nonce search, and validation.
//!
//! The target is a pure bit-shift (`1 << (256 - TARGET_BITS)`) compared via
//! big-integer ordering against the `SHA-256` digest of a fixed byte
//! layout. Both choices are deliberately simple so the preimage and
//! comparison are trivially reproducible across implementations — no
//! difficulty retargeting, just a fixed target checked every block.

use num_bigint::BigUint;

use mintchain_core::block::Block;
use mintchain_core::constants::TARGET_BITS;
use mintchain_core::hash::Hash256;

use crate::error::PowError;

/// The fixed proof-of-work target: `1 << (256 - TARGET_BITS)`.
pub fn target() -> BigUint {
    BigUint::from(1u8) << (256 - TARGET_BITS)
}

/// Assemble the nonce preimage: `prev_block_hash || merkle_root ||
/// be64(timestamp) || be64(target_bits) || be64(nonce)`.
fn preimage(block: &Block, merkle_root: &Hash256, nonce: i64) -> Result<Vec<u8>, PowError> {
    let mut data = Vec::with_capacity(32 + 32 + 8 + 8 + 8);
    data.extend_from_slice(block.prev_block_hash.as_bytes());
    data.extend_from_slice(merkle_root.as_bytes());
    data.extend_from_slice(&block.timestamp.to_be_bytes());
    data.extend_from_slice(&(TARGET_BITS as i64).to_be_bytes());
    data.extend_from_slice(&nonce.to_be_bytes());
    Ok(data)
}

fn hash_as_uint(hash: &Hash256) -> BigUint {
    BigUint::from_bytes_be(hash.as_bytes())
}

/// Search for the nonce whose preimage hash is below [`target`].
///
/// Tries `n = 0, 1, 2, ...` up to `i64::MAX`. Returns the winning
/// `(nonce, hash)` pair.
pub fn run(block: &Block) -> Result<(i64, Hash256), PowError> {
    let merkle_root = block.hash_transactions()?;
    let target = target();

    let mut nonce: i64 = 0;
    loop {
        let data = preimage(block, &merkle_root, nonce)?;
        let hash = Hash256::sha256(&data);
        if hash_as_uint(&hash) < target {
            return Ok((nonce, hash));
        }
        nonce = nonce.checked_add(1).ok_or(PowError::NonceSpaceExhausted)?;
    }
}

/// Recompute the hash for `block.nonce` against the block's current
/// `timestamp`, `prev_block_hash`, and transactions, and check it against
/// the fixed target.
pub fn validate(block: &Block) -> Result<bool, PowError> {
    let merkle_root = block.hash_transactions()?;
    let data = preimage(block, &merkle_root, block.nonce)?;
    let hash = Hash256::sha256(&data);
    Ok(hash_as_uint(&hash) < target())
}
