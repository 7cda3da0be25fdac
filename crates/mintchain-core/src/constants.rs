//! Protocol constants.

/// Block subsidy paid to a coinbase output, in native units.
pub const SUBSIDY: u64 = 10;

/// Proof-of-work target bits: the target is `1 << (256 - TARGET_BITS)`.
pub const TARGET_BITS: u32 = 24;

/// Length in bytes of the Base58Check address checksum.
pub const ADDRESS_CHECKSUM_LEN: usize = 4;

/// Address version byte.
pub const ADDRESS_VERSION: u8 = 0x00;

/// Length in bytes of a RIPEMD-160(SHA-256(pubkey)) pubkey hash.
pub const PUBKEY_HASH_LEN: usize = 20;

/// Coinbase data embedded in the genesis block.
pub const GENESIS_COINBASE_DATA: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";

/// Reserved chain-store key holding the tip block hash.
pub const TIP_KEY: &[u8] = b"1";

/// Logical bucket name for blocks and the tip pointer.
pub const BLOCKS_BUCKET: &str = "blocks";

/// Logical bucket name for the UTXO index.
pub const CHAINSTATE_BUCKET: &str = "chainstate";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_key_is_ascii_one() {
        assert_eq!(TIP_KEY, b"1");
    }

    #[test]
    fn genesis_phrase_matches_literal() {
        assert_eq!(
            GENESIS_COINBASE_DATA,
            "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks"
        );
    }
}
