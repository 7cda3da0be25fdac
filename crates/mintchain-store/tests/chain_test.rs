//! End-to-end scenarios exercising the chain store and UTXO index
//! together against a disposable on-disk database.

use mintchain_core::address::{self, hash_pubkey};
use mintchain_core::crypto::PrivateKey;
use mintchain_store::chain::ChainStore;
use mintchain_store::tx_builder::new_utxo_transaction;
use mintchain_store::utxo::UtxoIndex;

fn miner_address() -> (PrivateKey, String) {
    let key = PrivateKey::generate();
    let pubkey_hash = hash_pubkey(&key.public_key().to_xy_bytes());
    (key, address::encode(&pubkey_hash))
}

#[test]
fn genesis_block_is_created_and_pays_subsidy() {
    let dir = tempfile::tempdir().unwrap();
    let (_key, addr) = miner_address();

    let chain = ChainStore::create_blockchain_at(dir.path().join("chain.db"), &addr).unwrap();

    assert_eq!(chain.get_best_height().unwrap(), 0);
    let tip = chain.get_block(&chain.tip_hash().unwrap()).unwrap();
    assert!(tip.is_genesis());
    assert!(tip.coinbase().unwrap().is_coinbase());
}

#[test]
fn mining_a_transfer_moves_balance_between_addresses() {
    let dir = tempfile::tempdir().unwrap();
    let (miner_key, miner_addr) = miner_address();
    let (_receiver_key, receiver_addr) = miner_address();

    let chain = ChainStore::create_blockchain_at(dir.path().join("chain.db"), &miner_addr).unwrap();
    let utxo = UtxoIndex::new(&chain);
    utxo.reindex(&chain).unwrap();

    let (_version, miner_pkh) = address::decode(&miner_addr).unwrap();
    let (_version, receiver_pkh) = address::decode(&receiver_addr).unwrap();

    let spend = new_utxo_transaction(&miner_key, &miner_pkh, &receiver_addr, 4, &utxo, &chain).unwrap();
    let block = chain.mine_block(vec![spend]).unwrap();
    utxo.update(&block).unwrap();

    let receiver_balance: u64 = utxo.find_utxo(&receiver_pkh).unwrap().iter().map(|o| o.value).sum();
    assert_eq!(receiver_balance, 4);

    let miner_balance: u64 = utxo.find_utxo(&miner_pkh).unwrap().iter().map(|o| o.value).sum();
    assert_eq!(miner_balance, 10 - 4);
}

#[test]
fn spending_more_than_available_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (miner_key, miner_addr) = miner_address();
    let (_receiver_key, receiver_addr) = miner_address();

    let chain = ChainStore::create_blockchain_at(dir.path().join("chain.db"), &miner_addr).unwrap();
    let utxo = UtxoIndex::new(&chain);
    utxo.reindex(&chain).unwrap();

    let (_version, miner_pkh) = address::decode(&miner_addr).unwrap();

    let tip_before = chain.tip_hash().unwrap();
    let err = new_utxo_transaction(&miner_key, &miner_pkh, &receiver_addr, 1_000, &utxo, &chain).unwrap_err();
    assert!(matches!(
        err,
        mintchain_store::error::StoreError::InsufficientFunds { .. }
    ));
    assert_eq!(chain.get_best_height().unwrap(), 0);
    assert_eq!(chain.tip_hash().unwrap(), tip_before);
}

/// Reproduces the literal walkthrough from the testable-properties scenario:
/// genesis pays the miner 10, a mined transfer of 4 pays the receiver and
/// leaves the miner with a fresh coinbase plus change (10 + 10 - 4 = 16).
#[test]
fn mine_one_transfer_matches_the_worked_example() {
    let dir = tempfile::tempdir().unwrap();
    let (miner_key, miner_addr) = miner_address();
    let (_receiver_key, receiver_addr) = miner_address();

    let chain = ChainStore::create_blockchain_at(dir.path().join("chain.db"), &miner_addr).unwrap();
    let utxo = UtxoIndex::new(&chain);
    utxo.reindex(&chain).unwrap();

    let (_version, miner_pkh) = address::decode(&miner_addr).unwrap();
    let (_version, receiver_pkh) = address::decode(&receiver_addr).unwrap();

    let spend = new_utxo_transaction(&miner_key, &miner_pkh, &receiver_addr, 4, &utxo, &chain).unwrap();
    let reward = mintchain_core::tx::Transaction::new_coinbase(miner_pkh, Vec::new()).unwrap();
    let block = chain.mine_block(vec![reward, spend]).unwrap();
    utxo.update(&block).unwrap();

    assert_eq!(chain.get_best_height().unwrap(), 1);

    let miner_balance: u64 = utxo.find_utxo(&miner_pkh).unwrap().iter().map(|o| o.value).sum();
    let receiver_balance: u64 = utxo.find_utxo(&receiver_pkh).unwrap().iter().map(|o| o.value).sum();
    assert_eq!(miner_balance, 16);
    assert_eq!(receiver_balance, 4);
}

#[test]
fn mining_a_tampered_transaction_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (miner_key, miner_addr) = miner_address();
    let (_receiver_key, receiver_addr) = miner_address();

    let chain = ChainStore::create_blockchain_at(dir.path().join("chain.db"), &miner_addr).unwrap();
    let utxo = UtxoIndex::new(&chain);
    utxo.reindex(&chain).unwrap();

    let (_version, miner_pkh) = address::decode(&miner_addr).unwrap();
    let mut spend = new_utxo_transaction(&miner_key, &miner_pkh, &receiver_addr, 4, &utxo, &chain).unwrap();
    spend.vin[0].signature[0] ^= 0xFF;

    let err = chain.mine_block(vec![spend]).unwrap_err();
    assert!(matches!(
        err,
        mintchain_store::error::StoreError::InvalidTransaction(_)
    ));
}

#[test]
fn reindex_matches_incremental_update() {
    let dir = tempfile::tempdir().unwrap();
    let (miner_key, miner_addr) = miner_address();
    let (_receiver_key, receiver_addr) = miner_address();

    let chain = ChainStore::create_blockchain_at(dir.path().join("chain.db"), &miner_addr).unwrap();
    let utxo = UtxoIndex::new(&chain);
    utxo.reindex(&chain).unwrap();

    let (_version, miner_pkh) = address::decode(&miner_addr).unwrap();
    let spend = new_utxo_transaction(&miner_key, &miner_pkh, &receiver_addr, 3, &utxo, &chain).unwrap();
    let block = chain.mine_block(vec![spend]).unwrap();
    utxo.update(&block).unwrap();

    let incremental = utxo.all_utxo().unwrap();

    utxo.reindex(&chain).unwrap();
    let rebuilt = utxo.all_utxo().unwrap();

    assert_eq!(incremental, rebuilt);
}

#[test]
fn chain_iterator_walks_every_block_to_genesis() {
    let dir = tempfile::tempdir().unwrap();
    let (miner_key, miner_addr) = miner_address();
    let (_receiver_key, receiver_addr) = miner_address();

    let chain = ChainStore::create_blockchain_at(dir.path().join("chain.db"), &miner_addr).unwrap();
    let utxo = UtxoIndex::new(&chain);
    utxo.reindex(&chain).unwrap();

    let (_version, miner_pkh) = address::decode(&miner_addr).unwrap();
    for amount in [1u64, 1, 1] {
        let spend = new_utxo_transaction(&miner_key, &miner_pkh, &receiver_addr, amount, &utxo, &chain).unwrap();
        let block = chain.mine_block(vec![spend]).unwrap();
        utxo.update(&block).unwrap();
    }

    let hashes = chain.get_block_hashes().unwrap();
    assert_eq!(hashes.len(), 4);

    let mut iter = chain.iterator();
    let mut seen = 0;
    while iter.next_block().unwrap().is_some() {
        seen += 1;
    }
    assert_eq!(seen, 4);
}
