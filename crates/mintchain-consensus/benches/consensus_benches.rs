//! Criterion benchmarks for mintchain-consensus critical operations.
//!
//! Covers: proof-of-work validation (the hot path every received block
//! runs through) and full mining of a single-transaction block.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mintchain_consensus::{new_genesis_block, pow};
use mintchain_core::address::hash_pubkey;
use mintchain_core::tx::Transaction;

fn sample_genesis() -> mintchain_core::block::Block {
    let coinbase = Transaction::new_coinbase(hash_pubkey(b"bench-miner"), b"bench".to_vec()).unwrap();
    new_genesis_block(coinbase).unwrap()
}

fn bench_pow_validate(c: &mut Criterion) {
    let block = sample_genesis();
    c.bench_function("pow_validate", |b| b.iter(|| pow::validate(black_box(&block))));
}

fn bench_mine_genesis(c: &mut Criterion) {
    c.bench_function("mine_genesis_block", |b| {
        b.iter(|| {
            let coinbase =
                Transaction::new_coinbase(hash_pubkey(b"bench-miner"), b"bench".to_vec()).unwrap();
            new_genesis_block(black_box(coinbase)).unwrap()
        })
    });
}

criterion_group!(benches, bench_pow_validate, bench_mine_genesis);
criterion_main!(benches);
