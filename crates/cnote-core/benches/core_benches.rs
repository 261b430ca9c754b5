//! Criterion benchmarks for cnote-core hot paths.
//!
//! Covers: block Base58 address encoding/decoding, key derivation,
//! ring signature generation/verification, and transaction serialization.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cnote_core::address::{decode_address, encode_address};
use cnote_core::constants::DEFAULT_ADDRESS_PREFIX;
use cnote_core::crypto::DefaultCrypto;
use cnote_core::traits::CryptoProvider;
use cnote_core::transaction::{Transaction, TransactionInput, TransactionOutput};
use cnote_core::types::{Hash256, KeyImage, PublicKey, Signature};

const ADDRESS: &str = "TRTLv3nzumGSpRsZWxkcbDhiVEfy9rAgX3X9b7z8XQAy9gwjB6cwr6BJ3P52a6TQUSfA4eXf3Avwz7W89J4doLuigLjUzQjvRqX";

fn sample_transaction() -> Transaction {
    let mut tx = Transaction::new();
    tx.add_public_key(&PublicKey([0x11; 32]));
    for i in 0..4u8 {
        tx.inputs.push(TransactionInput {
            amount: 1000,
            key_offsets: vec![53984, 349063, 1130812, 61739],
            key_image: KeyImage([i; 32]),
        });
        tx.signatures.push(vec![Signature([i; 64]); 4]);
    }
    for amount in [1, 20, 300, 4000, 50000] {
        tx.outputs.push(TransactionOutput { amount, key: PublicKey([0x22; 32]) });
    }
    tx
}

fn bench_address(c: &mut Criterion) {
    let crypto = DefaultCrypto;
    let decoded = decode_address(&crypto, ADDRESS, DEFAULT_ADDRESS_PREFIX).unwrap();

    c.bench_function("address_encode", |b| {
        b.iter(|| {
            encode_address(
                &crypto,
                black_box(&decoded.public_view_key),
                black_box(&decoded.public_spend_key),
                None,
                DEFAULT_ADDRESS_PREFIX,
            )
        })
    });

    c.bench_function("address_decode", |b| {
        b.iter(|| decode_address(&crypto, black_box(ADDRESS), DEFAULT_ADDRESS_PREFIX))
    });
}

fn bench_derivation(c: &mut Criterion) {
    let crypto = DefaultCrypto;
    let tx_keys = crypto.generate_keys();
    let view = crypto.generate_keys();
    let spend = crypto.generate_keys();

    c.bench_function("generate_key_derivation", |b| {
        b.iter(|| crypto.generate_key_derivation(black_box(&tx_keys.public_key), &view.secret_key))
    });

    let derivation = crypto.generate_key_derivation(&tx_keys.public_key, &view.secret_key).unwrap();
    c.bench_function("derive_public_key", |b| {
        b.iter(|| crypto.derive_public_key(black_box(&derivation), 3, &spend.public_key))
    });
}

fn bench_ring_signatures(c: &mut Criterion) {
    let crypto = DefaultCrypto;
    let members: Vec<_> = (0..4).map(|_| crypto.generate_keys()).collect();
    let keys: Vec<PublicKey> = members.iter().map(|m| m.public_key).collect();
    let image = crypto.generate_key_image(&keys[1], &members[1].secret_key).unwrap();
    let prefix = Hash256([0x5a; 32]);

    c.bench_function("ring_sign_4", |b| {
        b.iter(|| {
            crypto.generate_ring_signatures(black_box(&prefix), &image, &keys, &members[1].secret_key, 1)
        })
    });

    let sigs = crypto
        .generate_ring_signatures(&prefix, &image, &keys, &members[1].secret_key, 1)
        .unwrap();
    c.bench_function("ring_verify_4", |b| {
        b.iter(|| crypto.check_ring_signatures(black_box(&prefix), &image, &keys, &sigs))
    });
}

fn bench_transaction_serde(c: &mut Criterion) {
    let tx = sample_transaction();
    let bytes = tx.to_bytes();

    c.bench_function("transaction_to_bytes", |b| b.iter(|| black_box(&tx).to_bytes()));
    c.bench_function("transaction_from_bytes", |b| {
        b.iter(|| Transaction::from_bytes(black_box(&bytes)))
    });
}

criterion_group!(
    benches,
    bench_address,
    bench_derivation,
    bench_ring_signatures,
    bench_transaction_serde,
);
criterion_main!(benches);
