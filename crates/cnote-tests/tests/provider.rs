//! Swapping cryptographic primitives under the facade.
//!
//! Every primitive can be replaced through `CryptoOverrides`; the engine
//! must call the replacement at the same call sites with the same
//! arguments, and surface its failures unchanged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cnote_core::config::Config;
use cnote_core::crypto::DefaultCrypto;
use cnote_core::error::CryptoError;
use cnote_core::overrides::CryptoOverrides;
use cnote_core::traits::CryptoProvider;
use cnote_tests::helpers::*;
use cnote_wallet::{CryptoNote, WalletError};

fn base() -> Arc<dyn CryptoProvider> {
    Arc::new(DefaultCrypto)
}

fn engine_with(overrides: CryptoOverrides) -> CryptoNote {
    CryptoNote::with_crypto(Config::default(), Arc::new(overrides))
}

#[test]
fn pinned_key_generation_makes_builds_reproducible() {
    let fixed = DefaultCrypto.generate_keys();
    let pinned = fixed.clone();
    let engine = engine_with(CryptoOverrides::new(base()).with_generate_keys(move || pinned.clone()));
    let funding = CryptoNote::default();
    let alice = new_wallet(&funding);
    let bob = new_wallet(&funding);
    let owned = fund(&funding, &alice, &[210], 0);

    let mut builder = engine.transaction_builder();
    builder
        .add_recipients(engine.create_transaction_outputs(&bob.address, 200, None).unwrap())
        .spend(owned, Vec::new());
    let a = engine.create_transaction(&builder).unwrap();
    let b = engine.create_transaction(&builder).unwrap();
    assert_eq!(a.raw_transaction, b.raw_transaction);
    assert_eq!(a.transaction_keys, fixed);
}

#[test]
fn failing_ring_check_aborts_the_build() {
    let engine = engine_with(CryptoOverrides::new(base()).with_check_ring_signatures(|_, _, _, _| false));
    let alice = new_wallet(&engine);
    let bob = new_wallet(&engine);

    let mut builder = engine.transaction_builder();
    builder
        .add_recipients(engine.create_transaction_outputs(&bob.address, 100, None).unwrap())
        .spend(fund(&engine, &alice, &[110], 0), Vec::new());
    assert_eq!(
        engine.create_transaction(&builder).unwrap_err(),
        WalletError::SignatureGenerationFailed { input: 0 }
    );
}

#[test]
fn failing_ring_signer_aborts_the_build() {
    let engine = engine_with(CryptoOverrides::new(base()).with_generate_ring_signatures(|_, _, _, _, _| {
        Err(CryptoError::PrimitiveFailure { primitive: "generate_ring_signatures", reason: "offline".into() })
    }));
    let alice = new_wallet(&engine);
    let bob = new_wallet(&engine);

    let mut builder = engine.transaction_builder();
    builder
        .add_recipients(engine.create_transaction_outputs(&bob.address, 100, None).unwrap())
        .spend(fund(&engine, &alice, &[110], 0), Vec::new());
    assert_eq!(
        engine.create_transaction(&builder).unwrap_err(),
        WalletError::SignatureGenerationFailed { input: 0 }
    );
}

#[test]
fn derivation_failure_surfaces_as_primitive_failure() {
    let engine = engine_with(CryptoOverrides::new(base()).with_generate_key_derivation(|_, _| {
        Err(CryptoError::PrimitiveFailure { primitive: "generate_key_derivation", reason: "refused".into() })
    }));
    let err = engine
        .generate_key_derivation(&pk(TX_PUBLIC_KEY), &sk(PRIVATE_VIEW_KEY))
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::Crypto(CryptoError::PrimitiveFailure { primitive: "generate_key_derivation", .. })
    ));
}

#[test]
fn custom_hash_changes_checksums() {
    let engine = engine_with(CryptoOverrides::new(base()).with_hash(|data| {
        let mut digest = DefaultCrypto.hash(data);
        digest.0[0] ^= 0xff;
        digest
    }));
    // The reference address was checksummed with the standard hash.
    assert!(matches!(
        engine.decode_address(TRTL_ADDRESS, None),
        Err(WalletError::Address(cnote_core::error::AddressError::ChecksumMismatch))
    ));
    // Its own encodings still round trip.
    let address = engine.encode_address(&pk(TRTL_VIEW), &pk(TRTL_SPEND), None, None);
    assert!(engine.decode_address(&address, None).is_ok());
}

#[test]
fn scanner_calls_overridden_derive_public_key() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let engine = engine_with(CryptoOverrides::new(base()).with_derive_public_key(move |d, i, k| {
        counter.fetch_add(1, Ordering::SeqCst);
        DefaultCrypto.derive_public_key(d, i, k)
    }));

    let owned = reference_output(&engine);
    assert_eq!(owned.index, 2);
    // Once to test ownership, once more for the key image parts.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
