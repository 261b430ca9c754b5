//! Shared fixtures for the integration tests.

use cnote_core::types::{Output, PublicKey, RandomOutput, SecretKey};
use cnote_wallet::{CryptoNote, Wallet};

/// Reference transaction public key; output 2 pays [`PUBLIC_SPEND_KEY`].
pub const TX_PUBLIC_KEY: &str = "3b0cc2b066812e6b9fcc42a797dc3c723a7344b604fd4be0b22e06254ff57f94";
pub const PRIVATE_VIEW_KEY: &str = "6968a0b8f744ec4b8cea5ec124a1b4bd1626a2e6f31e999f8adbab52c4dfa909";
pub const PUBLIC_SPEND_KEY: &str = "854a637b2863af9e8e8216eb2382f3d16616b3ac3e53d0976fbd6f8da6c56418";
pub const PRIVATE_SPEND_KEY: &str = "d9d555a892a85f64916cae1a168bd3f7f400b6471c7b12b438b599601298210b";
/// One-time key of output 2 of the reference transaction.
pub const OWNED_OUTPUT_KEY: &str = "bb55bef919d1c9f74b5b52a8a6995a1dc4af4c0bb8824f5dc889012bc748173d";
pub const OWNED_GLOBAL_INDEX: u64 = 1_595_598;

pub const TRTL_ADDRESS: &str = "TRTLv3nzumGSpRsZWxkcbDhiVEfy9rAgX3X9b7z8XQAy9gwjB6cwr6BJ3P52a6TQUSfA4eXf3Avwz7W89J4doLuigLjUzQjvRqX";
pub const TRTL_RAW: &str = "9df6ee01f71e440f9a5aab08dbdab0f4f36bba813660a0600f109b1371dc53be33f23c99f0ba225065e1b9c2e43165b3e41f10fcb768853126dfa7e612a3df2deb332492cc073a66";
pub const TRTL_SPEND: &str = "f71e440f9a5aab08dbdab0f4f36bba813660a0600f109b1371dc53be33f23c99";
pub const TRTL_VIEW: &str = "f0ba225065e1b9c2e43165b3e41f10fcb768853126dfa7e612a3df2deb332492";

pub fn pk(hex: &str) -> PublicKey {
    hex.parse().expect("valid public key")
}

pub fn sk(hex: &str) -> SecretKey {
    hex.parse().expect("valid secret key")
}

/// Output 2 of the reference transaction, scanned with the spend key so it
/// can be spent.
pub fn reference_output(engine: &CryptoNote) -> Output {
    engine
        .is_our_transaction_output(
            &pk(TX_PUBLIC_KEY),
            &Output::new(pk(OWNED_OUTPUT_KEY), 2, OWNED_GLOBAL_INDEX, 100),
            &sk(PRIVATE_VIEW_KEY),
            &pk(PUBLIC_SPEND_KEY),
            Some(&sk(PRIVATE_SPEND_KEY)),
        )
        .expect("scan succeeds")
        .expect("reference output is owned")
}

/// Pay `amounts` to `wallet` in one synthetic transaction and scan them
/// back as spendable outputs. Global indices start at `first_global_index`
/// and step by 1000.
pub fn fund(engine: &CryptoNote, wallet: &Wallet, amounts: &[u64], first_global_index: u64) -> Vec<Output> {
    let crypto = engine.crypto();
    let tx_keys = crypto.generate_keys();
    let derivation = crypto
        .generate_key_derivation(&wallet.view.public_key, &tx_keys.secret_key)
        .expect("derivation");
    let candidates: Vec<Output> = amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| {
            let key = crypto
                .derive_public_key(&derivation, i as u64, &wallet.spend.public_key)
                .expect("output key");
            Output::new(key, i as u64, first_global_index + i as u64 * 1_000, amount)
        })
        .collect();
    engine
        .scan_transaction_outputs(
            &tx_keys.public_key,
            &candidates,
            &wallet.view.secret_key,
            &wallet.spend.public_key,
            Some(&wallet.spend.secret_key),
        )
        .expect("scan succeeds")
}

/// Random decoys at the given global indices.
pub fn decoys(engine: &CryptoNote, indices: &[u64]) -> Vec<RandomOutput> {
    indices
        .iter()
        .map(|&global_index| RandomOutput { key: engine.crypto().generate_keys().public_key, global_index })
        .collect()
}

pub fn new_wallet(engine: &CryptoNote) -> Wallet {
    engine.create_new_address(None, None, None).expect("new wallet")
}
