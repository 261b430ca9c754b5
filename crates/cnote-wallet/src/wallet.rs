//! Wallet identities: key pairs, address, and optional recovery material.

use bip39::Language;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cnote_core::address::encode_address;
use cnote_core::constants::KEY_SIZE;
use cnote_core::traits::CryptoProvider;
use cnote_core::types::{KeyPair, SecretKey};

use crate::error::WalletError;
use crate::keys::{self, Seed};
use crate::mnemonic;

/// A spend/view key pair set with its encoded address.
///
/// `mnemonic` and `seed` are only present when the view key is the one
/// deterministically derived from the spend key; wallets built from
/// independent key pairs cannot be restored from a phrase and never get one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub spend: KeyPair,
    pub view: KeyPair,
    pub address: String,
    pub mnemonic: Option<String>,
    pub seed: Option<Seed>,
    pub sub_wallet_index: u64,
}

impl Wallet {
    /// Whether the view secret is `scalar_reduce(hash(spend secret))`.
    pub fn is_deterministic(&self, crypto: &dyn CryptoProvider) -> bool {
        keys::deterministic_view_secret(crypto, &self.spend.secret_key) == self.view.secret_key
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("spend_public", &self.spend.public_key)
            .field("view_public", &self.view.public_key)
            .field("sub_wallet_index", &self.sub_wallet_index)
            .field("has_mnemonic", &self.mnemonic.is_some())
            .finish_non_exhaustive()
    }
}

fn address_of(crypto: &dyn CryptoProvider, spend: &KeyPair, view: &KeyPair, prefix: u64) -> String {
    encode_address(crypto, &view.public_key, &spend.public_key, None, prefix)
}

/// Build a wallet from seed material.
///
/// A 32-byte seed reduces straight to the spend secret and the view secret
/// comes from hashing that spend secret. Any other length is hashed to 32
/// bytes first and the view secret comes from hashing that digest.
pub fn create_address_from_seed(
    crypto: &dyn CryptoProvider,
    seed: &Seed,
    language: Language,
    prefix: u64,
) -> Result<Wallet, WalletError> {
    let canonical = seed.is_canonical_length();
    let first: [u8; KEY_SIZE] = if canonical {
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(seed.as_bytes());
        bytes
    } else {
        crypto.hash(seed.as_bytes()).0
    };

    let spend = keys::key_pair_from_secret(crypto, crypto.scalar_reduce(&first))?;
    let view_secret = if canonical {
        keys::deterministic_view_secret(crypto, &spend.secret_key)
    } else {
        crypto.hash_to_scalar(&first)
    };
    let view = keys::key_pair_from_secret(crypto, view_secret)?;

    let address = address_of(crypto, &spend, &view, prefix);
    debug!(%address, seed_len = seed.len(), "wallet: created from seed");

    Ok(Wallet {
        mnemonic: mnemonic::seed_to_mnemonic(seed, language),
        seed: Some(seed.clone()),
        spend,
        view,
        address,
        sub_wallet_index: 0,
    })
}

/// Restore a wallet from its mnemonic phrase.
pub fn create_address_from_mnemonic(
    crypto: &dyn CryptoProvider,
    phrase: &str,
    language: Language,
    prefix: u64,
) -> Result<Wallet, WalletError> {
    let seed = mnemonic::mnemonic_to_seed(phrase, language)?;
    create_address_from_seed(crypto, &seed, language, prefix)
}

/// Build a wallet from existing private keys.
///
/// Recovery material is attached only when the view key is the
/// deterministic one; the seed is then the spend secret itself.
pub fn create_address_from_keys(
    crypto: &dyn CryptoProvider,
    spend_secret: &SecretKey,
    view_secret: &SecretKey,
    language: Language,
    prefix: u64,
) -> Result<Wallet, WalletError> {
    let spend = keys::key_pair_from_secret(crypto, spend_secret.clone())?;
    let view = keys::key_pair_from_secret(crypto, view_secret.clone())?;
    let address = address_of(crypto, &spend, &view, prefix);

    let (mnemonic, seed) = if keys::deterministic_view_secret(crypto, spend_secret) == *view_secret {
        let seed = Seed::from_bytes(spend_secret.as_bytes());
        (mnemonic::seed_to_mnemonic(&seed, language), Some(seed))
    } else {
        (None, None)
    };
    debug!(%address, deterministic = seed.is_some(), "wallet: created from keys");

    Ok(Wallet { spend, view, address, mnemonic, seed, sub_wallet_index: 0 })
}

/// Derive sub-wallet `index` from a base spend secret.
///
/// The sub-wallet's seed is the base key hashed `index` times; index 0 is
/// the base wallet itself.
pub fn create_sub_wallet_from_private_spend_key(
    crypto: &dyn CryptoProvider,
    base_spend_secret: &SecretKey,
    index: u64,
    language: Language,
    prefix: u64,
) -> Result<Wallet, WalletError> {
    let seed = keys::sub_wallet_seed(crypto, base_spend_secret, index);
    let mut wallet = create_address_from_seed(crypto, &seed, language, prefix)?;
    wallet.sub_wallet_index = index;
    Ok(wallet)
}

/// Create a brand-new random wallet.
pub fn create_new_address(
    crypto: &dyn CryptoProvider,
    entropy: Option<&[u8]>,
    iterations: u32,
    language: Language,
    prefix: u64,
) -> Result<Wallet, WalletError> {
    let seed = keys::create_new_seed(crypto, entropy, iterations);
    create_address_from_seed(crypto, &seed, language, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnote_core::address::decode_address;
    use cnote_core::constants::DEFAULT_ADDRESS_PREFIX;
    use cnote_core::crypto::DefaultCrypto;

    const PREFIX: u64 = DEFAULT_ADDRESS_PREFIX;
    const EN: Language = Language::English;

    fn crypto() -> DefaultCrypto {
        DefaultCrypto
    }

    fn fixed_seed() -> Seed {
        // Already a reduced scalar, so it is also the spend secret.
        Seed::from_bytes(
            &hex::decode("4a078e76cd41a3d3b534b83dc6f2ea2de500b653ca82273b7bfad8045d85a400").unwrap(),
        )
    }

    // --- Seed wallets ---

    #[test]
    fn seed_wallet_uses_seed_as_spend_key() {
        let wallet = create_address_from_seed(&crypto(), &fixed_seed(), EN, PREFIX).unwrap();
        assert_eq!(wallet.spend.secret_key.as_bytes(), fixed_seed().as_bytes());
        assert_eq!(
            wallet.spend.public_key.to_hex(),
            "7849297236cd7c0d6c69a3c8c179c038d3c1c434735741bb3c8995c3c9d6f2ac"
        );
        assert!(wallet.is_deterministic(&crypto()));
        assert!(wallet.address.starts_with("TRTL"));
        assert_eq!(wallet.sub_wallet_index, 0);
    }

    #[test]
    fn seed_wallet_address_decodes_to_its_keys() {
        let wallet = create_address_from_seed(&crypto(), &fixed_seed(), EN, PREFIX).unwrap();
        let decoded = decode_address(&crypto(), &wallet.address, PREFIX).unwrap();
        assert_eq!(decoded.public_spend_key, wallet.spend.public_key);
        assert_eq!(decoded.public_view_key, wallet.view.public_key);
    }

    #[test]
    fn mnemonic_restores_same_wallet() {
        let wallet = create_address_from_seed(&crypto(), &fixed_seed(), EN, PREFIX).unwrap();
        let phrase = wallet.mnemonic.clone().unwrap();
        let restored = create_address_from_mnemonic(&crypto(), &phrase, EN, PREFIX).unwrap();
        assert_eq!(restored, wallet);
    }

    #[test]
    fn non_canonical_seed_is_hashed_first() {
        let c = crypto();
        let seed = Seed::from_bytes(b"short seed");
        let wallet = create_address_from_seed(&c, &seed, EN, PREFIX).unwrap();
        let first = c.hash(seed.as_bytes());
        assert_eq!(wallet.spend.secret_key, c.scalar_reduce(&first.0));
        assert_eq!(wallet.view.secret_key, c.hash_to_scalar(first.as_bytes()));
        assert!(wallet.mnemonic.is_none());
        assert_eq!(wallet.seed, Some(seed));
    }

    // --- Key wallets ---

    #[test]
    fn keys_wallet_with_derived_view_key_gets_mnemonic() {
        let c = crypto();
        let spend = c.generate_keys().secret_key;
        let view = keys::deterministic_view_secret(&c, &spend);
        let wallet = create_address_from_keys(&c, &spend, &view, EN, PREFIX).unwrap();
        assert!(wallet.mnemonic.is_some());
        assert_eq!(wallet.seed.as_ref().unwrap().as_bytes(), spend.as_bytes());

        let from_seed = create_address_from_seed(&c, wallet.seed.as_ref().unwrap(), EN, PREFIX).unwrap();
        assert_eq!(from_seed.address, wallet.address);
    }

    #[test]
    fn keys_wallet_with_independent_view_key_has_no_mnemonic() {
        let c = crypto();
        let spend = c.generate_keys().secret_key;
        let view = c.generate_keys().secret_key;
        let wallet = create_address_from_keys(&c, &spend, &view, EN, PREFIX).unwrap();
        assert!(wallet.mnemonic.is_none());
        assert!(wallet.seed.is_none());
        assert!(!wallet.is_deterministic(&c));
    }

    #[test]
    fn keys_wallet_rejects_unreduced_secret() {
        let c = crypto();
        let bad = SecretKey::from_bytes([0xff; 32]);
        let view = c.generate_keys().secret_key;
        assert!(matches!(
            create_address_from_keys(&c, &bad, &view, EN, PREFIX),
            Err(WalletError::Crypto(_))
        ));
    }

    // --- Sub-wallets ---

    #[test]
    fn sub_wallet_zero_matches_base() {
        let c = crypto();
        let base = create_address_from_seed(&c, &fixed_seed(), EN, PREFIX).unwrap();
        let sub = create_sub_wallet_from_private_spend_key(&c, &base.spend.secret_key, 0, EN, PREFIX).unwrap();
        assert_eq!(sub.address, base.address);
        assert_eq!(sub.sub_wallet_index, 0);
    }

    #[test]
    fn sub_wallets_are_distinct() {
        let c = crypto();
        let base = create_address_from_seed(&c, &fixed_seed(), EN, PREFIX).unwrap();
        let spends: Vec<_> = (0..5)
            .map(|i| {
                create_sub_wallet_from_private_spend_key(&c, &base.spend.secret_key, i, EN, PREFIX)
                    .unwrap()
                    .spend
                    .public_key
            })
            .collect();
        for i in 0..spends.len() {
            for j in i + 1..spends.len() {
                assert_ne!(spends[i], spends[j], "indices {i} and {j}");
            }
        }
    }

    #[test]
    fn sub_wallet_records_index_and_seed() {
        let c = crypto();
        let base = fixed_seed();
        let base_secret = SecretKey::from_slice(base.as_bytes()).unwrap();
        let sub = create_sub_wallet_from_private_spend_key(&c, &base_secret, 3, EN, PREFIX).unwrap();
        assert_eq!(sub.sub_wallet_index, 3);
        assert_eq!(sub.seed.unwrap(), keys::sub_wallet_seed(&c, &base_secret, 3));
    }

    // --- New wallets ---

    #[test]
    fn new_address_is_restorable() {
        let c = crypto();
        let wallet = create_new_address(&c, None, 1, EN, PREFIX).unwrap();
        let restored = create_address_from_mnemonic(&c, wallet.mnemonic.as_ref().unwrap(), EN, PREFIX).unwrap();
        assert_eq!(restored.address, wallet.address);
    }

    #[test]
    fn custom_prefix_is_used() {
        let wallet = create_address_from_seed(&crypto(), &fixed_seed(), EN, 6581243850).unwrap();
        assert!(wallet.address.starts_with("athena"));
    }

    #[test]
    fn debug_hides_secrets() {
        let wallet = create_address_from_seed(&crypto(), &fixed_seed(), EN, PREFIX).unwrap();
        let dbg = format!("{wallet:?}");
        assert!(!dbg.contains("4a078e76"));
    }
}
