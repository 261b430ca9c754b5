//! Seed management and deterministic key derivation.
//!
//! A CryptoNote wallet is two key pairs. The spend secret is the reduced
//! seed; the view secret is the reduced hash of the spend secret, which is
//! what lets a single mnemonic restore both. Sub-wallets chain the hash
//! over the base spend key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use cnote_core::constants::KEY_SIZE;
use cnote_core::traits::CryptoProvider;
use cnote_core::types::{KeyPair, SecretKey};

use crate::error::WalletError;

/// Seed material for deterministic wallet creation.
///
/// Usually 32 bytes, in which case it doubles as the spend secret before
/// reduction; other lengths are accepted and hashed down first. Zeroized on
/// drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: Vec<u8>,
}

impl Seed {
    /// Generate a random 32-byte seed from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self { bytes: random_bytes().to_vec() }
    }

    /// Create a seed from raw bytes of any length.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { bytes: bytes.to_vec() }
    }

    /// Get the raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the seed can be used directly as a spend secret.
    pub fn is_canonical_length(&self) -> bool {
        self.bytes.len() == KEY_SIZE
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        Ok(Self { bytes })
    }
}

fn random_bytes() -> [u8; 32] {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Produce a fresh 32-byte seed.
///
/// `entropy` (random if absent) is concatenated with 32 more random bytes,
/// hashed `iterations` times, and reduced to a scalar. Extra rounds make
/// low-quality caller entropy more expensive to search; at least one round
/// always runs.
pub fn create_new_seed(
    crypto: &dyn CryptoProvider,
    entropy: Option<&[u8]>,
    iterations: u32,
) -> Seed {
    let mut material = match entropy {
        Some(bytes) => bytes.to_vec(),
        None => random_bytes().to_vec(),
    };
    material.extend_from_slice(&random_bytes());

    let mut digest = crypto.hash(&material);
    material.zeroize();
    for _ in 1..iterations.max(1) {
        digest = crypto.hash(digest.as_bytes());
    }
    let reduced = crypto.scalar_reduce(&digest.0);
    Seed::from_bytes(reduced.as_bytes())
}

pub fn private_key_to_public_key(
    crypto: &dyn CryptoProvider,
    secret: &SecretKey,
) -> Result<cnote_core::types::PublicKey, WalletError> {
    Ok(crypto.secret_key_to_public_key(secret)?)
}

/// Complete a key pair from its secret half.
pub fn key_pair_from_secret(
    crypto: &dyn CryptoProvider,
    secret: SecretKey,
) -> Result<KeyPair, WalletError> {
    let public = crypto.secret_key_to_public_key(&secret)?;
    Ok(KeyPair::new(public, secret))
}

/// The view secret a deterministic wallet derives from its spend secret.
pub fn deterministic_view_secret(crypto: &dyn CryptoProvider, spend_secret: &SecretKey) -> SecretKey {
    crypto.hash_to_scalar(spend_secret.as_bytes())
}

/// Seed of sub-wallet `index`: the base spend key hashed `index` times.
pub fn sub_wallet_seed(crypto: &dyn CryptoProvider, base_spend_secret: &SecretKey, index: u64) -> Seed {
    let mut current = *base_spend_secret.as_bytes();
    for _ in 0..index {
        current = crypto.hash(&current).0;
    }
    let seed = Seed::from_bytes(&current);
    current.zeroize();
    seed
}
