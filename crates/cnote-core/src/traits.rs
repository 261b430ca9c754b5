//! Trait interfaces for cnote.
//!
//! [`CryptoProvider`] is the seam between the address/transaction logic and
//! the elliptic-curve and hashing primitives. The wallet crate only ever
//! calls primitives through this trait, so a caller can swap any of them
//! (see [`CryptoOverrides`](crate::overrides::CryptoOverrides)) without
//! touching call sites.

use crate::error::CryptoError;
use crate::types::{Hash256, KeyDerivation, KeyImage, KeyPair, PublicKey, SecretKey, Signature};

/// CryptoNote primitive operations.
///
/// Implementations must be deterministic for everything except
/// [`generate_keys`](Self::generate_keys), and must be shareable across
/// threads: one provider instance serves every concurrent build.
pub trait CryptoProvider: Send + Sync {
    /// Keccak-256 ("cn_fast_hash").
    fn hash(&self, data: &[u8]) -> Hash256;

    /// Reduce 32 bytes modulo the group order `l`.
    fn scalar_reduce(&self, bytes: &[u8; 32]) -> SecretKey;

    /// Whether `key` decompresses to a curve point.
    fn check_key(&self, key: &PublicKey) -> bool;

    /// Fresh random key pair.
    fn generate_keys(&self) -> KeyPair;

    /// `secret·G`.
    fn secret_key_to_public_key(&self, secret: &SecretKey) -> Result<PublicKey, CryptoError>;

    /// Shared secret `8·secret·public`.
    fn generate_key_derivation(
        &self,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<KeyDerivation, CryptoError>;

    /// One-time output key `Hs(derivation ‖ index)·G + base`.
    fn derive_public_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        base: &PublicKey,
    ) -> Result<PublicKey, CryptoError>;

    /// One-time output secret `Hs(derivation ‖ index) + base`.
    fn derive_secret_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        base: &SecretKey,
    ) -> Result<SecretKey, CryptoError>;

    /// Inverse of [`derive_public_key`](Self::derive_public_key): recovers the
    /// spend key an output was addressed to.
    fn underive_public_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        output_key: &PublicKey,
    ) -> Result<PublicKey, CryptoError>;

    /// Key image `secret·Hp(public)`.
    fn generate_key_image(
        &self,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<KeyImage, CryptoError>;

    /// One signature per ring member, proving knowledge of the secret for
    /// `public_keys[real_index]` without revealing the index.
    fn generate_ring_signatures(
        &self,
        prefix_hash: &Hash256,
        key_image: &KeyImage,
        public_keys: &[PublicKey],
        secret: &SecretKey,
        real_index: usize,
    ) -> Result<Vec<Signature>, CryptoError>;

    fn check_ring_signatures(
        &self,
        prefix_hash: &Hash256,
        key_image: &KeyImage,
        public_keys: &[PublicKey],
        signatures: &[Signature],
    ) -> bool;

    /// Single-key Schnorr signature over a 32-byte hash.
    fn generate_signature(
        &self,
        hash: &Hash256,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<Signature, CryptoError>;

    fn check_signature(&self, hash: &Hash256, public: &PublicKey, signature: &Signature) -> bool;

    /// `scalar_reduce(hash(data))`.
    ///
    /// Default implementation composes the two overridable primitives.
    fn hash_to_scalar(&self, data: &[u8]) -> SecretKey {
        self.scalar_reduce(&self.hash(data).0)
    }
}
