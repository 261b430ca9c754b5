//! Per-primitive overrides layered over a base provider.
//!
//! Each primitive of [`CryptoProvider`] can be replaced independently with a
//! closure; anything not replaced falls through to the base provider. The
//! closures take exactly the arguments of the trait method they replace.
//!
//! ```
//! use std::sync::Arc;
//! use cnote_core::crypto::DefaultCrypto;
//! use cnote_core::overrides::CryptoOverrides;
//! use cnote_core::traits::CryptoProvider;
//! use cnote_core::types::Hash256;
//!
//! let provider = CryptoOverrides::new(Arc::new(DefaultCrypto))
//!     .with_hash(|_data| Hash256([0x11; 32]));
//! assert_eq!(provider.hash(b"anything"), Hash256([0x11; 32]));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::CryptoError;
use crate::traits::CryptoProvider;
use crate::types::{Hash256, KeyDerivation, KeyImage, KeyPair, PublicKey, SecretKey, Signature};

pub type HashFn = dyn Fn(&[u8]) -> Hash256 + Send + Sync;
pub type ScalarReduceFn = dyn Fn(&[u8; 32]) -> SecretKey + Send + Sync;
pub type CheckKeyFn = dyn Fn(&PublicKey) -> bool + Send + Sync;
pub type GenerateKeysFn = dyn Fn() -> KeyPair + Send + Sync;
pub type SecretToPublicFn = dyn Fn(&SecretKey) -> Result<PublicKey, CryptoError> + Send + Sync;
pub type KeyDerivationFn =
    dyn Fn(&PublicKey, &SecretKey) -> Result<KeyDerivation, CryptoError> + Send + Sync;
pub type DerivePublicKeyFn =
    dyn Fn(&KeyDerivation, u64, &PublicKey) -> Result<PublicKey, CryptoError> + Send + Sync;
pub type DeriveSecretKeyFn =
    dyn Fn(&KeyDerivation, u64, &SecretKey) -> Result<SecretKey, CryptoError> + Send + Sync;
pub type KeyImageFn = dyn Fn(&PublicKey, &SecretKey) -> Result<KeyImage, CryptoError> + Send + Sync;
pub type RingSignFn = dyn Fn(&Hash256, &KeyImage, &[PublicKey], &SecretKey, usize) -> Result<Vec<Signature>, CryptoError>
    + Send
    + Sync;
pub type RingCheckFn = dyn Fn(&Hash256, &KeyImage, &[PublicKey], &[Signature]) -> bool + Send + Sync;
pub type SignFn = dyn Fn(&Hash256, &PublicKey, &SecretKey) -> Result<Signature, CryptoError> + Send + Sync;
pub type CheckSignatureFn = dyn Fn(&Hash256, &PublicKey, &Signature) -> bool + Send + Sync;

/// A provider whose primitives can be replaced one at a time.
///
/// Configure once, then share behind an `Arc`; the override table is never
/// mutated after construction.
pub struct CryptoOverrides {
    base: Arc<dyn CryptoProvider>,
    hash: Option<Box<HashFn>>,
    scalar_reduce: Option<Box<ScalarReduceFn>>,
    check_key: Option<Box<CheckKeyFn>>,
    generate_keys: Option<Box<GenerateKeysFn>>,
    secret_key_to_public_key: Option<Box<SecretToPublicFn>>,
    generate_key_derivation: Option<Box<KeyDerivationFn>>,
    derive_public_key: Option<Box<DerivePublicKeyFn>>,
    derive_secret_key: Option<Box<DeriveSecretKeyFn>>,
    underive_public_key: Option<Box<DerivePublicKeyFn>>,
    generate_key_image: Option<Box<KeyImageFn>>,
    generate_ring_signatures: Option<Box<RingSignFn>>,
    check_ring_signatures: Option<Box<RingCheckFn>>,
    generate_signature: Option<Box<SignFn>>,
    check_signature: Option<Box<CheckSignatureFn>>,
}

macro_rules! setter {
    ($method:ident, $field:ident, ($($arg:ty),*) -> $ret:ty) => {
        pub fn $method(mut self, f: impl Fn($($arg),*) -> $ret + Send + Sync + 'static) -> Self {
            self.$field = Some(Box::new(f));
            self
        }
    };
}

impl CryptoOverrides {
    /// Wrap `base` with no primitives replaced.
    pub fn new(base: Arc<dyn CryptoProvider>) -> Self {
        Self {
            base,
            hash: None,
            scalar_reduce: None,
            check_key: None,
            generate_keys: None,
            secret_key_to_public_key: None,
            generate_key_derivation: None,
            derive_public_key: None,
            derive_secret_key: None,
            underive_public_key: None,
            generate_key_image: None,
            generate_ring_signatures: None,
            check_ring_signatures: None,
            generate_signature: None,
            check_signature: None,
        }
    }

    /// Names of the primitives currently replaced.
    pub fn overridden(&self) -> Vec<&'static str> {
        let table: [(&'static str, bool); 14] = [
            ("hash", self.hash.is_some()),
            ("scalar_reduce", self.scalar_reduce.is_some()),
            ("check_key", self.check_key.is_some()),
            ("generate_keys", self.generate_keys.is_some()),
            ("secret_key_to_public_key", self.secret_key_to_public_key.is_some()),
            ("generate_key_derivation", self.generate_key_derivation.is_some()),
            ("derive_public_key", self.derive_public_key.is_some()),
            ("derive_secret_key", self.derive_secret_key.is_some()),
            ("underive_public_key", self.underive_public_key.is_some()),
            ("generate_key_image", self.generate_key_image.is_some()),
            ("generate_ring_signatures", self.generate_ring_signatures.is_some()),
            ("check_ring_signatures", self.check_ring_signatures.is_some()),
            ("generate_signature", self.generate_signature.is_some()),
            ("check_signature", self.check_signature.is_some()),
        ];
        table.into_iter().filter(|(_, set)| *set).map(|(name, _)| name).collect()
    }

    setter!(with_hash, hash, (&[u8]) -> Hash256);
    setter!(with_scalar_reduce, scalar_reduce, (&[u8; 32]) -> SecretKey);
    setter!(with_check_key, check_key, (&PublicKey) -> bool);
    setter!(with_generate_keys, generate_keys, () -> KeyPair);
    setter!(with_secret_key_to_public_key, secret_key_to_public_key, (&SecretKey) -> Result<PublicKey, CryptoError>);
    setter!(with_generate_key_derivation, generate_key_derivation, (&PublicKey, &SecretKey) -> Result<KeyDerivation, CryptoError>);
    setter!(with_derive_public_key, derive_public_key, (&KeyDerivation, u64, &PublicKey) -> Result<PublicKey, CryptoError>);
    setter!(with_derive_secret_key, derive_secret_key, (&KeyDerivation, u64, &SecretKey) -> Result<SecretKey, CryptoError>);
    setter!(with_underive_public_key, underive_public_key, (&KeyDerivation, u64, &PublicKey) -> Result<PublicKey, CryptoError>);
    setter!(with_generate_key_image, generate_key_image, (&PublicKey, &SecretKey) -> Result<KeyImage, CryptoError>);
    setter!(with_generate_ring_signatures, generate_ring_signatures, (&Hash256, &KeyImage, &[PublicKey], &SecretKey, usize) -> Result<Vec<Signature>, CryptoError>);
    setter!(with_check_ring_signatures, check_ring_signatures, (&Hash256, &KeyImage, &[PublicKey], &[Signature]) -> bool);
    setter!(with_generate_signature, generate_signature, (&Hash256, &PublicKey, &SecretKey) -> Result<Signature, CryptoError>);
    setter!(with_check_signature, check_signature, (&Hash256, &PublicKey, &Signature) -> bool);
}

impl fmt::Debug for CryptoOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoOverrides")
            .field("overridden", &self.overridden())
            .finish_non_exhaustive()
    }
}

impl CryptoProvider for CryptoOverrides {
    fn hash(&self, data: &[u8]) -> Hash256 {
        match &self.hash {
            Some(f) => f(data),
            None => self.base.hash(data),
        }
    }

    fn scalar_reduce(&self, bytes: &[u8; 32]) -> SecretKey {
        match &self.scalar_reduce {
            Some(f) => f(bytes),
            None => self.base.scalar_reduce(bytes),
        }
    }

    fn check_key(&self, key: &PublicKey) -> bool {
        match &self.check_key {
            Some(f) => f(key),
            None => self.base.check_key(key),
        }
    }

    fn generate_keys(&self) -> KeyPair {
        match &self.generate_keys {
            Some(f) => f(),
            None => self.base.generate_keys(),
        }
    }

    fn secret_key_to_public_key(&self, secret: &SecretKey) -> Result<PublicKey, CryptoError> {
        match &self.secret_key_to_public_key {
            Some(f) => f(secret),
            None => self.base.secret_key_to_public_key(secret),
        }
    }

    fn generate_key_derivation(
        &self,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<KeyDerivation, CryptoError> {
        match &self.generate_key_derivation {
            Some(f) => f(public, secret),
            None => self.base.generate_key_derivation(public, secret),
        }
    }

    fn derive_public_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        base: &PublicKey,
    ) -> Result<PublicKey, CryptoError> {
        match &self.derive_public_key {
            Some(f) => f(derivation, output_index, base),
            None => self.base.derive_public_key(derivation, output_index, base),
        }
    }

    fn derive_secret_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        base: &SecretKey,
    ) -> Result<SecretKey, CryptoError> {
        match &self.derive_secret_key {
            Some(f) => f(derivation, output_index, base),
            None => self.base.derive_secret_key(derivation, output_index, base),
        }
    }

    fn underive_public_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        output_key: &PublicKey,
    ) -> Result<PublicKey, CryptoError> {
        match &self.underive_public_key {
            Some(f) => f(derivation, output_index, output_key),
            None => self.base.underive_public_key(derivation, output_index, output_key),
        }
    }

    fn generate_key_image(
        &self,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<KeyImage, CryptoError> {
        match &self.generate_key_image {
            Some(f) => f(public, secret),
            None => self.base.generate_key_image(public, secret),
        }
    }

    fn generate_ring_signatures(
        &self,
        prefix_hash: &Hash256,
        key_image: &KeyImage,
        public_keys: &[PublicKey],
        secret: &SecretKey,
        real_index: usize,
    ) -> Result<Vec<Signature>, CryptoError> {
        match &self.generate_ring_signatures {
            Some(f) => f(prefix_hash, key_image, public_keys, secret, real_index),
            None => self
                .base
                .generate_ring_signatures(prefix_hash, key_image, public_keys, secret, real_index),
        }
    }

    fn check_ring_signatures(
        &self,
        prefix_hash: &Hash256,
        key_image: &KeyImage,
        public_keys: &[PublicKey],
        signatures: &[Signature],
    ) -> bool {
        match &self.check_ring_signatures {
            Some(f) => f(prefix_hash, key_image, public_keys, signatures),
            None => self.base.check_ring_signatures(prefix_hash, key_image, public_keys, signatures),
        }
    }

    fn generate_signature(
        &self,
        hash: &Hash256,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<Signature, CryptoError> {
        match &self.generate_signature {
            Some(f) => f(hash, public, secret),
            None => self.base.generate_signature(hash, public, secret),
        }
    }

    fn check_signature(&self, hash: &Hash256, public: &PublicKey, signature: &Signature) -> bool {
        match &self.check_signature {
            Some(f) => f(hash, public, signature),
            None => self.base.check_signature(hash, public, signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCrypto;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn base() -> Arc<dyn CryptoProvider> {
        Arc::new(DefaultCrypto)
    }

    #[test]
    fn no_overrides_delegates_to_base() {
        let provider = CryptoOverrides::new(base());
        assert_eq!(provider.hash(b"abc"), DefaultCrypto.hash(b"abc"));
        assert!(provider.overridden().is_empty());
    }

    #[test]
    fn hash_override_is_used() {
        let provider = CryptoOverrides::new(base()).with_hash(|_| Hash256([0x11; 32]));
        assert_eq!(provider.hash(b"abc"), Hash256([0x11; 32]));
        assert_eq!(provider.overridden(), vec!["hash"]);
    }

    #[test]
    fn override_is_used_and_others_fall_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let provider = CryptoOverrides::new(base()).with_check_key(move |_key| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        let pair = provider.generate_keys();
        assert!(!provider.check_key(&pair.public_key));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Untouched primitives still come from the base provider.
        assert_eq!(provider.secret_key_to_public_key(&pair.secret_key).unwrap(), pair.public_key);
    }

    #[test]
    fn ring_signature_override_receives_arguments_in_order() {
        let provider = CryptoOverrides::new(base()).with_generate_ring_signatures(
            |_hash, _image, keys, _secret, real| {
                assert_eq!(real, keys.len() - 1);
                Ok(vec![Signature([0; 64]); keys.len()])
            },
        );
        let pair = provider.generate_keys();
        let sigs = provider
            .generate_ring_signatures(&Hash256::ZERO, &KeyImage([0; 32]), &[pair.public_key; 3], &pair.secret_key, 2)
            .unwrap();
        assert_eq!(sigs.len(), 3);
    }

    #[test]
    fn debug_lists_overrides() {
        let provider = CryptoOverrides::new(base()).with_hash(|_| Hash256::ZERO);
        assert!(format!("{provider:?}").contains("hash"));
    }
}
