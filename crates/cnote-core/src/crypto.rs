//! Default CryptoNote primitives over Ed25519.
//!
//! Group arithmetic comes from curve25519-dalek and the fast hash is
//! Keccak-256 (original padding, not SHA3-256).
//!
//! # Determinism
//!
//! Ring and message signatures draw their nonces from a Keccak transcript of
//! the secret key and everything being signed instead of from an RNG. The
//! signatures verify exactly like randomly-nonced ones, and building the
//! same transaction twice with the same transaction key yields identical
//! bytes, which is what lets the blocking and async builders be compared.
//!
//! # Hash to point
//!
//! `Hp` is the reference `hash_to_ec` (see [`crate::hash_to_point`]), so key
//! images match the ones any CryptoNote node computes and rings verify
//! against the standard check.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::IsIdentity;
use rand::RngCore;
use sha3::{Digest, Keccak256};

use crate::error::CryptoError;
use crate::hash_to_point::hash_to_point;
use crate::traits::CryptoProvider;
use crate::types::{Hash256, KeyDerivation, KeyImage, KeyPair, PublicKey, SecretKey, Signature};
use crate::varint;

/// Domain tags for deterministic nonces.
const RING_NONCE_DOMAIN: &[u8] = b"cnote-ring-nonce";
const SIGNATURE_NONCE_DOMAIN: &[u8] = b"cnote-signature-nonce";

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// The built-in provider. Stateless and cheap to clone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCrypto;

impl DefaultCrypto {
    pub fn new() -> Self {
        Self
    }
}

fn decompress(key: &[u8; 32], primitive: &'static str) -> Result<EdwardsPoint, CryptoError> {
    CompressedEdwardsY(*key)
        .decompress()
        .ok_or_else(|| CryptoError::primitive(primitive, format!("{} is not a curve point", hex::encode(key))))
}

fn canonical_scalar(bytes: &[u8; 32], primitive: &'static str) -> Result<Scalar, CryptoError> {
    Option::<Scalar>::from(Scalar::from_canonical_bytes(*bytes))
        .ok_or_else(|| CryptoError::primitive(primitive, "scalar is not reduced"))
}

fn secret_scalar(secret: &SecretKey, primitive: &'static str) -> Result<Scalar, CryptoError> {
    canonical_scalar(secret.as_bytes(), primitive)
}

fn hash_scalar(data: &[u8]) -> Scalar {
    Scalar::from_bytes_mod_order(keccak256(data))
}

/// `Hs(derivation ‖ varint(index))`.
fn derivation_to_scalar(derivation: &KeyDerivation, output_index: u64) -> Scalar {
    let mut buf = Vec::with_capacity(32 + 10);
    buf.extend_from_slice(derivation.as_bytes());
    varint::write(&mut buf, output_index);
    hash_scalar(&buf)
}

/// Wide-reduced scalar from a Keccak transcript of `parts`.
fn transcript_scalar(domain: &[u8], parts: &[&[u8]]) -> Scalar {
    let mut hasher = Keccak256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let seed: [u8; 32] = hasher.finalize().into();
    let mut wide = [0u8; 64];
    wide[..32].copy_from_slice(&keccak256(&[&seed[..], &[0u8]].concat()));
    wide[32..].copy_from_slice(&keccak256(&[&seed[..], &[1u8]].concat()));
    Scalar::from_bytes_mod_order_wide(&wide)
}

fn signature_parts(sig: &Signature) -> Option<(Scalar, Scalar)> {
    let mut c = [0u8; 32];
    let mut r = [0u8; 32];
    c.copy_from_slice(&sig.0[..32]);
    r.copy_from_slice(&sig.0[32..]);
    let c = Option::<Scalar>::from(Scalar::from_canonical_bytes(c))?;
    let r = Option::<Scalar>::from(Scalar::from_canonical_bytes(r))?;
    Some((c, r))
}

fn signature_from(c: &Scalar, r: &Scalar) -> Signature {
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(c.as_bytes());
    bytes[32..].copy_from_slice(r.as_bytes());
    Signature(bytes)
}

impl CryptoProvider for DefaultCrypto {
    fn hash(&self, data: &[u8]) -> Hash256 {
        Hash256(keccak256(data))
    }

    fn scalar_reduce(&self, bytes: &[u8; 32]) -> SecretKey {
        SecretKey::from_bytes(Scalar::from_bytes_mod_order(*bytes).to_bytes())
    }

    fn check_key(&self, key: &PublicKey) -> bool {
        CompressedEdwardsY(key.0).decompress().is_some()
    }

    fn generate_keys(&self) -> KeyPair {
        let mut wide = [0u8; 64];
        rand::rngs::OsRng.fill_bytes(&mut wide);
        let scalar = Scalar::from_bytes_mod_order_wide(&wide);
        KeyPair::new(
            PublicKey(EdwardsPoint::mul_base(&scalar).compress().to_bytes()),
            SecretKey::from_bytes(scalar.to_bytes()),
        )
    }

    fn secret_key_to_public_key(&self, secret: &SecretKey) -> Result<PublicKey, CryptoError> {
        let scalar = secret_scalar(secret, "secret_key_to_public_key")?;
        Ok(PublicKey(EdwardsPoint::mul_base(&scalar).compress().to_bytes()))
    }

    fn generate_key_derivation(
        &self,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<KeyDerivation, CryptoError> {
        let point = decompress(&public.0, "generate_key_derivation")?;
        let scalar = secret_scalar(secret, "generate_key_derivation")?;
        Ok(KeyDerivation((scalar * point).mul_by_cofactor().compress().to_bytes()))
    }

    fn derive_public_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        base: &PublicKey,
    ) -> Result<PublicKey, CryptoError> {
        let base = decompress(&base.0, "derive_public_key")?;
        let point = EdwardsPoint::mul_base(&derivation_to_scalar(derivation, output_index)) + base;
        Ok(PublicKey(point.compress().to_bytes()))
    }

    fn derive_secret_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        base: &SecretKey,
    ) -> Result<SecretKey, CryptoError> {
        let base = secret_scalar(base, "derive_secret_key")?;
        let derived = derivation_to_scalar(derivation, output_index) + base;
        Ok(SecretKey::from_bytes(derived.to_bytes()))
    }

    fn underive_public_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        output_key: &PublicKey,
    ) -> Result<PublicKey, CryptoError> {
        let output = decompress(&output_key.0, "underive_public_key")?;
        let point = output - EdwardsPoint::mul_base(&derivation_to_scalar(derivation, output_index));
        Ok(PublicKey(point.compress().to_bytes()))
    }

    fn generate_key_image(
        &self,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<KeyImage, CryptoError> {
        let scalar = secret_scalar(secret, "generate_key_image")?;
        let hp = hash_to_point(&public.0)?;
        Ok(KeyImage((scalar * hp).compress().to_bytes()))
    }

    fn generate_ring_signatures(
        &self,
        prefix_hash: &Hash256,
        key_image: &KeyImage,
        public_keys: &[PublicKey],
        secret: &SecretKey,
        real_index: usize,
    ) -> Result<Vec<Signature>, CryptoError> {
        const PRIMITIVE: &str = "generate_ring_signatures";
        if real_index >= public_keys.len() {
            return Err(CryptoError::RealIndexOutOfBounds { index: real_index, len: public_keys.len() });
        }
        let x = secret_scalar(secret, PRIMITIVE)?;
        let image = decompress(&key_image.0, PRIMITIVE)?;

        let ring_bytes: Vec<u8> = public_keys.iter().flat_map(|k| k.0).collect();
        let nonce_parts = |tag: &[u8]| -> Scalar {
            transcript_scalar(
                RING_NONCE_DOMAIN,
                &[secret.as_bytes(), prefix_hash.as_bytes(), key_image.as_bytes(), &ring_bytes, tag],
            )
        };

        let mut transcript = Vec::with_capacity(32 + public_keys.len() * 64);
        transcript.extend_from_slice(prefix_hash.as_bytes());

        let mut cs = vec![Scalar::ZERO; public_keys.len()];
        let mut rs = vec![Scalar::ZERO; public_keys.len()];
        let mut sum = Scalar::ZERO;
        let k = nonce_parts(b"k");

        for (i, key) in public_keys.iter().enumerate() {
            let point = decompress(&key.0, PRIMITIVE)?;
            let hp = hash_to_point(&key.0)?;
            let (l, r) = if i == real_index {
                (EdwardsPoint::mul_base(&k), k * hp)
            } else {
                let index = (i as u64).to_le_bytes();
                cs[i] = nonce_parts(&[b"c".as_slice(), &index].concat());
                rs[i] = nonce_parts(&[b"r".as_slice(), &index].concat());
                sum += cs[i];
                (
                    EdwardsPoint::vartime_double_scalar_mul_basepoint(&cs[i], &point, &rs[i]),
                    rs[i] * hp + cs[i] * image,
                )
            };
            transcript.extend_from_slice(l.compress().as_bytes());
            transcript.extend_from_slice(r.compress().as_bytes());
        }

        let h = hash_scalar(&transcript);
        cs[real_index] = h - sum;
        rs[real_index] = k - cs[real_index] * x;

        Ok(cs.iter().zip(&rs).map(|(c, r)| signature_from(c, r)).collect())
    }

    fn check_ring_signatures(
        &self,
        prefix_hash: &Hash256,
        key_image: &KeyImage,
        public_keys: &[PublicKey],
        signatures: &[Signature],
    ) -> bool {
        if public_keys.is_empty() || signatures.len() != public_keys.len() {
            return false;
        }
        let Some(image) = CompressedEdwardsY(key_image.0).decompress() else {
            return false;
        };
        if image.is_identity() || !image.is_torsion_free() {
            return false;
        }

        let mut transcript = Vec::with_capacity(32 + public_keys.len() * 64);
        transcript.extend_from_slice(prefix_hash.as_bytes());
        let mut sum = Scalar::ZERO;

        for (key, sig) in public_keys.iter().zip(signatures) {
            let Some(point) = CompressedEdwardsY(key.0).decompress() else {
                return false;
            };
            let Ok(hp) = hash_to_point(&key.0) else {
                return false;
            };
            let Some((c, r)) = signature_parts(sig) else {
                return false;
            };
            let l = EdwardsPoint::vartime_double_scalar_mul_basepoint(&c, &point, &r);
            let rr = r * hp + c * image;
            transcript.extend_from_slice(l.compress().as_bytes());
            transcript.extend_from_slice(rr.compress().as_bytes());
            sum += c;
        }

        hash_scalar(&transcript) - sum == Scalar::ZERO
    }

    fn generate_signature(
        &self,
        hash: &Hash256,
        public: &PublicKey,
        secret: &SecretKey,
    ) -> Result<Signature, CryptoError> {
        let x = secret_scalar(secret, "generate_signature")?;
        let k = transcript_scalar(
            SIGNATURE_NONCE_DOMAIN,
            &[secret.as_bytes(), hash.as_bytes(), public.as_bytes()],
        );
        let mut buf = Vec::with_capacity(96);
        buf.extend_from_slice(hash.as_bytes());
        buf.extend_from_slice(public.as_bytes());
        buf.extend_from_slice(EdwardsPoint::mul_base(&k).compress().as_bytes());
        let c = hash_scalar(&buf);
        let r = k - c * x;
        Ok(signature_from(&c, &r))
    }

    fn check_signature(&self, hash: &Hash256, public: &PublicKey, signature: &Signature) -> bool {
        let Some(point) = CompressedEdwardsY(public.0).decompress() else {
            return false;
        };
        let Some((c, r)) = signature_parts(signature) else {
            return false;
        };
        let commitment = EdwardsPoint::vartime_double_scalar_mul_basepoint(&c, &point, &r);
        let mut buf = Vec::with_capacity(96);
        buf.extend_from_slice(hash.as_bytes());
        buf.extend_from_slice(public.as_bytes());
        buf.extend_from_slice(commitment.compress().as_bytes());
        hash_scalar(&buf) == c
    }
}

/// The Ed25519 base point, compressed. Handy for tests and tooling.
pub fn base_point() -> PublicKey {
    PublicKey(ED25519_BASEPOINT_POINT.compress().to_bytes())
}
