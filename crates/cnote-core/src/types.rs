//! Core value types: keys, hashes, key images and wallet outputs.
//!
//! Every fixed-size value is a thin newtype over a byte array. Text form is
//! lowercase hex, which is also the serde representation, so JSON produced
//! by this crate matches what CryptoNote wallets and daemons exchange.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::KEY_SIZE;
use crate::error::AddressError;

/// Parse exactly `N` bytes from a hex string.
fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N], String> {
    if s.len() != N * 2 {
        return Err(format!("expected {} hex characters, got {}", N * 2, s.len()));
    }
    let mut bytes = [0u8; N];
    hex::decode_to_slice(s, &mut bytes).map_err(|e| e.to_string())?;
    Ok(bytes)
}

macro_rules! hex_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr, $err:path) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Wrap raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Copy from a slice, failing unless it has exactly the right length.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
                let arr: [u8; $len] = bytes
                    .try_into()
                    .map_err(|_| $err(format!("expected {} bytes, got {}", $len, bytes.len())))?;
                Ok(Self(arr))
            }

            /// Borrow the underlying bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase hex encoding.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = AddressError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex::<$len>(s).map(Self).map_err($err)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_newtype!(
    /// A 32-byte Keccak-256 digest: transaction hashes, prefix hashes, message hashes.
    Hash256, 32, AddressError::InvalidHexInput
);

hex_newtype!(
    /// A compressed Ed25519 point. Not guaranteed to decompress; see
    /// [`CryptoProvider::check_key`](crate::traits::CryptoProvider::check_key).
    PublicKey, KEY_SIZE, AddressError::InvalidKeyFormat
);

hex_newtype!(
    /// Shared secret `8·a·R` between a transaction key and a view key.
    KeyDerivation, KEY_SIZE, AddressError::InvalidKeyFormat
);

hex_newtype!(
    /// Spend tag `x·Hp(P)` of a one-time output key.
    KeyImage, KEY_SIZE, AddressError::InvalidKeyFormat
);

hex_newtype!(
    /// 32-byte payment identifier carried in integrated addresses and tx extra.
    PaymentId, KEY_SIZE, AddressError::InvalidPaymentId
);

hex_newtype!(
    /// A 64-byte `(c, r)` signature, used both for ring members and messages.
    Signature, 64, AddressError::InvalidHexInput
);

impl Hash256 {
    /// The all-zero digest.
    pub const ZERO: Self = Self([0u8; 32]);
}

/// An Ed25519 scalar used as a private key.
///
/// Zeroized on drop; `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_SIZE]);

impl SecretKey {
    /// Wrap raw scalar bytes. No reduction is applied.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy from a slice of exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            AddressError::InvalidKeyFormat(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Borrow the raw scalar bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Lowercase hex encoding of the scalar.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl FromStr for SecretKey {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex::<KEY_SIZE>(s)
            .map(Self)
            .map_err(AddressError::InvalidKeyFormat)
    }
}

impl Serialize for SecretKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A public/private key pair.
///
/// When produced by this crate, `public_key` is always `secret_key·G`.
/// Pairs built from caller-supplied parts are not checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    #[serde(rename = "publicKey")]
    pub public_key: PublicKey,
    #[serde(rename = "privateKey")]
    pub secret_key: SecretKey,
}

impl KeyPair {
    pub fn new(public_key: PublicKey, secret_key: SecretKey) -> Self {
        Self { public_key, secret_key }
    }
}

/// Material needed to spend an output once ownership has been established.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInput {
    /// Public half is the transaction public key; the "private" half is the
    /// key derivation between that key and the wallet's view key.
    pub transaction_key: TransactionKey,
    pub public_ephemeral: PublicKey,
    /// Present only when the private spend key was available during scanning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ephemeral: Option<SecretKey>,
}

/// Transaction public key paired with the derivation computed from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionKey {
    pub public_key: PublicKey,
    pub derivation: KeyDerivation,
}

/// An output on chain, either a scan candidate or an owned spendable output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    /// One-time output public key.
    pub key: PublicKey,
    /// Position of the output within its transaction.
    pub index: u64,
    /// Position of the output within the whole chain.
    pub global_index: u64,
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_image: Option<KeyImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<GeneratedInput>,
}

impl Output {
    /// A bare scan candidate with no ownership data attached.
    pub fn new(key: PublicKey, index: u64, global_index: u64, amount: u64) -> Self {
        Self { key, index, global_index, amount, key_image: None, input: None }
    }
}

/// A decoy candidate for ring mixing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomOutput {
    pub key: PublicKey,
    pub global_index: u64,
}

/// Recipient keys for a new output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientKeys {
    pub public_view_key: PublicKey,
    pub public_spend_key: PublicKey,
}

/// An amount destined for a recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedOutput {
    pub amount: u64,
    pub keys: RecipientKeys,
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Hex newtypes ---

    #[test]
    fn public_key_hex_roundtrip() {
        let hex = "7849297236cd7c0d6c69a3c8c179c038d3c1c434735741bb3c8995c3c9d6f2ac";
        let key: PublicKey = hex.parse().unwrap();
        assert_eq!(key.to_string(), hex);
        assert_eq!(key.as_bytes()[0], 0x78);
    }

    #[test]
    fn public_key_rejects_short_hex() {
        let err = "abcd".parse::<PublicKey>().unwrap_err();
        assert!(matches!(err, AddressError::InvalidKeyFormat(_)));
    }

    #[test]
    fn public_key_rejects_non_hex() {
        let bad = "zz".repeat(32);
        assert!(matches!(
            bad.parse::<PublicKey>().unwrap_err(),
            AddressError::InvalidKeyFormat(_)
        ));
    }

    #[test]
    fn payment_id_uses_payment_id_error() {
        let err = "12".parse::<PaymentId>().unwrap_err();
        assert!(matches!(err, AddressError::InvalidPaymentId(_)));
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(KeyImage::from_slice(&[0u8; 31]).is_err());
        assert!(KeyImage::from_slice(&[0u8; 32]).is_ok());
        assert!(Signature::from_slice(&[0u8; 64]).is_ok());
    }

    #[test]
    fn serde_as_hex_string() {
        let h = Hash256([0xab; 32]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: Hash256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    // --- SecretKey ---

    #[test]
    fn secret_key_debug_is_redacted() {
        let sk = SecretKey::from_bytes([0x42; 32]);
        let dbg = format!("{sk:?}");
        assert!(!dbg.contains("42"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn secret_key_parse_and_hex() {
        let hex = "4a078e76cd41a3d3b534b83dc6f2ea2de500b653ca82273b7bfad8045d85a400";
        let sk: SecretKey = hex.parse().unwrap();
        assert_eq!(sk.to_hex(), hex);
    }

    // --- Outputs ---

    #[test]
    fn output_json_uses_camel_case() {
        let out = Output::new(PublicKey([1; 32]), 2, 1595598, 100);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["globalIndex"], 1595598);
        assert!(json.get("keyImage").is_none());
    }
}
