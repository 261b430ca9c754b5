//! CryptoNote address encoding.
//!
//! Layout of the decoded bytes:
//!
//! ```text
//! varint(prefix) ‖ [payment id as 64 ASCII hex bytes] ‖ spend key ‖ view key ‖ checksum
//! ```
//!
//! The checksum is the first [`ADDRESS_CHECKSUM_SIZE`] bytes of the Keccak
//! hash of everything before it. The whole byte string is rendered with
//! block Base58, so every address of a given network and kind has the same
//! length.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base58;
use crate::constants::{ADDRESS_CHECKSUM_SIZE, EMBEDDED_PAYMENT_ID_SIZE, KEY_SIZE};
use crate::error::AddressError;
use crate::traits::CryptoProvider;
use crate::types::{PaymentId, PublicKey, RecipientKeys};
use crate::varint;

/// The network identifier embedded at the front of every address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPrefix {
    /// Varint-encoded prefix bytes.
    #[serde(with = "hex_bytes")]
    pub prefix: Vec<u8>,
    /// Leading characters of the address contributed by the prefix.
    pub base58: String,
    pub decimal: u64,
    pub hexadecimal: String,
}

/// The parts of a decoded address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedAddress {
    pub public_view_key: PublicKey,
    pub public_spend_key: PublicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
    /// Hex of the varint prefix bytes.
    pub encoded_prefix: String,
    pub prefix: u64,
    /// Hex of the full Base58-decoded byte string.
    pub raw_address: String,
}

impl DecodedAddress {
    /// The key pair outputs to this address are derived from.
    pub fn keys(&self) -> RecipientKeys {
        RecipientKeys {
            public_view_key: self.public_view_key,
            public_spend_key: self.public_spend_key,
        }
    }

    pub fn is_integrated(&self) -> bool {
        self.payment_id.is_some()
    }
}

fn checksum(crypto: &dyn CryptoProvider, data: &[u8]) -> [u8; ADDRESS_CHECKSUM_SIZE] {
    let hash = crypto.hash(data);
    let mut out = [0u8; ADDRESS_CHECKSUM_SIZE];
    out.copy_from_slice(&hash.0[..ADDRESS_CHECKSUM_SIZE]);
    out
}

/// Encode view and spend keys (and optionally a payment id) as an address.
pub fn encode_address(
    crypto: &dyn CryptoProvider,
    public_view_key: &PublicKey,
    public_spend_key: &PublicKey,
    payment_id: Option<&PaymentId>,
    prefix: u64,
) -> String {
    let mut data = varint::encode(prefix);
    if let Some(pid) = payment_id {
        data.extend_from_slice(pid.to_hex().as_bytes());
    }
    data.extend_from_slice(public_spend_key.as_bytes());
    data.extend_from_slice(public_view_key.as_bytes());
    let check = checksum(crypto, &data);
    data.extend_from_slice(&check);
    base58::encode(&data)
}

/// Like [`encode_address`] but takes hex strings, reporting malformed keys as
/// [`AddressError::InvalidKeyFormat`] and a malformed payment id as
/// [`AddressError::InvalidPaymentId`].
pub fn encode_address_hex(
    crypto: &dyn CryptoProvider,
    public_view_key: &str,
    public_spend_key: &str,
    payment_id: Option<&str>,
    prefix: u64,
) -> Result<String, AddressError> {
    let view: PublicKey = public_view_key.parse()?;
    let spend: PublicKey = public_spend_key.parse()?;
    let pid = payment_id.map(str::parse::<PaymentId>).transpose()?;
    Ok(encode_address(crypto, &view, &spend, pid.as_ref(), prefix))
}

/// Decode and verify an address produced for `prefix`.
pub fn decode_address(
    crypto: &dyn CryptoProvider,
    address: &str,
    prefix: u64,
) -> Result<DecodedAddress, AddressError> {
    let raw = base58::decode(address)?;
    let (found, prefix_len) = varint::decode(&raw)?;
    if found != prefix {
        return Err(AddressError::PrefixMismatch { expected: prefix, found });
    }
    // Only the shortest encoding of the prefix is accepted.
    if raw[..prefix_len] != varint::encode(prefix)[..] {
        return Err(AddressError::InvalidVarint);
    }

    let body = &raw[prefix_len..];
    let plain_len = 2 * KEY_SIZE + ADDRESS_CHECKSUM_SIZE;
    let pid_len = if body.len() == plain_len {
        0
    } else if body.len() == plain_len + EMBEDDED_PAYMENT_ID_SIZE {
        EMBEDDED_PAYMENT_ID_SIZE
    } else {
        return Err(AddressError::InvalidLength(raw.len()));
    };

    let payment_id = if pid_len > 0 {
        let text = std::str::from_utf8(&body[..pid_len])
            .map_err(|_| AddressError::InvalidPaymentId("embedded payment id is not text".into()))?;
        Some(text.parse::<PaymentId>()?)
    } else {
        None
    };

    let keys = &body[pid_len..pid_len + 2 * KEY_SIZE];
    let public_spend_key = PublicKey::from_slice(&keys[..KEY_SIZE])?;
    let public_view_key = PublicKey::from_slice(&keys[KEY_SIZE..])?;

    let signed_len = raw.len() - ADDRESS_CHECKSUM_SIZE;
    if checksum(crypto, &raw[..signed_len]) != raw[signed_len..] {
        debug!(prefix, "address: checksum mismatch");
        return Err(AddressError::ChecksumMismatch);
    }

    Ok(DecodedAddress {
        public_view_key,
        public_spend_key,
        payment_id,
        encoded_prefix: hex::encode(&raw[..prefix_len]),
        prefix: found,
        raw_address: hex::encode(&raw),
    })
}

/// Recover the human-readable Base58 prefix of an address whose numeric
/// prefix is not known in advance.
///
/// Block Base58 does not align character boundaries with byte boundaries,
/// so this is a heuristic matched against real networks' addresses: the
/// decimal digit count `d` of the prefix decides how many leading
/// characters belong to it, `ceil(d / 2)`, plus one when `d` is even, plus
/// `(d mod 10) / 2` more once `d` exceeds ten.
pub fn decode_address_prefix(address: &str) -> Result<AddressPrefix, AddressError> {
    let raw = base58::decode(address)?;
    if raw.len() < ADDRESS_CHECKSUM_SIZE {
        return Err(AddressError::InvalidLength(raw.len()));
    }
    let without_checksum = &raw[..raw.len() - ADDRESS_CHECKSUM_SIZE];
    let prefix_len = without_checksum.len() % KEY_SIZE;
    let prefix_bytes = &without_checksum[..prefix_len];
    let (decimal, _) = varint::decode(prefix_bytes)?;

    let digits = decimal.to_string().len();
    let mut offset = if digits % 2 == 0 { 1 } else { 0 };
    if digits > 10 {
        offset += (digits % 10) / 2;
    }
    let take = (digits.div_ceil(2) + offset).min(address.len());

    Ok(AddressPrefix {
        prefix: prefix_bytes.to_vec(),
        base58: address[..take].to_string(),
        decimal,
        hexadecimal: format!("{decimal:x}"),
    })
}

/// Re-encode `address` with `payment_id` embedded.
pub fn create_integrated_address(
    crypto: &dyn CryptoProvider,
    address: &str,
    payment_id: &PaymentId,
    prefix: u64,
) -> Result<String, AddressError> {
    let decoded = decode_address(crypto, address, prefix)?;
    Ok(encode_address(
        crypto,
        &decoded.public_view_key,
        &decoded.public_spend_key,
        Some(payment_id),
        prefix,
    ))
}

/// Base58-encode an arbitrary even-length hex string.
pub fn encode_raw_address(raw_hex: &str) -> Result<String, AddressError> {
    if raw_hex.len() % 2 != 0 {
        return Err(AddressError::InvalidHexInput(format!("odd length {}", raw_hex.len())));
    }
    let bytes = hex::decode(raw_hex).map_err(|e| AddressError::InvalidHexInput(e.to_string()))?;
    Ok(base58::encode(&bytes))
}

/// Base58-decode an address to hex without interpreting its fields.
pub fn decode_raw_address(address: &str) -> Result<String, AddressError> {
    Ok(hex::encode(base58::decode(address)?))
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
