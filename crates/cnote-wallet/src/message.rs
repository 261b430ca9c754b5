//! Signing arbitrary messages with a wallet's spend key.
//!
//! The signed value is the fast hash of the message bytes; structured
//! messages are signed over their JSON encoding.

use serde::Serialize;
use tracing::debug;

use cnote_core::address::decode_address;
use cnote_core::error::AddressError;
use cnote_core::traits::CryptoProvider;
use cnote_core::types::{SecretKey, Signature};

use crate::error::WalletError;

fn json_bytes<T: Serialize + ?Sized>(message: &T) -> Result<Vec<u8>, WalletError> {
    serde_json::to_vec(message).map_err(|e| WalletError::Serialization(e.to_string()))
}

/// Sign `message` as the owner of `address`.
///
/// Fails unless `private_spend_key` belongs to the address's public spend
/// key.
pub fn sign_message(
    crypto: &dyn CryptoProvider,
    message: impl AsRef<[u8]>,
    address: &str,
    private_spend_key: &SecretKey,
    prefix: u64,
) -> Result<Signature, WalletError> {
    let decoded = decode_address(crypto, address, prefix)?;
    let public = crypto.secret_key_to_public_key(private_spend_key)?;
    if public != decoded.public_spend_key {
        return Err(AddressError::InvalidKeyFormat(
            "private spend key does not belong to the signing address".into(),
        )
        .into());
    }
    let hash = crypto.hash(message.as_ref());
    debug!(%hash, "message: signing");
    Ok(crypto.generate_signature(&hash, &public, private_spend_key)?)
}

/// [`sign_message`] over the JSON encoding of `message`.
pub fn sign_json_message<T: Serialize + ?Sized>(
    crypto: &dyn CryptoProvider,
    message: &T,
    address: &str,
    private_spend_key: &SecretKey,
    prefix: u64,
) -> Result<Signature, WalletError> {
    sign_message(crypto, json_bytes(message)?, address, private_spend_key, prefix)
}

/// Whether `signature` is a signature of `message` by the owner of `address`.
///
/// Only a malformed address is an error; a wrong signature is `Ok(false)`.
pub fn verify_message_signature(
    crypto: &dyn CryptoProvider,
    message: impl AsRef<[u8]>,
    address: &str,
    signature: &Signature,
    prefix: u64,
) -> Result<bool, WalletError> {
    let decoded = decode_address(crypto, address, prefix)?;
    let hash = crypto.hash(message.as_ref());
    Ok(crypto.check_signature(&hash, &decoded.public_spend_key, signature))
}

/// [`verify_message_signature`] over the JSON encoding of `message`.
pub fn verify_json_message_signature<T: Serialize + ?Sized>(
    crypto: &dyn CryptoProvider,
    message: &T,
    address: &str,
    signature: &Signature,
    prefix: u64,
) -> Result<bool, WalletError> {
    verify_message_signature(crypto, json_bytes(message)?, address, signature, prefix)
}
