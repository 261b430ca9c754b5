//! Output ownership scanning and key image derivation.
//!
//! An output belongs to a wallet when the one-time key derived from the
//! transaction public key, the wallet's private view key and the output's
//! index equals the key recorded on chain. The view key alone proves
//! ownership; the spend key is only needed to produce a key image.

use serde::{Deserialize, Serialize};
use tracing::debug;

use cnote_core::error::CryptoError;
use cnote_core::traits::CryptoProvider;
use cnote_core::types::{
    GeneratedInput, KeyDerivation, KeyImage, Output, PublicKey, SecretKey, TransactionKey,
};

use crate::error::WalletError;

/// The one-time key pair of an owned output plus its key image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyImageParts {
    pub public_ephemeral: PublicKey,
    pub private_ephemeral: SecretKey,
    pub key_image: KeyImage,
}

/// Shared secret between a transaction public key and a private view key.
///
/// Fails with `InvalidKeyFormat` when the transaction key is not a curve
/// point, before the provider ever sees it.
pub fn generate_key_derivation(
    crypto: &dyn CryptoProvider,
    transaction_public_key: &PublicKey,
    private_view_key: &SecretKey,
) -> Result<KeyDerivation, WalletError> {
    if !crypto.check_key(transaction_public_key) {
        return Err(CryptoError::InvalidKeyFormat(format!(
            "transaction public key {transaction_public_key} is not a curve point"
        ))
        .into());
    }
    Ok(crypto.generate_key_derivation(transaction_public_key, private_view_key)?)
}

/// Key image parts from an already computed derivation.
pub fn generate_key_image_primitive(
    crypto: &dyn CryptoProvider,
    public_spend_key: &PublicKey,
    private_spend_key: &SecretKey,
    output_index: u64,
    derivation: &KeyDerivation,
) -> Result<KeyImageParts, WalletError> {
    let public_ephemeral = crypto.derive_public_key(derivation, output_index, public_spend_key)?;
    let private_ephemeral = crypto.derive_secret_key(derivation, output_index, private_spend_key)?;
    let key_image = crypto.generate_key_image(&public_ephemeral, &private_ephemeral)?;
    Ok(KeyImageParts { public_ephemeral, private_ephemeral, key_image })
}

/// Key image parts for output `output_index` of the transaction with
/// public key `transaction_public_key`.
pub fn generate_key_image(
    crypto: &dyn CryptoProvider,
    transaction_public_key: &PublicKey,
    private_view_key: &SecretKey,
    public_spend_key: &PublicKey,
    private_spend_key: &SecretKey,
    output_index: u64,
) -> Result<KeyImageParts, WalletError> {
    let derivation = generate_key_derivation(crypto, transaction_public_key, private_view_key)?;
    generate_key_image_primitive(crypto, public_spend_key, private_spend_key, output_index, &derivation)
}

/// Recover the public spend key an output was sent to.
pub fn underive_public_key(
    crypto: &dyn CryptoProvider,
    derivation: &KeyDerivation,
    output_index: u64,
    output_key: &PublicKey,
) -> Result<PublicKey, WalletError> {
    Ok(crypto.underive_public_key(derivation, output_index, output_key)?)
}

fn check_output(
    crypto: &dyn CryptoProvider,
    transaction_public_key: &PublicKey,
    derivation: &KeyDerivation,
    output: &Output,
    public_spend_key: &PublicKey,
    private_spend_key: Option<&SecretKey>,
) -> Result<Option<Output>, WalletError> {
    let expected = crypto.derive_public_key(derivation, output.index, public_spend_key)?;
    if expected != output.key {
        return Ok(None);
    }

    let mut owned = output.clone();
    let transaction_key = TransactionKey { public_key: *transaction_public_key, derivation: *derivation };
    let (private_ephemeral, key_image) = match private_spend_key {
        Some(secret) => {
            let parts = generate_key_image_primitive(crypto, public_spend_key, secret, output.index, derivation)?;
            (Some(parts.private_ephemeral), Some(parts.key_image))
        }
        None => (None, None),
    };
    owned.key_image = key_image;
    owned.input = Some(GeneratedInput { transaction_key, public_ephemeral: expected, private_ephemeral });
    Ok(Some(owned))
}

/// Check whether `output` belongs to the wallet.
///
/// Returns the output with its spend material attached when it does and
/// `None` when it does not. The key image and private ephemeral are only
/// filled in when `private_spend_key` is supplied.
pub fn is_our_transaction_output(
    crypto: &dyn CryptoProvider,
    transaction_public_key: &PublicKey,
    output: &Output,
    private_view_key: &SecretKey,
    public_spend_key: &PublicKey,
    private_spend_key: Option<&SecretKey>,
) -> Result<Option<Output>, WalletError> {
    let derivation = generate_key_derivation(crypto, transaction_public_key, private_view_key)?;
    check_output(crypto, transaction_public_key, &derivation, output, public_spend_key, private_spend_key)
}

/// All outputs of one transaction that belong to the wallet, in their
/// original order.
pub fn scan_transaction_outputs(
    crypto: &dyn CryptoProvider,
    transaction_public_key: &PublicKey,
    outputs: &[Output],
    private_view_key: &SecretKey,
    public_spend_key: &PublicKey,
    private_spend_key: Option<&SecretKey>,
) -> Result<Vec<Output>, WalletError> {
    let derivation = generate_key_derivation(crypto, transaction_public_key, private_view_key)?;
    let mut owned = Vec::new();
    for output in outputs {
        if let Some(found) =
            check_output(crypto, transaction_public_key, &derivation, output, public_spend_key, private_spend_key)?
        {
            owned.push(found);
        }
    }
    debug!(scanned = outputs.len(), owned = owned.len(), "scanner: transaction scanned");
    Ok(owned)
}
