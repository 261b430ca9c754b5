//! Wallet error types.

use cnote_core::error::{AddressError, CryptoError, TransactionError};
use thiserror::Error;

/// Errors that can occur in wallet and transaction-building operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// An amount is zero or exceeds the configured per-output maximum.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A running sum of amounts reached 2^64.
    #[error("amount overflow: {0} total exceeds u64")]
    AmountOverflow(&'static str),

    /// Inputs exceed outputs by something other than the fee.
    #[error("unbalanced transaction: change {change} does not equal fee {fee}")]
    UnbalancedTransaction {
        /// Inputs minus outputs.
        change: u64,
        /// Requested fee.
        fee: u64,
    },

    /// Outputs exceed inputs.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Sum of spent outputs.
        have: u64,
        /// Sum of new outputs.
        need: u64,
    },

    /// Not enough usable decoys to reach the requested mixin.
    #[error("insufficient decoys: {0}")]
    InsufficientDecoys(String),

    /// A ring signature could not be produced or failed self-verification.
    #[error("signature generation failed for input {input}")]
    SignatureGenerationFailed {
        /// Position of the input in the finished transaction.
        input: usize,
    },

    /// An owned output was scanned without the private spend key.
    #[error("unspendable output at global index {0}: missing key image or private ephemeral")]
    UnspendableOutput(u64),

    /// Invalid BIP-39 mnemonic phrase.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Extra payload could not be serialized.
    #[error("serialization: {0}")]
    Serialization(String),

    /// Address or key parsing error from cnote-core.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Primitive failure from the cryptography provider.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Transaction container error from cnote-core.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_insufficient_funds() {
        let e = WalletError::InsufficientFunds { have: 100, need: 200 };
        assert_eq!(e.to_string(), "insufficient funds: have 100, need 200");
    }

    #[test]
    fn display_unbalanced() {
        let e = WalletError::UnbalancedTransaction { change: 15, fee: 10 };
        assert_eq!(e.to_string(), "unbalanced transaction: change 15 does not equal fee 10");
    }

    #[test]
    fn clone_and_eq() {
        let e1 = WalletError::InvalidAmount("zero".into());
        let e2 = e1.clone();
        assert_eq!(e1, e2);
    }

    #[test]
    fn from_address_error() {
        let wallet: WalletError = AddressError::ChecksumMismatch.into();
        assert_eq!(wallet, WalletError::Address(AddressError::ChecksumMismatch));
        assert_eq!(wallet.to_string(), "checksum mismatch");
    }

    #[test]
    fn from_crypto_error() {
        let crypto = CryptoError::RealIndexOutOfBounds { index: 4, len: 4 };
        let wallet: WalletError = crypto.clone().into();
        assert_eq!(wallet, WalletError::Crypto(crypto));
    }
}
