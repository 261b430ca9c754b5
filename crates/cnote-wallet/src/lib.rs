//! # cnote-wallet — CryptoNote wallets and ring-signed transactions.
//!
//! Turns seeds, mnemonics and key pairs into wallet identities, finds the
//! outputs a wallet owns, and builds balanced transactions that hide each
//! spent output in a ring of decoys.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` enum
//! - [`keys`] — Seeds, deterministic view keys, sub-wallet seeds
//! - [`mnemonic`] — BIP-39 backup phrases
//! - [`wallet`] — Wallet creation and restoration
//! - [`scanner`] — Output ownership and key images
//! - [`denominations`] — Splitting amounts into canonical outputs
//! - [`ring`] — Ring assembly around a real output
//! - [`builder`] — Transaction builder, blocking and async
//! - [`message`] — Message signatures with the spend key
//! - [`engine`] — The `CryptoNote` facade

pub mod builder;
pub mod denominations;
pub mod engine;
pub mod error;
pub mod keys;
pub mod message;
pub mod mnemonic;
pub mod ring;
pub mod scanner;
pub mod wallet;

// Re-exports for convenient access
pub use bip39::Language;
pub use builder::{GeneratedTransaction, TransactionBuilder};
pub use engine::CryptoNote;
pub use error::WalletError;
pub use keys::Seed;
pub use ring::MixedInput;
pub use scanner::KeyImageParts;
pub use wallet::Wallet;
