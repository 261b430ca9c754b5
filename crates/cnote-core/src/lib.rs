//! # cnote-core
//! Foundation types, codecs and cryptography for CryptoNote wallets.

pub mod address;
pub mod base58;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod hash_to_point;
pub mod overrides;
pub mod traits;
pub mod transaction;
pub mod types;
pub mod varint;
