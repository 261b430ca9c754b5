//! Integration test suite for cnote.
//!
//! Exercises the address codec, wallet derivation, scanner and transaction
//! builder together through the public `CryptoNote` facade.

pub mod helpers;
