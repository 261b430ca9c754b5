//! Error types for the cnote codec and cryptography layers.

use thiserror::Error;

/// Errors from address, key and Base58 parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A key is not 64 hex characters, or its bytes are not a valid key.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// A payment id is not 64 hex characters.
    #[error("invalid payment id: {0}")]
    InvalidPaymentId(String),

    #[error("invalid hex input: {0}")]
    InvalidHexInput(String),

    /// Bad Base58 alphabet character, block size or block overflow.
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid varint")]
    InvalidVarint,

    /// The decoded body is neither a standard nor an integrated address.
    #[error("invalid length: {0} bytes")]
    InvalidLength(usize),

    #[error("prefix mismatch: expected {expected}, found {found}")]
    PrefixMismatch {
        /// Prefix the caller asked for.
        expected: u64,
        /// Prefix encoded in the address.
        found: u64,
    },

    #[error("checksum mismatch")]
    ChecksumMismatch,
}

/// Errors from the binary transaction format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// An input, output or extra field carries a tag this crate does not read.
    #[error("unsupported {kind} tag: {tag:#04x}")]
    UnsupportedTag { kind: &'static str, tag: u8 },

    #[error("truncated at byte {0}")]
    Truncated(usize),

    #[error("{0} trailing bytes")]
    TrailingBytes(usize),

    #[error(transparent)]
    Field(#[from] AddressError),
}

/// Errors surfaced by a [`CryptoProvider`](crate::traits::CryptoProvider).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// A primitive rejected its inputs, e.g. a non-canonical scalar.
    #[error("primitive failure in {primitive}: {reason}")]
    PrimitiveFailure { primitive: &'static str, reason: String },

    #[error("real index out of bounds: {index} >= {len}")]
    RealIndexOutOfBounds { index: usize, len: usize },
}

impl CryptoError {
    pub(crate) fn primitive(primitive: &'static str, reason: impl Into<String>) -> Self {
        CryptoError::PrimitiveFailure { primitive, reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefix_mismatch() {
        let e = AddressError::PrefixMismatch { expected: 3914525, found: 18511 };
        assert_eq!(e.to_string(), "prefix mismatch: expected 3914525, found 18511");
    }

    #[test]
    fn display_unsupported_tag() {
        let e = TransactionError::UnsupportedTag { kind: "extra", tag: 0x05 };
        assert_eq!(e.to_string(), "unsupported extra tag: 0x05");
    }

    #[test]
    fn display_primitive_failure() {
        let e = CryptoError::primitive("generate_key_derivation", "not a curve point");
        assert_eq!(
            e.to_string(),
            "primitive failure in generate_key_derivation: not a curve point"
        );
    }
}
