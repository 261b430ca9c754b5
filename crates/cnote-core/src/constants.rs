//! Protocol constants for CryptoNote addresses and transactions.

/// Size in bytes of every key, key image, derivation and payment id.
pub const KEY_SIZE: usize = 32;

/// Number of leading Keccak-256 bytes appended to an address as checksum.
pub const ADDRESS_CHECKSUM_SIZE: usize = 4;

/// An integrated address embeds the payment id as its 64 ASCII hex characters.
pub const EMBEDDED_PAYMENT_ID_SIZE: usize = KEY_SIZE * 2;

/// Default numeric address prefix (addresses start with `TRTL`).
///
/// # Examples
///
/// ```
/// use cnote_core::constants::DEFAULT_ADDRESS_PREFIX;
/// let encoded = cnote_core::varint::encode(DEFAULT_ADDRESS_PREFIX);
/// assert_eq!(encoded, vec![0x9d, 0xf6, 0xee, 0x01]);
/// ```
pub const DEFAULT_ADDRESS_PREFIX: u64 = 3_914_525;

/// Decimal places used when formatting atomic units for display.
pub const DEFAULT_COIN_UNIT_PLACES: u32 = 2;

/// Default network fee in atomic units.
pub const DEFAULT_NETWORK_FEE: u64 = 10;

/// Default number of hash rounds applied when stretching new seed entropy.
pub const DEFAULT_KDF_ITERATIONS: u32 = 1;

/// Transaction format version produced by the builder.
pub const TRANSACTION_VERSION: u64 = 1;

/// Type tag of a to-key input and of a to-key output target.
pub const TX_IN_TO_KEY_TAG: u8 = 0x02;
pub const TX_OUT_TO_KEY_TAG: u8 = 0x02;

/// Extra field tags.
pub const TX_EXTRA_PUBKEY_TAG: u8 = 0x01;
pub const TX_EXTRA_NONCE_TAG: u8 = 0x02;
pub const TX_EXTRA_NONCE_PAYMENT_ID_TAG: u8 = 0x00;
pub const TX_EXTRA_ARBITRARY_DATA_TAG: u8 = 0x7f;

/// Largest amount representable on chain is `u64::MAX`; sums must stay below 2^64.
pub const AMOUNT_LIMIT: u128 = 1u128 << 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_payment_id_is_hex_text() {
        assert_eq!(EMBEDDED_PAYMENT_ID_SIZE, 64);
    }

    #[test]
    fn amount_limit_is_two_pow_64() {
        assert_eq!(AMOUNT_LIMIT, u64::MAX as u128 + 1);
    }
}
