//! CryptoNote block Base58.
//!
//! Unlike Bitcoin Base58, the input is split into 8-byte blocks and each
//! block is encoded independently into a fixed number of characters, so the
//! output length depends only on the input length. A full block becomes 11
//! characters; a trailing partial block of `n` bytes becomes
//! `ENCODED_BLOCK_SIZES[n]` characters. The alphabet is Bitcoin's; the
//! per-block big-endian conversion is delegated to `bs58`.

use crate::error::AddressError;

const FULL_BLOCK_SIZE: usize = 8;
const FULL_ENCODED_BLOCK_SIZE: usize = 11;

/// Encoded width for a block of `index` bytes.
const ENCODED_BLOCK_SIZES: [usize; FULL_BLOCK_SIZE + 1] = [0, 2, 3, 5, 6, 7, 9, 10, 11];

/// Alphabet character for digit zero, used as left padding.
const ZERO_DIGIT: char = '1';

/// Encode arbitrary bytes.
pub fn encode(data: &[u8]) -> String {
    let full_blocks = data.len() / FULL_BLOCK_SIZE;
    let mut out = String::with_capacity(
        full_blocks * FULL_ENCODED_BLOCK_SIZE + ENCODED_BLOCK_SIZES[data.len() % FULL_BLOCK_SIZE],
    );
    for block in data.chunks(FULL_BLOCK_SIZE) {
        encode_block(block, &mut out);
    }
    out
}

/// Decode a CryptoNote Base58 string.
pub fn decode(text: &str) -> Result<Vec<u8>, AddressError> {
    if !text.is_ascii() {
        return Err(AddressError::InvalidBase58("non-ASCII character".into()));
    }
    let tail = text.len() % FULL_ENCODED_BLOCK_SIZE;
    let tail_size = ENCODED_BLOCK_SIZES
        .iter()
        .position(|&size| size == tail)
        .ok_or_else(|| AddressError::InvalidBase58(format!("invalid trailing block of {tail} characters")))?;

    let full_blocks = text.len() / FULL_ENCODED_BLOCK_SIZE;
    let mut out = Vec::with_capacity(full_blocks * FULL_BLOCK_SIZE + tail_size);
    for chunk in text.as_bytes().chunks(FULL_ENCODED_BLOCK_SIZE) {
        let size = if chunk.len() == FULL_ENCODED_BLOCK_SIZE { FULL_BLOCK_SIZE } else { tail_size };
        decode_block(chunk, size, &mut out)?;
    }
    Ok(out)
}

fn encode_block(block: &[u8], out: &mut String) {
    let width = ENCODED_BLOCK_SIZES[block.len()];
    let encoded = bs58::encode(block).into_string();
    // bs58 renders each leading zero byte as its own '1'; only the numeric
    // digits matter for a fixed-width block.
    let digits = encoded.trim_start_matches(ZERO_DIGIT);
    for _ in digits.len()..width {
        out.push(ZERO_DIGIT);
    }
    out.push_str(digits);
}

fn decode_block(chunk: &[u8], size: usize, out: &mut Vec<u8>) -> Result<(), AddressError> {
    let decoded = bs58::decode(chunk)
        .into_vec()
        .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
    let first_nonzero = decoded.iter().position(|&b| b != 0).unwrap_or(decoded.len());
    let significant = &decoded[first_nonzero..];
    if significant.len() > size {
        return Err(AddressError::InvalidBase58("block overflow".into()));
    }
    out.extend(std::iter::repeat_n(0u8, size - significant.len()));
    out.extend_from_slice(significant);
    Ok(())
}
