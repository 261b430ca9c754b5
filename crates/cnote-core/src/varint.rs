//! Little-endian base-128 varints as used in CryptoNote addresses and
//! transaction prefixes.

use crate::error::AddressError;

/// Encode `value` with 7 data bits per byte, high bit set on all but the last.
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    write(&mut out, value);
    out
}

/// Append the varint encoding of `value` to `buf`.
pub fn write(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Decode a varint from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed. Fails on truncated
/// input and on encodings that overflow 64 bits.
pub fn decode(bytes: &[u8]) -> Result<(u64, usize), AddressError> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let shift = 7 * i as u32;
        if shift >= 64 {
            return Err(AddressError::InvalidVarint);
        }
        let bits = (byte & 0x7f) as u64;
        if shift > 0 && bits >> (64 - shift) != 0 {
            return Err(AddressError::InvalidVarint);
        }
        value |= bits << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(AddressError::InvalidVarint)
}
