//! CryptoNote `hash_to_ec`.
//!
//! `Hp(key) = 8 · map(Keccak(key))`, where `map` is the reference
//! `ge_fromfe_frombytes_vartime`: the hash is read as a full 256-bit
//! little-endian integer reduced mod p (the top bit is not masked), pushed
//! through an Elligator-style map onto the Montgomery curve and converted to
//! Edwards form. Key images and ring signatures depend on this exact map.
//!
//! dalek keeps its field type private, so the field arithmetic here runs on
//! `crypto-bigint` residues. The map yields affine `y` and the sign of `x`;
//! dalek recovers the point from that compressed form.

use crypto_bigint::modular::constant_mod::Residue;
use crypto_bigint::{impl_modulus, Encoding, U256};
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};

use crate::crypto::keccak256;
use crate::error::CryptoError;

impl_modulus!(
    Field25519,
    U256,
    "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed"
);

type Fe = Residue<Field25519, { U256::LIMBS }>;

/// Montgomery curve coefficient.
const A: Fe = Fe::new(&U256::from_u64(486_662));
const SQRT_M1: Fe = Fe::new(&U256::from_be_hex(
    "2b8324804fc1df0b2b4d00993dfbd7a72f431806ad2fe478c4ee1b274a0ea0b0",
));
/// sqrt(-2·A·(A+2))
const FFFB1: Fe = Fe::new(&U256::from_be_hex(
    "018e04102529e4e8df563ac8be04e61c2e6bfb5746d58c72dd58968acde3bdff",
));
/// sqrt(2·A·(A+2))
const FFFB2: Fe = Fe::new(&U256::from_be_hex(
    "32f9e1f5fba5d3096e2bae483fe9a041ae21fcb9fba908202d219b7c9f83650d",
));
/// sqrt(-sqrt(-1)·A·(A+2))
const FFFB3: Fe = Fe::new(&U256::from_be_hex(
    "674a110d14c208efb89546403f0da2ed4024ff4ea5964229581b7d8717302c66",
));
/// sqrt(sqrt(-1)·A·(A+2))
const FFFB4: Fe = Fe::new(&U256::from_be_hex(
    "65bc0cfcef982406d93f0b778108bcd111b903f75ec0b5b67ac2e6fc494c6e67",
));
/// (p - 5) / 8
const P58: U256 = U256::from_be_hex("0ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffd");

fn to_bytes(fe: &Fe) -> [u8; 32] {
    fe.retrieve().to_le_bytes()
}

fn is_zero(fe: &Fe) -> bool {
    *fe == Fe::ZERO
}

fn is_negative(fe: &Fe) -> bool {
    to_bytes(fe)[0] & 1 == 1
}

/// `(u / v)^((p + 3) / 8)` without an inversion.
fn div_pow_m1(u: &Fe, v: &Fe) -> Fe {
    let v3 = v.square() * v;
    let v7 = v3.square() * v;
    *u * v3 * (*u * v7).pow(&P58)
}

/// `ge_fromfe_frombytes_vartime`, returned in compressed Edwards form.
fn map_to_curve(bytes: &[u8; 32]) -> [u8; 32] {
    let u = Fe::new(&U256::from_le_slice(bytes));
    let v = u.square() + u.square();
    let w = v + Fe::ONE;
    let mut x = w.square() - A.square() * v;
    let mut r_x = div_pow_m1(&w, &x);
    let mut z = -A;

    x = r_x.square() * x;
    let negative = if !is_zero(&(w - x)) {
        if !is_zero(&(w + x)) {
            true
        } else {
            r_x = r_x * FFFB1;
            false
        }
    } else {
        r_x = r_x * FFFB2;
        false
    };

    let sign = if negative {
        x = x * SQRT_M1;
        if !is_zero(&(w - x)) {
            r_x = r_x * FFFB3;
        } else {
            r_x = r_x * FFFB4;
        }
        true
    } else {
        r_x = r_x * u;
        z = z * v;
        false
    };

    if is_negative(&r_x) != sign {
        r_x = -r_x;
    }

    // Projective (X·Z : Y : Z) with Y = z - w and Z = z + w.
    let big_z = z + w;
    let big_y = z - w;
    let (z_inv, _) = big_z.invert();
    let affine_x = r_x;
    let affine_y = big_y * z_inv;

    let mut compressed = to_bytes(&affine_y);
    if is_negative(&affine_x) {
        compressed[31] |= 0x80;
    }
    compressed
}

/// `Hp(key)`: a point in the prime-order subgroup derived from `key`.
pub fn hash_to_point(key: &[u8; 32]) -> Result<EdwardsPoint, CryptoError> {
    let compressed = map_to_curve(&keccak256(key));
    CompressedEdwardsY(compressed)
        .decompress()
        .map(|point| point.mul_by_cofactor())
        .ok_or_else(|| CryptoError::primitive("hash_to_point", "map left the curve"))
}
