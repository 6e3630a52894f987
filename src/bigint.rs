//! Glue between byte strings and `num-bigint` values.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::{CryptoError, Result};

/// Exports `x` big-endian, left-padded to exactly `len` bytes.
///
/// Fails when `x` needs more than `len` bytes.
pub fn to_be_bytes_padded(x: &BigUint, len: usize) -> Result<Vec<u8>> {
    let raw = x.to_bytes_be();
    if x.is_zero() {
        return Ok(vec![0u8; len]);
    }
    if raw.len() > len {
        return Err(CryptoError::MalformedInput("integer wider than its field"));
    }
    let mut out = vec![0u8; len - raw.len()];
    out.extend_from_slice(&raw);
    Ok(out)
}

pub fn from_be_bytes(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// `a^-1 mod m`, or `None` when `a` and `m` share a factor.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let a = BigInt::from_biguint(Sign::Plus, a % m);
    let m = BigInt::from_biguint(Sign::Plus, m.clone());
    let egcd = a.extended_gcd(&m);
    if !egcd.gcd.is_one() {
        return None;
    }
    egcd.x.mod_floor(&m).to_biguint()
}

/// `(a - b) mod m` for `a, b < m`.
pub fn mod_sub(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    if a >= b { a - b } else { m - (b - a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_of_three_mod_eleven() {
        let inv = mod_inverse(&BigUint::from(3u32), &BigUint::from(11u32));
        assert_eq!(inv, Some(BigUint::from(4u32)));
    }

    #[test]
    fn no_inverse_for_shared_factor() {
        assert_eq!(mod_inverse(&BigUint::from(6u32), &BigUint::from(9u32)), None);
    }

    #[test]
    fn padding_rejects_overflow() {
        let x = BigUint::from(0x1_0000u32);
        assert_eq!(to_be_bytes_padded(&x, 4).unwrap(), vec![0, 1, 0, 0]);
        assert!(to_be_bytes_padded(&x, 2).is_err());
    }

    #[test]
    fn mod_sub_wraps() {
        let m = BigUint::from(13u32);
        let r = mod_sub(&BigUint::from(2u32), &BigUint::from(5u32), &m);
        assert_eq!(r, BigUint::from(10u32));
    }
}
