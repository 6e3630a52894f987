//! Curve448 field arithmetic for the X448 ladder.
//!
//! `p = 2^448 - 2^224 - 1`. Elements are sixteen 28-bit limbs. Since
//! `2^448 = 2^224 + 1 (mod p)`, a product limb at position `k >= 16` folds
//! into positions `k - 16` and `k - 8`.

use std::ops::{Add, Mul, Sub};

use subtle::Choice;

use super::LadderField;

const MASK: u128 = (1 << 28) - 1;

/// `2p` in limb form, added before subtracting so limbs stay non-negative.
const TWO_P: [u32; 16] = [
    0x1fff_fffe, 0x1fff_fffe, 0x1fff_fffe, 0x1fff_fffe, 0x1fff_fffe, 0x1fff_fffe, 0x1fff_fffe,
    0x1fff_fffe, 0x1fff_fffc, 0x1fff_fffe, 0x1fff_fffe, 0x1fff_fffe, 0x1fff_fffe, 0x1fff_fffe,
    0x1fff_fffe, 0x1fff_fffe,
];

/// `p` in limb form.
const P: [i64; 16] = [
    0x0fff_ffff, 0x0fff_ffff, 0x0fff_ffff, 0x0fff_ffff, 0x0fff_ffff, 0x0fff_ffff, 0x0fff_ffff,
    0x0fff_ffff, 0x0fff_fffe, 0x0fff_ffff, 0x0fff_ffff, 0x0fff_ffff, 0x0fff_ffff, 0x0fff_ffff,
    0x0fff_ffff, 0x0fff_ffff,
];

/// `p - 2`, little-endian, the inversion exponent.
const P_MINUS_2: [u8; 56] = {
    let mut e = [0xffu8; 56];
    e[0] = 0xfd;
    e[28] = 0xfe;
    e
};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fe448([u32; 16]);

impl Fe448 {
    /// Decodes 56 little-endian bytes. All 448 bits are used; values at or
    /// above `p` reduce during arithmetic.
    pub(crate) fn from_bytes(bytes: &[u8; 56]) -> Self {
        let mut limbs = [0u32; 16];
        for (i, limb) in limbs.iter_mut().enumerate() {
            // 28-bit limbs: even limbs start on a byte, odd limbs on a nibble
            let start = (i * 28) / 8;
            let mut word = 0u32;
            for k in 0..4 {
                word |= u32::from(bytes[start + k]) << (8 * k);
            }
            if i % 2 == 1 {
                word >>= 4;
            }
            *limb = word & 0x0fff_ffff;
        }
        Fe448(limbs)
    }

    /// Encodes the canonical representative.
    pub(crate) fn to_bytes(self) -> [u8; 56] {
        let h = carry(self.0.map(u128::from));
        let h: [i64; 16] = h.0.map(i64::from);

        let mut reduced = [0i64; 16];
        let mut c = 0i64;
        for i in 0..16 {
            let t = h[i] - P[i] + c;
            c = t >> 28;
            reduced[i] = t & 0x0fff_ffff;
        }

        let mut plain = [0i64; 16];
        let mut c2 = 0i64;
        for i in 0..16 {
            let t = h[i] + c2;
            c2 = t >> 28;
            plain[i] = t & 0x0fff_ffff;
        }

        // a negative final borrow means h < p
        let below_p = (c >> 63) & 1;
        let mask = -below_p;
        let limbs: [i64; 16] = std::array::from_fn(|i| (plain[i] & mask) | (reduced[i] & !mask));

        let mut out = [0u8; 56];
        for (i, pair) in limbs.chunks_exact(2).enumerate() {
            let v = (pair[0] as u64) | ((pair[1] as u64) << 28);
            out[7 * i..7 * i + 7].copy_from_slice(&v.to_le_bytes()[..7]);
        }
        out
    }
}

/// Two full carry passes; the carry out of the top limb folds into limbs
/// 0 and 8.
fn carry(mut h: [u128; 16]) -> Fe448 {
    for _ in 0..2 {
        for i in 0..15 {
            let c = h[i] >> 28;
            h[i] &= MASK;
            h[i + 1] += c;
        }
        let c = h[15] >> 28;
        h[15] &= MASK;
        h[0] += c;
        h[8] += c;
    }
    Fe448(h.map(|x| x as u32))
}

impl Add for Fe448 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Fe448(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for Fe448 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Fe448(std::array::from_fn(|i| self.0[i] + TWO_P[i] - rhs.0[i]))
    }
}

impl Mul for Fe448 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut wide = [0u128; 31];
        for i in 0..16 {
            let a = u128::from(self.0[i]);
            for j in 0..16 {
                wide[i + j] += a * u128::from(rhs.0[j]);
            }
        }
        for k in (16..31).rev() {
            let v = wide[k];
            wide[k - 16] += v;
            wide[k - 8] += v;
            wide[k] = 0;
        }
        let mut low = [0u128; 16];
        low.copy_from_slice(&wide[..16]);
        carry(low)
    }
}

impl LadderField for Fe448 {
    const ZERO: Self = Fe448([0; 16]);
    const ONE: Self = Fe448([1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    const A24: u32 = 39081;
    const BITS: usize = 448;

    fn square(&self) -> Self {
        *self * *self
    }

    fn mul_small(&self, k: u32) -> Self {
        carry(self.0.map(|x| u128::from(x) * u128::from(k)))
    }

    fn invert(&self) -> Self {
        let mut r = Self::ONE;
        for i in (0..448).rev() {
            r = r.square();
            if (P_MINUS_2[i / 8] >> (i % 8)) & 1 == 1 {
                r = r * *self;
            }
        }
        r
    }

    fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice) {
        let mask = 0u32.wrapping_sub(u32::from(choice.unwrap_u8()));
        for (x, y) in a.0.iter_mut().zip(b.0.iter_mut()) {
            let t = (*x ^ *y) & mask;
            *x ^= t;
            *y ^= t;
        }
    }
}

/// X448 on already fixed inputs.
pub(super) fn x448(scalar: &[u8; 56], u: &[u8; 56]) -> [u8; 56] {
    super::ladder(scalar, Fe448::from_bytes(u)).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_encodes_as_zero() {
        let mut p = [0xffu8; 56];
        p[28] = 0xfe;
        assert_eq!(Fe448::from_bytes(&p).to_bytes(), [0u8; 56]);
    }

    #[test]
    fn encoding_round_trips() {
        let mut bytes = [0u8; 56];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(29).wrapping_add(3);
        }
        assert_eq!(Fe448::from_bytes(&bytes).to_bytes(), bytes);
    }

    #[test]
    fn inverse_times_value_is_one() {
        let mut bytes = [0u8; 56];
        bytes[0] = 42;
        bytes[40] = 7;
        let x = Fe448::from_bytes(&bytes);
        assert_eq!((x * x.invert()).to_bytes(), Fe448::ONE.to_bytes());
    }
}
