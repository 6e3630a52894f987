//! Scalars modulo the Ed25519 group order
//! `L = 2^252 + 27742317777372353535851937790883648493`.
//!
//! Reduction works on signed 21-bit limbs and uses `2^252 = -c (mod L)`,
//! with the limbs of `-c` in [`FOLD`]. Limbs above bit 252 are folded down
//! from the top, interleaved with carry passes that keep every intermediate
//! inside `i64`. The sequence of folds and carries does not depend on the
//! value, so reduction is constant time.

use subtle::{Choice, ConstantTimeEq, ConstantTimeLess};

/// Signed 21-bit limbs of `2^252 mod L`, negated.
const FOLD: [i64; 6] = [666643, 470296, 654183, -997805, 136657, -683901];

const MASK: u64 = (1 << 21) - 1;

/// The group order, little-endian.
pub(crate) const L_BYTES: [u8; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde, 0x14,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
];

/// A 256-bit little-endian scalar. Values produced by [`Scalar::reduce`] and
/// [`Scalar::mul_add`] are canonical (below `L`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Scalar(pub(crate) [u8; 32]);

/// One signed digit per bit position, mostly zero, odd and within
/// `[-15, 15]` otherwise.
pub(crate) type Slide = [i8; 256];

impl Scalar {
    /// Reduces a 512-bit little-endian value, such as a SHA-512 digest.
    pub(crate) fn reduce(wide: &[u8; 64]) -> Self {
        let mut s = load_limbs::<24>(wide);
        Scalar(reduce_limbs(&mut s))
    }

    /// Computes `a * b + c mod L`.
    pub(crate) fn mul_add(a: &Scalar, b: &Scalar, c: &Scalar) -> Self {
        let a = load_limbs::<12>(&a.0);
        let b = load_limbs::<12>(&b.0);
        let c = load_limbs::<12>(&c.0);

        let mut s = [0i64; 24];
        s[..12].copy_from_slice(&c);
        for i in 0..12 {
            for j in 0..12 {
                s[i + j] += a[i] * b[j];
            }
        }
        for i in (0..23).step_by(2) {
            carry_round(&mut s, i);
        }
        for i in (1..22).step_by(2) {
            carry_round(&mut s, i);
        }

        Scalar(reduce_limbs(&mut s))
    }

    /// Returns set when the encoding is below `L`.
    pub(crate) fn is_canonical(bytes: &[u8; 32]) -> Choice {
        // compare as big-endian integers, most significant byte first
        let mut lt = Choice::from(0);
        let mut eq = Choice::from(1);
        for i in (0..32).rev() {
            lt |= eq & bytes[i].ct_lt(&L_BYTES[i]);
            eq &= bytes[i].ct_eq(&L_BYTES[i]);
        }
        lt
    }

    /// Signed radix-16 digits `e[0..64]` in `[-8, 8]` with
    /// `self = sum(e[i] * 16^i)`. Requires the top bit to be clear.
    pub(crate) fn radix16(&self) -> [i8; 64] {
        let mut e = [0i8; 64];
        for (i, &byte) in self.0.iter().enumerate() {
            e[2 * i] = (byte & 0x0f) as i8;
            e[2 * i + 1] = (byte >> 4) as i8;
        }

        let mut carry = 0i8;
        for digit in e.iter_mut().take(63) {
            *digit += carry;
            carry = (*digit + 8) >> 4;
            *digit -= carry << 4;
        }
        e[63] += carry;
        e
    }

    /// Sliding-window recoding for variable-time multiplication. Only used
    /// on public scalars.
    pub(crate) fn slide(&self) -> Slide {
        let mut r: Slide = std::array::from_fn(|i| ((self.0[i >> 3] >> (i & 7)) & 1) as i8);

        for i in 0..256 {
            if r[i] == 0 {
                continue;
            }
            for b in 1..=6 {
                if i + b >= 256 {
                    break;
                }
                if r[i + b] == 0 {
                    continue;
                }
                let rb = i32::from(r[i + b]) << b;
                let ri = i32::from(r[i]);
                if ri + rb <= 15 {
                    r[i] = (ri + rb) as i8;
                    r[i + b] = 0;
                } else if ri - rb >= -15 {
                    r[i] = (ri - rb) as i8;
                    for v in r.iter_mut().skip(i + b) {
                        if *v == 0 {
                            *v = 1;
                            break;
                        }
                        *v = 0;
                    }
                } else {
                    break;
                }
            }
        }
        r
    }
}

/// Splits little-endian bytes into `N` 21-bit limbs; the last limb takes
/// every remaining bit.
fn load_limbs<const N: usize>(bytes: &[u8]) -> [i64; N] {
    let mut out = [0i64; N];
    let mut acc = 0u64;
    let mut bits = 0u32;
    let mut iter = bytes.iter();
    for (i, limb) in out.iter_mut().enumerate() {
        while bits < 21 {
            match iter.next() {
                Some(&b) => {
                    acc |= u64::from(b) << bits;
                    bits += 8;
                }
                None => break,
            }
        }
        if i + 1 == N {
            for &b in iter.by_ref() {
                acc |= u64::from(b) << bits;
                bits += 8;
            }
            *limb = acc as i64;
        } else {
            *limb = (acc & MASK) as i64;
            acc >>= 21;
            bits = bits.saturating_sub(21);
        }
    }
    out
}

/// Folds limb `i` (at bit `21 * i`, `i >= 12`) into limbs `i - 12 ..= i - 7`.
#[inline(always)]
fn fold(s: &mut [i64; 24], i: usize) {
    for (k, f) in FOLD.iter().enumerate() {
        s[i - 12 + k] += s[i] * f;
    }
    s[i] = 0;
}

#[inline(always)]
fn carry_round(s: &mut [i64; 24], i: usize) {
    let c = (s[i] + (1 << 20)) >> 21;
    s[i + 1] += c;
    s[i] -= c << 21;
}

#[inline(always)]
fn carry_floor(s: &mut [i64; 24], i: usize) {
    let c = s[i] >> 21;
    s[i + 1] += c;
    s[i] -= c << 21;
}

fn reduce_limbs(s: &mut [i64; 24]) -> [u8; 32] {
    for i in (18..24).rev() {
        fold(s, i);
    }
    for i in (6..17).step_by(2) {
        carry_round(s, i);
    }
    for i in (7..16).step_by(2) {
        carry_round(s, i);
    }

    for i in (12..18).rev() {
        fold(s, i);
    }
    for i in (0..11).step_by(2) {
        carry_round(s, i);
    }
    for i in (1..12).step_by(2) {
        carry_round(s, i);
    }

    fold(s, 12);
    for i in 0..12 {
        carry_floor(s, i);
    }
    fold(s, 12);
    for i in 0..11 {
        carry_floor(s, i);
    }

    let mut out = [0u8; 32];
    let mut acc = 0u64;
    let mut bits = 0u32;
    let mut pos = 0;
    for &limb in &s[..12] {
        acc |= (limb as u64) << bits;
        bits += 21;
        while bits >= 8 {
            out[pos] = acc as u8;
            acc >>= 8;
            bits -= 8;
            pos += 1;
        }
    }
    out[31] = acc as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_reduces_to_zero() {
        let mut wide = [0u8; 64];
        wide[..32].copy_from_slice(&L_BYTES);
        assert_eq!(Scalar::reduce(&wide).0, [0u8; 32]);
    }

    #[test]
    fn order_minus_one_is_canonical() {
        let mut l_minus_one = L_BYTES;
        l_minus_one[0] -= 1;
        let mut wide = [0u8; 64];
        wide[..32].copy_from_slice(&l_minus_one);
        assert_eq!(Scalar::reduce(&wide).0, l_minus_one);
        assert!(bool::from(Scalar::is_canonical(&l_minus_one)));
        assert!(!bool::from(Scalar::is_canonical(&L_BYTES)));
    }

    #[test]
    fn mul_add_small_values() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        let mut c = [0u8; 32];
        a[0] = 7;
        b[0] = 6;
        c[0] = 8;
        let r = Scalar::mul_add(&Scalar(a), &Scalar(b), &Scalar(c));
        assert_eq!(r.0[0], 50);
        assert!(r.0[1..].iter().all(|&x| x == 0));
    }

    #[test]
    fn radix16_digits_stay_in_range() {
        let s = Scalar([0x5a; 32].map(|b: u8| b & 0x7f));
        let e = s.radix16();
        assert!(e.iter().all(|&d| (-8..=8).contains(&d)));
    }
}
