//! Arithmetic in GF(2^255 - 19).
//!
//! Elements are ten signed limbs in radix 2^25.5: limb `i` sits at bit
//! offset `ceil(25.5 * i)` and alternates between 26 and 25 bits. Addition
//! and subtraction are limb-wise and leave carries pending; multiplication
//! and squaring end with a full carry chain, so operands are always the
//! output of at most one add or sub since the last product.
//!
//! Nothing here branches on or indexes by element values.

use std::ops::{Add, Mul, Neg, Sub};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Bit offset of each limb.
const OFFSETS: [u32; 10] = [0, 26, 51, 77, 102, 128, 153, 179, 204, 230];

/// Bit width of each limb.
const WIDTHS: [u32; 10] = [26, 25, 26, 25, 26, 25, 26, 25, 26, 25];

/// An element of GF(2^255 - 19).
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldElement(pub(crate) [i32; 10]);

/// Edwards25519 curve constant `d = -121665/121666`.
pub(crate) const D: FieldElement = FieldElement([
    -10913610, 13857413, -15372611, 6949391, 114729, -8787816, -6275908, -3247719, -18696448,
    -12055116,
]);

/// `2 * d`.
pub(crate) const D2: FieldElement = FieldElement([
    -21827239, -5839606, -30745221, 13898782, 229458, 15978800, -12551817, -6495438, 29715968,
    9444199,
]);

/// A square root of -1.
pub(crate) const SQRT_M1: FieldElement = FieldElement([
    -32595792, -7943725, 9377950, 3500415, 12389472, -272473, -25146209, -2005654, 326686,
    11406482,
]);

impl FieldElement {
    pub(crate) const ZERO: Self = FieldElement([0; 10]);
    pub(crate) const ONE: Self = FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    /// Decodes 32 little-endian bytes, ignoring bit 255. Values in
    /// `[p, 2^255)` are accepted and reduce on the next operation.
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (w, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *w = u64::from_le_bytes(buf);
        }

        let mut limbs = [0i32; 10];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let off = OFFSETS[i];
            let (word, shift) = ((off / 64) as usize, off % 64);
            let mut v = words[word] >> shift;
            if shift + WIDTHS[i] > 64 && word < 3 {
                v |= words[word + 1] << (64 - shift);
            }
            *limb = (v & ((1u64 << WIDTHS[i]) - 1)) as i32;
        }
        FieldElement(limbs)
    }

    /// Encodes the canonical representative as 32 little-endian bytes.
    pub(crate) fn to_bytes(self) -> [u8; 32] {
        let mut h = self.0.map(i64::from);

        // q = floor(h / p), computed from the top limb down with 19 folded in
        let mut q = (19 * h[9] + (1 << 24)) >> 25;
        for (i, &limb) in h.iter().enumerate() {
            q = (limb + q) >> WIDTHS[i];
        }

        h[0] += 19 * q;
        for i in 0..9 {
            let carry = h[i] >> WIDTHS[i];
            h[i + 1] += carry;
            h[i] -= carry << WIDTHS[i];
        }
        h[9] &= (1 << 25) - 1;

        let mut out = [0u8; 32];
        let mut acc = 0u64;
        let mut bits = 0u32;
        let mut pos = 0;
        for (i, &limb) in h.iter().enumerate() {
            acc |= (limb as u64) << bits;
            bits += WIDTHS[i];
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

    pub(crate) fn is_zero(&self) -> Choice {
        self.to_bytes()[..].ct_eq(&[0u8; 32][..])
    }

    /// The "sign" of an element: the low bit of its canonical encoding.
    pub(crate) fn is_negative(&self) -> Choice {
        Choice::from(self.to_bytes()[0] & 1)
    }

    /// Multiplies by a small constant.
    pub(crate) fn mul_small(&self, k: i32) -> Self {
        carry(self.0.map(|x| i64::from(x) * i64::from(k)))
    }

    pub(crate) fn square(&self) -> Self {
        carry(mul_wide(&self.0, &self.0))
    }

    /// `2 * self^2` with a single carry pass.
    pub(crate) fn double_square(&self) -> Self {
        carry(mul_wide(&self.0, &self.0).map(|x| 2 * x))
    }

    pub(crate) fn n_square(&self, n: usize) -> Self {
        (0..n).fold(*self, |acc, _| acc.square())
    }

    /// `self^(2^252 - 3)`, the exponent behind square roots mod p.
    pub(crate) fn pow22523(&self) -> Self {
        let (_, z_250_0) = self.pow_2_250_minus_1();
        z_250_0.n_square(2) * *self
    }

    /// `self^(p - 2)`; zero maps to zero.
    pub(crate) fn invert(&self) -> Self {
        let (z11, z_250_0) = self.pow_2_250_minus_1();
        z_250_0.n_square(5) * z11
    }

    /// Shared addition chain: returns `(self^11, self^(2^250 - 1))`.
    fn pow_2_250_minus_1(&self) -> (Self, Self) {
        let z2 = self.square();
        let z9 = z2.n_square(2) * *self;
        let z11 = z9 * z2;
        let z_5_0 = z11.square() * z9;
        let z_10_0 = z_5_0.n_square(5) * z_5_0;
        let z_20_0 = z_10_0.n_square(10) * z_10_0;
        let z_40_0 = z_20_0.n_square(20) * z_20_0;
        let z_50_0 = z_40_0.n_square(10) * z_10_0;
        let z_100_0 = z_50_0.n_square(50) * z_50_0;
        let z_200_0 = z_100_0.n_square(100) * z_100_0;
        let z_250_0 = z_200_0.n_square(50) * z_50_0;
        (z11, z_250_0)
    }

    /// Computes a square root of `u / v`, if one exists.
    ///
    /// Returns `(choice, r)` where `r^2 * v == u` when `choice` is set.
    pub(crate) fn sqrt_ratio(u: &Self, v: &Self) -> (Choice, Self) {
        let v3 = v.square() * *v;
        let v7 = v3.square() * *v;
        let mut r = *u * v3 * (*u * v7).pow22523();

        let check = *v * r.square();
        let correct = (check - *u).is_zero();
        let flipped = (check + *u).is_zero();

        r.conditional_assign(&(r * SQRT_M1), flipped & !correct);
        (correct | flipped, r)
    }

    pub(crate) fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice) {
        let mask = -(i32::from(choice.unwrap_u8()));
        for (x, y) in a.0.iter_mut().zip(b.0.iter_mut()) {
            let t = (*x ^ *y) & mask;
            *x ^= t;
            *y ^= t;
        }
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut out = [0i32; 10];
        for (i, o) in out.iter_mut().enumerate() {
            *o = i32::conditional_select(&a.0[i], &b.0[i], choice);
        }
        FieldElement(out)
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.to_bytes()[..].ct_eq(&other.to_bytes()[..])
    }
}

/// Schoolbook product with the reduction `2^255 = 19` folded in.
///
/// Two odd-indexed limbs multiply to a value one bit above the target limb
/// offset, hence the factor of two.
#[inline(always)]
fn mul_wide(f: &[i32; 10], g: &[i32; 10]) -> [i64; 10] {
    let mut h = [0i64; 10];
    for i in 0..10 {
        let fi = i64::from(f[i]);
        for j in 0..10 {
            let mut term = fi * i64::from(g[j]);
            if i & j & 1 == 1 {
                term *= 2;
            }
            if i + j >= 10 {
                h[i + j - 10] += 19 * term;
            } else {
                h[i + j] += term;
            }
        }
    }
    h
}

/// Reduces wide limbs to the 26/25-bit shape.
#[inline(always)]
fn carry(mut h: [i64; 10]) -> FieldElement {
    #[inline(always)]
    fn step(h: &mut [i64; 10], i: usize) {
        let w = WIDTHS[i];
        let c = (h[i] + (1 << (w - 1))) >> w;
        h[i] -= c << w;
        if i == 9 {
            h[0] += 19 * c;
        } else {
            h[i + 1] += c;
        }
    }

    for i in [0, 4, 1, 5, 2, 6, 3, 7, 4, 8, 9, 0] {
        step(&mut h, i);
    }
    FieldElement(h.map(|x| x as i32))
}

impl Add for FieldElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        FieldElement(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for FieldElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        FieldElement(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl Mul for FieldElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        carry(mul_wide(&self.0, &rhs.0))
    }
}

impl Neg for FieldElement {
    type Output = Self;

    fn neg(self) -> Self {
        FieldElement(self.0.map(|x| -x))
    }
}
