//! Edwards25519 group arithmetic: `-x^2 + y^2 = 1 + d x^2 y^2`.
//!
//! ## Coordinate systems
//!
//! - [`GeP3`]: extended `(X : Y : Z : T)` with `T = XY/Z`. Working form.
//! - [`GeP1`]: "completed" `((X : Z), (Y : T))`, the raw output of an
//!   addition or doubling before it is projected back.
//! - [`GeP2`]: projective `(X : Y : Z)`, enough for doubling.
//! - [`GeCached`]: `(Y + X, Y - X, Z, 2dT)`, the right-hand operand of
//!   additions with a point computed at runtime.
//! - [`GePrecomp`]: affine `(y + x, y - x, 2dxy)`, the right-hand operand of
//!   additions with table points.
//!
//! Fixed-base multiplication uses 32 tables of eight multiples, built once
//! on first use, with constant-time selection. Verification uses a
//! variable-time sliding window over public scalars.

use once_cell::sync::Lazy;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::scalar::{L_BYTES, Scalar};
use crate::ec::field25519::{D, D2, FieldElement};

/// Base point `x` coordinate limbs.
const BASE_X: FieldElement = FieldElement([
    52811034, 25909283, 16144682, 17082669, 27570973, 30858332, 40966398, 8378388, 20764389,
    8758491,
]);

/// Base point `y = 4/5` coordinate limbs.
const BASE_Y: FieldElement = FieldElement([
    40265304, 26843545, 13421772, 20132659, 26843545, 6710886, 53687091, 13421772, 40265318,
    26843545,
]);

/// `BASE_TABLE[i][j] = (j + 1) * 256^i * B`.
static BASE_TABLE: Lazy<Box<[[GePrecomp; 8]; 32]>> = Lazy::new(|| {
    let mut table = Box::new([[GePrecomp::IDENTITY; 8]; 32]);
    let mut row_base = GeP3::base_point();
    for row in table.iter_mut() {
        let mut multiple = row_base;
        let cached = GeCached::from_p3(&row_base);
        for entry in row.iter_mut() {
            *entry = GePrecomp::from_p3(&multiple);
            multiple = GeP3::from_p1(&GeP1::from_sum(&multiple, &cached));
        }
        for _ in 0..8 {
            row_base = GeP3::from_p1(&row_base.double());
        }
    }
    table
});

/// Odd multiples `B, 3B, ..., 15B` for the sliding window.
static BASE_ODD_MULTIPLES: Lazy<[GePrecomp; 8]> = Lazy::new(|| {
    let b = GeP3::base_point();
    let two_b = GeCached::from_p3(&GeP3::from_p1(&b.double()));
    let mut table = [GePrecomp::IDENTITY; 8];
    let mut current = b;
    for entry in table.iter_mut() {
        *entry = GePrecomp::from_p3(&current);
        current = GeP3::from_p1(&GeP1::from_sum(&current, &two_b));
    }
    table
});

pub(crate) struct GeP1 {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
    t: FieldElement,
}

impl GeP1 {
    pub(crate) fn from_sum(a: &GeP3, b: &GeCached) -> Self {
        let ypx = a.y + a.x;
        let ymx = a.y - a.x;
        let pp = ypx * b.y_plus_x;
        let mm = ymx * b.y_minus_x;
        let tt2d = b.t2d * a.t;
        let zz = a.z * b.z;
        let zz2 = zz + zz;
        GeP1 {
            x: pp - mm,
            y: pp + mm,
            z: zz2 + tt2d,
            t: zz2 - tt2d,
        }
    }

    pub(crate) fn from_difference(a: &GeP3, b: &GeCached) -> Self {
        let ypx = a.y + a.x;
        let ymx = a.y - a.x;
        let pm = ypx * b.y_minus_x;
        let mp = ymx * b.y_plus_x;
        let tt2d = b.t2d * a.t;
        let zz = a.z * b.z;
        let zz2 = zz + zz;
        GeP1 {
            x: pm - mp,
            y: pm + mp,
            z: zz2 - tt2d,
            t: zz2 + tt2d,
        }
    }

    pub(crate) fn from_mixed_sum(a: &GeP3, b: &GePrecomp) -> Self {
        let ypx = a.y + a.x;
        let ymx = a.y - a.x;
        let pp = ypx * b.y_plus_x;
        let mm = ymx * b.y_minus_x;
        let txy2d = b.xy2d * a.t;
        let z2 = a.z + a.z;
        GeP1 {
            x: pp - mm,
            y: pp + mm,
            z: z2 + txy2d,
            t: z2 - txy2d,
        }
    }

    pub(crate) fn from_mixed_difference(a: &GeP3, b: &GePrecomp) -> Self {
        let ypx = a.y + a.x;
        let ymx = a.y - a.x;
        let pm = ypx * b.y_minus_x;
        let mp = ymx * b.y_plus_x;
        let txy2d = b.xy2d * a.t;
        let z2 = a.z + a.z;
        GeP1 {
            x: pm - mp,
            y: pm + mp,
            z: z2 - txy2d,
            t: z2 + txy2d,
        }
    }
}

pub(crate) struct GeP2 {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl GeP2 {
    const IDENTITY: Self = GeP2 {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ONE,
    };

    fn from_p1(p: &GeP1) -> Self {
        GeP2 {
            x: p.x * p.t,
            y: p.y * p.z,
            z: p.z * p.t,
        }
    }

    fn double(&self) -> GeP1 {
        let xx = self.x.square();
        let yy = self.y.square();
        let zz2 = self.z.double_square();
        let xy = self.x + self.y;
        let xy_sq = xy.square();
        let y = yy + xx;
        let z = yy - xx;
        GeP1 {
            x: xy_sq - y,
            y,
            z,
            t: zz2 - z,
        }
    }

    pub(crate) fn to_bytes(&self) -> [u8; 32] {
        encode(&self.x, &self.y, &self.z)
    }
}

/// A curve point in extended coordinates.
#[derive(Clone, Copy)]
pub(crate) struct GeP3 {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
    t: FieldElement,
}

impl GeP3 {
    pub(crate) const IDENTITY: Self = GeP3 {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ONE,
        t: FieldElement::ZERO,
    };

    pub(crate) fn base_point() -> Self {
        GeP3 {
            x: BASE_X,
            y: BASE_Y,
            z: FieldElement::ONE,
            t: BASE_X * BASE_Y,
        }
    }

    fn from_p1(p: &GeP1) -> Self {
        GeP3 {
            x: p.x * p.t,
            y: p.y * p.z,
            z: p.z * p.t,
            t: p.x * p.y,
        }
    }

    fn double(&self) -> GeP1 {
        GeP2 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
        .double()
    }

    pub(crate) fn neg(&self) -> Self {
        GeP3 {
            x: -self.x,
            y: self.y,
            z: self.z,
            t: -self.t,
        }
    }

    pub(crate) fn to_bytes(&self) -> [u8; 32] {
        encode(&self.x, &self.y, &self.z)
    }

    /// Decodes a compressed point.
    ///
    /// Rejects a `y` at or above `p`, a `y` with no matching `x`, and the
    /// encoding of `x = 0` with the sign bit set.
    pub(crate) fn decompress(bytes: &[u8; 32]) -> Option<Self> {
        let sign = Choice::from(bytes[31] >> 7);
        let mut y_bytes = *bytes;
        y_bytes[31] &= 0x7f;

        let y = FieldElement::from_bytes(&y_bytes);
        if y.to_bytes() != y_bytes {
            return None;
        }

        let yy = y.square();
        let u = yy - FieldElement::ONE;
        let v = yy * D + FieldElement::ONE;
        let (is_square, mut x) = FieldElement::sqrt_ratio(&u, &v);
        if !bool::from(is_square) {
            return None;
        }
        if bool::from(x.is_zero() & sign) {
            return None;
        }

        let flip = x.is_negative() ^ sign;
        x.conditional_assign(&(-x), flip);

        Some(GeP3 {
            x,
            y,
            z: FieldElement::ONE,
            t: x * y,
        })
    }

    /// Constant-time `a * B` for a scalar whose top bit is clear.
    pub(crate) fn mul_base(a: &Scalar) -> Self {
        let e = a.radix16();
        let table = &*BASE_TABLE;

        let mut h = GeP3::IDENTITY;
        for i in (1..64).step_by(2) {
            let t = GePrecomp::select(&table[i / 2], e[i]);
            h = GeP3::from_p1(&GeP1::from_mixed_sum(&h, &t));
        }

        let mut r = GeP2::from_p1(&h.double());
        for _ in 0..2 {
            r = GeP2::from_p1(&r.double());
        }
        h = GeP3::from_p1(&r.double());

        for i in (0..64).step_by(2) {
            let t = GePrecomp::select(&table[i / 2], e[i]);
            h = GeP3::from_p1(&GeP1::from_mixed_sum(&h, &t));
        }
        h
    }

    fn is_identity(&self) -> bool {
        self.to_bytes() == GeP3::IDENTITY.to_bytes()
    }

    /// True when `8 * self` is the identity, which includes the identity
    /// itself.
    pub(crate) fn is_small_order(&self) -> bool {
        let mut p = *self;
        for _ in 0..3 {
            p = GeP3::from_p1(&p.double());
        }
        p.is_identity()
    }

    /// True when `L * self` is the identity, i.e. the point lies in the
    /// prime-order subgroup.
    pub(crate) fn is_torsion_free(&self) -> bool {
        self.mul(&L_BYTES).is_identity()
    }

    /// Constant-time `k * self` for any 256-bit little-endian `k`.
    pub(crate) fn mul(&self, k: &[u8; 32]) -> Self {
        let cached = GeCached::from_p3(self);
        let mut r = GeP3::IDENTITY;
        for i in (0..256).rev() {
            r = GeP3::from_p1(&r.double());
            let sum = GeP3::from_p1(&GeP1::from_sum(&r, &cached));
            r.conditional_assign(&sum, Choice::from((k[i / 8] >> (i % 8)) & 1));
        }
        r
    }

    /// Variable-time `a * self + b * B`. Only for public inputs.
    pub(crate) fn double_scalar_mul_vartime(&self, a: &Scalar, b: &Scalar) -> GeP2 {
        let a_slide = a.slide();
        let b_slide = b.slide();
        let b_table = &*BASE_ODD_MULTIPLES;

        let mut a_table = [GeCached::from_p3(self); 8];
        let self2 = GeP3::from_p1(&self.double());
        for j in 1..8 {
            let t = GeP1::from_sum(&self2, &a_table[j - 1]);
            a_table[j] = GeCached::from_p3(&GeP3::from_p1(&t));
        }

        let top = (0..256)
            .rev()
            .find(|&i| a_slide[i] != 0 || b_slide[i] != 0);
        let Some(top) = top else {
            return GeP2::IDENTITY;
        };

        let mut r = GeP2::IDENTITY;
        for i in (0..=top).rev() {
            let mut t = r.double();

            let ai = a_slide[i];
            if ai > 0 {
                t = GeP1::from_sum(&GeP3::from_p1(&t), &a_table[(ai / 2) as usize]);
            } else if ai < 0 {
                t = GeP1::from_difference(&GeP3::from_p1(&t), &a_table[(-ai / 2) as usize]);
            }

            let bi = b_slide[i];
            if bi > 0 {
                t = GeP1::from_mixed_sum(&GeP3::from_p1(&t), &b_table[(bi / 2) as usize]);
            } else if bi < 0 {
                t = GeP1::from_mixed_difference(&GeP3::from_p1(&t), &b_table[(-bi / 2) as usize]);
            }

            r = GeP2::from_p1(&t);
        }
        r
    }
}

impl ConditionallySelectable for GeP3 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        GeP3 {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
            t: FieldElement::conditional_select(&a.t, &b.t, choice),
        }
    }
}

fn encode(x: &FieldElement, y: &FieldElement, z: &FieldElement) -> [u8; 32] {
    let recip = z.invert();
    let x = *x * recip;
    let y = *y * recip;
    let mut out = y.to_bytes();
    out[31] ^= x.is_negative().unwrap_u8() << 7;
    out
}

#[derive(Clone, Copy)]
pub(crate) struct GeCached {
    y_plus_x: FieldElement,
    y_minus_x: FieldElement,
    z: FieldElement,
    t2d: FieldElement,
}

impl GeCached {
    fn from_p3(p: &GeP3) -> Self {
        GeCached {
            y_plus_x: p.y + p.x,
            y_minus_x: p.y - p.x,
            z: p.z,
            t2d: p.t * D2,
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct GePrecomp {
    y_plus_x: FieldElement,
    y_minus_x: FieldElement,
    xy2d: FieldElement,
}

impl GePrecomp {
    const IDENTITY: Self = GePrecomp {
        y_plus_x: FieldElement::ONE,
        y_minus_x: FieldElement::ONE,
        xy2d: FieldElement::ZERO,
    };

    /// Normalises to affine form. Used only while building tables.
    fn from_p3(p: &GeP3) -> Self {
        let recip = p.z.invert();
        let x = p.x * recip;
        let y = p.y * recip;
        GePrecomp {
            y_plus_x: y + x,
            y_minus_x: y - x,
            xy2d: x * y * D2,
        }
    }

    fn neg(&self) -> Self {
        GePrecomp {
            y_plus_x: self.y_minus_x,
            y_minus_x: self.y_plus_x,
            xy2d: -self.xy2d,
        }
    }

    /// Returns `digit * row[0]` for `digit` in `[-8, 8]` without branching
    /// on or indexing by the digit.
    fn select(row: &[GePrecomp; 8], digit: i8) -> Self {
        let negative = Choice::from(((digit as u8) >> 7) & 1);
        let abs = (digit as i16).unsigned_abs() as u8;

        let mut t = GePrecomp::IDENTITY;
        for (j, entry) in row.iter().enumerate() {
            t.conditional_assign(entry, abs.ct_eq(&(j as u8 + 1)));
        }
        let minus_t = t.neg();
        t.conditional_assign(&minus_t, negative);
        t
    }
}

impl ConditionallySelectable for GePrecomp {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        GePrecomp {
            y_plus_x: FieldElement::conditional_select(&a.y_plus_x, &b.y_plus_x, choice),
            y_minus_x: FieldElement::conditional_select(&a.y_minus_x, &b.y_minus_x, choice),
            xy2d: FieldElement::conditional_select(&a.xy2d, &b.xy2d, choice),
        }
    }
}
