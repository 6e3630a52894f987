//! Points and group arithmetic on short Weierstrass curves.
//!
//! Scalar multiplication runs in Jacobian coordinates, where `(X, Y, Z)`
//! stands for the affine point `(X / Z^2, Y / Z^3)`, so the only inversion
//! happens when converting the result back.
//!
//! Arithmetic goes through `num-bigint` and is not constant time.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::{debug, instrument};

use super::curve::EllipticCurve;
use crate::bigint::{from_be_bytes, mod_inverse, mod_sub, to_be_bytes_padded};
use crate::error::{CryptoError, Result};

/// An affine point, or the point at infinity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EcPoint {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl EcPoint {
    /// An affine point. Not checked against any curve.
    pub fn new(x: BigUint, y: BigUint) -> Self {
        EcPoint::Affine { x, y }
    }

    /// True for the identity.
    pub fn is_infinity(&self) -> bool {
        matches!(self, EcPoint::Infinity)
    }

    /// The affine `x`, or `None` at infinity.
    pub fn x(&self) -> Option<&BigUint> {
        match self {
            EcPoint::Affine { x, .. } => Some(x),
            EcPoint::Infinity => None,
        }
    }

    /// The affine `y`, or `None` at infinity.
    pub fn y(&self) -> Option<&BigUint> {
        match self {
            EcPoint::Affine { y, .. } => Some(y),
            EcPoint::Infinity => None,
        }
    }
}

struct Jacobian {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl Jacobian {
    fn infinity() -> Self {
        Jacobian {
            x: BigUint::one(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }
}

impl EllipticCurve {
    /// Returns `true` for the point at infinity and for affine points with
    /// both coordinates in `[0, p)` that satisfy the curve equation.
    pub fn contains(&self, point: &EcPoint) -> bool {
        match point {
            EcPoint::Infinity => true,
            EcPoint::Affine { x, y } => {
                if x >= &self.p || y >= &self.p {
                    return false;
                }
                let lhs = y * y % &self.p;
                let rhs = (x * x * x + &self.a * x + &self.b) % &self.p;
                lhs == rhs
            }
        }
    }

    /// `-P`.
    pub fn negate(&self, point: &EcPoint) -> EcPoint {
        match point {
            EcPoint::Infinity => EcPoint::Infinity,
            EcPoint::Affine { x, y } => EcPoint::Affine {
                x: x.clone(),
                y: mod_sub(&BigUint::zero(), &(y % &self.p), &self.p),
            },
        }
    }

    /// `P + Q`.
    pub fn add(&self, p: &EcPoint, q: &EcPoint) -> EcPoint {
        let sum = self.jacobian_add(&self.to_jacobian(p), &self.to_jacobian(q));
        self.to_affine(&sum)
    }

    /// `2P`.
    pub fn double(&self, p: &EcPoint) -> EcPoint {
        let d = self.jacobian_double(&self.to_jacobian(p));
        self.to_affine(&d)
    }

    /// Computes `k * P` by double-and-add from the top bit of `k`.
    ///
    /// With `validate` set, an input or output point that is not on the
    /// curve is reported as [`CryptoError::InvalidPoint`].
    #[instrument(level = "debug", skip_all, fields(curve = self.name, validate))]
    pub fn point_mul(&self, k: &BigUint, point: &EcPoint, validate: bool) -> Result<EcPoint> {
        if validate && !self.contains(point) {
            debug!("point_mul: input point is not on the curve");
            return Err(CryptoError::InvalidPoint);
        }

        let base = self.to_jacobian(point);
        let mut acc = Jacobian::infinity();
        for i in (0..k.bits()).rev() {
            acc = self.jacobian_double(&acc);
            if k.bit(i) {
                acc = self.jacobian_add(&acc, &base);
            }
        }

        let result = self.to_affine(&acc);
        if validate && !self.contains(&result) {
            debug!("point_mul: result left the curve");
            return Err(CryptoError::InvalidPoint);
        }
        Ok(result)
    }

    /// `k * G`.
    pub fn mul_generator(&self, k: &BigUint) -> EcPoint {
        let base = self.to_jacobian(&self.g);
        let mut acc = Jacobian::infinity();
        for i in (0..k.bits()).rev() {
            acc = self.jacobian_double(&acc);
            if k.bit(i) {
                acc = self.jacobian_add(&acc, &base);
            }
        }
        self.to_affine(&acc)
    }

    /// Encodes a point as SEC1 `04 || x || y`; infinity is the single byte
    /// `00`.
    pub fn encode_point(&self, point: &EcPoint) -> Result<Vec<u8>> {
        match point {
            EcPoint::Infinity => Ok(vec![0x00]),
            EcPoint::Affine { x, y } => {
                let mut out = Vec::with_capacity(1 + 2 * self.field_len);
                out.push(0x04);
                out.extend(to_be_bytes_padded(x, self.field_len)?);
                out.extend(to_be_bytes_padded(y, self.field_len)?);
                Ok(out)
            }
        }
    }

    /// Decodes a SEC1 point, uncompressed (`04`) or compressed (`02`/`03`).
    ///
    /// Only the encoding is checked here; callers that take points from a
    /// peer go through [`EcdsaPublicKey::from_sec1`](super::EcdsaPublicKey::from_sec1),
    /// which also validates the point.
    pub fn decode_point(&self, bytes: &[u8]) -> Result<EcPoint> {
        let flen = self.field_len;
        match bytes.first().copied() {
            Some(0x00) if bytes.len() == 1 => Ok(EcPoint::Infinity),
            Some(0x04) if bytes.len() == 1 + 2 * flen => Ok(EcPoint::Affine {
                x: from_be_bytes(&bytes[1..1 + flen]),
                y: from_be_bytes(&bytes[1 + flen..]),
            }),
            Some(tag @ (0x02 | 0x03)) if bytes.len() == 1 + flen => {
                let x = from_be_bytes(&bytes[1..]);
                if x >= self.p {
                    return Err(CryptoError::MalformedInput("x coordinate out of range"));
                }
                let rhs = (&x * &x * &x + &self.a * &x + &self.b) % &self.p;
                // every supported p is 3 mod 4
                let exp = (&self.p + 1u32) >> 2;
                let mut y = rhs.modpow(&exp, &self.p);
                if &y * &y % &self.p != rhs {
                    return Err(CryptoError::InvalidPoint);
                }
                if y.bit(0) != (tag == 0x03) {
                    y = mod_sub(&BigUint::zero(), &y, &self.p);
                }
                Ok(EcPoint::Affine { x, y })
            }
            _ => Err(CryptoError::MalformedInput("bad SEC1 point encoding")),
        }
    }

    fn to_jacobian(&self, point: &EcPoint) -> Jacobian {
        match point {
            EcPoint::Infinity => Jacobian::infinity(),
            EcPoint::Affine { x, y } => Jacobian {
                x: x % &self.p,
                y: y % &self.p,
                z: BigUint::one(),
            },
        }
    }

    fn to_affine(&self, point: &Jacobian) -> EcPoint {
        if point.is_infinity() {
            return EcPoint::Infinity;
        }
        let Some(z_inv) = mod_inverse(&point.z, &self.p) else {
            return EcPoint::Infinity;
        };
        let z_inv2 = &z_inv * &z_inv % &self.p;
        let z_inv3 = &z_inv2 * &z_inv % &self.p;
        EcPoint::Affine {
            x: &point.x * z_inv2 % &self.p,
            y: &point.y * z_inv3 % &self.p,
        }
    }

    fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        a * b % &self.p
    }

    fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        mod_sub(a, b, &self.p)
    }

    fn small(&self, k: u32, a: &BigUint) -> BigUint {
        a * k % &self.p
    }

    /// Doubling for arbitrary `a`:
    /// `alpha = 3X^2 + aZ^4`, `X' = alpha^2 - 8XY^2`,
    /// `Y' = alpha(4XY^2 - X') - 8Y^4`, `Z' = 2YZ`.
    fn jacobian_double(&self, pt: &Jacobian) -> Jacobian {
        if pt.is_infinity() || pt.y.is_zero() {
            return Jacobian::infinity();
        }
        let delta = self.mul(&pt.z, &pt.z);
        let gamma = self.mul(&pt.y, &pt.y);
        let beta = self.mul(&pt.x, &gamma);

        let xx = self.mul(&pt.x, &pt.x);
        let alpha = (self.small(3, &xx) + self.mul(&self.a, &self.mul(&delta, &delta))) % &self.p;

        let x3 = self.sub(&self.mul(&alpha, &alpha), &self.small(8, &beta));
        let y3 = self.sub(
            &self.mul(&alpha, &self.sub(&self.small(4, &beta), &x3)),
            &self.small(8, &self.mul(&gamma, &gamma)),
        );
        let z3 = self.small(2, &self.mul(&pt.y, &pt.z));

        Jacobian {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn jacobian_add(&self, p1: &Jacobian, p2: &Jacobian) -> Jacobian {
        if p1.is_infinity() {
            return Jacobian {
                x: p2.x.clone(),
                y: p2.y.clone(),
                z: p2.z.clone(),
            };
        }
        if p2.is_infinity() {
            return Jacobian {
                x: p1.x.clone(),
                y: p1.y.clone(),
                z: p1.z.clone(),
            };
        }

        let z1_sq = self.mul(&p1.z, &p1.z);
        let z2_sq = self.mul(&p2.z, &p2.z);
        let u1 = self.mul(&p1.x, &z2_sq);
        let u2 = self.mul(&p2.x, &z1_sq);
        let s1 = self.mul(&p1.y, &self.mul(&z2_sq, &p2.z));
        let s2 = self.mul(&p2.y, &self.mul(&z1_sq, &p1.z));

        let h = self.sub(&u2, &u1);
        let r = self.sub(&s2, &s1);

        if h.is_zero() {
            if r.is_zero() {
                return self.jacobian_double(p1);
            }
            return Jacobian::infinity();
        }

        let h_sq = self.mul(&h, &h);
        let h_cu = self.mul(&h_sq, &h);
        let u1_h_sq = self.mul(&u1, &h_sq);

        let x3 = self.sub(
            &self.sub(&self.mul(&r, &r), &h_cu),
            &self.small(2, &u1_h_sq),
        );
        let y3 = self.sub(
            &self.mul(&r, &self.sub(&u1_h_sq, &x3)),
            &self.mul(&s1, &h_cu),
        );
        let z3 = self.mul(&self.mul(&p1.z, &p2.z), &h);

        Jacobian {
            x: x3,
            y: y3,
            z: z3,
        }
    }
}
