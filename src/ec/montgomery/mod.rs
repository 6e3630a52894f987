//! X25519 and X448 (RFC 7748).
//!
//! Both curves share one Montgomery ladder, generic over the field through
//! [`LadderField`]. Scalars and u-coordinates are little-endian byte strings
//! of the curve's key length.

mod x25519;
mod x448;

use std::ops::{Add, Mul, Sub};

use rand_core::CryptoRngCore;
use subtle::{Choice, ConstantTimeEq};
use tracing::{debug, instrument};
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};

/// Field operations the ladder needs. Constant time for every implementor.
pub(crate) trait LadderField:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
    /// `(A - 2) / 4` for the curve coefficient `A`.
    const A24: u32;
    /// Number of scalar bits the ladder walks.
    const BITS: usize;

    fn square(&self) -> Self;
    fn mul_small(&self, k: u32) -> Self;
    fn invert(&self) -> Self;
    fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice);
}

/// The Montgomery ladder from RFC 7748 section 5, returning `u(k * P)`.
fn ladder<F: LadderField>(scalar: &[u8], u: F) -> F {
    let x1 = u;
    let mut x2 = F::ONE;
    let mut z2 = F::ZERO;
    let mut x3 = u;
    let mut z3 = F::ONE;
    let mut swap = Choice::from(0);

    for t in (0..F::BITS).rev() {
        let bit = Choice::from((scalar[t / 8] >> (t % 8)) & 1);
        swap ^= bit;
        F::conditional_swap(&mut x2, &mut x3, swap);
        F::conditional_swap(&mut z2, &mut z3, swap);
        swap = bit;

        let a = x2 + z2;
        let aa = a.square();
        let b = x2 - z2;
        let bb = b.square();
        let e = aa - bb;
        let c = x3 + z3;
        let d = x3 - z3;
        let da = d * a;
        let cb = c * b;

        x3 = (da + cb).square();
        z3 = x1 * (da - cb).square();
        x2 = aa * bb;
        z2 = e * (aa + e.mul_small(F::A24));
    }

    F::conditional_swap(&mut x2, &mut x3, swap);
    F::conditional_swap(&mut z2, &mut z3, swap);
    x2 * z2.invert()
}

/// A Montgomery-form curve used for key agreement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MontgomeryCurve {
    X25519,
    X448,
}

impl MontgomeryCurve {
    /// Looks a curve up by its canonical identifier (`curve25519`,
    /// `curve448`) or its RFC 7748 function name.
    pub fn find_by_name(name: &str) -> Option<Self> {
        match name {
            "curve25519" | "x25519" => Some(MontgomeryCurve::X25519),
            "curve448" | "x448" => Some(MontgomeryCurve::X448),
            _ => None,
        }
    }

    /// The canonical identifier.
    pub fn name(self) -> &'static str {
        match self {
            MontgomeryCurve::X25519 => "curve25519",
            MontgomeryCurve::X448 => "curve448",
        }
    }

    /// Length of scalars, u-coordinates and shared secrets in bytes.
    pub fn key_len(self) -> usize {
        match self {
            MontgomeryCurve::X25519 => 32,
            MontgomeryCurve::X448 => 56,
        }
    }

    /// The u-coordinate of the base point: 9 for X25519, 5 for X448.
    pub fn base_point(self) -> Vec<u8> {
        let mut u = vec![0u8; self.key_len()];
        u[0] = match self {
            MontgomeryCurve::X25519 => 9,
            MontgomeryCurve::X448 => 5,
        };
        u
    }

    /// Applies `decodeScalar`: X25519 clears bits 0 to 2 and 255 and sets
    /// bit 254; X448 clears bits 0 and 1 and sets bit 447.
    pub fn fix_scalar(self, scalar: &mut [u8]) -> Result<()> {
        self.check_len(scalar.len())?;
        match self {
            MontgomeryCurve::X25519 => {
                scalar[0] &= 248;
                scalar[31] &= 127;
                scalar[31] |= 64;
            }
            MontgomeryCurve::X448 => {
                scalar[0] &= 252;
                scalar[55] |= 128;
            }
        }
        Ok(())
    }

    /// Applies `decodeUCoordinate`: X25519 masks the unused top bit, X448
    /// uses all 448 bits. Values at or above `p` are accepted and reduced by
    /// the ladder.
    pub fn fix_u_coordinate(self, u: &mut [u8]) -> Result<()> {
        self.check_len(u.len())?;
        if self == MontgomeryCurve::X25519 {
            u[31] &= 127;
        }
        Ok(())
    }

    /// Computes `u(k * P)` after fixing copies of both inputs.
    #[instrument(level = "debug", skip_all, fields(curve = self.name()))]
    pub fn scalar_multiplication(self, scalar: &[u8], u: &[u8]) -> Result<Vec<u8>> {
        self.check_len(scalar.len())?;
        self.check_len(u.len())?;

        match self {
            MontgomeryCurve::X25519 => {
                let mut k = [0u8; 32];
                let mut point = [0u8; 32];
                k.copy_from_slice(scalar);
                point.copy_from_slice(u);
                self.fix_scalar(&mut k)?;
                self.fix_u_coordinate(&mut point)?;
                let out = x25519::x25519(&k, &point);
                k.zeroize();
                Ok(out.to_vec())
            }
            MontgomeryCurve::X448 => {
                let mut k = [0u8; 56];
                let mut point = [0u8; 56];
                k.copy_from_slice(scalar);
                point.copy_from_slice(u);
                self.fix_scalar(&mut k)?;
                self.fix_u_coordinate(&mut point)?;
                let out = x448::x448(&k, &point);
                k.zeroize();
                Ok(out.to_vec())
            }
        }
    }

    /// Derives the public u-coordinate for a private scalar.
    pub fn public_key(self, private: &[u8]) -> Result<Vec<u8>> {
        self.scalar_multiplication(private, &self.base_point())
    }

    /// Computes the shared secret with a peer's public key.
    ///
    /// An all-zero result means the peer sent a low-order point and is
    /// rejected with [`CryptoError::InvalidPoint`].
    pub fn agree(self, private: &[u8], peer_public: &[u8]) -> Result<Vec<u8>> {
        let mut shared = self.scalar_multiplication(private, peer_public)?;
        let zero = vec![0u8; shared.len()];
        if bool::from(shared.ct_eq(&zero)) {
            shared.zeroize();
            debug!(curve = self.name(), "rejecting all-zero shared secret");
            return Err(CryptoError::InvalidPoint);
        }
        Ok(shared)
    }

    /// Draws a random private scalar. It is fixed on use, so no clamping is
    /// applied here.
    pub fn generate_private(self, rng: &mut impl CryptoRngCore) -> Vec<u8> {
        let mut private = vec![0u8; self.key_len()];
        rng.fill_bytes(&mut private);
        private
    }

    fn check_len(self, len: usize) -> Result<()> {
        if len != self.key_len() {
            return Err(CryptoError::MalformedInput(match self {
                MontgomeryCurve::X25519 => "x25519 values are 32 bytes",
                MontgomeryCurve::X448 => "x448 values are 56 bytes",
            }));
        }
        Ok(())
    }
}
