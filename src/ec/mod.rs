//! Elliptic curve engines.
//!
//! Three families are supported, each with its own point encoding:
//!
//! | Family       | Curves                  | Scalar           | Point             |
//! |--------------|-------------------------|------------------|-------------------|
//! | Weierstrass  | nistp256/384/521        | big-endian       | SEC1              |
//! | Montgomery   | curve25519, curve448    | little-endian    | u-coordinate      |
//! | Edwards      | ed25519                 | little-endian    | compressed y      |
//!
//! [`Curve`] ties them together behind [`ScalarMultiplication`].

mod field25519;
pub mod edwards;
pub mod montgomery;
pub mod weierstrass;

use num_bigint::BigUint;
use tracing::debug;

use crate::error::{CryptoError, Result};
use edwards::Ed25519;
use montgomery::MontgomeryCurve;
use weierstrass::{EcdsaPublicKey, EllipticCurve};

/// Scalar multiplication over encoded scalars and points.
pub trait ScalarMultiplication {
    /// Canonical lowercase curve identifier.
    fn name(&self) -> &'static str;

    /// Encoding of the curve's base point.
    fn base_point(&self) -> Vec<u8>;

    /// Computes `scalar * point`. Points supplied here are treated as
    /// untrusted and validated.
    fn scalar_multiply(&self, scalar: &[u8], point: &[u8]) -> Result<Vec<u8>>;
}

impl ScalarMultiplication for &'static EllipticCurve {
    fn name(&self) -> &'static str {
        EllipticCurve::name(self)
    }

    fn base_point(&self) -> Vec<u8> {
        self.encode_point(self.generator()).unwrap_or_default()
    }

    /// The scalar is big-endian and must lie in `[1, n-1]`; the point is
    /// SEC1. The result is the uncompressed SEC1 encoding.
    fn scalar_multiply(&self, scalar: &[u8], point: &[u8]) -> Result<Vec<u8>> {
        let k = BigUint::from_bytes_be(scalar);
        if k.bits() == 0 || &k >= self.order() {
            return Err(CryptoError::InvalidScalar);
        }
        let peer = EcdsaPublicKey::from_sec1(*self, point)?;
        let product = self.point_mul(&k, peer.point(), true)?;
        self.encode_point(&product)
    }
}

impl ScalarMultiplication for MontgomeryCurve {
    fn name(&self) -> &'static str {
        MontgomeryCurve::name(*self)
    }

    fn base_point(&self) -> Vec<u8> {
        MontgomeryCurve::base_point(*self)
    }

    /// RFC 7748 `X25519` / `X448`: the scalar is clamped and the
    /// u-coordinate masked before the ladder runs.
    fn scalar_multiply(&self, scalar: &[u8], point: &[u8]) -> Result<Vec<u8>> {
        self.scalar_multiplication(scalar, point)
    }
}

impl ScalarMultiplication for Ed25519 {
    fn name(&self) -> &'static str {
        "ed25519"
    }

    fn base_point(&self) -> Vec<u8> {
        Ed25519::base_point().to_vec()
    }

    /// The scalar is 32 little-endian bytes used as-is; the point is a
    /// compressed Edwards point.
    fn scalar_multiply(&self, scalar: &[u8], point: &[u8]) -> Result<Vec<u8>> {
        let scalar: &[u8; 32] = scalar
            .try_into()
            .map_err(|_| CryptoError::MalformedInput("ed25519 scalar must be 32 bytes"))?;
        let point: &[u8; 32] = point
            .try_into()
            .map_err(|_| CryptoError::MalformedInput("ed25519 point must be 32 bytes"))?;
        Ed25519::scalar_multiply(scalar, point)
            .map(|p| p.to_vec())
            .ok_or(CryptoError::InvalidPoint)
    }
}

/// A curve from any of the supported families.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// nistp256, nistp384 or nistp521.
    Weierstrass(&'static EllipticCurve),
    /// curve25519 or curve448 in Montgomery form.
    Montgomery(MontgomeryCurve),
    /// edwards25519.
    Edwards(Ed25519),
}

impl Curve {
    /// Resolves a curve identifier across all families.
    pub fn find_by_name(name: &str) -> Result<Curve> {
        if let Some(curve) = EllipticCurve::find_by_name(name) {
            return Ok(Curve::Weierstrass(curve));
        }
        if let Some(curve) = MontgomeryCurve::find_by_name(name) {
            return Ok(Curve::Montgomery(curve));
        }
        if name == "ed25519" {
            return Ok(Curve::Edwards(Ed25519));
        }
        debug!(name, "unknown curve name");
        Err(CryptoError::UnknownCurve(name.to_owned()))
    }

    fn engine(&self) -> &dyn ScalarMultiplication {
        match self {
            Curve::Weierstrass(c) => c,
            Curve::Montgomery(c) => c,
            Curve::Edwards(c) => c,
        }
    }
}

impl ScalarMultiplication for Curve {
    fn name(&self) -> &'static str {
        self.engine().name()
    }

    fn base_point(&self) -> Vec<u8> {
        self.engine().base_point()
    }

    fn scalar_multiply(&self, scalar: &[u8], point: &[u8]) -> Result<Vec<u8>> {
        self.engine().scalar_multiply(scalar, point)
    }
}
