//! Ed25519 signatures (RFC 8032, pure variant).
//!
//! Private keys are 32-byte seeds, public keys are compressed points and
//! signatures are `R || S`. Signing is deterministic: the nonce is derived
//! from the second half of the expanded seed and the message.

mod group;
mod scalar;

use rand_core::CryptoRngCore;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Verification;
use group::GeP3;
use scalar::Scalar;

/// Length of a seed, of a public key, and of each signature half.
pub const ED25519_KEY_LEN: usize = 32;

/// Length of a signature.
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// Stateless entry points for Ed25519.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Ed25519;

impl Ed25519 {
    /// Derives the public key for a seed.
    pub fn public_key(seed: &[u8; 32]) -> [u8; 32] {
        Ed25519KeyPair::from_seed(seed).public
    }

    /// Signs `message` with the key expanded from `seed`.
    pub fn sign(seed: &[u8; 32], message: &[u8]) -> [u8; 64] {
        Ed25519KeyPair::from_seed(seed).sign(message)
    }

    /// Checks `signature` over `message` against `public_key`.
    ///
    /// Returns [`Verification::Malformed`] when the public key does not
    /// decode to a curve point or when `S` is not below the group order.
    pub fn verify(public_key: &[u8; 32], signature: &[u8; 64], message: &[u8]) -> Verification {
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(&signature[32..]);
        if !bool::from(Scalar::is_canonical(&s_bytes)) {
            debug!("ed25519: rejecting signature with non-canonical S");
            return Verification::Malformed("signature scalar is not reduced");
        }

        let Some(a) = GeP3::decompress(public_key) else {
            debug!("ed25519: public key is not a curve point");
            return Verification::Malformed("public key is not a curve point");
        };

        let k = challenge(&signature[..32], public_key, message);
        let r_check = a.neg().double_scalar_mul_vartime(&k, &Scalar(s_bytes)).to_bytes();

        let outcome = Verification::from_choice(r_check[..].ct_eq(&signature[..32]));
        if !outcome.is_valid() {
            debug!("ed25519: signature mismatch");
        }
        outcome
    }

    /// Multiplies a compressed point by a 32-byte little-endian scalar,
    /// used as-is without clamping or reduction. Returns `None` when the
    /// point does not decompress, has small order, or lies outside the
    /// prime-order subgroup.
    pub fn scalar_multiply(scalar: &[u8; 32], point: &[u8; 32]) -> Option<[u8; 32]> {
        let p = GeP3::decompress(point)?;
        if p.is_small_order() || !p.is_torsion_free() {
            debug!("ed25519: point is outside the prime-order subgroup");
            return None;
        }
        Some(p.mul(scalar).to_bytes())
    }

    /// The compressed base point.
    pub fn base_point() -> [u8; 32] {
        GeP3::base_point().to_bytes()
    }
}

/// An expanded Ed25519 signing key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Ed25519KeyPair {
    seed: [u8; 32],
    scalar: [u8; 32],
    prefix: [u8; 32],
    public: [u8; 32],
}

impl Ed25519KeyPair {
    /// Expands a seed: `SHA-512(seed)` split into the clamped secret scalar
    /// and the nonce prefix.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut digest = sha512(&[seed.as_slice()]);

        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&digest[..32]);
        scalar[0] &= 248;
        scalar[31] &= 63;
        scalar[31] |= 64;

        let mut prefix = [0u8; 32];
        prefix.copy_from_slice(&digest[32..]);
        digest.zeroize();

        let public = GeP3::mul_base(&Scalar(scalar)).to_bytes();
        Self {
            seed: *seed,
            scalar,
            prefix,
            public,
        }
    }

    /// Draws a fresh seed from `rng`.
    pub fn generate(rng: &mut impl CryptoRngCore) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let pair = Self::from_seed(&seed);
        seed.zeroize();
        pair
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public
    }

    /// Produces `R || S` with `R = r * B` and `S = r + H(R || A || M) * a`.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let mut wide = sha512(&[self.prefix.as_slice(), message]);
        let r = Scalar::reduce(&wide);
        wide.zeroize();

        let big_r = GeP3::mul_base(&r).to_bytes();
        let k = challenge(&big_r, &self.public, message);
        let s = Scalar::mul_add(&k, &Scalar(self.scalar), &r);

        let mut signature = [0u8; 64];
        signature[..32].copy_from_slice(&big_r);
        signature[32..].copy_from_slice(&s.0);
        signature
    }

    pub fn verify(&self, signature: &[u8; 64], message: &[u8]) -> Verification {
        Ed25519::verify(&self.public, signature, message)
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public", &hex_string(&self.public))
            .finish_non_exhaustive()
    }
}

/// `H(R || A || M) mod L`.
fn challenge(r: &[u8], public_key: &[u8; 32], message: &[u8]) -> Scalar {
    Scalar::reduce(&sha512(&[r, public_key.as_slice(), message]))
}

fn sha512(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_point_encoding() {
        let b = GeP3::base_point().to_bytes();
        assert_eq!(b[0], 0x58);
        assert!(b[1..].iter().all(|&x| x == 0x66));
    }

    #[test]
    fn decompress_round_trips_base_point() {
        let b = GeP3::base_point().to_bytes();
        let p = GeP3::decompress(&b).expect("base point decodes");
        assert_eq!(p.to_bytes(), b);
    }

    #[test]
    fn mul_base_by_one_is_base_point() {
        let mut one = [0u8; 32];
        one[0] = 1;
        assert_eq!(
            GeP3::mul_base(&Scalar(one)).to_bytes(),
            GeP3::base_point().to_bytes()
        );
    }

    #[test]
    fn rejects_x_zero_with_sign_bit() {
        // y = 1 is the identity, x = 0
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        assert!(GeP3::decompress(&bytes).is_some());
        bytes[31] |= 0x80;
        assert!(GeP3::decompress(&bytes).is_none());
    }
}
