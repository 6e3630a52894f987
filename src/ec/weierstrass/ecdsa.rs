//! ECDSA over the NIST curves with SSH signature blobs.
//!
//! Signatures travel as `mpint r || mpint s` (RFC 5656 section 3.1.2).
//! Signing derives its nonce deterministically (RFC 6979), so it needs no
//! random source.

use std::marker::PhantomData;

use hmac::digest::core_api::BlockSizeUser;
use hmac::{Mac, SimpleHmac};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256, Sha384, Sha512};
use tracing::{debug, instrument};

use super::curve::{EllipticCurve, HashAlgorithm};
use super::point::EcPoint;
use crate::ber::BerReader;
use crate::bigint::{from_be_bytes, mod_inverse, to_be_bytes_padded};
use crate::error::{CryptoError, Result, Verification};
use crate::wire::{SshReader, SshWriter};

/// A public key `Q` on a named curve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaPublicKey {
    curve: &'static EllipticCurve,
    q: EcPoint,
}

impl EcdsaPublicKey {
    /// Wraps a point without validating it. See [`EcdsaPublicKey::is_valid`].
    pub fn new(curve: &'static EllipticCurve, q: EcPoint) -> Self {
        Self { curve, q }
    }

    /// Decodes a SEC1 point and rejects it unless [`is_valid`](Self::is_valid)
    /// holds.
    pub fn from_sec1(curve: &'static EllipticCurve, bytes: &[u8]) -> Result<Self> {
        let key = Self::new(curve, curve.decode_point(bytes)?);
        if !key.is_valid() {
            return Err(CryptoError::InvalidPoint);
        }
        Ok(key)
    }

    /// Uncompressed SEC1 encoding, as carried in SSH public key blobs.
    pub fn to_sec1(&self) -> Result<Vec<u8>> {
        self.curve.encode_point(&self.q)
    }

    pub fn curve(&self) -> &'static EllipticCurve {
        self.curve
    }

    pub fn point(&self) -> &EcPoint {
        &self.q
    }

    /// Full public key validation: `Q` is not infinity, its coordinates lie
    /// in `[0, p)`, it satisfies the curve equation, and `n * Q = O`.
    #[instrument(level = "debug", skip_all, fields(curve = self.curve.name))]
    pub fn is_valid(&self) -> bool {
        if self.q.is_infinity() || !self.curve.contains(&self.q) {
            debug!("public key is infinity or off the curve");
            return false;
        }
        match self.curve.point_mul(&self.curve.n, &self.q, false) {
            Ok(p) if p.is_infinity() => true,
            _ => {
                debug!("public key is outside the prime-order subgroup");
                false
            }
        }
    }

    /// Verifies an SSH signature blob over `message`, hashing with the
    /// curve's hash.
    pub fn verify(&self, signature: &[u8], message: &[u8]) -> Verification {
        match parse_signature_blob(signature) {
            Ok((r, s)) => self.verify_components(&r, &s, message),
            Err(err) => {
                debug!(error = %err, "ecdsa: undecodable signature blob");
                Verification::Malformed("signature blob")
            }
        }
    }

    /// Verifies `(r, s)` over `message`.
    pub fn verify_components(&self, r: &BigUint, s: &BigUint, message: &[u8]) -> Verification {
        self.verify_digest(r, s, &self.curve.hash.digest(message))
    }

    /// Verifies `(r, s)` over a precomputed digest.
    #[instrument(level = "debug", skip_all, fields(curve = self.curve.name))]
    pub fn verify_digest(&self, r: &BigUint, s: &BigUint, digest: &[u8]) -> Verification {
        let curve = self.curve;
        let n = &curve.n;

        if self.q.is_infinity() || !curve.contains(&self.q) {
            debug!("ecdsa: public key is not a curve point");
            return Verification::Malformed("public key is not a curve point");
        }
        if r.is_zero() || s.is_zero() || r >= n || s >= n {
            debug!("ecdsa: r or s outside [1, n-1]");
            return Verification::Malformed("signature component out of range");
        }

        let e = bits2int(digest, n.bits() as usize) % n;
        let Some(w) = mod_inverse(s, n) else {
            return Verification::Invalid;
        };
        let u1 = &e * &w % n;
        let u2 = r * &w % n;

        let p1 = curve.mul_generator(&u1);
        let Ok(p2) = curve.point_mul(&u2, &self.q, false) else {
            return Verification::Invalid;
        };
        let sum = curve.add(&p1, &p2);

        let outcome = match sum.x() {
            Some(x) if &(x % n) == r => Verification::Valid,
            _ => Verification::Invalid,
        };
        if !outcome.is_valid() {
            debug!("ecdsa: signature mismatch");
        }
        outcome
    }
}

/// A private scalar `d` with its public point `Q`.
#[derive(Clone)]
pub struct EcdsaKeyPair {
    d: BigUint,
    public: EcdsaPublicKey,
}

impl EcdsaKeyPair {
    /// Pairs a private scalar with a public point as given. Use
    /// [`check_key_consistency`](Self::check_key_consistency) to confirm
    /// `Q = d * G`.
    pub fn new(curve: &'static EllipticCurve, d: BigUint, q: EcPoint) -> Result<Self> {
        check_scalar(curve, &d)?;
        Ok(Self {
            d,
            public: EcdsaPublicKey::new(curve, q),
        })
    }

    /// Derives `Q = d * G`.
    #[instrument(level = "debug", skip_all, fields(curve = curve.name))]
    pub fn from_private(curve: &'static EllipticCurve, d: BigUint) -> Result<Self> {
        check_scalar(curve, &d)?;
        let q = curve.mul_generator(&d);
        Ok(Self {
            d,
            public: EcdsaPublicKey::new(curve, q),
        })
    }

    /// Draws `d` uniformly from `[1, n-1]` by rejection sampling.
    pub fn generate(curve: &'static EllipticCurve, rng: &mut impl CryptoRngCore) -> Self {
        let n = &curve.n;
        let len = curve.scalar_len();
        let excess_bits = len * 8 - n.bits() as usize;
        let mut buf = vec![0u8; len];
        loop {
            rng.fill_bytes(&mut buf);
            buf[0] &= 0xff >> excess_bits;
            let d = from_be_bytes(&buf);
            if !d.is_zero() && &d < n {
                buf.fill(0);
                let q = curve.mul_generator(&d);
                return Self {
                    d,
                    public: EcdsaPublicKey::new(curve, q),
                };
            }
        }
    }

    /// Parses an RFC 5915 `ECPrivateKey`:
    ///
    /// ```text
    /// ECPrivateKey ::= SEQUENCE {
    ///   version        INTEGER { ecPrivkeyVer1(1) },
    ///   privateKey     OCTET STRING,
    ///   parameters [0] ECParameters {{ NamedCurve }} OPTIONAL,
    ///   publicKey  [1] BIT STRING OPTIONAL
    /// }
    /// ```
    ///
    /// The named-curve parameters are required. When the public key is
    /// present it must match `d * G`.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let mut outer = BerReader::new(der);
        let mut seq = outer.read_sequence()?;
        if !outer.is_empty() {
            return Err(CryptoError::MalformedInput("trailing data after ECPrivateKey"));
        }

        if seq.read_unsigned_integer()? != BigUint::one() {
            return Err(CryptoError::MalformedInput("unsupported ECPrivateKey version"));
        }
        let d = from_be_bytes(seq.read_octet_string()?);

        if !seq.peek_context_specific(0) {
            return Err(CryptoError::MalformedInput("ECPrivateKey without curve parameters"));
        }
        let oid = seq.read_context_specific(0)?.read_object_identifier()?;
        let curve =
            EllipticCurve::find_by_oid(&oid).ok_or_else(|| CryptoError::UnknownCurve(oid))?;

        let pair = Self::from_private(curve, d)?;

        if seq.peek_context_specific(1) {
            let bits = seq.read_context_specific(1)?.read_bit_string()?;
            if bits.unused_bits != 0 {
                return Err(CryptoError::MalformedInput("public key bit string"));
            }
            let q = curve.decode_point(bits.bytes)?;
            if q != pair.public.q {
                return Err(CryptoError::MalformedInput("public key does not match private key"));
            }
        }
        Ok(pair)
    }

    pub fn curve(&self) -> &'static EllipticCurve {
        self.public.curve
    }

    pub fn public_key(&self) -> &EcdsaPublicKey {
        &self.public
    }

    pub fn private_scalar(&self) -> &BigUint {
        &self.d
    }

    /// Recomputes `d * G` and compares it with the stored public point.
    pub fn check_key_consistency(&self) -> bool {
        let curve = self.public.curve;
        let consistent = curve.mul_generator(&self.d) == self.public.q;
        if !consistent {
            debug!(curve = curve.name, "key pair public point does not match d * G");
        }
        consistent
    }

    /// Signs `message` and returns the SSH signature blob.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let digest = self.public.curve.hash.digest(message);
        let (r, s) = self.sign_digest(&digest)?;
        let mut blob = SshWriter::new();
        blob.write_mpint(&r).write_mpint(&s);
        Ok(blob.into_vec())
    }

    /// Signs a precomputed digest, returning `(r, s)`.
    #[instrument(level = "debug", skip_all, fields(curve = self.public.curve.name))]
    pub fn sign_digest(&self, digest: &[u8]) -> Result<(BigUint, BigUint)> {
        match self.public.curve.hash {
            HashAlgorithm::Sha256 => self.sign_with::<Sha256>(digest),
            HashAlgorithm::Sha384 => self.sign_with::<Sha384>(digest),
            HashAlgorithm::Sha512 => self.sign_with::<Sha512>(digest),
        }
    }

    /// Computes the ECDH shared secret: the x coordinate of `d * Q_peer`,
    /// padded to the field length. The peer key is always validated.
    pub fn agree(&self, peer: &EcdsaPublicKey) -> Result<Vec<u8>> {
        let curve = self.public.curve;
        if peer.curve != curve || !peer.is_valid() {
            return Err(CryptoError::InvalidPoint);
        }
        let shared = curve.point_mul(&self.d, &peer.q, true)?;
        let x = shared.x().ok_or(CryptoError::InvalidPoint)?;
        to_be_bytes_padded(x, curve.field_len)
    }

    fn sign_with<D>(&self, digest: &[u8]) -> Result<(BigUint, BigUint)>
    where
        D: Digest + BlockSizeUser + Clone,
    {
        let curve = self.public.curve;
        let n = &curve.n;
        let e = bits2int(digest, n.bits() as usize) % n;
        let mut nonces = NonceGenerator::<D>::new(curve, &self.d, digest)?;

        loop {
            let k = nonces.next_nonce()?;
            let Some(x) = curve.mul_generator(&k).x().cloned() else {
                continue;
            };
            let r = x % n;
            if r.is_zero() {
                continue;
            }
            let Some(k_inv) = mod_inverse(&k, n) else {
                continue;
            };
            let s = k_inv * ((&e + &r * &self.d) % n) % n;
            if s.is_zero() {
                continue;
            }
            return Ok((r, s));
        }
    }
}

impl std::fmt::Debug for EcdsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaKeyPair")
            .field("curve", &self.public.curve.name)
            .field("public", &self.public.q)
            .finish_non_exhaustive()
    }
}

fn parse_signature_blob(blob: &[u8]) -> Result<(BigUint, BigUint)> {
    let mut reader = SshReader::new(blob);
    let r = reader.read_mpint()?;
    let s = reader.read_mpint()?;
    reader.finish()?;
    Ok((r, s))
}

fn check_scalar(curve: &EllipticCurve, d: &BigUint) -> Result<()> {
    if d.is_zero() || d >= &curve.n {
        return Err(CryptoError::InvalidScalar);
    }
    Ok(())
}

/// The leftmost `qlen` bits of `bytes` as an integer.
fn bits2int(bytes: &[u8], qlen: usize) -> BigUint {
    let x = from_be_bytes(bytes);
    let blen = bytes.len() * 8;
    if blen > qlen { x >> (blen - qlen) } else { x }
}

/// The HMAC-DRBG nonce sequence from RFC 6979 section 3.2.
struct NonceGenerator<D> {
    k: Vec<u8>,
    v: Vec<u8>,
    n: BigUint,
    qlen: usize,
    started: bool,
    _digest: PhantomData<D>,
}

impl<D> NonceGenerator<D>
where
    D: Digest + BlockSizeUser + Clone,
{
    fn new(curve: &EllipticCurve, d: &BigUint, digest: &[u8]) -> Result<Self> {
        let n = curve.n.clone();
        let qlen = n.bits() as usize;
        let rlen = curve.scalar_len();
        let hlen = <D as Digest>::output_size();

        let x = to_be_bytes_padded(d, rlen)?;
        let h1 = to_be_bytes_padded(&(bits2int(digest, qlen) % &n), rlen)?;

        let mut v = vec![0x01u8; hlen];
        let mut k = vec![0x00u8; hlen];
        k = hmac::<D>(&k, &[v.as_slice(), &[0x00], x.as_slice(), h1.as_slice()])?;
        v = hmac::<D>(&k, &[v.as_slice()])?;
        k = hmac::<D>(&k, &[v.as_slice(), &[0x01], x.as_slice(), h1.as_slice()])?;
        v = hmac::<D>(&k, &[v.as_slice()])?;

        Ok(Self {
            k,
            v,
            n,
            qlen,
            started: false,
            _digest: PhantomData,
        })
    }

    fn next_nonce(&mut self) -> Result<BigUint> {
        loop {
            if self.started {
                self.k = hmac::<D>(&self.k, &[self.v.as_slice(), &[0x00]])?;
                self.v = hmac::<D>(&self.k, &[self.v.as_slice()])?;
            }
            self.started = true;

            let mut t = Vec::with_capacity(self.qlen.div_ceil(8));
            while t.len() * 8 < self.qlen {
                self.v = hmac::<D>(&self.k, &[self.v.as_slice()])?;
                t.extend_from_slice(&self.v);
            }
            let k = bits2int(&t, self.qlen);
            if !k.is_zero() && k < self.n {
                return Ok(k);
            }
        }
    }
}

fn hmac<D>(key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>>
where
    D: Digest + BlockSizeUser + Clone,
{
    let mut mac = <SimpleHmac<D> as Mac>::new_from_slice(key)
        .map_err(|_| CryptoError::InvalidState("hmac rejected key"))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}
