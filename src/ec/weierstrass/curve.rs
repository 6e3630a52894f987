//! Domain parameters for the NIST prime curves `y^2 = x^3 + ax + b`.

use num_bigint::BigUint;
use num_traits::Num;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::point::EcPoint;

/// The hash paired with a curve by RFC 5656.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256, for nistp256.
    Sha256,
    /// SHA-384, for nistp384.
    Sha384,
    /// SHA-512, for nistp521.
    Sha512,
}

impl HashAlgorithm {
    /// Digest size in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Hashes `message` in one shot.
    pub fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(message).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(message).to_vec(),
        }
    }
}

/// Immutable parameters of a short Weierstrass curve over a prime field.
#[derive(Debug)]
pub struct EllipticCurve {
    pub(crate) name: &'static str,
    pub(crate) oid: &'static str,
    pub(crate) p: BigUint,
    pub(crate) a: BigUint,
    pub(crate) b: BigUint,
    pub(crate) g: EcPoint,
    pub(crate) n: BigUint,
    pub(crate) h: u32,
    pub(crate) hash: HashAlgorithm,
    pub(crate) field_len: usize,
}

struct CurveHex {
    name: &'static str,
    oid: &'static str,
    p: &'static str,
    b: &'static str,
    gx: &'static str,
    gy: &'static str,
    n: &'static str,
    hash: HashAlgorithm,
}

fn hex(s: &str) -> BigUint {
    // constants below are valid hex
    BigUint::from_str_radix(s, 16).unwrap_or_default()
}

impl EllipticCurve {
    fn from_hex(c: CurveHex) -> Self {
        let p = hex(c.p);
        let a = &p - 3u32;
        let field_len = (p.bits() as usize).div_ceil(8);
        EllipticCurve {
            name: c.name,
            oid: c.oid,
            a,
            b: hex(c.b),
            g: EcPoint::Affine {
                x: hex(c.gx),
                y: hex(c.gy),
            },
            n: hex(c.n),
            h: 1,
            hash: c.hash,
            field_len,
            p,
        }
    }

    /// Looks a curve up by its canonical lowercase identifier.
    pub fn find_by_name(name: &str) -> Option<&'static EllipticCurve> {
        match name {
            "nistp256" => Some(&NISTP256),
            "nistp384" => Some(&NISTP384),
            "nistp521" => Some(&NISTP521),
            _ => None,
        }
    }

    /// Looks a curve up by its dotted named-curve OID.
    pub fn find_by_oid(oid: &str) -> Option<&'static EllipticCurve> {
        [&*NISTP256, &*NISTP384, &*NISTP521]
            .into_iter()
            .find(|c| c.oid == oid)
    }

    /// The SSH curve identifier, e.g. `nistp256`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The named-curve OID in dotted form.
    pub fn oid(&self) -> &'static str {
        self.oid
    }

    /// The field prime.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// The `a` coefficient, `p - 3` for every NIST curve.
    pub fn a(&self) -> &BigUint {
        &self.a
    }

    /// The `b` coefficient.
    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// The base point `G`.
    pub fn generator(&self) -> &EcPoint {
        &self.g
    }

    /// The order of `G`.
    pub fn order(&self) -> &BigUint {
        &self.n
    }

    /// Always 1 for the NIST prime curves.
    pub fn cofactor(&self) -> u32 {
        self.h
    }

    /// The hash ECDSA uses on this curve.
    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Bytes needed for one coordinate.
    pub fn field_len(&self) -> usize {
        self.field_len
    }

    /// Bytes needed for a scalar below `n`.
    pub fn scalar_len(&self) -> usize {
        (self.n.bits() as usize).div_ceil(8)
    }
}

impl PartialEq for EllipticCurve {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
    }
}

impl Eq for EllipticCurve {}

pub static NISTP256: Lazy<EllipticCurve> = Lazy::new(|| {
    EllipticCurve::from_hex(CurveHex {
        name: "nistp256",
        oid: "1.2.840.10045.3.1.7",
        p: "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
        b: "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
        gx: "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
        gy: "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5",
        n: "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
        hash: HashAlgorithm::Sha256,
    })
});

pub static NISTP384: Lazy<EllipticCurve> = Lazy::new(|| {
    EllipticCurve::from_hex(CurveHex {
        name: "nistp384",
        oid: "1.3.132.0.34",
        p: "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe\
            ffffffff0000000000000000ffffffff",
        b: "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875a\
            c656398d8a2ed19d2a85c8edd3ec2aef",
        gx: "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a38\
             5502f25dbf55296c3a545e3872760ab7",
        gy: "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c0\
             0a60b1ce1d7e819d7a431d7c90ea0e5f",
        n: "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf\
            581a0db248b0a77aecec196accc52973",
        hash: HashAlgorithm::Sha384,
    })
});

pub static NISTP521: Lazy<EllipticCurve> = Lazy::new(|| {
    EllipticCurve::from_hex(CurveHex {
        name: "nistp521",
        oid: "1.3.132.0.35",
        p: "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
            ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
            ffff",
        b: "0051953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef1\
            09e156193951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b50\
            3f00",
        gx: "00c6858e06b70404e9cd9e3ecb662395b4429c648139053fb521f828af606b4d\
             3dbaa14b5e77efe75928fe1dc127a2ffa8de3348b3c1856a429bf97e7e31c2e5\
             bd66",
        gy: "011839296a789a3bc0045c8a5fb42c7d1bd998f54449579b446817afbd17273e\
             662c97ee72995ef42640c550b9013fad0761353c7086a272c24088be94769fd1\
             6650",
        n: "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
            fffa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e9138\
            6409",
        hash: HashAlgorithm::Sha512,
    })
});
