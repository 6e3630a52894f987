//! Short Weierstrass curves: NIST P-256, P-384 and P-521 with ECDSA and
//! ECDH.

mod curve;
mod ecdsa;
mod point;

pub use curve::{EllipticCurve, HashAlgorithm, NISTP256, NISTP384, NISTP521};
pub use ecdsa::{EcdsaKeyPair, EcdsaPublicKey};
pub use point::EcPoint;
