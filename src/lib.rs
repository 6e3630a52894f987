//! Cryptographic primitives for an SSH implementation.
//!
//! This crate provides the block ciphers, cipher modes, elliptic curve
//! engines and key-file decoding that an SSH transport and key loader sit
//! on. It does not speak the SSH protocol itself; it only supplies the
//! algorithms behind the negotiated names.
//!
//! # Module overview
//!
//! - `cipher`
//!   Blowfish and Rijndael (AES-128/192/256) block cores behind the
//!   [`cipher::BlockCipher`] trait, with offset/length addressing and
//!   in-place variants.
//!
//! - `modes`
//!   ECB, CBC, CTR and GCM over any [`cipher::BlockCipher`]. GCM checks its
//!   tag in constant time and never releases plaintext for a forged
//!   message.
//!
//! - `ec`
//!   Elliptic curves in three families:
//!
//!   - Weierstrass (NIST P-256/384/521): point validation, ECDSA
//!     verification and deterministic signing, ECDH.
//!   - Montgomery (X25519, X448): RFC 7748 scalar multiplication and key
//!     agreement.
//!   - Edwards (Ed25519): RFC 8032 signing and verification.
//!
//!   [`ec::Curve`] resolves a curve name to any family and dispatches
//!   through [`ec::ScalarMultiplication`].
//!
//! - `ber`
//!   A bounds-checked BER/DER reader for private key files. Malformed input
//!   is always an error value, never a panic.
//!
//! - `wire`
//!   SSH `uint32` / `string` / `mpint` encoding for signature blobs.
//!
//! - `rng`
//!   A ChaCha20-based CSPRNG seeded from the operating system.
//!
//! # Errors
//!
//! Constructors and decoders return [`Result`]. Signature and tag checks
//! return [`Verification`], which separates forgeries from input that
//! could not be decoded at all.

pub mod ber;
pub mod cipher;
pub mod ec;
pub mod error;
pub mod modes;
pub mod rng;
pub mod wire;

mod bigint;

pub use error::{CryptoError, Result, Verification};
