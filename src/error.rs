//! Error and verification outcome types.
//!
//! Failures fall into three classes that callers must be able to tell apart:
//!
//! - **Malformed input**: bytes from an untrusted peer or key file that cannot
//!   be decoded. Reported as [`CryptoError::MalformedInput`], [`BerError`] or
//!   [`Verification::Malformed`].
//! - **Verification failure**: a well-formed signature or authentication tag
//!   that does not match. Reported as [`Verification::Invalid`].
//! - **Contract violation**: the caller asked for something the engine does not
//!   support, such as an unsupported key length. Reported at construction time
//!   as a [`CryptoError`]; buffer window misuse panics.

use thiserror::Error;

use crate::ber::BerError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors raised by the primitives engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key length is not supported by the algorithm.
    #[error("{algorithm}: unsupported key length {len}")]
    InvalidKeyLength {
        /// Algorithm name.
        algorithm: &'static str,
        /// Rejected key length in bytes.
        len: usize,
    },

    /// IV or nonce has the wrong size.
    #[error("invalid IV length: expected {expected}, got {actual}")]
    InvalidIvLength {
        /// Required length in bytes.
        expected: usize,
        /// Supplied length in bytes.
        actual: usize,
    },

    /// Authentication tag length outside the supported range.
    #[error("invalid tag length {0}")]
    InvalidTagLength(usize),

    /// The mode requires a different cipher block size.
    #[error("unsupported block size {0}")]
    InvalidBlockSize(usize),

    /// An operation was called out of order, e.g. GCM encryption without a
    /// fresh nonce.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Input could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(&'static str),

    /// Point is not on the curve, is the identity, or lies outside the
    /// prime-order subgroup.
    #[error("invalid curve point")]
    InvalidPoint,

    /// Scalar is zero or not below the group order.
    #[error("invalid scalar")]
    InvalidScalar,

    /// No curve is registered under the given name or OID.
    #[error("unknown curve: {0}")]
    UnknownCurve(String),

    /// Key-file decoding failed.
    #[error(transparent)]
    Ber(#[from] BerError),

    /// The operating system could not provide entropy.
    #[error("entropy source unavailable")]
    Entropy,
}

impl CryptoError {
    /// Returns `true` when the error was caused by untrusted input rather
    /// than by the caller misusing the API.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CryptoError::MalformedInput(_)
                | CryptoError::InvalidPoint
                | CryptoError::InvalidScalar
                | CryptoError::Ber(_)
        )
    }
}

/// Outcome of checking a signature or an authentication tag.
///
/// A mismatch is an expected outcome, not an error, so verifiers return this
/// instead of a `Result`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The signature or tag is authentic.
    Valid,
    /// The input decoded correctly but does not verify.
    Invalid,
    /// The input could not be decoded at all.
    Malformed(&'static str),
}

impl Verification {
    /// Returns `true` only for [`Verification::Valid`].
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }

    pub(crate) fn from_choice(ok: subtle::Choice) -> Self {
        if bool::from(ok) {
            Verification::Valid
        } else {
            Verification::Invalid
        }
    }
}

impl From<Verification> for bool {
    fn from(v: Verification) -> bool {
        v.is_valid()
    }
}
