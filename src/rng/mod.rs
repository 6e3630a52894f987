//! Random number generation for key generation.
//!
//! [`Csprng`] implements `rand_core::{RngCore, CryptoRng}`, so it plugs into
//! every `generate` function in the crate. Any other `CryptoRngCore` source,
//! such as `rand_core::OsRng`, works as well.

mod chacha20;
mod csprng;

pub use csprng::Csprng;
