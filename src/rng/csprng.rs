//! ChaCha20-based CSPRNG.
//!
//! The generator is seeded once from the operating system (or from a caller
//! seed in tests) and then expands ChaCha20 keystream. After every request
//! it replaces its key with fresh keystream, so a later state compromise
//! does not reveal earlier output.

use rand_core::{CryptoRng, RngCore};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::chacha20::block;
use crate::error::{CryptoError, Result};

/// Cryptographically secure pseudorandom number generator.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Csprng {
    key: [u8; 32],
    /// Fixed to zero; uniqueness comes from the counter and rekeying.
    nonce: [u8; 12],
    counter: u32,
}

impl Csprng {
    /// Seeds a generator from the operating system.
    pub fn from_os() -> Result<Self> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).map_err(|err| {
            debug!(error = %err, "operating system entropy unavailable");
            CryptoError::Entropy
        })?;
        Ok(Self::from_seed(seed))
    }

    /// Seeds a generator from caller-supplied bytes, which must be uniformly
    /// random and secret. The same seed always yields the same stream.
    pub fn from_seed(mut seed: [u8; 32]) -> Self {
        let key = seed;
        seed.zeroize();
        Self {
            key,
            nonce: [0u8; 12],
            counter: 0,
        }
    }

    /// Fills `out` with keystream, then rekeys.
    pub fn fill(&mut self, out: &mut [u8]) {
        for chunk in out.chunks_mut(64) {
            let mut ks = block(&self.key, self.counter, &self.nonce);
            self.counter = self.counter.wrapping_add(1);
            chunk.copy_from_slice(&ks[..chunk.len()]);
            ks.zeroize();
        }
        self.rekey();
    }

    fn rekey(&mut self) {
        let mut ks = block(&self.key, self.counter, &self.nonce);
        self.counter = self.counter.wrapping_add(1);
        self.key.copy_from_slice(&ks[..32]);
        ks.zeroize();
    }
}

impl RngCore for Csprng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
        self.fill(dest);
        Ok(())
    }
}

impl CryptoRng for Csprng {}

impl std::fmt::Debug for Csprng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Csprng").finish_non_exhaustive()
    }
}
