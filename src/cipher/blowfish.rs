//! Blowfish block cipher (64-bit block, 16 rounds).
//!
//! Key setup XORs the key cyclically into the P-array and then replaces
//! the P-array and all four S-boxes with successive encryptions of an
//! all-zero block, 521 block encryptions in total.

use tracing::instrument;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::BlockCipher;
use super::blowfish_tables::{P_INIT, S_INIT};
use crate::error::{CryptoError, Result};

const ROUNDS: usize = 16;

/// Expanded Blowfish key schedule.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Blowfish {
    p: [u32; ROUNDS + 2],
    s: [[u32; 256]; 4],
}

impl Blowfish {
    /// Block size in bytes.
    pub const BLOCK_SIZE: usize = 8;

    /// Expands a key of 1 to 56 bytes.
    #[instrument(level = "debug", skip(key), fields(key_len = key.len()))]
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() || key.len() > 56 {
            return Err(CryptoError::InvalidKeyLength {
                algorithm: "blowfish",
                len: key.len(),
            });
        }

        let mut cipher = Self {
            p: P_INIT,
            s: S_INIT,
        };

        let mut bytes = key.iter().copied().cycle();
        for p in cipher.p.iter_mut() {
            let mut word = 0u32;
            for _ in 0..4 {
                // `cycle` over a non-empty slice never ends
                word = (word << 8) | u32::from(bytes.next().unwrap_or_default());
            }
            *p ^= word;
        }

        let (mut l, mut r) = (0u32, 0u32);
        for i in (0..ROUNDS + 2).step_by(2) {
            (l, r) = cipher.encrypt_words(l, r);
            cipher.p[i] = l;
            cipher.p[i + 1] = r;
        }
        for b in 0..4 {
            for i in (0..256).step_by(2) {
                (l, r) = cipher.encrypt_words(l, r);
                cipher.s[b][i] = l;
                cipher.s[b][i + 1] = r;
            }
        }

        Ok(cipher)
    }

    #[inline(always)]
    fn f(&self, x: u32) -> u32 {
        let [a, b, c, d] = x.to_be_bytes();
        (self.s[0][a as usize].wrapping_add(self.s[1][b as usize]) ^ self.s[2][c as usize])
            .wrapping_add(self.s[3][d as usize])
    }

    fn encrypt_words(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        for i in 0..ROUNDS {
            l ^= self.p[i];
            r ^= self.f(l);
            (l, r) = (r, l);
        }
        (l, r) = (r, l);
        r ^= self.p[ROUNDS];
        l ^= self.p[ROUNDS + 1];
        (l, r)
    }

    fn decrypt_words(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        for i in (2..ROUNDS + 2).rev() {
            l ^= self.p[i];
            r ^= self.f(l);
            (l, r) = (r, l);
        }
        (l, r) = (r, l);
        r ^= self.p[1];
        l ^= self.p[0];
        (l, r)
    }
}

#[inline(always)]
fn load(input: &[u8], off: usize) -> (u32, u32) {
    let block = &input[off..off + Blowfish::BLOCK_SIZE];
    (
        u32::from_be_bytes([block[0], block[1], block[2], block[3]]),
        u32::from_be_bytes([block[4], block[5], block[6], block[7]]),
    )
}

#[inline(always)]
fn store(output: &mut [u8], off: usize, l: u32, r: u32) {
    let block = &mut output[off..off + Blowfish::BLOCK_SIZE];
    block[..4].copy_from_slice(&l.to_be_bytes());
    block[4..].copy_from_slice(&r.to_be_bytes());
}

impl BlockCipher for Blowfish {
    fn block_size(&self) -> usize {
        Self::BLOCK_SIZE
    }

    fn encrypt_block(&self, input: &[u8], in_off: usize, output: &mut [u8], out_off: usize) {
        let (l, r) = load(input, in_off);
        let (l, r) = self.encrypt_words(l, r);
        store(output, out_off, l, r);
    }

    fn decrypt_block(&self, input: &[u8], in_off: usize, output: &mut [u8], out_off: usize) {
        let (l, r) = load(input, in_off);
        let (l, r) = self.decrypt_words(l, r);
        store(output, out_off, l, r);
    }

    fn encrypt_block_in_place(&self, buf: &mut [u8], off: usize) {
        let (l, r) = load(buf, off);
        let (l, r) = self.encrypt_words(l, r);
        store(buf, off, l, r);
    }

    fn decrypt_block_in_place(&self, buf: &mut [u8], off: usize) {
        let (l, r) = load(buf, off);
        let (l, r) = self.decrypt_words(l, r);
        store(buf, off, l, r);
    }
}
