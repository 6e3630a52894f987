//! Galois/Counter Mode (NIST SP 800-38D).
//!
//! ## Lifecycle
//!
//! ```text
//! new ─► set_nonce / next_packet ─► [set_aad] ─► encrypt | decrypt ─┐
//!              ▲                                                     │
//!              └─────────────────────────────────────────────────────┘
//! ```
//!
//! A nonce is consumed by exactly one encryption or decryption; calling
//! either again without a new nonce is rejected, which makes accidental
//! nonce reuse a hard error.
//!
//! ## Decryption
//!
//! The tag is recomputed over the ciphertext and compared in constant time
//! before any keystream is applied. On mismatch the output window is left
//! exactly as it was.
//!
//! ## SSH usage
//!
//! [`Gcm::with_fixed_iv`] keeps the 12-byte IV from key exchange and treats
//! its low 64 bits as the invocation counter, incremented after every packet
//! (RFC 5647 §7.1).

use subtle::ConstantTimeEq;
use tracing::{debug, instrument, trace};
use zeroize::Zeroize;

use crate::cipher::{BlockCipher, check_window};
use crate::error::{CryptoError, Result, Verification};

const BLOCK: usize = 16;

/// Reduction constant of the GHASH field, bit-reflected.
const R: u128 = 0xe1 << 120;

/// Largest message GCM can protect under one nonce: 2^39 - 256 bits.
const MAX_MESSAGE_LEN: u64 = (1 << 36) - 32;

/// Per-instance GCM settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcmConfig {
    /// Tag length in bytes, 4 to 16.
    pub tag_len: usize,
}

impl Default for GcmConfig {
    fn default() -> Self {
        Self { tag_len: 16 }
    }
}

/// An authentication tag, possibly truncated.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    bytes: [u8; BLOCK],
    len: usize,
}

impl Tag {
    /// The tag bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tag(")?;
        for b in self.as_bytes() {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

/// GCM over a 128-bit block cipher.
pub struct Gcm<C> {
    cipher: C,
    h: u128,
    tag_len: usize,
    j0: Option<[u8; BLOCK]>,
    aad_hash: u128,
    aad_len: u64,
    fixed_iv: Option<[u8; 12]>,
}

impl<C: BlockCipher> Gcm<C> {
    /// Wraps a cipher with full-length tags.
    pub fn new(cipher: C) -> Result<Self> {
        Self::with_config(cipher, GcmConfig::default())
    }

    /// Wraps a cipher with explicit settings.
    #[instrument(level = "debug", skip(cipher), fields(tag_len = config.tag_len))]
    pub fn with_config(cipher: C, config: GcmConfig) -> Result<Self> {
        if cipher.block_size() != BLOCK {
            return Err(CryptoError::InvalidBlockSize(cipher.block_size()));
        }
        if !(4..=BLOCK).contains(&config.tag_len) {
            return Err(CryptoError::InvalidTagLength(config.tag_len));
        }

        let mut zero = [0u8; BLOCK];
        cipher.encrypt_block_in_place(&mut zero, 0);
        let h = u128::from_be_bytes(zero);

        Ok(Self {
            cipher,
            h,
            tag_len: config.tag_len,
            j0: None,
            aad_hash: 0,
            aad_len: 0,
            fixed_iv: None,
        })
    }

    /// Wraps a cipher for SSH packet protection with a fixed 12-byte IV
    /// whose invocation counter advances per packet.
    pub fn with_fixed_iv(cipher: C, iv: &[u8], config: GcmConfig) -> Result<Self> {
        let fixed: [u8; 12] = iv.try_into().map_err(|_| CryptoError::InvalidIvLength {
            expected: 12,
            actual: iv.len(),
        })?;
        let mut gcm = Self::with_config(cipher, config)?;
        gcm.fixed_iv = Some(fixed);
        Ok(gcm)
    }

    /// Configured tag length in bytes.
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    /// The IV the next call to [`Gcm::next_packet`] will use.
    pub fn current_iv(&self) -> Option<&[u8; 12]> {
        self.fixed_iv.as_ref()
    }

    /// Starts a message under `nonce`. Any length other than zero is
    /// accepted; 12 bytes is the fast path.
    pub fn set_nonce(&mut self, nonce: &[u8]) -> Result<()> {
        if nonce.is_empty() {
            return Err(CryptoError::InvalidIvLength {
                expected: 12,
                actual: 0,
            });
        }

        let j0 = if nonce.len() == 12 {
            let mut j0 = [0u8; BLOCK];
            j0[..12].copy_from_slice(nonce);
            j0[15] = 1;
            j0
        } else {
            let mut y = ghash(self.h, 0, nonce);
            y = gf_mul(y ^ ((nonce.len() as u128) * 8), self.h);
            y.to_be_bytes()
        };

        self.j0 = Some(j0);
        self.aad_hash = 0;
        self.aad_len = 0;
        Ok(())
    }

    /// Starts the next SSH packet: uses the current fixed IV as nonce and
    /// then increments its invocation counter.
    pub fn next_packet(&mut self) -> Result<()> {
        let iv = self
            .fixed_iv
            .ok_or(CryptoError::InvalidState("gcm has no fixed IV"))?;
        self.set_nonce(&iv)?;

        let mut counter = [0u8; 8];
        counter.copy_from_slice(&iv[4..]);
        let next = u64::from_be_bytes(counter).wrapping_add(1);
        if let Some(fixed) = self.fixed_iv.as_mut() {
            fixed[4..].copy_from_slice(&next.to_be_bytes());
        }
        Ok(())
    }

    /// Supplies the additional authenticated data for the current message.
    pub fn set_aad(&mut self, aad: &[u8]) -> Result<()> {
        if self.j0.is_none() {
            return Err(CryptoError::InvalidState("gcm nonce not set"));
        }
        self.aad_hash = ghash(self.h, 0, aad);
        self.aad_len = aad.len() as u64;
        Ok(())
    }

    /// Encrypts `len` bytes from `input[in_off..]` into `output[out_off..]`
    /// and returns the tag.
    ///
    /// # Panics
    ///
    /// If a window is out of bounds.
    pub fn encrypt(
        &mut self,
        input: &[u8],
        in_off: usize,
        len: usize,
        output: &mut [u8],
        out_off: usize,
    ) -> Result<Tag> {
        check_window(input, in_off, len, "gcm input");
        check_window(output, out_off, len, "gcm output");
        let j0 = self.take_nonce(len)?;
        trace!(len, "gcm encrypt");

        output[out_off..out_off + len].copy_from_slice(&input[in_off..in_off + len]);
        self.keystream(&j0, &mut output[out_off..out_off + len]);
        Ok(self.tag(&j0, &output[out_off..out_off + len]))
    }

    /// Encrypts `buf[off..off + len]` in place and returns the tag.
    pub fn encrypt_in_place(&mut self, buf: &mut [u8], off: usize, len: usize) -> Result<Tag> {
        check_window(buf, off, len, "gcm buffer");
        let j0 = self.take_nonce(len)?;
        trace!(len, "gcm encrypt in place");

        self.keystream(&j0, &mut buf[off..off + len]);
        Ok(self.tag(&j0, &buf[off..off + len]))
    }

    /// Authenticates and decrypts `len` bytes from `input[in_off..]` into
    /// `output[out_off..]`.
    ///
    /// Nothing is written to `output` unless the result is
    /// [`Verification::Valid`].
    pub fn decrypt(
        &mut self,
        input: &[u8],
        in_off: usize,
        len: usize,
        tag: &[u8],
        output: &mut [u8],
        out_off: usize,
    ) -> Result<Verification> {
        check_window(input, in_off, len, "gcm input");
        check_window(output, out_off, len, "gcm output");
        let j0 = self.take_nonce(len)?;

        let verdict = self.check_tag(&j0, &input[in_off..in_off + len], tag);
        if verdict.is_valid() {
            output[out_off..out_off + len].copy_from_slice(&input[in_off..in_off + len]);
            self.keystream(&j0, &mut output[out_off..out_off + len]);
        }
        Ok(verdict)
    }

    /// Authenticates and decrypts `buf[off..off + len]` in place. The buffer
    /// is untouched unless the result is [`Verification::Valid`].
    pub fn decrypt_in_place(
        &mut self,
        buf: &mut [u8],
        off: usize,
        len: usize,
        tag: &[u8],
    ) -> Result<Verification> {
        check_window(buf, off, len, "gcm buffer");
        let j0 = self.take_nonce(len)?;

        let verdict = self.check_tag(&j0, &buf[off..off + len], tag);
        if verdict.is_valid() {
            self.keystream(&j0, &mut buf[off..off + len]);
        }
        Ok(verdict)
    }

    fn take_nonce(&mut self, len: usize) -> Result<[u8; BLOCK]> {
        if len as u64 > MAX_MESSAGE_LEN {
            return Err(CryptoError::MalformedInput("gcm message too long"));
        }
        self.j0
            .take()
            .ok_or(CryptoError::InvalidState("gcm nonce not set"))
    }

    fn check_tag(&self, j0: &[u8; BLOCK], ciphertext: &[u8], tag: &[u8]) -> Verification {
        if tag.len() != self.tag_len {
            debug!(expected = self.tag_len, actual = tag.len(), "gcm tag length mismatch");
            return Verification::Malformed("gcm tag length");
        }
        let expected = self.tag(j0, ciphertext);
        let verdict = Verification::from_choice(expected.as_bytes().ct_eq(tag));
        if !verdict.is_valid() {
            debug!("gcm tag mismatch");
        }
        verdict
    }

    /// XORs the keystream starting at `inc32(J0)` over `data`.
    fn keystream(&self, j0: &[u8; BLOCK], data: &mut [u8]) {
        let mut counter = *j0;
        let mut ks = [0u8; BLOCK];
        for chunk in data.chunks_mut(BLOCK) {
            inc32(&mut counter);
            self.cipher.encrypt_block(&counter, 0, &mut ks, 0);
            for (d, k) in chunk.iter_mut().zip(&ks) {
                *d ^= k;
            }
        }
        ks.zeroize();
    }

    fn tag(&self, j0: &[u8; BLOCK], ciphertext: &[u8]) -> Tag {
        let mut s = ghash(self.h, self.aad_hash, ciphertext);
        let lengths =
            (u128::from(self.aad_len * 8) << 64) | u128::from(ciphertext.len() as u64 * 8);
        s = gf_mul(s ^ lengths, self.h);

        let mut ek = [0u8; BLOCK];
        self.cipher.encrypt_block(j0, 0, &mut ek, 0);
        let full = (u128::from_be_bytes(ek) ^ s).to_be_bytes();

        let mut bytes = [0u8; BLOCK];
        bytes[..self.tag_len].copy_from_slice(&full[..self.tag_len]);
        Tag {
            bytes,
            len: self.tag_len,
        }
    }
}

impl<C> Drop for Gcm<C> {
    fn drop(&mut self) {
        self.h.zeroize();
        self.aad_hash.zeroize();
    }
}

/// Increments the low 32 bits of the counter block modulo 2^32, leaving
/// the upper 96 bits alone.
fn inc32(block: &mut [u8; BLOCK]) {
    let low = u32::from_be_bytes([block[12], block[13], block[14], block[15]]).wrapping_add(1);
    block[12..].copy_from_slice(&low.to_be_bytes());
}

/// Multiplication in GF(2^128) with the GCM bit order, without
/// data-dependent branches.
fn gf_mul(x: u128, h: u128) -> u128 {
    let mut z = 0u128;
    let mut v = h;
    for i in (0..128).rev() {
        let bit = (x >> i) & 1;
        z ^= v & 0u128.wrapping_sub(bit);
        let lsb = v & 1;
        v = (v >> 1) ^ (R & 0u128.wrapping_sub(lsb));
    }
    z
}

/// Folds `data`, zero padded to whole blocks, into the GHASH accumulator.
fn ghash(h: u128, mut acc: u128, data: &[u8]) -> u128 {
    for chunk in data.chunks(BLOCK) {
        let mut block = [0u8; BLOCK];
        block[..chunk.len()].copy_from_slice(chunk);
        acc = gf_mul(acc ^ u128::from_be_bytes(block), h);
    }
    acc
}
