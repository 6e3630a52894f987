use tracing::trace;

use super::{check_block_multiple, xor_into};
use crate::cipher::{BlockCipher, MAX_BLOCK_SIZE, check_window};
use crate::error::{CryptoError, Result};

/// Cipher block chaining mode without padding.
///
/// The chaining value carries across calls, so a message split into several
/// block-aligned calls produces the same output as a single call.
pub struct Cbc<C> {
    cipher: C,
    iv: [u8; MAX_BLOCK_SIZE],
}

impl<C: BlockCipher> Cbc<C> {
    /// Binds a cipher to an initial chaining value of one block.
    pub fn new(cipher: C, iv: &[u8]) -> Result<Self> {
        let bs = cipher.block_size();
        if iv.len() != bs {
            return Err(CryptoError::InvalidIvLength {
                expected: bs,
                actual: iv.len(),
            });
        }
        let mut chain = [0u8; MAX_BLOCK_SIZE];
        chain[..bs].copy_from_slice(iv);
        Ok(Self { cipher, iv: chain })
    }

    /// Current chaining value: the last ciphertext block processed, or the
    /// initial IV.
    pub fn iv(&self) -> &[u8] {
        &self.iv[..self.cipher.block_size()]
    }

    /// Replaces the chaining value for a new message.
    pub fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        let bs = self.cipher.block_size();
        if iv.len() != bs {
            return Err(CryptoError::InvalidIvLength {
                expected: bs,
                actual: iv.len(),
            });
        }
        self.iv[..bs].copy_from_slice(iv);
        Ok(())
    }

    /// Encrypts `len` bytes from `input[in_off..]` into `output[out_off..]`.
    ///
    /// # Panics
    ///
    /// If `len` is not a multiple of the block size or a window is out of
    /// bounds.
    pub fn encrypt(
        &mut self,
        input: &[u8],
        in_off: usize,
        len: usize,
        output: &mut [u8],
        out_off: usize,
    ) {
        let bs = self.cipher.block_size();
        check_block_multiple(len, bs, "cbc");
        check_window(input, in_off, len, "cbc input");
        check_window(output, out_off, len, "cbc output");
        trace!(len, "cbc encrypt");

        for i in (0..len).step_by(bs) {
            let mut block = [0u8; MAX_BLOCK_SIZE];
            block[..bs].copy_from_slice(&input[in_off + i..in_off + i + bs]);
            xor_into(&mut block[..bs], &self.iv[..bs]);
            self.cipher.encrypt_block(&block[..bs], 0, &mut self.iv[..bs], 0);
            output[out_off + i..out_off + i + bs].copy_from_slice(&self.iv[..bs]);
        }
    }

    /// Decrypts `len` bytes from `input[in_off..]` into `output[out_off..]`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Cbc::encrypt`].
    pub fn decrypt(
        &mut self,
        input: &[u8],
        in_off: usize,
        len: usize,
        output: &mut [u8],
        out_off: usize,
    ) {
        let bs = self.cipher.block_size();
        check_block_multiple(len, bs, "cbc");
        check_window(input, in_off, len, "cbc input");
        check_window(output, out_off, len, "cbc output");
        trace!(len, "cbc decrypt");

        for i in (0..len).step_by(bs) {
            let ct = &input[in_off + i..in_off + i + bs];
            let out = &mut output[out_off + i..out_off + i + bs];
            self.cipher.decrypt_block(ct, 0, out, 0);
            xor_into(out, &self.iv[..bs]);
            self.iv[..bs].copy_from_slice(ct);
        }
    }

    /// Encrypts `buf[off..off + len]` in place.
    pub fn encrypt_in_place(&mut self, buf: &mut [u8], off: usize, len: usize) {
        let bs = self.cipher.block_size();
        check_block_multiple(len, bs, "cbc");
        check_window(buf, off, len, "cbc buffer");

        for i in (off..off + len).step_by(bs) {
            let block = &mut buf[i..i + bs];
            xor_into(block, &self.iv[..bs]);
            self.cipher.encrypt_block_in_place(block, 0);
            self.iv[..bs].copy_from_slice(block);
        }
    }

    /// Decrypts `buf[off..off + len]` in place.
    pub fn decrypt_in_place(&mut self, buf: &mut [u8], off: usize, len: usize) {
        let bs = self.cipher.block_size();
        check_block_multiple(len, bs, "cbc");
        check_window(buf, off, len, "cbc buffer");

        for i in (off..off + len).step_by(bs) {
            let block = &mut buf[i..i + bs];
            // the ciphertext is the next chaining value and is about to be overwritten
            let mut next = [0u8; MAX_BLOCK_SIZE];
            next[..bs].copy_from_slice(block);
            self.cipher.decrypt_block_in_place(block, 0);
            xor_into(block, &self.iv[..bs]);
            self.iv = next;
        }
    }
}
