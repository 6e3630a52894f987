use tracing::trace;

use super::check_block_multiple;
use crate::cipher::{BlockCipher, check_window};

/// Electronic codebook mode: every block is transformed independently.
pub struct Ecb<C> {
    cipher: C,
}

impl<C: BlockCipher> Ecb<C> {
    /// Wraps a keyed block cipher.
    pub fn new(cipher: C) -> Self {
        Self { cipher }
    }

    /// The underlying block cipher.
    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Encrypts `len` bytes from `input[in_off..]` into `output[out_off..]`.
    ///
    /// # Panics
    ///
    /// If `len` is not a multiple of the block size or a window is out of
    /// bounds.
    pub fn encrypt(
        &self,
        input: &[u8],
        in_off: usize,
        len: usize,
        output: &mut [u8],
        out_off: usize,
    ) {
        self.check(input, in_off, len, output, out_off);
        trace!(len, "ecb encrypt");
        let bs = self.cipher.block_size();
        for i in (0..len).step_by(bs) {
            self.cipher.encrypt_block(input, in_off + i, output, out_off + i);
        }
    }

    /// Decrypts `len` bytes from `input[in_off..]` into `output[out_off..]`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Ecb::encrypt`].
    pub fn decrypt(
        &self,
        input: &[u8],
        in_off: usize,
        len: usize,
        output: &mut [u8],
        out_off: usize,
    ) {
        self.check(input, in_off, len, output, out_off);
        trace!(len, "ecb decrypt");
        let bs = self.cipher.block_size();
        for i in (0..len).step_by(bs) {
            self.cipher.decrypt_block(input, in_off + i, output, out_off + i);
        }
    }

    /// Encrypts `buf[off..off + len]` in place.
    pub fn encrypt_in_place(&self, buf: &mut [u8], off: usize, len: usize) {
        let bs = self.cipher.block_size();
        check_block_multiple(len, bs, "ecb");
        check_window(buf, off, len, "ecb buffer");
        for i in (0..len).step_by(bs) {
            self.cipher.encrypt_block_in_place(buf, off + i);
        }
    }

    /// Decrypts `buf[off..off + len]` in place.
    pub fn decrypt_in_place(&self, buf: &mut [u8], off: usize, len: usize) {
        let bs = self.cipher.block_size();
        check_block_multiple(len, bs, "ecb");
        check_window(buf, off, len, "ecb buffer");
        for i in (0..len).step_by(bs) {
            self.cipher.decrypt_block_in_place(buf, off + i);
        }
    }

    #[track_caller]
    fn check(&self, input: &[u8], in_off: usize, len: usize, output: &[u8], out_off: usize) {
        check_block_multiple(len, self.cipher.block_size(), "ecb");
        check_window(input, in_off, len, "ecb input");
        check_window(output, out_off, len, "ecb output");
    }
}
