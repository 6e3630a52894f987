//! Block cipher cores.
//!
//! Each core transforms exactly one block per call using a key schedule
//! expanded once at construction. Cores are stateless after construction:
//! chaining and keystream state live in [`crate::modes`].
//!
//! Every transform reads the whole input block into local words before the
//! first output byte is written, so the in-place variants produce the same
//! result as the out-of-place ones.

mod blowfish;
mod blowfish_tables;
mod rijndael;

pub use blowfish::Blowfish;
pub use rijndael::Rijndael;

/// Largest block size of any supported core.
pub const MAX_BLOCK_SIZE: usize = 16;

/// A keyed block cipher operating on one block at a time.
///
/// # Panics
///
/// All block methods panic if the addressed window does not contain a full
/// block. This is a programming error, not a property of untrusted input.
pub trait BlockCipher {
    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Encrypts the block at `input[in_off..]` into `output[out_off..]`.
    fn encrypt_block(&self, input: &[u8], in_off: usize, output: &mut [u8], out_off: usize);

    /// Decrypts the block at `input[in_off..]` into `output[out_off..]`.
    fn decrypt_block(&self, input: &[u8], in_off: usize, output: &mut [u8], out_off: usize);

    /// Encrypts the block at `buf[off..]` in place.
    fn encrypt_block_in_place(&self, buf: &mut [u8], off: usize) {
        let n = self.block_size();
        let mut tmp = [0u8; MAX_BLOCK_SIZE];
        tmp[..n].copy_from_slice(&buf[off..off + n]);
        self.encrypt_block(&tmp[..n], 0, buf, off);
    }

    /// Decrypts the block at `buf[off..]` in place.
    fn decrypt_block_in_place(&self, buf: &mut [u8], off: usize) {
        let n = self.block_size();
        let mut tmp = [0u8; MAX_BLOCK_SIZE];
        tmp[..n].copy_from_slice(&buf[off..off + n]);
        self.decrypt_block(&tmp[..n], 0, buf, off);
    }
}

impl<C: BlockCipher + ?Sized> BlockCipher for &C {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, input: &[u8], in_off: usize, output: &mut [u8], out_off: usize) {
        (**self).encrypt_block(input, in_off, output, out_off)
    }

    fn decrypt_block(&self, input: &[u8], in_off: usize, output: &mut [u8], out_off: usize) {
        (**self).decrypt_block(input, in_off, output, out_off)
    }
}

/// Asserts that `buf[off..off + len]` is addressable.
#[inline]
#[track_caller]
pub(crate) fn check_window(buf: &[u8], off: usize, len: usize, what: &str) {
    assert!(
        off.checked_add(len).is_some_and(|end| end <= buf.len()),
        "{what}: window {off}..{off}+{len} exceeds buffer of {} bytes",
        buf.len()
    );
}
