use tracing::trace;
use zeroize::Zeroize;

use super::increment_be;
use crate::cipher::{BlockCipher, MAX_BLOCK_SIZE, check_window};
use crate::error::{CryptoError, Result};

/// Counter mode.
///
/// The keystream is `E(counter)`, with the counter incremented as a single
/// big-endian integer over the whole block after every block, wrapping from
/// all-ones to zero. Unused keystream from a partial block is kept for the
/// next call, so splitting a stream across calls does not change the output.
pub struct Ctr<C> {
    cipher: C,
    counter: [u8; MAX_BLOCK_SIZE],
    keystream: [u8; MAX_BLOCK_SIZE],
    used: usize,
}

impl<C: BlockCipher> Ctr<C> {
    /// Binds a cipher to an initial counter block.
    pub fn new(cipher: C, counter: &[u8]) -> Result<Self> {
        let bs = cipher.block_size();
        if counter.len() != bs {
            return Err(CryptoError::InvalidIvLength {
                expected: bs,
                actual: counter.len(),
            });
        }
        let mut block = [0u8; MAX_BLOCK_SIZE];
        block[..bs].copy_from_slice(counter);
        Ok(Self {
            cipher,
            counter: block,
            keystream: [0u8; MAX_BLOCK_SIZE],
            used: bs,
        })
    }

    /// The counter value that will produce the next keystream block.
    pub fn counter(&self) -> &[u8] {
        &self.counter[..self.cipher.block_size()]
    }

    /// Restarts the keystream at a new counter value.
    pub fn set_counter(&mut self, counter: &[u8]) -> Result<()> {
        let bs = self.cipher.block_size();
        if counter.len() != bs {
            return Err(CryptoError::InvalidIvLength {
                expected: bs,
                actual: counter.len(),
            });
        }
        self.counter[..bs].copy_from_slice(counter);
        self.keystream.zeroize();
        self.used = bs;
        Ok(())
    }

    /// XORs `len` bytes of keystream over `input[in_off..]` into
    /// `output[out_off..]`. Encryption and decryption are the same operation.
    ///
    /// # Panics
    ///
    /// If a window is out of bounds.
    pub fn apply(
        &mut self,
        input: &[u8],
        in_off: usize,
        len: usize,
        output: &mut [u8],
        out_off: usize,
    ) {
        check_window(input, in_off, len, "ctr input");
        check_window(output, out_off, len, "ctr output");
        trace!(len, "ctr apply");
        for i in 0..len {
            output[out_off + i] = input[in_off + i] ^ self.next_keystream_byte();
        }
    }

    /// XORs keystream over `buf[off..off + len]` in place.
    pub fn apply_in_place(&mut self, buf: &mut [u8], off: usize, len: usize) {
        check_window(buf, off, len, "ctr buffer");
        trace!(len, "ctr apply in place");
        for byte in &mut buf[off..off + len] {
            *byte ^= self.next_keystream_byte();
        }
    }

    #[inline]
    fn next_keystream_byte(&mut self) -> u8 {
        let bs = self.cipher.block_size();
        if self.used == bs {
            self.cipher
                .encrypt_block(&self.counter[..bs], 0, &mut self.keystream[..bs], 0);
            increment_be(&mut self.counter[..bs]);
            self.used = 0;
        }
        let byte = self.keystream[self.used];
        self.used += 1;
        byte
    }
}

impl<C> Drop for Ctr<C> {
    fn drop(&mut self) {
        self.keystream.zeroize();
    }
}
