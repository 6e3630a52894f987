//! Block cipher modes of operation.
//!
//! Every mode addresses its data through explicit `(buffer, offset, length)`
//! windows. Bytes outside a window are never read or written, and each mode
//! also offers an in-place form working on a single buffer.
//!
//! Modes that carry state (CBC chaining value, CTR counter, GCM nonce) are
//! driven through `&mut self`. Resetting that state between independent
//! messages is the caller's job.

mod cbc;
mod ctr;
mod ecb;
mod gcm;

pub use cbc::Cbc;
pub use ctr::Ctr;
pub use ecb::Ecb;
pub use gcm::{Gcm, GcmConfig, Tag};

/// Increments `counter` as one big-endian integer, wrapping to zero.
pub(crate) fn increment_be(counter: &mut [u8]) {
    let mut carry = 1u16;
    for byte in counter.iter_mut().rev() {
        let sum = u16::from(*byte) + carry;
        *byte = sum as u8;
        carry = sum >> 8;
    }
}

/// XORs `src` into `dst`.
#[inline]
pub(crate) fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

#[inline]
#[track_caller]
fn check_block_multiple(len: usize, block_size: usize, mode: &str) {
    assert!(
        len % block_size == 0,
        "{mode}: length {len} is not a multiple of the {block_size}-byte block size"
    );
}
