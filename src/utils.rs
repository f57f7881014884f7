//! Utility functions used across the library.

use crate::error::CryptError;
use subtle::ConstantTimeEq;

/// XORs `block_b` into `block_a` over the length of `block_a`.
///
/// Used by the CBC chaining step and the CTR keystream step. Callers pass
/// equal-length block slices; `block_b` must be at least as long as `block_a`.
#[inline(always)]
pub fn xor_in_place(block_a: &mut [u8], block_b: &[u8]) {
    for (a, b) in block_a.iter_mut().zip(block_b) {
        *a ^= b;
    }
}

/// Compares two tags in constant time over their full length.
///
/// Lengths are public, so a length mismatch returns `false` immediately.
#[inline]
pub fn tags_match(computed: &[u8], received: &[u8]) -> bool {
    computed.len() == received.len() && bool::from(computed.ct_eq(received))
}

/// Rejects an output buffer smaller than `required` bytes.
#[inline]
pub fn ensure_output_len(out: &[u8], required: usize, op: &str) -> Result<(), CryptError> {
    if out.len() < required {
        return Err(CryptError::Crypto(format!(
            "{op}: output buffer too small ({} < {required})",
            out.len()
        )));
    }
    Ok(())
}

/// Rounds `len` down to a whole number of `block_size` blocks.
#[inline(always)]
pub const fn align_down(len: usize, block_size: usize) -> usize {
    len - len % block_size
}

/// Rounds `len` up to a whole number of `block_size` blocks.
#[inline(always)]
pub const fn align_up(len: usize, block_size: usize) -> usize {
    len.div_ceil(block_size) * block_size
}
