//! src/padding.rs
//! `sympad` framing: a `0x80` marker right after the last plaintext byte,
//! then zeros up to the block boundary.
//!
//! Padding is always present. Plaintext that already ends on a block boundary
//! gets one whole extra block (`80 00 .. 00`).

use crate::consts::PAD_MARKER;
use crate::error::CryptError;
use crate::utils::align_up;

/// Length of `plain_len` bytes after padding: `(n / B + 1) * B`.
#[inline(always)]
pub const fn padded_len(plain_len: usize, block_size: usize) -> usize {
    align_up(plain_len + 1, block_size)
}

/// Pad the final plaintext `tail` into `out`, returning the padded length.
///
/// `out` must hold [`padded_len`]`(tail.len(), block_size)` bytes.
pub fn pad_final(tail: &[u8], block_size: usize, out: &mut [u8]) -> Result<usize, CryptError> {
    let total = padded_len(tail.len(), block_size);
    if out.len() < total {
        return Err(CryptError::Crypto(format!(
            "pad: output buffer too small ({} < {total})",
            out.len()
        )));
    }
    out[..tail.len()].copy_from_slice(tail);
    out[tail.len()] = PAD_MARKER;
    out[tail.len() + 1..total].fill(0);
    Ok(total)
}

/// Find the plaintext length inside the final decrypted block.
///
/// Scans from the end for the first non-zero byte, which must be the marker.
/// Returns the count of plaintext bytes that precede it.
pub fn unpad_final(last_block: &[u8]) -> Result<usize, CryptError> {
    match last_block.iter().rposition(|&b| b != 0) {
        Some(pos) if last_block[pos] == PAD_MARKER => Ok(pos),
        Some(pos) => Err(CryptError::Framing(format!(
            "padding marker missing (found 0x{:02x})",
            last_block[pos]
        ))),
        None => Err(CryptError::Framing("final block is all zero".into())),
    }
}
