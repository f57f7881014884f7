//! src/crypto/tea.rs
//! TEA (Tiny Encryption Algorithm): 64-bit block, 128-bit key, 32 cycles.
//!
//! Words are read big-endian from the block and key bytes.

const DELTA: u32 = 0x9E37_79B9;
const CYCLES: u32 = 32;

/// Keyed TEA transform. The key schedule is just the four key words.
pub struct Tea {
    key: [u32; 4],
}

impl Tea {
    /// Key must be exactly 16 bytes; the caller validates the length.
    pub fn new(key: &[u8; 16]) -> Self {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(key.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self { key: words }
    }

    pub fn encrypt_block(&self, block: &mut [u8; 8]) {
        let (mut v0, mut v1) = split(block);
        let [k0, k1, k2, k3] = self.key;
        let mut sum: u32 = 0;
        for _ in 0..CYCLES {
            sum = sum.wrapping_add(DELTA);
            v0 = v0.wrapping_add(
                (v1 << 4).wrapping_add(k0) ^ v1.wrapping_add(sum) ^ (v1 >> 5).wrapping_add(k1),
            );
            v1 = v1.wrapping_add(
                (v0 << 4).wrapping_add(k2) ^ v0.wrapping_add(sum) ^ (v0 >> 5).wrapping_add(k3),
            );
        }
        join(block, v0, v1);
    }

    pub fn decrypt_block(&self, block: &mut [u8; 8]) {
        let (mut v0, mut v1) = split(block);
        let [k0, k1, k2, k3] = self.key;
        let mut sum: u32 = DELTA.wrapping_mul(CYCLES);
        for _ in 0..CYCLES {
            v1 = v1.wrapping_sub(
                (v0 << 4).wrapping_add(k2) ^ v0.wrapping_add(sum) ^ (v0 >> 5).wrapping_add(k3),
            );
            v0 = v0.wrapping_sub(
                (v1 << 4).wrapping_add(k0) ^ v1.wrapping_add(sum) ^ (v1 >> 5).wrapping_add(k1),
            );
            sum = sum.wrapping_sub(DELTA);
        }
        join(block, v0, v1);
    }
}

#[inline(always)]
fn split(block: &[u8; 8]) -> (u32, u32) {
    (
        u32::from_be_bytes([block[0], block[1], block[2], block[3]]),
        u32::from_be_bytes([block[4], block[5], block[6], block[7]]),
    )
}

#[inline(always)]
fn join(block: &mut [u8; 8], v0: u32, v1: u32) {
    block[..4].copy_from_slice(&v0.to_be_bytes());
    block[4..].copy_from_slice(&v1.to_be_bytes());
}
