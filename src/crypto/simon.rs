//! src/crypto/simon.rs
//! Simon128/128: 128-bit block, 128-bit key, 68 rounds.
//!
//! Words are little-endian; bytes `0..8` of a block are the low word `y`,
//! bytes `8..16` the high word `x`. Key bytes `0..8` are `k0`, `8..16` are `k1`.

const ROUNDS: usize = 68;

/// Round-constant sequence `z2`, bit `i` is `z2[i]` (period 62).
const Z2: u64 = 0x7369_f885_192c_0ef5;

/// `2^64 - 4`.
const C: u64 = 0xffff_ffff_ffff_fffc;

/// Keyed Simon128/128 transform holding the expanded round keys.
pub struct Simon128 {
    round_keys: [u64; ROUNDS],
}

impl Simon128 {
    /// Key must be exactly 16 bytes; the caller validates the length.
    pub fn new(key: &[u8; 16]) -> Self {
        let mut k = [0u64; ROUNDS];
        k[0] = load(&key[..8]);
        k[1] = load(&key[8..]);
        for i in 2..ROUNDS {
            let mut tmp = k[i - 1].rotate_right(3);
            tmp ^= tmp.rotate_right(1);
            let z = (Z2 >> ((i - 2) % 62)) & 1;
            k[i] = C ^ z ^ k[i - 2] ^ tmp;
        }
        Self { round_keys: k }
    }

    pub fn encrypt_block(&self, block: &mut [u8; 16]) {
        let (mut x, mut y) = split(block);
        for &k in &self.round_keys {
            let t = x;
            x = y ^ f(x) ^ k;
            y = t;
        }
        join(block, x, y);
    }

    pub fn decrypt_block(&self, block: &mut [u8; 16]) {
        let (mut x, mut y) = split(block);
        for &k in self.round_keys.iter().rev() {
            let t = y;
            y = x ^ f(y) ^ k;
            x = t;
        }
        join(block, x, y);
    }
}

impl Drop for Simon128 {
    fn drop(&mut self) {
        self.round_keys.fill(0);
    }
}

#[inline(always)]
fn f(x: u64) -> u64 {
    (x.rotate_left(1) & x.rotate_left(8)) ^ x.rotate_left(2)
}

#[inline(always)]
fn load(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    u64::from_le_bytes(word)
}

/// `(x, y)` = (high word, low word).
#[inline(always)]
fn split(block: &[u8; 16]) -> (u64, u64) {
    (load(&block[8..]), load(&block[..8]))
}

#[inline(always)]
fn join(block: &mut [u8; 16], x: u64, y: u64) {
    block[..8].copy_from_slice(&y.to_le_bytes());
    block[8..].copy_from_slice(&x.to_le_bytes());
}
