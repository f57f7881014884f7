//! tests/common.rs
//! Common constants and helpers shared across test files

use symcrypt_rs::{EncryptionScheme, KeyMetadata, SchemeAlgorithm, SymmetricKey};
use symcrypt_rs::CipherAlgorithm;

/// Fast iteration count for password tests - KDF cost is measured nowhere here.
#[allow(dead_code)] // Used across multiple test files
pub const TEST_ITERATIONS: u32 = 5;

#[allow(dead_code)] // Used across multiple test files
pub const TEST_PASSWORD: &str = "Hello";

/// Fixed key material for deterministic scenarios.
#[allow(dead_code)]
pub const TEST_ENC_KEY: [u8; 16] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
];

#[allow(dead_code)]
pub const TEST_MAC_KEY: [u8; 32] = [0x5c; 32];

#[allow(dead_code)]
pub const TEST_IV: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];

/// Plaintext lengths exercised by round-trip tests for a 16-byte block.
#[allow(dead_code)]
pub const TEST_LENGTHS: &[usize] = &[0, 1, 15, 16, 17, 31, 160, 1000, 4099];

#[allow(dead_code)]
pub const BOTH_SCHEMES: [SchemeAlgorithm; 2] = [
    SchemeAlgorithm::Aes128CbcHmacSha256Sympad,
    SchemeAlgorithm::Aes128CtrHmacSha256Sympad,
];

/// Deterministic scheme built from the fixed test material.
#[allow(dead_code)]
pub fn fixed_scheme(algorithm: SchemeAlgorithm, mac_key: &[u8]) -> EncryptionScheme {
    let key = SymmetricKey::from_bytes(CipherAlgorithm::AES_128, &TEST_ENC_KEY, KeyMetadata::new())
        .unwrap();
    EncryptionScheme::make_scheme(algorithm, "fixed", key, mac_key, &TEST_IV, None).unwrap()
}

/// Patterned plaintext so misplaced blocks show up in comparisons.
#[allow(dead_code)]
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
