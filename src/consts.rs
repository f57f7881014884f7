//! # Constants
//!
//! This module defines constants for the stream framing, supported scheme
//! names, primitive sizes, and key-derivation bounds.

/// Default transfer buffer size used by the stream drivers.
///
/// Independent of the cipher block size; the drivers align it down to a
/// whole number of blocks.
pub const DEFAULT_TRANSFER_SIZE: usize = 2048;

/// Upper bound on the transfer size accepted by
/// [`StreamOptions::with_transfer_size`](crate::StreamOptions::with_transfer_size) (16 MiB).
pub const MAX_TRANSFER_SIZE: usize = 16 * 1024 * 1024;

/// Marker byte that terminates plaintext in the `sympad` framing.
pub const PAD_MARKER: u8 = 0x80;

/// Largest block size of any supported cipher (AES / Twofish).
pub const MAX_BLOCK_SIZE: usize = 16;

/// AES / Twofish block size in bytes.
pub const BLOCK_SIZE_16: usize = 16;

/// TEA / RC4 block size in bytes (RC4 uses it for buffering only).
pub const BLOCK_SIZE_8: usize = 8;

/// Largest raw key held by a [`SymmetricKey`](crate::keys::SymmetricKey) (256 bits).
pub const MAX_KEY_BYTES: usize = 32;

/// HMAC-SHA256 tag length in bytes.
pub const HMAC_SHA256_TAG_SIZE: usize = 32;

/// MAC key length used by the composite schemes.
pub const SCHEME_MAC_KEY_SIZE: usize = 32;

/// IV / initial counter block length used by the composite schemes.
pub const SCHEME_IV_SIZE: usize = 16;

/// Encryption key length (AES-128) used by the composite schemes.
pub const SCHEME_ENC_KEY_SIZE: usize = 16;

/// CBC-then-MAC composite scheme name.
pub const AES128_CBC_HMACSHA256_SYMPAD: &str = "aes128-cbc-hmacsha256-sympad";

/// CTR-then-MAC composite scheme name.
pub const AES128_CTR_HMACSHA256_SYMPAD: &str = "aes128-ctr-hmacsha256-sympad";

/// Minimum allowed PBKDF2 iteration count.
pub const PBKDF2_MIN_ITER: u32 = 1;

/// Maximum allowed PBKDF2 iteration count.
///
/// Set to `5_000_000` to prevent excessive computation times.
pub const PBKDF2_MAX_ITER: u32 = 5_000_000;

/// Default PBKDF2 iteration count for password-derived schemes.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 300_000;

/// Salt prefixed to password-encrypted files.
pub const PASSWORD_SALT_SIZE: usize = 16;

/// Bytes derived from a password: AES-128 key followed by the MAC key.
pub const PASSWORD_DERIVED_LEN: usize = SCHEME_ENC_KEY_SIZE + SCHEME_MAC_KEY_SIZE;

/// Default key validity window, in days (one common year).
pub const DEFAULT_KEY_LIFETIME_DAYS: i64 = 365;
