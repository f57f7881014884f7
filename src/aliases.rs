//! # Secure-Gate Type Aliases
//!
//! This module provides type aliases for secure memory management using
//! [`secure-gate`](https://github.com/Slurp9187/secure-gate). Every buffer that holds key
//! material, chaining state or keystream is wrapped so it is zeroized on drop and can
//! only be read through an explicit `.expose_secret()`.
//!
//! ## Type Categories
//!
//! ### HMAC Primitives
//! - [`HmacSha256`] - HMAC-SHA256 for stream authentication and file MACs
//! - [`HmacSha512`] - HMAC-SHA512 for PBKDF2 key derivation
//!
//! ### Generic Secure Buffers
//! - [`SpanBuffer<N>`] - Generic secure stack buffer for any size `N`
//!
//! ### Semantic Fixed-Size Types
//! - [`Block16`] - one 16-byte cipher block (also holds 8-byte blocks)
//! - [`ChainBlock16`] - CBC previous-ciphertext block or CTR counter block
//! - [`KeyBuffer32`] - fixed-capacity raw symmetric key storage
//! - [`MacKey32`] - 32-byte HMAC-SHA256 key
//! - [`Iv16`] - 16-byte IV / initial counter block
//! - [`Salt16`] - 16-byte salt for password derivation
//! - [`Tag32`] - 32-byte authentication tag
//! - [`DerivedKeys48`] - password-derived encryption key followed by the MAC key
//!
//! ### Dynamic Secrets
//! - [`PasswordString`] - Secure password string wrapper

use hmac::Hmac;
use sha2::{Sha256, Sha512};

pub type HmacSha256 = Hmac<Sha256>;
pub type HmacSha512 = Hmac<Sha512>;

// ─────────────────────────────────────────────────────────────────────────────
// SpanBuffer: generic secure stack buffer (direct alias to secure-gate's Fixed)
// ─────────────────────────────────────────────────────────────────────────────
pub type SpanBuffer<const N: usize> = secure_gate::Fixed<[u8; N]>;

// Semantic sub-types: alphabetical order
pub type Block16 = SpanBuffer<16>; // one cipher block (8-byte ciphers use a prefix)
pub type ChainBlock16 = SpanBuffer<16>; // CBC previous ciphertext / CTR counter
pub type DerivedKeys48 = SpanBuffer<48>; // PBKDF2 output: enc key ‖ MAC key
pub type Iv16 = SpanBuffer<16>; // scheme IV, CTR initial counter block
pub type KeyBuffer32 = SpanBuffer<32>; // raw key, up to 256 bits
pub type MacKey32 = SpanBuffer<32>; // HMAC-SHA256 key
pub type Salt16 = SpanBuffer<16>; // password salt
pub type Tag32 = SpanBuffer<32>; // HMAC-SHA256 tag

// ─────────────────────────────────────────────────────────────────────────────
// Dynamic secrets
// ─────────────────────────────────────────────────────────────────────────────
pub type PasswordString = secure_gate::Dynamic<String>;
