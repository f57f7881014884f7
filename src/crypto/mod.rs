// src/crypto/mod.rs

//! Low-level crypto primitives: cipher port, MAC port, KDF, RNG.
//!
//! Everything above this layer (padding, streaming, schemes) talks to the
//! primitives only through [`cipher::BlockCipher`] and [`mac::MacPort`].

pub mod cipher;
pub mod kdf;
pub mod mac;
pub mod rng;
pub mod simon;
pub mod tea;
