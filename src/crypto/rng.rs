// src/crypto/rng.rs
//! Secure randomness for fixed-size secrets
//!
//! Adds `T::random()` to every `SpanBuffer<N>` alias (`KeyBuffer32`, `Iv16`, `MacKey32`, …)
//! using a thread-local `OsRng`.

use crate::error::CryptError;
use rand::{rngs::OsRng, TryRngCore};
use secure_gate::Fixed;
use std::cell::RefCell;

/// Extension trait – gives `.random()` to all fixed-size secret types
pub trait SecureRandomExt: Sized {
    /// Generate a cryptographically secure random instance of this type
    fn random() -> Result<Self, CryptError>;
}

// Thread-local OsRng wrapped in RefCell so we can mutably borrow it
thread_local! {
    static RNG: RefCell<OsRng> = const { RefCell::new(OsRng) };
}

/// Fill `dest` from the operating system RNG.
#[inline]
pub fn fill_random(dest: &mut [u8]) -> Result<(), CryptError> {
    RNG.with(|rng_cell| {
        rng_cell
            .borrow_mut()
            .try_fill_bytes(dest)
            .map_err(|e| CryptError::Crypto(format!("OS RNG failed: {e}")))
    })
}

/// Blanket impl – every `Fixed<[u8; N]>` gets `.random()`
impl<const N: usize> SecureRandomExt for Fixed<[u8; N]> {
    #[inline]
    fn random() -> Result<Self, CryptError> {
        let mut secret = Fixed::new([0u8; N]);
        fill_random(secret.expose_secret_mut())?;
        Ok(secret)
    }
}
