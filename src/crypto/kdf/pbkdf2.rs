//! src/crypto/kdf/pbkdf2.rs
//! PBKDF2-HMAC-SHA512 for password-derived schemes

use crate::aliases::{DerivedKeys48, HmacSha512, PasswordString, Salt16};
use crate::consts::{PBKDF2_MAX_ITER, PBKDF2_MIN_ITER};
use crate::error::CryptError;

use pbkdf2::pbkdf2;

/// Derive the encryption key and MAC key for a password scheme directly into
/// the caller's buffer.
///
/// The first 16 bytes become the AES-128 key, the remaining 32 the HMAC key. Both come
/// out of one PBKDF2 stream, so neither is a function of the other.
#[inline]
pub fn derive_password_keys(
    password: &PasswordString,
    salt: &Salt16,
    iterations: u32,
    out_keys: &mut DerivedKeys48,
) -> Result<(), CryptError> {
    if password.expose_secret().is_empty() {
        return Err(CryptError::Init("empty password".into()));
    }
    if !(PBKDF2_MIN_ITER..=PBKDF2_MAX_ITER).contains(&iterations) {
        return Err(CryptError::Init(format!(
            "PBKDF2 iterations must be in {PBKDF2_MIN_ITER}..={PBKDF2_MAX_ITER}"
        )));
    }

    pbkdf2::<HmacSha512>(
        password.expose_secret().as_bytes(),
        salt.expose_secret(),
        iterations,
        out_keys.expose_secret_mut(),
    )
    .map_err(|e| CryptError::Crypto(format!("PBKDF2 failed: {e}")))?;
    Ok(())
}
