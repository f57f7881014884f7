//! # Key Derivation Functions (KDF)
//!
//! Password-based derivation for the password-protected file operations.
//! The derivation itself is an opaque primitive (`pbkdf2` + `hmac` + `sha2`);
//! this module only fixes its parameters and output layout.

pub mod pbkdf2;
