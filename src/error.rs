//! # Error Types
//!
//! This module defines the error type used throughout the library.
//! All operations return [`Result<T, CryptError>`](CryptError).

use thiserror::Error;

/// The error type for all stream, scheme and codec operations.
///
/// Variants follow the failure taxonomy of the streaming engine: I/O,
/// initialization, framing, authentication, call ordering, blob codec, and
/// primitive failures.
#[derive(Error, Debug)]
pub enum CryptError {
    /// I/O error while opening, reading or writing a source or sink.
    ///
    /// Always fatal to the current operation; never retried.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key, MAC key or IV length mismatch, or an unsupported algorithm tag.
    ///
    /// Raised before any byte is processed.
    #[error("Init error: {0}")]
    Init(String),

    /// Padding marker missing or ciphertext not block-aligned.
    #[error("Framing error: {0}")]
    Framing(String),

    /// Computed authentication tag did not match the received tag.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// API called out of sequence (e.g. `plain_in` after the terminal call).
    #[error("State error: {0}")]
    State(String),

    /// Malformed key, scheme or signature blob.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Cryptographic primitive failure.
    ///
    /// This variant is used for:
    /// - KDF derivation failures
    /// - RNG failures
    /// - Output buffers smaller than the block-aligned requirement
    /// - Blocks of the wrong length handed to a cipher port
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl From<&'static str> for CryptError {
    fn from(msg: &'static str) -> Self {
        CryptError::Crypto(msg.to_string())
    }
}

impl From<serde_json::Error> for CryptError {
    fn from(err: serde_json::Error) -> Self {
        CryptError::Codec(format!("json: {err}"))
    }
}

impl From<base64::DecodeError> for CryptError {
    fn from(err: base64::DecodeError) -> Self {
        CryptError::Codec(format!("base64: {err}"))
    }
}

impl CryptError {
    /// `true` for the variants that signal tampered or corrupt input
    /// rather than misuse or environment failure.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, CryptError::Framing(_) | CryptError::Authentication(_))
    }
}
