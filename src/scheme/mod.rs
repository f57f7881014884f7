//! src/scheme/mod.rs
//! Authenticated encryption: composite schemes, the encrypt-then-MAC session,
//! and the stream drivers built on it

pub mod algorithm;
pub mod authenticated;
pub mod session;

pub use algorithm::{EncryptionScheme, SchemeAlgorithm};
pub use authenticated::{
    decrypt_with_scheme, decrypt_with_session, encrypt_with_scheme, encrypt_with_session,
};
pub use session::{Aes128HmacSha256Session, ChainMode, EncryptThenMac, SessionState};
