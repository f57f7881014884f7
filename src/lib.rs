// src/lib.rs

pub mod aliases;
pub mod codec;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod ops;
pub mod padding;
pub mod scheme;
pub mod stream;
pub mod utils;

// High-level API
pub use config::{StreamOptions, VerifyPolicy};
pub use error::CryptError;
pub use keys::{parse_duration, KeyMetadata, SymmetricKey};
pub use scheme::{
    decrypt_with_scheme, decrypt_with_session, encrypt_with_scheme, encrypt_with_session,
    Aes128HmacSha256Session, ChainMode, EncryptThenMac, EncryptionScheme, SchemeAlgorithm,
    SessionState,
};
pub use stream::{decrypt_stream, encrypt_stream, ByteSource, SizedReader, StreamSummary};

// Primitive ports: for custom sessions over other ciphers or MACs
pub use crypto::cipher::{BlockCipher, CipherAlgorithm, CipherFamily, CipherPort, Direction};
pub use crypto::mac::{HmacSha256Port, MacPort};

pub use codec::Signature;
