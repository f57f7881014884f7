//! src/scheme/algorithm.rs
//! Composite scheme descriptors and the persisted scheme bundle

use crate::aliases::{Iv16, MacKey32};
use crate::consts::{
    AES128_CBC_HMACSHA256_SYMPAD, AES128_CTR_HMACSHA256_SYMPAD, SCHEME_IV_SIZE,
    SCHEME_MAC_KEY_SIZE,
};
use crate::crypto::cipher::CipherAlgorithm;
use crate::crypto::rng::SecureRandomExt;
use crate::error::CryptError;
use crate::keys::{KeyMetadata, SymmetricKey};
use crate::scheme::session::{Aes128HmacSha256Session, ChainMode, EncryptThenMac};
use std::fmt;
use std::str::FromStr;

/// The fixed set of encrypt-then-MAC constructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeAlgorithm {
    Aes128CbcHmacSha256Sympad,
    Aes128CtrHmacSha256Sympad,
}

impl SchemeAlgorithm {
    pub const fn name(self) -> &'static str {
        match self {
            SchemeAlgorithm::Aes128CbcHmacSha256Sympad => AES128_CBC_HMACSHA256_SYMPAD,
            SchemeAlgorithm::Aes128CtrHmacSha256Sympad => AES128_CTR_HMACSHA256_SYMPAD,
        }
    }

    pub const fn mode(self) -> ChainMode {
        match self {
            SchemeAlgorithm::Aes128CbcHmacSha256Sympad => ChainMode::Cbc,
            SchemeAlgorithm::Aes128CtrHmacSha256Sympad => ChainMode::Ctr,
        }
    }

    /// Padding actually applied on the wire. CTR carries the `sympad` name
    /// but never pads.
    pub const fn pad(self) -> &'static str {
        match self.mode() {
            ChainMode::Cbc => "sympad",
            ChainMode::Ctr => "none",
        }
    }

    pub const fn cipher(self) -> CipherAlgorithm {
        CipherAlgorithm::AES_128
    }
}

impl fmt::Display for SchemeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemeAlgorithm {
    type Err = CryptError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            AES128_CBC_HMACSHA256_SYMPAD => Ok(SchemeAlgorithm::Aes128CbcHmacSha256Sympad),
            AES128_CTR_HMACSHA256_SYMPAD => Ok(SchemeAlgorithm::Aes128CtrHmacSha256Sympad),
            other => Err(CryptError::Init(format!("unsupported scheme '{other}'"))),
        }
    }
}

/// Everything one encrypt or decrypt session needs: algorithm, independent
/// encryption and MAC keys, IV, and an optional message id.
///
/// Immutable once built. Every session spawned from one scheme uses the same
/// IV, so a scheme must not encrypt two different messages.
pub struct EncryptionScheme {
    algorithm: SchemeAlgorithm,
    name: String,
    key: SymmetricKey,
    mac_key: MacKey32,
    iv: Iv16,
    message_id: Option<String>,
}

impl EncryptionScheme {
    /// Bundle supplied material. Lengths are checked here so that sessions
    /// spawned later cannot fail on them.
    pub fn make_scheme(
        algorithm: SchemeAlgorithm,
        name: impl Into<String>,
        key: SymmetricKey,
        mac_key: &[u8],
        iv: &[u8],
        message_id: Option<String>,
    ) -> Result<Self, CryptError> {
        if key.algorithm() != algorithm.cipher() {
            return Err(CryptError::Init(format!(
                "{algorithm} needs an {} key, got {}",
                algorithm.cipher(),
                key.algorithm()
            )));
        }
        let mac_key: [u8; SCHEME_MAC_KEY_SIZE] = mac_key.try_into().map_err(|_| {
            CryptError::Init(format!(
                "MAC key must be {SCHEME_MAC_KEY_SIZE} bytes, got {}",
                mac_key.len()
            ))
        })?;
        let iv: [u8; SCHEME_IV_SIZE] = iv.try_into().map_err(|_| {
            CryptError::Init(format!(
                "IV must be {SCHEME_IV_SIZE} bytes, got {}",
                iv.len()
            ))
        })?;
        Ok(Self {
            algorithm,
            name: name.into(),
            key,
            mac_key: MacKey32::new(mac_key),
            iv: Iv16::new(iv),
            message_id,
        })
    }

    /// Fresh random encryption key, MAC key and IV, drawn independently.
    pub fn generate_scheme(
        algorithm: SchemeAlgorithm,
        name: impl Into<String>,
    ) -> Result<Self, CryptError> {
        let name = name.into();
        let key = SymmetricKey::generate(
            algorithm.cipher(),
            KeyMetadata::new()
                .with_name(format!("{name}-key"))
                .with_purpose("scheme-encryption"),
        )?;
        let mac_key = MacKey32::random()?;
        let iv = Iv16::random()?;
        tracing::debug!(%algorithm, %name, "generated encryption scheme");
        Ok(Self {
            algorithm,
            name,
            key,
            mac_key,
            iv,
            message_id: None,
        })
    }

    pub fn algorithm(&self) -> SchemeAlgorithm {
        self.algorithm
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }

    pub fn mac_key(&self) -> &MacKey32 {
        &self.mac_key
    }

    pub fn iv(&self) -> &Iv16 {
        &self.iv
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Same keys, different IV. For encrypting a further message under
    /// one key set.
    pub fn with_iv(&self, iv: &Iv16) -> Self {
        Self {
            algorithm: self.algorithm,
            name: self.name.clone(),
            key: self.key.duplicate(),
            mac_key: MacKey32::new(*self.mac_key.expose_secret()),
            iv: Iv16::new(*iv.expose_secret()),
            message_id: self.message_id.clone(),
        }
    }

    /// A session keyed for encryption.
    pub fn encryptor(&self) -> Result<Aes128HmacSha256Session, CryptError> {
        let mut session = EncryptThenMac::new(self.algorithm.mode());
        session.init_enc(
            self.key.expose_key(),
            self.mac_key.expose_secret(),
            self.iv.expose_secret(),
        )?;
        Ok(session)
    }

    /// A session keyed for decryption.
    pub fn decryptor(&self) -> Result<Aes128HmacSha256Session, CryptError> {
        let mut session = EncryptThenMac::new(self.algorithm.mode());
        session.init_dec(
            self.key.expose_key(),
            self.mac_key.expose_secret(),
            self.iv.expose_secret(),
        )?;
        Ok(session)
    }
}

impl fmt::Debug for EncryptionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionScheme")
            .field("algorithm", &self.algorithm)
            .field("name", &self.name)
            .field("key", &self.key)
            .field("message_id", &self.message_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for alg in [
            SchemeAlgorithm::Aes128CbcHmacSha256Sympad,
            SchemeAlgorithm::Aes128CtrHmacSha256Sympad,
        ] {
            assert_eq!(alg.name().parse::<SchemeAlgorithm>().unwrap(), alg);
        }
        assert!("aes256-gcm".parse::<SchemeAlgorithm>().is_err());
    }

    #[test]
    fn generated_material_is_independent() {
        let scheme =
            EncryptionScheme::generate_scheme(SchemeAlgorithm::Aes128CbcHmacSha256Sympad, "s")
                .unwrap();
        assert_eq!(scheme.key().expose_key().len(), 16);
        assert_ne!(
            &scheme.mac_key().expose_secret()[..16],
            scheme.key().expose_key()
        );
    }

    #[test]
    fn make_scheme_validates_material() {
        let key = || {
            SymmetricKey::from_bytes(CipherAlgorithm::AES_128, &[1; 16], KeyMetadata::new())
                .unwrap()
        };
        let alg = SchemeAlgorithm::Aes128CtrHmacSha256Sympad;
        assert!(EncryptionScheme::make_scheme(alg, "ok", key(), &[2; 32], &[3; 16], None).is_ok());
        for (mac, iv, desc) in [(&[2u8; 31][..], &[3u8; 16][..], "mac"), (&[2; 32][..], &[3; 8][..], "iv")] {
            let err = EncryptionScheme::make_scheme(alg, "bad", key(), mac, iv, None).unwrap_err();
            assert!(matches!(err, CryptError::Init(_)), "{desc}");
        }
        let twofish =
            SymmetricKey::from_bytes(CipherAlgorithm::TWOFISH_128, &[1; 16], KeyMetadata::new())
                .unwrap();
        assert!(matches!(
            EncryptionScheme::make_scheme(alg, "tf", twofish, &[2; 32], &[3; 16], None),
            Err(CryptError::Init(_))
        ));
    }

    #[test]
    fn debug_hides_secrets() {
        let scheme =
            EncryptionScheme::generate_scheme(SchemeAlgorithm::Aes128CtrHmacSha256Sympad, "dbg")
                .unwrap();
        let shown = format!("{scheme:?}");
        assert!(shown.contains("dbg"));
        assert!(!shown.contains("mac_key"));
    }
}
