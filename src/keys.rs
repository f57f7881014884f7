//! src/keys.rs
//! Symmetric keys with algorithm tag and validity metadata

use crate::aliases::KeyBuffer32;
use crate::consts::{DEFAULT_KEY_LIFETIME_DAYS, MAX_KEY_BYTES};
use crate::crypto::cipher::CipherAlgorithm;
use crate::crypto::rng::fill_random;
use crate::error::CryptError;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Descriptive fields and validity window carried alongside a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMetadata {
    name: String,
    purpose: String,
    owner: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl KeyMetadata {
    /// Valid from now for [`DEFAULT_KEY_LIFETIME_DAYS`].
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            name: String::new(),
            purpose: String::new(),
            owner: String::new(),
            not_before: now,
            not_after: now + Duration::days(DEFAULT_KEY_LIFETIME_DAYS),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Keep `not_before`, move `not_after` to `not_before + lifetime`.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.not_after = self.not_before + lifetime;
        self
    }

    /// Set the window explicitly. `not_after` earlier than `not_before` is an
    /// [`CryptError::Init`].
    pub fn with_validity(
        mut self,
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
    ) -> Result<Self, CryptError> {
        if not_after < not_before {
            return Err(CryptError::Init(
                "key validity ends before it begins".into(),
            ));
        }
        self.not_before = not_before;
        self.not_after = not_after;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

impl Default for KeyMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a key lifetime such as `1Y`, `90D` or `12H`.
///
/// A year is a common year of 365 days. A bare number counts years.
pub fn parse_duration(code: &str) -> Result<Duration, CryptError> {
    let code = code.trim();
    let bad = || CryptError::Init(format!("unrecognized duration '{code}'"));
    let split = code
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(code.len());
    let (digits, unit) = code.split_at(split);
    let n: i64 = digits.parse().map_err(|_| bad())?;
    let duration = match unit {
        "" | "Y" | "y" => n.checked_mul(365).and_then(Duration::try_days),
        "D" | "d" => Duration::try_days(n),
        "H" | "h" => Duration::try_hours(n),
        _ => None,
    };
    duration.ok_or_else(bad)
}

/// Raw key bytes bound to their algorithm tag.
///
/// The bytes live in a fixed 32-byte secret buffer; only the first
/// `bit_length / 8` are meaningful.
pub struct SymmetricKey {
    algorithm: CipherAlgorithm,
    key: KeyBuffer32,
    metadata: KeyMetadata,
}

impl SymmetricKey {
    /// Fresh random key of `algorithm.key_len()` bytes.
    pub fn generate(
        algorithm: CipherAlgorithm,
        metadata: KeyMetadata,
    ) -> Result<Self, CryptError> {
        let mut key = KeyBuffer32::new([0u8; MAX_KEY_BYTES]);
        fill_random(&mut key.expose_secret_mut()[..algorithm.key_len()])?;
        tracing::debug!(%algorithm, name = metadata.name(), "generated symmetric key");
        Ok(Self {
            algorithm,
            key,
            metadata,
        })
    }

    /// Wrap existing key bytes. The length must match the algorithm.
    pub fn from_bytes(
        algorithm: CipherAlgorithm,
        bytes: &[u8],
        metadata: KeyMetadata,
    ) -> Result<Self, CryptError> {
        if bytes.len() != algorithm.key_len() {
            return Err(CryptError::Init(format!(
                "{algorithm} needs {} key bytes, got {}",
                algorithm.key_len(),
                bytes.len()
            )));
        }
        let mut key = KeyBuffer32::new([0u8; MAX_KEY_BYTES]);
        key.expose_secret_mut()[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            algorithm,
            key,
            metadata,
        })
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    pub fn bit_length(&self) -> u32 {
        self.algorithm.key_bits()
    }

    pub fn metadata(&self) -> &KeyMetadata {
        &self.metadata
    }

    /// The meaningful key bytes.
    #[inline]
    pub fn expose_key(&self) -> &[u8] {
        &self.key.expose_secret()[..self.algorithm.key_len()]
    }

    /// An independent copy; secret buffers do not implement `Clone`.
    pub fn duplicate(&self) -> Self {
        Self {
            algorithm: self.algorithm,
            key: KeyBuffer32::new(*self.key.expose_secret()),
            metadata: self.metadata.clone(),
        }
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("algorithm", &self.algorithm)
            .field("metadata", &self.metadata)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("1Y").unwrap(), Duration::days(365));
        assert_eq!(parse_duration("2").unwrap(), Duration::days(730));
        assert_eq!(parse_duration("90D").unwrap(), Duration::days(90));
        assert_eq!(parse_duration("12h").unwrap(), Duration::hours(12));
        for bad in ["", "Y", "1Q", "-1Y", "1.5Y"] {
            assert!(parse_duration(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn generated_key_has_algorithm_length() {
        let key = SymmetricKey::generate(CipherAlgorithm::AES_192, KeyMetadata::new()).unwrap();
        assert_eq!(key.expose_key().len(), 24);
        assert_eq!(key.bit_length(), 192);
        assert!(key.metadata().is_valid_at(Utc::now()));
    }

    #[test]
    fn from_bytes_checks_length() {
        let err = SymmetricKey::from_bytes(CipherAlgorithm::AES_128, &[0u8; 32], KeyMetadata::new())
            .unwrap_err();
        assert!(matches!(err, CryptError::Init(_)));
    }

    #[test]
    fn debug_redacts_key() {
        let key =
            SymmetricKey::from_bytes(CipherAlgorithm::TEA_128, &[0xAB; 16], KeyMetadata::new())
                .unwrap();
        let shown = format!("{key:?}");
        assert!(!shown.contains("171, 171"));
        assert!(shown.contains("REDACTED"));
    }

    #[test]
    fn metadata_builder() {
        let meta = KeyMetadata::new()
            .with_name("k1")
            .with_purpose("file-encryption")
            .with_owner("ops")
            .with_lifetime(Duration::days(1));
        assert_eq!(meta.name(), "k1");
        assert_eq!(meta.not_after() - meta.not_before(), Duration::days(1));
        let now = Utc::now();
        assert!(KeyMetadata::new()
            .with_validity(now, now - Duration::days(1))
            .is_err());
    }
}
