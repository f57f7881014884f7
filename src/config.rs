//! src/config.rs
//! Stream options: transfer size and decrypt release policy

use crate::consts::{DEFAULT_TRANSFER_SIZE, MAX_TRANSFER_SIZE};

/// What the authenticated decrypt driver does with plaintext before the tag
/// has been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyPolicy {
    /// Stage plaintext in memory; write it only after the tag verifies.
    /// A mismatch returns [`CryptError::Authentication`](crate::CryptError::Authentication)
    /// and the sink receives nothing.
    ///
    /// The whole plaintext is held in one heap buffer until the final
    /// chunk, so peak memory grows with the message size, not with
    /// [`StreamOptions::transfer_size`]. Use
    /// [`LegacyReleaseUnverified`](Self::LegacyReleaseUnverified) for
    /// messages that do not fit in memory.
    #[default]
    VerifyBeforeRelease,

    /// Write plaintext as it is produced and report the tag result in
    /// [`StreamSummary::message_valid`](crate::StreamSummary::message_valid).
    /// Needed for inputs too large to stage; the caller must discard the
    /// output on `Some(false)`.
    LegacyReleaseUnverified,
}

/// Options shared by all stream drivers.
///
/// ```
/// use symcrypt_rs::{StreamOptions, VerifyPolicy};
///
/// let opts = StreamOptions::new()
///     .with_transfer_size(64 * 1024)
///     .with_policy(VerifyPolicy::LegacyReleaseUnverified);
/// assert_eq!(opts.transfer_size(), 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    transfer_size: usize,
    policy: VerifyPolicy,
}

impl StreamOptions {
    /// 2048-byte transfers, verify before release.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            transfer_size: DEFAULT_TRANSFER_SIZE,
            policy: VerifyPolicy::VerifyBeforeRelease,
        }
    }

    /// Bytes pulled from the source per chunk, clamped to
    /// `1..=`[`MAX_TRANSFER_SIZE`]. Drivers align it down to the cipher block
    /// size, and never go below one block.
    #[must_use]
    pub fn with_transfer_size(mut self, transfer_size: usize) -> Self {
        self.transfer_size = transfer_size.clamp(1, MAX_TRANSFER_SIZE);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: VerifyPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn transfer_size(&self) -> usize {
        self.transfer_size
    }

    #[must_use]
    pub const fn policy(&self) -> VerifyPolicy {
        self.policy
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self::new()
    }
}
