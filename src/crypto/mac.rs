//! src/crypto/mac.rs
//! Keyed MAC port: incremental update, finalize once

use crate::aliases::HmacSha256;
use crate::consts::HMAC_SHA256_TAG_SIZE;
use crate::error::CryptError;
use crate::utils::ensure_output_len;
use hmac::Mac;

/// Incremental keyed MAC with a fixed tag size.
///
/// `finalize_into` may be called once; the port is spent afterwards.
pub trait MacPort {
    fn tag_size(&self) -> usize;

    fn update(&mut self, data: &[u8]);

    /// Write the tag into `out[..tag_size]`.
    fn finalize_into(&mut self, out: &mut [u8]) -> Result<(), CryptError>;
}

/// HMAC-SHA256 behind [`MacPort`].
pub struct HmacSha256Port {
    // `None` once finalized
    inner: Option<HmacSha256>,
}

impl HmacSha256Port {
    /// Any key length is accepted by HMAC; the schemes pin it to 32 bytes
    /// before reaching here.
    pub fn new(key: &[u8]) -> Result<Self, CryptError> {
        let inner = <HmacSha256 as Mac>::new_from_slice(key)
            .map_err(|e| CryptError::Init(format!("HMAC key rejected: {e}")))?;
        Ok(Self { inner: Some(inner) })
    }
}

impl MacPort for HmacSha256Port {
    #[inline(always)]
    fn tag_size(&self) -> usize {
        HMAC_SHA256_TAG_SIZE
    }

    #[inline(always)]
    fn update(&mut self, data: &[u8]) {
        if let Some(mac) = self.inner.as_mut() {
            mac.update(data);
        }
    }

    fn finalize_into(&mut self, out: &mut [u8]) -> Result<(), CryptError> {
        ensure_output_len(out, HMAC_SHA256_TAG_SIZE, "mac finalize")?;
        let mac = self
            .inner
            .take()
            .ok_or_else(|| CryptError::State("MAC already finalized".into()))?;
        out[..HMAC_SHA256_TAG_SIZE].copy_from_slice(mac.finalize().into_bytes().as_slice());
        Ok(())
    }
}
