//! src/codec.rs
//! Key, scheme and signature blobs: JSON with base64 byte fields
//!
//! Blobs are plain data; everything secret is base64 inside the JSON and is
//! moved into secret buffers as soon as it is decoded.

use crate::crypto::cipher::CipherAlgorithm;
use crate::error::CryptError;
use crate::keys::{KeyMetadata, SymmetricKey};
use crate::scheme::algorithm::{EncryptionScheme, SchemeAlgorithm};
use crate::scheme::session::ChainMode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Detached signature as exchanged with signing tools. Only carried, never
/// produced or checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub signer: String,
    pub algorithm: String,
    pub signature: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct KeyBlob {
    algorithm: String,
    bit_size: u32,
    key: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    purpose: String,
    #[serde(default)]
    owner: String,
}

#[derive(Serialize, Deserialize)]
struct SchemeBlob {
    algorithm: String,
    #[serde(default)]
    name: String,
    mode: String,
    pad: String,
    key: KeyBlob,
    mac_key: String,
    iv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct SignatureBlob {
    signer: String,
    algorithm: String,
    signature: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// keys
// ─────────────────────────────────────────────────────────────────────────────

fn key_to_blob(key: &SymmetricKey) -> KeyBlob {
    let meta = key.metadata();
    KeyBlob {
        algorithm: key.algorithm().to_string(),
        bit_size: key.bit_length(),
        key: STANDARD.encode(key.expose_key()),
        not_before: meta.not_before(),
        not_after: meta.not_after(),
        name: meta.name().to_owned(),
        purpose: meta.purpose().to_owned(),
        owner: meta.owner().to_owned(),
    }
}

fn key_from_blob(blob: KeyBlob) -> Result<SymmetricKey, CryptError> {
    let algorithm: CipherAlgorithm = blob.algorithm.parse()?;
    if blob.bit_size != algorithm.key_bits() {
        return Err(CryptError::Init(format!(
            "key blob says {} bits but algorithm is {algorithm}",
            blob.bit_size
        )));
    }
    let metadata = KeyMetadata::new()
        .with_name(blob.name)
        .with_purpose(blob.purpose)
        .with_owner(blob.owner)
        .with_validity(blob.not_before, blob.not_after)?;
    let mut bytes = STANDARD.decode(blob.key.as_bytes())?;
    let key = SymmetricKey::from_bytes(algorithm, &bytes, metadata);
    bytes.fill(0);
    key
}

pub fn serialize_key(key: &SymmetricKey) -> Result<Vec<u8>, CryptError> {
    Ok(serde_json::to_vec_pretty(&key_to_blob(key))?)
}

pub fn deserialize_key(data: &[u8]) -> Result<SymmetricKey, CryptError> {
    key_from_blob(serde_json::from_slice(data)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// schemes
// ─────────────────────────────────────────────────────────────────────────────

pub fn serialize_scheme(scheme: &EncryptionScheme) -> Result<Vec<u8>, CryptError> {
    let algorithm = scheme.algorithm();
    let blob = SchemeBlob {
        algorithm: algorithm.name().to_owned(),
        name: scheme.name().to_owned(),
        mode: algorithm.mode().name().to_owned(),
        pad: algorithm.pad().to_owned(),
        key: key_to_blob(scheme.key()),
        mac_key: STANDARD.encode(scheme.mac_key().expose_secret()),
        iv: STANDARD.encode(scheme.iv().expose_secret()),
        message_id: scheme.message_id().map(str::to_owned),
    };
    Ok(serde_json::to_vec_pretty(&blob)?)
}

/// CTR blobs are written with pad `none`, but older writers stored the
/// composite's `sympad` name.
fn pad_matches(algorithm: SchemeAlgorithm, pad: &str) -> bool {
    pad == algorithm.pad() || (algorithm.mode() == ChainMode::Ctr && pad == "sympad")
}

pub fn deserialize_scheme(data: &[u8]) -> Result<EncryptionScheme, CryptError> {
    let blob: SchemeBlob = serde_json::from_slice(data)?;
    let algorithm: SchemeAlgorithm = blob
        .algorithm
        .parse()
        .map_err(|_| CryptError::Codec(format!("unknown scheme '{}'", blob.algorithm)))?;
    if blob.mode != algorithm.mode().name() {
        return Err(CryptError::Codec(format!(
            "mode '{}' does not match scheme {algorithm}",
            blob.mode
        )));
    }
    if !pad_matches(algorithm, &blob.pad) {
        return Err(CryptError::Codec(format!(
            "pad '{}' does not match scheme {algorithm}",
            blob.pad
        )));
    }

    let key = key_from_blob(blob.key)?;
    let mut mac_key = STANDARD.decode(blob.mac_key.as_bytes())?;
    let iv = STANDARD.decode(blob.iv.as_bytes())?;
    let scheme =
        EncryptionScheme::make_scheme(algorithm, blob.name, key, &mac_key, &iv, blob.message_id);
    mac_key.fill(0);
    scheme
}

// ─────────────────────────────────────────────────────────────────────────────
// signatures
// ─────────────────────────────────────────────────────────────────────────────

pub fn serialize_signature(signature: &Signature) -> Result<Vec<u8>, CryptError> {
    let blob = SignatureBlob {
        signer: signature.signer.clone(),
        algorithm: signature.algorithm.clone(),
        signature: STANDARD.encode(&signature.signature),
    };
    Ok(serde_json::to_vec_pretty(&blob)?)
}

pub fn deserialize_signature(data: &[u8]) -> Result<Signature, CryptError> {
    let blob: SignatureBlob = serde_json::from_slice(data)?;
    if blob.signer.is_empty() {
        return Err(CryptError::Codec("signature has no signer".into()));
    }
    Ok(Signature {
        signer: blob.signer,
        algorithm: blob.algorithm,
        signature: STANDARD.decode(blob.signature.as_bytes())?,
    })
}
