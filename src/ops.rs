//! src/ops.rs
//! File-level operations: key and scheme files, encrypt/decrypt by scheme,
//! raw key or password, and whole-file MACs
//!
//! Outputs are written through a `BufWriter<File>`. When an operation fails
//! the partially written output file is removed.

use crate::aliases::{DerivedKeys48, Iv16, PasswordString, Salt16, Tag32};
use crate::codec::{deserialize_key, deserialize_scheme, serialize_key, serialize_scheme};
use crate::config::StreamOptions;
use crate::consts::{
    DEFAULT_TRANSFER_SIZE, HMAC_SHA256_TAG_SIZE, PASSWORD_DERIVED_LEN, PASSWORD_SALT_SIZE,
    SCHEME_ENC_KEY_SIZE, SCHEME_IV_SIZE,
};
use crate::crypto::cipher::{CipherAlgorithm, CipherPort, Direction};
use crate::crypto::kdf::pbkdf2::derive_password_keys;
use crate::crypto::mac::{HmacSha256Port, MacPort};
use crate::crypto::rng::SecureRandomExt;
use crate::error::CryptError;
use crate::keys::{KeyMetadata, SymmetricKey};
use crate::scheme::algorithm::{EncryptionScheme, SchemeAlgorithm};
use crate::scheme::authenticated::{
    decrypt_with_scheme, decrypt_with_session, encrypt_with_scheme, encrypt_with_session,
};
use crate::scheme::session::{Aes128HmacSha256Session, ChainMode};
use crate::stream::driver::{decrypt_stream, encrypt_stream, StreamSummary};
use crate::stream::source::{ByteSource, SizedReader};
use crate::utils::tags_match;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Chaining used for password-protected files.
const PASSWORD_MODE: ChainMode = ChainMode::Cbc;

/// Bytes in front of the authenticated body of a password-protected file.
const PASSWORD_HEADER_LEN: usize = PASSWORD_SALT_SIZE + SCHEME_IV_SIZE;

// ─────────────────────────────────────────────────────────────────────────────
// keys and schemes
// ─────────────────────────────────────────────────────────────────────────────

pub fn generate_key(
    algorithm: CipherAlgorithm,
    metadata: KeyMetadata,
) -> Result<SymmetricKey, CryptError> {
    SymmetricKey::generate(algorithm, metadata)
}

pub fn write_key_file(key: &SymmetricKey, path: impl AsRef<Path>) -> Result<(), CryptError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), algorithm = %key.algorithm(), "writing key file");
    fs::write(path, serialize_key(key)?)?;
    Ok(())
}

pub fn read_key_file(path: impl AsRef<Path>) -> Result<SymmetricKey, CryptError> {
    deserialize_key(&fs::read(path.as_ref())?)
}

pub fn generate_scheme(
    algorithm: SchemeAlgorithm,
    name: &str,
) -> Result<EncryptionScheme, CryptError> {
    EncryptionScheme::generate_scheme(algorithm, name)
}

pub fn write_scheme_file(
    scheme: &EncryptionScheme,
    path: impl AsRef<Path>,
) -> Result<(), CryptError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), scheme = %scheme.algorithm(), "writing scheme file");
    fs::write(path, serialize_scheme(scheme)?)?;
    Ok(())
}

pub fn read_scheme_file(path: impl AsRef<Path>) -> Result<EncryptionScheme, CryptError> {
    deserialize_scheme(&fs::read(path.as_ref())?)
}

// ─────────────────────────────────────────────────────────────────────────────
// file encryption
// ─────────────────────────────────────────────────────────────────────────────

/// Authenticated encrypt of `input` into `output` under `scheme`.
pub fn encrypt_file_with_scheme(
    scheme: &EncryptionScheme,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError> {
    let source = SizedReader::open(input.as_ref())?;
    tracing::debug!(scheme = %scheme.algorithm(), bytes = source.bytes_remaining(), "encrypting file");
    write_output(output.as_ref(), "encrypt", |sink| {
        encrypt_with_scheme(scheme, source, sink, options)
    })
}

/// Authenticated decrypt of `input` into `output` under `scheme`.
///
/// With the default policy a tag mismatch removes `output` and returns
/// [`CryptError::Authentication`].
pub fn decrypt_file_with_scheme(
    scheme: &EncryptionScheme,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError> {
    let source = SizedReader::open(input.as_ref())?;
    tracing::debug!(scheme = %scheme.algorithm(), bytes = source.bytes_remaining(), "decrypting file");
    write_output(output.as_ref(), "decrypt", |sink| {
        decrypt_with_scheme(scheme, source, sink, options)
    })
}

/// Unauthenticated `sympad` encrypt with a raw key of any supported algorithm.
pub fn encrypt_file_with_key(
    key: &SymmetricKey,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError> {
    let mut port = CipherPort::init(key.algorithm(), key.expose_key(), Direction::Encrypt)?;
    let source = SizedReader::open(input.as_ref())?;
    tracing::debug!(algorithm = %key.algorithm(), bytes = source.bytes_remaining(), "encrypting file with raw key");
    write_output(output.as_ref(), "encrypt", |sink| {
        encrypt_stream(&mut port, source, sink, options)
    })
}

pub fn decrypt_file_with_key(
    key: &SymmetricKey,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError> {
    let mut port = CipherPort::init(key.algorithm(), key.expose_key(), Direction::Decrypt)?;
    let source = SizedReader::open(input.as_ref())?;
    tracing::debug!(algorithm = %key.algorithm(), bytes = source.bytes_remaining(), "decrypting file with raw key");
    write_output(output.as_ref(), "decrypt", |sink| {
        decrypt_stream(&mut port, source, sink, options)
    })
}

/// Password-protected encrypt: `salt(16) || iv(16) || CBC body || tag`.
///
/// PBKDF2-HMAC-SHA512 over a fresh salt yields the AES-128 key and the MAC
/// key; the IV is drawn independently. `iterations` is not stored and must
/// be supplied again to decrypt; [`DEFAULT_PBKDF2_ITERATIONS`](crate::consts::DEFAULT_PBKDF2_ITERATIONS)
/// is a reasonable choice.
pub fn encrypt_file_with_password(
    password: &PasswordString,
    iterations: u32,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError> {
    let salt = Salt16::random()?;
    let iv = Iv16::random()?;
    let mut session = password_session(password, iterations, &salt, &iv, Direction::Encrypt)?;
    let source = SizedReader::open(input.as_ref())?;
    tracing::debug!(iterations, bytes = source.bytes_remaining(), "encrypting file with password");

    write_output(output.as_ref(), "encrypt", |sink| {
        sink.write_all(salt.expose_secret())?;
        sink.write_all(iv.expose_secret())?;
        let mut summary = encrypt_with_session(&mut session, source, &mut *sink, options)?;
        summary.produced += PASSWORD_HEADER_LEN as u64;
        Ok(summary)
    })
}

pub fn decrypt_file_with_password(
    password: &PasswordString,
    iterations: u32,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError> {
    let mut source = SizedReader::open(input.as_ref())?;
    if source.bytes_remaining() < PASSWORD_HEADER_LEN as u64 {
        return Err(CryptError::Framing(format!(
            "password file shorter than its {PASSWORD_HEADER_LEN}-byte header"
        )));
    }
    let mut salt = Salt16::new([0u8; PASSWORD_SALT_SIZE]);
    let mut iv = Iv16::new([0u8; SCHEME_IV_SIZE]);
    source.read_exact(salt.expose_secret_mut())?;
    source.read_exact(iv.expose_secret_mut())?;
    let mut session = password_session(password, iterations, &salt, &iv, Direction::Decrypt)?;
    tracing::debug!(iterations, bytes = source.bytes_remaining(), "decrypting file with password");

    write_output(output.as_ref(), "decrypt", |sink| {
        let mut summary = decrypt_with_session(&mut session, source, sink, options)?;
        summary.consumed += PASSWORD_HEADER_LEN as u64;
        Ok(summary)
    })
}

fn password_session(
    password: &PasswordString,
    iterations: u32,
    salt: &Salt16,
    iv: &Iv16,
    direction: Direction,
) -> Result<Aes128HmacSha256Session, CryptError> {
    let mut derived = DerivedKeys48::new([0u8; PASSWORD_DERIVED_LEN]);
    derive_password_keys(password, salt, iterations, &mut derived)?;
    let (enc_key, mac_key) = derived.expose_secret().split_at(SCHEME_ENC_KEY_SIZE);
    let mut session = Aes128HmacSha256Session::new(PASSWORD_MODE);
    match direction {
        Direction::Encrypt => session.init_enc(enc_key, mac_key, iv.expose_secret())?,
        Direction::Decrypt => session.init_dec(enc_key, mac_key, iv.expose_secret())?,
    }
    Ok(session)
}

// ─────────────────────────────────────────────────────────────────────────────
// MAC
// ─────────────────────────────────────────────────────────────────────────────

/// HMAC-SHA256 over the whole of `input`.
pub fn mac_file(mac_key: &[u8], input: impl AsRef<Path>) -> Result<Tag32, CryptError> {
    if mac_key.is_empty() {
        return Err(CryptError::Init("empty MAC key".into()));
    }
    let mut source = SizedReader::open(input.as_ref())?;
    let mut mac = HmacSha256Port::new(mac_key)?;
    let mut buf = vec![0u8; DEFAULT_TRANSFER_SIZE];
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        mac.update(&buf[..n]);
    }
    if source.bytes_remaining() != 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "file shrank while reading").into());
    }
    let mut tag = Tag32::new([0u8; HMAC_SHA256_TAG_SIZE]);
    mac.finalize_into(tag.expose_secret_mut())?;
    Ok(tag)
}

/// Recompute the file MAC and compare it with `expected` in constant time.
pub fn verify_mac_file(
    mac_key: &[u8],
    input: impl AsRef<Path>,
    expected: &[u8],
) -> Result<bool, CryptError> {
    let tag = mac_file(mac_key, input)?;
    let valid = tags_match(tag.expose_secret(), expected);
    if !valid {
        tracing::warn!("file MAC mismatch");
    }
    Ok(valid)
}

// ─────────────────────────────────────────────────────────────────────────────
// output handling
// ─────────────────────────────────────────────────────────────────────────────

/// Create `path`, run `op` against it, and remove the file if anything fails.
fn write_output<F>(path: &Path, op: &str, f: F) -> Result<StreamSummary, CryptError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<StreamSummary, CryptError>,
{
    let mut sink = BufWriter::new(File::create(path)?);
    let result = f(&mut sink).and_then(|summary| {
        sink.flush()?;
        Ok(summary)
    });
    drop(sink);

    if let Err(err) = &result {
        tracing::warn!(path = %path.display(), op, error = %err, "removing partial output");
        if let Err(rm) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %rm, "could not remove partial output");
        }
    }
    result
}
