//! src/scheme/authenticated.rs
//! Authenticated stream drivers that feed a session chunk by chunk
//!
//! The cursor plans every read with the session's `minimum_final_*_in`
//! reserve, so the terminal call always sees the last block and the whole tag.

use crate::config::{StreamOptions, VerifyPolicy};
use crate::crypto::cipher::BlockCipher;
use crate::crypto::mac::MacPort;
use crate::error::CryptError;
use crate::scheme::algorithm::EncryptionScheme;
use crate::scheme::session::{EncryptThenMac, SessionState};
use crate::stream::cursor::{chunk_capacity, output_capacity, StreamCursor};
use crate::stream::driver::StreamSummary;
use crate::stream::source::ByteSource;
use std::io::Write;

/// Encrypt all of `source` with an `Encrypting` session, tag appended.
pub fn encrypt_with_session<C, M, S, W>(
    session: &mut EncryptThenMac<C, M>,
    mut source: S,
    mut sink: W,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError>
where
    C: BlockCipher,
    M: MacPort,
    S: ByteSource,
    W: Write,
{
    if session.state() != SessionState::Encrypting {
        return Err(CryptError::State(format!(
            "encrypt driver needs an encrypting session, got {:?}",
            session.state()
        )));
    }
    let bs = session.block_size();
    let reserve = session.minimum_final_encrypt_in();
    let transfer = options.transfer_size();
    let total = source.bytes_remaining();
    let capacity = chunk_capacity(total, transfer, reserve, bs)?;

    let mut cursor = StreamCursor::new(total);
    let mut input = vec![0u8; capacity];
    let mut output = vec![0u8; output_capacity(capacity, bs + session.tag_size())?];
    let mut produced = 0u64;

    loop {
        let plan = cursor.plan(transfer, reserve, bs)?;
        let chunk = &mut input[..plan.len];
        source.read_exact(chunk)?;
        cursor.advance(plan)?;

        let n = if plan.is_final {
            session.final_plain_in(chunk, &mut output)?
        } else {
            session.plain_in(chunk, &mut output)?
        };
        sink.write_all(&output[..n])?;
        produced += n as u64;

        if plan.is_final {
            break;
        }
    }

    sink.flush()?;
    input.fill(0);
    Ok(StreamSummary {
        consumed: cursor.consumed(),
        produced,
        message_valid: None,
    })
}

/// Decrypt all of `source` with a `Decrypting` session.
///
/// Release of plaintext follows [`StreamOptions::policy`]:
///
/// * [`VerifyPolicy::VerifyBeforeRelease`] stages the plaintext and writes it
///   only after the tag verifies; otherwise [`CryptError::Authentication`]
///   and the sink is untouched. The staging buffer holds the entire
///   plaintext, so memory use is proportional to the message.
/// * [`VerifyPolicy::LegacyReleaseUnverified`] writes as it goes and reports
///   the outcome in [`StreamSummary::message_valid`].
///
/// Under either policy a padding failure on a message whose tag did not
/// verify is reported as [`CryptError::Authentication`].
pub fn decrypt_with_session<C, M, S, W>(
    session: &mut EncryptThenMac<C, M>,
    mut source: S,
    mut sink: W,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError>
where
    C: BlockCipher,
    M: MacPort,
    S: ByteSource,
    W: Write,
{
    if session.state() != SessionState::Decrypting {
        return Err(CryptError::State(format!(
            "decrypt driver needs a decrypting session, got {:?}",
            session.state()
        )));
    }
    let bs = session.block_size();
    let reserve = session.minimum_final_decrypt_in();
    let transfer = options.transfer_size();
    let total = source.bytes_remaining();
    let capacity = chunk_capacity(total, transfer, reserve, bs)?;
    let policy = options.policy();

    let mut cursor = StreamCursor::new(total);
    let mut input = vec![0u8; capacity];
    let mut output = vec![0u8; output_capacity(capacity, bs)?];
    let mut staged = Vec::new();
    let mut produced = 0u64;

    let mut release = |plain: &[u8], sink: &mut W| -> Result<(), CryptError> {
        match policy {
            VerifyPolicy::VerifyBeforeRelease => staged.extend_from_slice(plain),
            VerifyPolicy::LegacyReleaseUnverified => sink.write_all(plain)?,
        }
        Ok(())
    };

    loop {
        let plan = cursor.plan(transfer, reserve, bs)?;
        let chunk = &mut input[..plan.len];
        source.read_exact(chunk)?;
        cursor.advance(plan)?;

        if !plan.is_final {
            let n = session.cipher_in(chunk, &mut output)?;
            release(&output[..n], &mut sink)?;
            produced += n as u64;
            continue;
        }

        match session.final_cipher_in(chunk, &mut output) {
            Ok(n) => {
                release(&output[..n], &mut sink)?;
                produced += n as u64;
            }
            Err(CryptError::Framing(msg))
                if session.state() == SessionState::Finalized && !session.message_valid() =>
            {
                return Err(CryptError::Authentication(format!(
                    "tag mismatch (padding also invalid: {msg})"
                )));
            }
            Err(e) => return Err(e),
        }
        break;
    }
    output.fill(0);
    input.fill(0);

    let valid = session.message_valid();
    match policy {
        VerifyPolicy::VerifyBeforeRelease => {
            if !valid {
                staged.fill(0);
                return Err(CryptError::Authentication(
                    "authentication tag mismatch".into(),
                ));
            }
            sink.write_all(&staged)?;
            staged.fill(0);
        }
        VerifyPolicy::LegacyReleaseUnverified => {
            if !valid {
                tracing::warn!(
                    bytes = produced,
                    "authentication tag mismatch; plaintext was released unverified"
                );
            }
        }
    }

    sink.flush()?;
    Ok(StreamSummary {
        consumed: cursor.consumed(),
        produced,
        message_valid: Some(valid),
    })
}

/// Encrypt `source` under `scheme` with a fresh session.
pub fn encrypt_with_scheme<S: ByteSource, W: Write>(
    scheme: &EncryptionScheme,
    source: S,
    sink: W,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError> {
    let mut session = scheme.encryptor()?;
    encrypt_with_session(&mut session, source, sink, options)
}

/// Decrypt `source` under `scheme` with a fresh session.
pub fn decrypt_with_scheme<S: ByteSource, W: Write>(
    scheme: &EncryptionScheme,
    source: S,
    sink: W,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError> {
    let mut session = scheme.decryptor()?;
    decrypt_with_session(&mut session, source, sink, options)
}
