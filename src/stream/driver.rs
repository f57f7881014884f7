//! src/stream/driver.rs
//! Cipher-only streaming with `sympad` framing
//!
//! Each block goes through the port on its own (no chaining). This is the
//! unauthenticated path used for raw-key file encryption.

use crate::aliases::Block16;
use crate::config::StreamOptions;
use crate::consts::MAX_BLOCK_SIZE;
use crate::crypto::cipher::BlockCipher;
use crate::error::CryptError;
use crate::padding::{pad_final, unpad_final};
use crate::stream::cursor::{chunk_capacity, StreamCursor};
use crate::stream::source::ByteSource;
use std::io::Write;

/// What one driver call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Bytes pulled from the source.
    pub consumed: u64,
    /// Bytes pushed to the sink.
    pub produced: u64,
    /// Tag result for authenticated decrypts; `None` everywhere else.
    pub message_valid: Option<bool>,
}

/// Encrypt `source` into `sink`, padding the tail.
///
/// Output length is always [`padded_len`](crate::padding::padded_len) of the
/// input; an empty source yields exactly one pad block.
pub fn encrypt_stream<C, S, W>(
    cipher: &mut C,
    mut source: S,
    mut sink: W,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError>
where
    C: BlockCipher + ?Sized,
    S: ByteSource,
    W: Write,
{
    let bs = checked_block_size(cipher)?;
    let transfer = options.transfer_size();
    let total = source.bytes_remaining();
    let mut cursor = StreamCursor::new(total);
    let mut buf = vec![0u8; chunk_capacity(total, transfer, 0, bs)?];
    let mut produced = 0u64;

    loop {
        let plan = cursor.plan(transfer, 0, bs)?;
        let chunk = &mut buf[..plan.len];
        source.read_exact(chunk)?;
        cursor.advance(plan)?;

        if plan.is_final {
            let mut last = Block16::new([0u8; 16]);
            let n = pad_final(chunk, bs, last.expose_secret_mut())?;
            cipher.encrypt_block(&mut last.expose_secret_mut()[..n])?;
            sink.write_all(&last.expose_secret()[..n])?;
            produced += n as u64;
            break;
        }

        for block in chunk.chunks_exact_mut(bs) {
            cipher.encrypt_block(block)?;
        }
        sink.write_all(chunk)?;
        produced += plan.len as u64;
    }

    sink.flush()?;
    buf.fill(0);
    Ok(StreamSummary {
        consumed: cursor.consumed(),
        produced,
        message_valid: None,
    })
}

/// Decrypt `source` into `sink`, stripping the pad from the last block.
///
/// The ciphertext must be a positive multiple of the block size, and the last
/// block must carry the `0x80` marker; both failures are [`CryptError::Framing`].
/// Plaintext before the last block has already reached the sink when a
/// framing error is raised.
pub fn decrypt_stream<C, S, W>(
    cipher: &mut C,
    mut source: S,
    mut sink: W,
    options: &StreamOptions,
) -> Result<StreamSummary, CryptError>
where
    C: BlockCipher + ?Sized,
    S: ByteSource,
    W: Write,
{
    let bs = checked_block_size(cipher)?;
    let total = source.bytes_remaining();
    if total == 0 || total % bs as u64 != 0 {
        return Err(CryptError::Framing(format!(
            "ciphertext length {total} is not a positive multiple of {bs}"
        )));
    }

    let transfer = options.transfer_size();
    let mut cursor = StreamCursor::new(total);
    let mut buf = vec![0u8; chunk_capacity(total, transfer, bs, bs)?];
    let mut produced = 0u64;

    loop {
        // reserve one block so the padded block is always read last and alone
        let plan = cursor.plan(transfer, bs, bs)?;
        let chunk = &mut buf[..plan.len];
        source.read_exact(chunk)?;
        cursor.advance(plan)?;

        for block in chunk.chunks_exact_mut(bs) {
            cipher.decrypt_block(block)?;
        }

        if plan.is_final {
            let keep = unpad_final(chunk)?;
            sink.write_all(&chunk[..keep])?;
            produced += keep as u64;
            break;
        }

        sink.write_all(chunk)?;
        produced += plan.len as u64;
    }

    sink.flush()?;
    buf.fill(0);
    Ok(StreamSummary {
        consumed: cursor.consumed(),
        produced,
        message_valid: None,
    })
}

fn checked_block_size<C: BlockCipher + ?Sized>(cipher: &C) -> Result<usize, CryptError> {
    match cipher.block_size() {
        0 => Err(CryptError::Init("cipher reports a zero block size".into())),
        bs if bs > MAX_BLOCK_SIZE => Err(CryptError::Init(format!(
            "block size {bs} exceeds {MAX_BLOCK_SIZE}"
        ))),
        bs => Ok(bs),
    }
}
