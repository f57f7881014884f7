//! src/stream/cursor.rs
//! Chunk planning: how much to read next, and whether it is the last read
//!
//! The decision is a pure function of `(remaining, transfer, reserve, B)`.
//! `reserve` is how many bytes the terminal call needs at minimum, so that
//! bytes the last call depends on (the last ciphertext block, the tag) are
//! never streamed early.

use crate::error::CryptError;
use crate::utils::align_down;

/// One planned read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub len: usize,
    pub is_final: bool,
}

/// `transfer` aligned down to whole blocks, never below one block.
#[inline(always)]
pub fn aligned_transfer(transfer: usize, block_size: usize) -> usize {
    align_down(transfer, block_size).max(block_size)
}

/// Largest chunk [`plan_chunk`] can return while walking a source of
/// `remaining` bytes.
///
/// Bounded by the input as well as the transfer size, so a large transfer
/// over a small source allocates only what the source can fill.
pub fn chunk_capacity(
    remaining: u64,
    transfer: usize,
    reserve: usize,
    block_size: usize,
) -> Result<usize, CryptError> {
    if block_size == 0 {
        return Err(CryptError::Init("block size must be non-zero".into()));
    }
    let spare = remaining.saturating_sub(reserve as u64);
    let streamable = spare - spare % block_size as u64;
    let streamed = streamable.min(aligned_transfer(transfer, block_size) as u64) as usize;
    // a final chunk is shorter than reserve + one block
    let last = reserve
        .checked_add(block_size)
        .ok_or_else(|| CryptError::Crypto(format!("reserve {reserve} overflows chunk size")))?;
    Ok(streamed.max(last))
}

/// `capacity + extra` for output buffers, failing instead of wrapping.
#[inline]
pub fn output_capacity(capacity: usize, extra: usize) -> Result<usize, CryptError> {
    capacity
        .checked_add(extra)
        .ok_or_else(|| CryptError::Crypto(format!("output buffer of {capacity} + {extra} bytes overflows")))
}

/// Plan the next read.
///
/// Streams as many whole blocks as the reserve allows (capped at the aligned
/// transfer size). When no whole block can be streamed, the chunk is final and
/// takes everything that is left.
pub fn plan_chunk(remaining: u64, transfer: usize, reserve: usize, block_size: usize) -> ChunkPlan {
    let transfer = aligned_transfer(transfer, block_size) as u64;
    let bs = block_size as u64;
    let spare = remaining.saturating_sub(reserve as u64);
    let streamable = spare - spare % bs;
    if streamable == 0 {
        ChunkPlan {
            // < reserve + B, so it fits in usize
            len: remaining as usize,
            is_final: true,
        }
    } else {
        ChunkPlan {
            len: streamable.min(transfer) as usize,
            is_final: false,
        }
    }
}

/// Position of one driver call inside its source.
#[derive(Debug, Clone)]
pub struct StreamCursor {
    consumed: u64,
    remaining: u64,
    finalized: bool,
}

impl StreamCursor {
    pub fn new(total_len: u64) -> Self {
        Self {
            consumed: 0,
            remaining: total_len,
            finalized: false,
        }
    }

    /// Plan the next chunk. Fails with `State` once the final chunk was taken.
    pub fn plan(
        &self,
        transfer: usize,
        reserve: usize,
        block_size: usize,
    ) -> Result<ChunkPlan, CryptError> {
        if self.finalized {
            return Err(CryptError::State("stream already finalized".into()));
        }
        if block_size == 0 {
            return Err(CryptError::Init("block size must be non-zero".into()));
        }
        Ok(plan_chunk(self.remaining, transfer, reserve, block_size))
    }

    /// Record that `plan` was read in full.
    pub fn advance(&mut self, plan: ChunkPlan) -> Result<(), CryptError> {
        if self.finalized {
            return Err(CryptError::State("stream already finalized".into()));
        }
        let len = plan.len as u64;
        if len > self.remaining {
            return Err(CryptError::State(format!(
                "chunk of {len} bytes exceeds the {} remaining",
                self.remaining
            )));
        }
        self.consumed += len;
        self.remaining -= len;
        self.finalized = plan.is_final;
        Ok(())
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}
