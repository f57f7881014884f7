//! src/stream/mod.rs
//! Chunked stream plumbing shared by the cipher-only and authenticated drivers

pub mod cursor;
pub mod driver;
pub mod source;

pub use cursor::{plan_chunk, ChunkPlan, StreamCursor};
pub use driver::{decrypt_stream, encrypt_stream, StreamSummary};
pub use source::{ByteSource, SizedReader};
