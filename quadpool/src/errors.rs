//! Error types for pool storage operations.

use std::io;
use thiserror::Error;

/// Errors that can occur while operating on the byte pool.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The free list has no block large enough for the request. Nothing
    /// is reserved; the pool does not grow.
    #[error("not enough space in pool for {requested} bytes")]
    OutOfSpace { requested: usize },

    /// A free or read request referenced bytes outside the pool bounds.
    /// The operation is a no-op.
    #[error("range at offset {offset} ({len} bytes) is outside the {capacity}-byte pool")]
    InvalidRange {
        offset: i64,
        len: usize,
        capacity: usize,
    },

    /// A record payload exceeded the single-byte length ceiling.
    #[error("record payload of {len} bytes exceeds the {max}-byte limit")]
    RecordTooLarge { len: usize, max: usize },

    /// Stored bytes could not be decoded as the expected record shape.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for pool storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
