//! Physical page storage behind the record layer.
//!
//! The record store delegates every byte transfer to a [`PageStore`].
//! Implementations only move bytes; they know nothing about records,
//! headers, or the free list.

mod file;
mod memory;

pub use file::FilePool;
pub use memory::MemoryPool;

use crate::errors::{StoreError, StoreResult};

/// Byte-level storage for a fixed-capacity pool.
///
/// Contract: a successful `write` makes exactly `bytes.len()` bytes
/// starting at `offset` readable as written. `clear` need not zero the
/// range; it only promises the range may be reused.
pub trait PageStore {
    /// Total pool size in bytes. Fixed for the lifetime of the store.
    fn capacity(&self) -> usize;

    /// Write `bytes` starting at `offset`.
    fn write(&self, offset: usize, bytes: &[u8]) -> StoreResult<()>;

    /// Fill `buf` from the range starting at `offset`.
    fn read(&self, offset: usize, buf: &mut [u8]) -> StoreResult<()>;

    /// Release `len` bytes starting at `offset` for reuse.
    fn clear(&self, offset: usize, len: usize) -> StoreResult<()>;

    /// Flush buffered writes to the backing medium, where one exists.
    fn sync(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Shared bounds check for page store implementations.
pub(crate) fn check_range(offset: usize, len: usize, capacity: usize) -> StoreResult<()> {
    if offset > capacity || len > capacity - offset.min(capacity) {
        return Err(StoreError::InvalidRange {
            offset: offset as i64,
            len,
            capacity,
        });
    }
    Ok(())
}
