//! Record-level management of the byte pool.
//!
//! A record is one header byte (payload length, 0-255) followed by the
//! payload. The store reserves and reclaims space through the free list
//! and delegates every physical byte transfer to the page store. It
//! never interprets payload contents.

use crate::errors::{StoreError, StoreResult};
use crate::free_list::{FreeList, FreeBlock};
use crate::handle::Handle;
use crate::pool::PageStore;

/// Largest payload a single record can carry; the length header is one
/// byte.
pub const MAX_PAYLOAD: usize = 255;

/// Length-prefixed record storage over a fixed-size pool.
pub struct RecordStore<S: PageStore> {
    pages: S,
    free: FreeList,
}

impl<S: PageStore> RecordStore<S> {
    /// Wrap a page store, treating its whole capacity as unused.
    pub fn new(pages: S) -> Self {
        let capacity = pages.capacity();
        RecordStore {
            pages,
            free: FreeList::new(capacity),
        }
    }

    /// Store `payload` and return a handle to the new record.
    ///
    /// Reserves `payload.len() + 1` bytes. An exhausted pool surfaces as
    /// `OutOfSpace` with nothing reserved; the pool never grows.
    pub fn insert(&mut self, payload: &[u8]) -> StoreResult<Handle> {
        if payload.len() > MAX_PAYLOAD {
            return Err(StoreError::RecordTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD,
            });
        }

        let offset = self.free.allocate(payload.len() + 1)?;
        let mut image = Vec::with_capacity(payload.len() + 1);
        image.push(payload.len() as u8);
        image.extend_from_slice(payload);

        if let Err(e) = self.pages.write(offset, &image) {
            // The reservation must not outlive a failed write.
            if let Err(undo) = self.free.free(image.len(), offset) {
                log::error!("could not return {} bytes at {offset}: {undo}", image.len());
            }
            return Err(e);
        }
        Ok(Handle::new(offset as i32))
    }

    /// Destroy the record at `handle`, returning its bytes to the free
    /// list.
    pub fn remove(&mut self, handle: Handle) -> StoreResult<()> {
        let offset = self.checked_offset(handle, 1)?;
        let stored = self.size_of(handle)?;
        self.pages.clear(offset, stored + 1)?;
        self.free.free(stored + 1, offset)
    }

    /// Copy up to `buf.len()` payload bytes of the record at `handle`
    /// into `buf`, returning how many bytes were copied
    /// (`min(buf.len(), stored length)`).
    pub fn get(&self, handle: Handle, buf: &mut [u8]) -> StoreResult<usize> {
        let offset = self.checked_offset(handle, 1)?;
        let stored = self.size_of(handle)?;
        let n = buf.len().min(stored);
        self.pages.read(offset + 1, &mut buf[..n])?;
        Ok(n)
    }

    /// The full payload of the record at `handle`.
    pub fn payload(&self, handle: Handle) -> StoreResult<Vec<u8>> {
        let stored = self.size_of(handle)?;
        let mut buf = vec![0u8; stored];
        self.get(handle, &mut buf)?;
        Ok(buf)
    }

    /// The stored payload length of the record at `handle`.
    pub fn size_of(&self, handle: Handle) -> StoreResult<usize> {
        let offset = self.checked_offset(handle, 1)?;
        let mut header = [0u8; 1];
        self.pages.read(offset, &mut header)?;
        Ok(header[0] as usize)
    }

    /// Free-space ledger, for diagnostics and invariant checks.
    pub fn free_list(&self) -> &FreeList {
        &self.free
    }

    /// Free blocks in list order.
    pub fn free_blocks(&self) -> &[FreeBlock] {
        self.free.blocks()
    }

    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }

    pub fn pages(&self) -> &S {
        &self.pages
    }

    fn checked_offset(&self, handle: Handle, len: usize) -> StoreResult<usize> {
        let offset = handle.offset();
        if offset < 0 || offset as usize + len > self.capacity() {
            return Err(StoreError::InvalidRange {
                offset: offset as i64,
                len,
                capacity: self.capacity(),
            });
        }
        Ok(offset as usize)
    }
}
