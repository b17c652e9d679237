//! In-memory page storage.

use parking_lot::RwLock;

use super::{check_range, PageStore};
use crate::errors::StoreResult;

/// A pool held entirely in memory.
///
/// Suitable for tests and for runs that do not need the pool to outlive
/// the process. All operations take `&self`; the buffer is guarded by a
/// lock so the store can be shared behind one owner.
pub struct MemoryPool {
    bytes: RwLock<Vec<u8>>,
}

impl MemoryPool {
    /// Create a zeroed pool of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        MemoryPool {
            bytes: RwLock::new(vec![0; capacity]),
        }
    }
}

impl PageStore for MemoryPool {
    fn capacity(&self) -> usize {
        self.bytes.read().len()
    }

    fn write(&self, offset: usize, bytes: &[u8]) -> StoreResult<()> {
        let mut pool = self.bytes.write();
        check_range(offset, bytes.len(), pool.len())?;
        pool[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> StoreResult<()> {
        let pool = self.bytes.read();
        check_range(offset, buf.len(), pool.len())?;
        buf.copy_from_slice(&pool[offset..offset + buf.len()]);
        Ok(())
    }

    fn clear(&self, offset: usize, len: usize) -> StoreResult<()> {
        let mut pool = self.bytes.write();
        check_range(offset, len, pool.len())?;
        pool[offset..offset + len].fill(0);
        Ok(())
    }
}
