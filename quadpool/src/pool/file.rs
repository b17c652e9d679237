//! File-backed page storage.
//!
//! Each read or write is one seek plus one transfer against the backing
//! file; nothing is buffered or preloaded here.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::{check_range, PageStore};
use crate::errors::StoreResult;

/// A pool persisted in a fixed-size file.
pub struct FilePool {
    file: RwLock<File>,
    path: PathBuf,
    capacity: usize,
}

impl FilePool {
    /// Create a new pool file of `capacity` bytes, truncating any
    /// existing file at `path`.
    pub fn create(path: &Path, capacity: usize) -> StoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(capacity as u64)?;

        Ok(FilePool {
            file: RwLock::new(file),
            path: path.to_path_buf(),
            capacity,
        })
    }

    /// Open an existing pool file; its length is the pool capacity.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let capacity = file.metadata()?.len() as usize;

        Ok(FilePool {
            file: RwLock::new(file),
            path: path.to_path_buf(),
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageStore for FilePool {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn write(&self, offset: usize, bytes: &[u8]) -> StoreResult<()> {
        check_range(offset, bytes.len(), self.capacity)?;
        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset as u64))?;
        file.write_all(bytes)?;
        Ok(())
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> StoreResult<()> {
        check_range(offset, buf.len(), self.capacity)?;
        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset as u64))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn clear(&self, offset: usize, len: usize) -> StoreResult<()> {
        check_range(offset, len, self.capacity)?;
        // Zeroing is not required by the contract, but keeps hex dumps
        // of the pool file readable.
        let zeros = vec![0u8; len];
        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset as u64))?;
        file.write_all(&zeros)?;
        Ok(())
    }

    fn sync(&self) -> StoreResult<()> {
        self.file.write().sync_all()?;
        Ok(())
    }
}
