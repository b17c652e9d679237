//! # Quadpool - pool-backed record storage
//!
//! This crate implements a fixed-size byte pool addressed by integer
//! offsets ("handles"), with:
//!
//! - **Free-list allocation**: unused ranges tracked best-fit in a
//!   size-descending block list with immediate coalescing of adjacent
//!   frees
//! - **Length-prefixed records**: every stored record is one header byte
//!   (payload length, 0-255) followed by the payload
//! - **Pluggable page storage**: physical byte transfer goes through the
//!   [`PageStore`] trait, with in-memory and file-backed implementations
//! - **Secondary name index**: an ordered multimap from record names to
//!   coordinates, maintained by callers alongside the pool
//!
//! The pool never grows: an allocation that cannot be satisfied surfaces
//! as [`StoreError::OutOfSpace`] and leaves the pool untouched.
//!
//! ## Quick Start
//!
//! ```rust
//! use quadpool::{MemoryPool, RecordStore};
//!
//! # fn main() -> quadpool::StoreResult<()> {
//! let mut store = RecordStore::new(MemoryPool::new(1024));
//!
//! let handle = store.insert(b"hello")?;
//! assert_eq!(store.size_of(handle)?, 5);
//!
//! let mut buf = [0u8; 5];
//! store.get(handle, &mut buf)?;
//! assert_eq!(&buf, b"hello");
//!
//! store.remove(handle)?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod free_list;
pub mod handle;
pub mod name_index;
pub mod pool;
pub mod record;
pub mod store;

pub use errors::{StoreError, StoreResult};
pub use free_list::{FreeBlock, FreeList};
pub use handle::Handle;
pub use name_index::NameIndex;
pub use pool::{FilePool, MemoryPool, PageStore};
pub use record::PointRecord;
pub use store::{RecordStore, MAX_PAYLOAD};
