//! # Quadpool Spatial - PR quadtree over a byte pool
//!
//! A Point-Region quadtree whose nodes live inside a `quadpool` byte
//! pool and reference each other only by handle:
//!
//! - **Handle-addressed nodes**: the tree holds a single root reference
//!   between calls; every operation re-derives nodes from the pool
//!   through the binary codec and re-serializes what it changes
//! - **Bounded integer domain**: points lie in `[0, 16383]` on both
//!   axes; a leaf holds at most three entries before splitting into four
//!   quadrants
//! - **Circular region search**: prunes quadrants by circle-vs-square
//!   intersection and reports how many nodes the last search visited
//!
//! ## Quick Start
//!
//! ```rust
//! use quadpool::{MemoryPool, PointRecord, RecordStore};
//! use quadpool_spatial::QuadTree;
//!
//! # fn main() -> quadpool_spatial::TreeResult<()> {
//! let mut tree = QuadTree::new(RecordStore::new(MemoryPool::new(4096)));
//!
//! tree.insert(&PointRecord::new(100, 200, "depot"))?;
//! tree.insert(&PointRecord::new(4000, 4000, "mill"))?;
//!
//! let hits = tree.search(90, 190, 25)?;
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].name(), "depot");
//!
//! let removed = tree.remove(100, 200)?;
//! assert_eq!(removed.name(), "depot");
//! # Ok(())
//! # }
//! ```

pub mod geometry;
pub mod pr_tree;

pub use geometry::{distance, Point, Quadrant, Square};
pub use pr_tree::{
    NodeRef, QuadNode, QuadTree, TreeError, TreeResult, MAX_COORD, MAX_LEAF_ENTRIES,
};
