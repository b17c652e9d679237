//! Point-Region quadtree stored inside the byte pool.
//!
//! The tree holds no node objects between operations. Its only state is
//! the root reference and a search diagnostic counter; every node is
//! re-derived from its handle through the codec, mutated, and
//! re-serialized. The pool is the single source of truth.

pub mod tree_codec;
pub mod tree_constants;
pub mod tree_types;
mod tree_impl;

pub use tree_codec::{decode_node, encode_node};
pub use tree_constants::{MAX_COORD, MAX_LEAF_ENTRIES};
pub use tree_impl::QuadTree;
pub use tree_types::{NodeRef, QuadNode, TreeError, TreeResult};
