//! Node types and error types for the PR quadtree.

use quadpool::{Handle, StoreError};
use smallvec::SmallVec;
use thiserror::Error;

use super::tree_constants::MAX_LEAF_ENTRIES;

/// Errors that can occur in quadtree operations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Coordinates fall outside the tree's domain. Rejected before any
    /// mutation.
    #[error("coordinates ({x}, {y}) are outside the coordinate domain")]
    OutOfBounds { x: i32, y: i32 },

    /// An entry with the same coordinates is already stored. The insert
    /// aborts with the tree unchanged.
    #[error("a record already exists at ({x}, {y})")]
    DuplicatePoint { x: i32, y: i32 },

    /// No entry with the given coordinates exists. The tree is left
    /// untouched.
    #[error("no record exists at ({x}, {y})")]
    PointNotFound { x: i32, y: i32 },

    /// Stored node bytes do not parse as a valid node image.
    #[error("corrupt node: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for quadtree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Reference to a quadtree node.
///
/// `Empty` is the flyweight for an unoccupied quadrant: structural, never
/// backed by a pool record, and serialized as the reserved sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Empty,
    Node(Handle),
}

impl NodeRef {
    pub fn is_empty(self) -> bool {
        matches!(self, NodeRef::Empty)
    }
}

/// A quadtree node, materialized from the pool for the duration of one
/// operation. A node's identity is its handle, never this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuadNode {
    /// Interior node: one child reference per quadrant, in NW, NE, SW,
    /// SE order.
    Region { children: [NodeRef; 4] },
    /// Leaf node: up to three handles of stored point records.
    Leaf {
        entries: SmallVec<[Handle; MAX_LEAF_ENTRIES]>,
    },
}

impl QuadNode {
    /// A region with four unoccupied quadrants.
    pub fn empty_region() -> Self {
        QuadNode::Region {
            children: [NodeRef::Empty; 4],
        }
    }

    /// A leaf holding a single record.
    pub fn leaf_of(entry: Handle) -> Self {
        let mut entries = SmallVec::new();
        entries.push(entry);
        QuadNode::Leaf { entries }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, QuadNode::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_has_four_empty_children() {
        let QuadNode::Region { children } = QuadNode::empty_region() else {
            panic!("expected region");
        };
        assert!(children.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn leaf_of_holds_one_entry() {
        let QuadNode::Leaf { entries } = QuadNode::leaf_of(Handle::new(12)) else {
            panic!("expected leaf");
        };
        assert_eq!(entries.as_slice(), &[Handle::new(12)]);
    }
}
