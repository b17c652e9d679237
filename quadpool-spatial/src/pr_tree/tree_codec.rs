//! Binary codec between pool records and quadtree nodes.
//!
//! This is the single serialization boundary: nothing else in the tree
//! reads or writes node bytes. The layout is exact:
//!
//! | offset | field |
//! |---|---|
//! | 0 | discriminant: 0 = region, nonzero = leaf |
//! | region 1-16 | four big-endian child handles: NW, NE, SW, SE |
//! | leaf 1 | entry count (0-3) |
//! | leaf 2+4i | big-endian handle of the i-th point record |
//!
//! Decoding is pure: it allocates a fresh node value per call and never
//! caches or mutates the pool. A changed node is never patched in place;
//! it is re-serialized under a fresh allocation by the tree.

use quadpool::{Handle, PageStore, RecordStore};
use smallvec::SmallVec;

use super::tree_constants::{
    EMPTY_REF, LEAF_TAG, MAX_LEAF_ENTRIES, REGION_PAYLOAD, REGION_TAG,
};
use super::tree_types::{NodeRef, QuadNode, TreeError, TreeResult};

/// Read the record at `handle` and parse it as a node.
pub fn decode_node<S: PageStore>(
    store: &RecordStore<S>,
    handle: Handle,
) -> TreeResult<QuadNode> {
    let payload = store.payload(handle)?;
    let Some(&tag) = payload.first() else {
        return Err(TreeError::Corrupt(format!(
            "node record {handle} has an empty payload"
        )));
    };

    if tag == REGION_TAG {
        if payload.len() != REGION_PAYLOAD {
            return Err(TreeError::Corrupt(format!(
                "region node {handle} is {} bytes, expected {REGION_PAYLOAD}",
                payload.len()
            )));
        }
        let mut children = [NodeRef::Empty; 4];
        for (i, child) in children.iter_mut().enumerate() {
            *child = read_ref(&payload, 1 + i * Handle::WIRE_BYTES);
        }
        Ok(QuadNode::Region { children })
    } else {
        let Some(&count) = payload.get(1) else {
            return Err(TreeError::Corrupt(format!(
                "leaf node {handle} is missing its entry count"
            )));
        };
        let count = count as usize;
        if count > MAX_LEAF_ENTRIES {
            return Err(TreeError::Corrupt(format!(
                "leaf node {handle} claims {count} entries, limit is {MAX_LEAF_ENTRIES}"
            )));
        }
        if payload.len() != 2 + count * Handle::WIRE_BYTES {
            return Err(TreeError::Corrupt(format!(
                "leaf node {handle} is {} bytes for {count} entries",
                payload.len()
            )));
        }
        let mut entries = SmallVec::new();
        for i in 0..count {
            entries.push(read_handle(&payload, 2 + i * Handle::WIRE_BYTES));
        }
        Ok(QuadNode::Leaf { entries })
    }
}

/// Serialize a node into its record payload.
pub fn encode_node(node: &QuadNode) -> Vec<u8> {
    match node {
        QuadNode::Region { children } => {
            let mut payload = Vec::with_capacity(REGION_PAYLOAD);
            payload.push(REGION_TAG);
            for child in children {
                let wire = match child {
                    NodeRef::Empty => EMPTY_REF,
                    NodeRef::Node(handle) => handle.offset(),
                };
                payload.extend_from_slice(&wire.to_be_bytes());
            }
            payload
        }
        QuadNode::Leaf { entries } => {
            let mut payload = Vec::with_capacity(2 + entries.len() * Handle::WIRE_BYTES);
            payload.push(LEAF_TAG);
            payload.push(entries.len() as u8);
            for entry in entries {
                payload.extend_from_slice(&entry.to_be_bytes());
            }
            payload
        }
    }
}

fn read_handle(payload: &[u8], at: usize) -> Handle {
    Handle::from_be_bytes([payload[at], payload[at + 1], payload[at + 2], payload[at + 3]])
}

fn read_ref(payload: &[u8], at: usize) -> NodeRef {
    let handle = read_handle(payload, at);
    if handle.offset() == EMPTY_REF {
        NodeRef::Empty
    } else {
        NodeRef::Node(handle)
    }
}
