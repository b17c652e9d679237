//! QuadTree implementation.

use quadpool::{Handle, PageStore, PointRecord, RecordStore};

use crate::geometry::{distance, Point, Quadrant, Square};

use super::tree_codec::{decode_node, encode_node};
use super::tree_constants::{MAX_COORD, MAX_LEAF_ENTRIES, MIN_REGION_ENTRIES};
use super::tree_types::{NodeRef, QuadNode, TreeError, TreeResult};

/// A Point-Region quadtree whose nodes live in the byte pool.
///
/// The only state carried between operations is the root reference and
/// the visit counter of the most recent search. Every operation
/// re-derives nodes from their handles, so the pool stays the single
/// source of truth; a structural change re-serializes the affected nodes
/// under fresh allocations and splices the new handles into the parent.
pub struct QuadTree<S: PageStore> {
    store: RecordStore<S>,
    root: NodeRef,
    visited: u64,
}

impl<S: PageStore> QuadTree<S> {
    /// An empty tree over the given record store.
    pub fn new(store: RecordStore<S>) -> Self {
        QuadTree {
            store,
            root: NodeRef::Empty,
            visited: 0,
        }
    }

    /// The record store backing this tree.
    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Nodes visited by the most recent `search`, empty quadrants
    /// included.
    pub fn last_search_visits(&self) -> u64 {
        self.visited
    }

    /// Store `record` and insert it at its coordinates.
    ///
    /// Fails with `OutOfBounds` outside the domain and `DuplicatePoint`
    /// if any entry already occupies the same point; a failed insert
    /// leaves tree and pool exactly as they were.
    pub fn insert(&mut self, record: &PointRecord) -> TreeResult<Handle> {
        let point = self.checked_point(record.x(), record.y())?;
        let payload = record.to_payload()?;
        let entry = self.store.insert(&payload)?;

        match self.insert_at(self.root, Self::domain(), point, entry) {
            Ok(root) => {
                self.root = root;
                Ok(entry)
            }
            Err(e) => {
                // The record must not outlive its failed insert.
                if let Err(undo) = self.store.remove(entry) {
                    log::warn!("could not release record {entry} after failed insert: {undo}");
                }
                Err(e)
            }
        }
    }

    /// Remove and return the record stored at `(x, y)`.
    ///
    /// Fails with `PointNotFound` when no entry matches; the tree is
    /// left untouched. Regions whose descendants drop below four entries
    /// collapse back into a single leaf on the way up.
    pub fn remove(&mut self, x: i32, y: i32) -> TreeResult<PointRecord> {
        let point = self.checked_point(x, y)?;
        if !self.probe(point)? {
            return Err(TreeError::PointNotFound { x, y });
        }

        let mut removed = None;
        let root = self.remove_at(self.root, Self::domain(), point, &mut removed)?;
        self.root = root;

        let entry = removed.ok_or(TreeError::PointNotFound { x, y })?;
        let record = PointRecord::from_payload(&self.store.payload(entry)?)?;
        self.store.remove(entry)?;
        Ok(record)
    }

    /// All records within Euclidean `radius` of `(x, y)`.
    ///
    /// Visits every node whose cell the circle touches and records the
    /// visit count for `last_search_visits`.
    pub fn search(&mut self, x: i32, y: i32, radius: i32) -> TreeResult<Vec<PointRecord>> {
        let center = Point::new(x, y);
        let mut visited = 0;
        let mut hits = Vec::new();
        self.search_at(
            self.root,
            Self::domain(),
            center,
            radius,
            &mut visited,
            &mut hits,
        )?;
        self.visited = visited;

        let mut records = Vec::with_capacity(hits.len());
        for entry in hits {
            records.push(PointRecord::from_payload(&self.store.payload(entry)?)?);
        }
        Ok(records)
    }

    /// Release every node and record in the tree.
    pub fn clear(&mut self) -> TreeResult<()> {
        let root = std::mem::replace(&mut self.root, NodeRef::Empty);
        self.free_subtree(root)?;
        self.visited = 0;
        Ok(())
    }

    /// Preorder rendering of the structure: `I` per region, `E` per
    /// empty quadrant, and each leaf's records followed by `|`.
    pub fn render(&self) -> TreeResult<String> {
        let mut out = String::new();
        self.render_at(self.root, &mut out)?;
        Ok(out)
    }

    fn domain() -> Square {
        Square::new(0, 0, MAX_COORD, MAX_COORD)
    }

    fn checked_point(&self, x: i32, y: i32) -> TreeResult<Point> {
        if x < 0 || y < 0 || x > MAX_COORD || y > MAX_COORD {
            return Err(TreeError::OutOfBounds { x, y });
        }
        Ok(Point::new(x, y))
    }

    fn insert_at(
        &mut self,
        node: NodeRef,
        cell: Square,
        point: Point,
        entry: Handle,
    ) -> TreeResult<NodeRef> {
        let handle = match node {
            NodeRef::Empty => {
                let leaf = self.write_node(&QuadNode::leaf_of(entry))?;
                return Ok(NodeRef::Node(leaf));
            }
            NodeRef::Node(handle) => handle,
        };

        match decode_node(&self.store, handle)? {
            QuadNode::Region { mut children } => {
                let q = cell.quadrant_of(point);
                let child = self.insert_at(children[q.index()], cell.quadrant(q), point, entry)?;
                children[q.index()] = child;
                let replaced = self.replace_node(handle, &QuadNode::Region { children })?;
                Ok(NodeRef::Node(replaced))
            }
            QuadNode::Leaf { mut entries } => {
                for &stored in &entries {
                    if self.read_point(stored)? == point {
                        return Err(TreeError::DuplicatePoint {
                            x: point.x,
                            y: point.y,
                        });
                    }
                }
                if entries.len() < MAX_LEAF_ENTRIES {
                    entries.push(entry);
                    let replaced = self.replace_node(handle, &QuadNode::Leaf { entries })?;
                    Ok(NodeRef::Node(replaced))
                } else {
                    let region = self.split_leaf(cell, &entries, point, entry)?;
                    // Only now that the replacement subtree exists may
                    // the old leaf record go.
                    self.store.remove(handle)?;
                    Ok(region)
                }
            }
        }
    }

    /// Split a full leaf: stage a region of four empty quadrants, then
    /// push the three existing entries and the new one through the
    /// normal insert path. The staged nodes are discarded if anything
    /// fails, leaving the old leaf in place.
    fn split_leaf(
        &mut self,
        cell: Square,
        existing: &[Handle],
        point: Point,
        entry: Handle,
    ) -> TreeResult<NodeRef> {
        let region = self.write_node(&QuadNode::empty_region())?;
        let mut staged = NodeRef::Node(region);

        for &stored in existing {
            let stored_point = match self.read_point(stored) {
                Ok(p) => p,
                Err(e) => {
                    self.discard_staged(staged);
                    return Err(e);
                }
            };
            match self.insert_at(staged, cell, stored_point, stored) {
                Ok(next) => staged = next,
                Err(e) => {
                    self.discard_staged(staged);
                    return Err(e);
                }
            }
        }
        match self.insert_at(staged, cell, point, entry) {
            Ok(next) => Ok(next),
            Err(e) => {
                self.discard_staged(staged);
                Err(e)
            }
        }
    }

    fn remove_at(
        &mut self,
        node: NodeRef,
        cell: Square,
        point: Point,
        removed: &mut Option<Handle>,
    ) -> TreeResult<NodeRef> {
        let handle = match node {
            NodeRef::Empty => return Ok(NodeRef::Empty),
            NodeRef::Node(handle) => handle,
        };

        match decode_node(&self.store, handle)? {
            QuadNode::Leaf { mut entries } => {
                let mut at = None;
                for (i, &stored) in entries.iter().enumerate() {
                    if self.read_point(stored)? == point {
                        at = Some(i);
                        break;
                    }
                }
                let Some(at) = at else {
                    return Ok(NodeRef::Node(handle));
                };
                *removed = Some(entries.remove(at));

                if entries.is_empty() {
                    self.store.remove(handle)?;
                    Ok(NodeRef::Empty)
                } else {
                    let replaced = self.replace_node(handle, &QuadNode::Leaf { entries })?;
                    Ok(NodeRef::Node(replaced))
                }
            }
            QuadNode::Region { mut children } => {
                let q = cell.quadrant_of(point);
                let child = self.remove_at(children[q.index()], cell.quadrant(q), point, removed)?;
                children[q.index()] = child;

                let mut total = 0;
                for child in children {
                    total += self.count_entries(child)?;
                }
                if total < MIN_REGION_ENTRIES {
                    // Collapse: gather the survivors, drop the region
                    // structure, and rebuild them as one leaf.
                    let mut survivors = Vec::with_capacity(total);
                    for child in children {
                        self.collect_entries(child, &mut survivors)?;
                    }
                    for child in children {
                        self.free_nodes(child)?;
                    }
                    self.store.remove(handle)?;
                    if survivors.is_empty() {
                        Ok(NodeRef::Empty)
                    } else {
                        let leaf = QuadNode::Leaf {
                            entries: survivors.into_iter().collect(),
                        };
                        Ok(NodeRef::Node(self.write_node(&leaf)?))
                    }
                } else {
                    let replaced = self.replace_node(handle, &QuadNode::Region { children })?;
                    Ok(NodeRef::Node(replaced))
                }
            }
        }
    }

    fn search_at(
        &self,
        node: NodeRef,
        cell: Square,
        center: Point,
        radius: i32,
        visited: &mut u64,
        hits: &mut Vec<Handle>,
    ) -> TreeResult<()> {
        *visited += 1;
        let handle = match node {
            NodeRef::Empty => return Ok(()),
            NodeRef::Node(handle) => handle,
        };

        match decode_node(&self.store, handle)? {
            QuadNode::Leaf { entries } => {
                for &entry in &entries {
                    let p = self.read_point(entry)?;
                    if distance(p, center) <= radius as f64 {
                        hits.push(entry);
                    }
                }
            }
            QuadNode::Region { children } => {
                for q in Quadrant::ALL {
                    let sub = cell.quadrant(q);
                    if sub.intersects_circle(center, radius) {
                        self.search_at(children[q.index()], sub, center, radius, visited, hits)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Exact-point membership test; does not disturb the search counter.
    fn probe(&self, point: Point) -> TreeResult<bool> {
        let mut visited = 0;
        let mut hits = Vec::new();
        self.search_at(self.root, Self::domain(), point, 0, &mut visited, &mut hits)?;
        Ok(!hits.is_empty())
    }

    /// Total entries stored under `node`.
    fn count_entries(&self, node: NodeRef) -> TreeResult<usize> {
        match node {
            NodeRef::Empty => Ok(0),
            NodeRef::Node(handle) => match decode_node(&self.store, handle)? {
                QuadNode::Leaf { entries } => Ok(entries.len()),
                QuadNode::Region { children } => {
                    let mut total = 0;
                    for child in children {
                        total += self.count_entries(child)?;
                    }
                    Ok(total)
                }
            },
        }
    }

    fn collect_entries(&self, node: NodeRef, out: &mut Vec<Handle>) -> TreeResult<()> {
        match node {
            NodeRef::Empty => Ok(()),
            NodeRef::Node(handle) => match decode_node(&self.store, handle)? {
                QuadNode::Leaf { entries } => {
                    out.extend_from_slice(&entries);
                    Ok(())
                }
                QuadNode::Region { children } => {
                    for child in children {
                        self.collect_entries(child, out)?;
                    }
                    Ok(())
                }
            },
        }
    }

    /// Release the node records under `node`, leaving the point records
    /// they referenced alone.
    fn free_nodes(&mut self, node: NodeRef) -> TreeResult<()> {
        match node {
            NodeRef::Empty => Ok(()),
            NodeRef::Node(handle) => {
                if let QuadNode::Region { children } = decode_node(&self.store, handle)? {
                    for child in children {
                        self.free_nodes(child)?;
                    }
                }
                self.store.remove(handle)?;
                Ok(())
            }
        }
    }

    /// Release node records and point records under `node`.
    fn free_subtree(&mut self, node: NodeRef) -> TreeResult<()> {
        match node {
            NodeRef::Empty => Ok(()),
            NodeRef::Node(handle) => {
                match decode_node(&self.store, handle)? {
                    QuadNode::Region { children } => {
                        for child in children {
                            self.free_subtree(child)?;
                        }
                    }
                    QuadNode::Leaf { entries } => {
                        for entry in entries {
                            self.store.remove(entry)?;
                        }
                    }
                }
                self.store.remove(handle)?;
                Ok(())
            }
        }
    }

    fn discard_staged(&mut self, node: NodeRef) {
        if let Err(e) = self.free_nodes(node) {
            log::warn!("could not discard staged nodes: {e}");
        }
    }

    fn read_point(&self, entry: Handle) -> TreeResult<Point> {
        let mut prefix = [0u8; 8];
        let copied = self.store.get(entry, &mut prefix)?;
        let (x, y) = PointRecord::decode_point(&prefix[..copied])?;
        Ok(Point::new(x, y))
    }

    fn write_node(&mut self, node: &QuadNode) -> TreeResult<Handle> {
        Ok(self.store.insert(&encode_node(node))?)
    }

    /// Re-serialize a changed node under a fresh allocation.
    ///
    /// A node that did not grow is removed first: the vacated block
    /// guarantees the re-insert cannot run out of space. A grown node is
    /// inserted first so an allocation failure leaves the old image
    /// live and referenced.
    fn replace_node(&mut self, old: Handle, node: &QuadNode) -> TreeResult<Handle> {
        let image = encode_node(node);
        if image.len() <= self.store.size_of(old)? {
            self.store.remove(old)?;
            Ok(self.store.insert(&image)?)
        } else {
            let fresh = self.store.insert(&image)?;
            self.store.remove(old)?;
            Ok(fresh)
        }
    }

    fn render_at(&self, node: NodeRef, out: &mut String) -> TreeResult<()> {
        let handle = match node {
            NodeRef::Empty => {
                out.push('E');
                return Ok(());
            }
            NodeRef::Node(handle) => handle,
        };

        match decode_node(&self.store, handle)? {
            QuadNode::Region { children } => {
                out.push('I');
                for child in children {
                    self.render_at(child, out)?;
                }
            }
            QuadNode::Leaf { entries } => {
                for entry in entries {
                    let record = PointRecord::from_payload(&self.store.payload(entry)?)?;
                    out.push_str(&record.to_string());
                    out.push(';');
                }
                out.push('|');
            }
        }
        Ok(())
    }
}
