//! Best-fit free-block tracking for the byte pool.
//!
//! Free blocks are kept sorted by strictly decreasing size, ties by
//! strictly increasing offset. Allocation scans from the small end, so
//! the first sufficient block is the minimal sufficient one (true best
//! fit). Freeing coalesces with every address-adjacent block before
//! re-inserting, so no two adjacent free blocks ever coexist.

use std::fmt;

use crate::errors::{StoreError, StoreResult};

/// A contiguous unused byte range in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock {
    pub offset: usize,
    pub size: usize,
}

impl FreeBlock {
    /// One past the last byte of the block.
    fn end(&self) -> usize {
        self.offset + self.size
    }
}

impl fmt::Display for FreeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] ({} bytes)",
            self.offset,
            self.end() - 1,
            self.size
        )
    }
}

/// Free-space ledger for a fixed-capacity pool.
pub struct FreeList {
    // Invariant: sorted by decreasing size, ties by increasing offset;
    // no two blocks overlap or touch.
    blocks: Vec<FreeBlock>,
    capacity: usize,
}

impl FreeList {
    /// A free list covering an entirely unused pool of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        let mut blocks = Vec::new();
        if capacity > 0 {
            blocks.push(FreeBlock { offset: 0, size: capacity });
        }
        FreeList { blocks, capacity }
    }

    /// Reserve `size` bytes, returning the offset of the reserved range.
    ///
    /// Best fit: the smallest block that satisfies the request is taken.
    /// If it has leftover capacity the remainder is re-inserted at
    /// `offset + size`. Fails with `OutOfSpace` without reserving
    /// anything when no block suffices.
    pub fn allocate(&mut self, size: usize) -> StoreResult<usize> {
        // Blocks are size-descending, so scanning from the back visits
        // the smallest candidates first.
        let position = self
            .blocks
            .iter()
            .rposition(|block| block.size >= size)
            .ok_or(StoreError::OutOfSpace { requested: size })?;

        let block = self.blocks.remove(position);
        if block.size > size {
            self.insert_sorted(FreeBlock {
                offset: block.offset + size,
                size: block.size - size,
            });
        }
        Ok(block.offset)
    }

    /// Return `size` bytes starting at `offset` to the free list,
    /// merging with any address-adjacent blocks.
    pub fn free(&mut self, size: usize, offset: usize) -> StoreResult<()> {
        if size > self.capacity || offset > self.capacity {
            return Err(StoreError::InvalidRange {
                offset: offset as i64,
                len: size,
                capacity: self.capacity,
            });
        }

        if size == 0 {
            return Ok(());
        }

        let mut merged = FreeBlock { offset, size };
        // Merges can chain: a freed range may bridge the blocks on both
        // sides of it.
        while let Some(i) = self
            .blocks
            .iter()
            .position(|b| b.end() == merged.offset || merged.end() == b.offset)
        {
            let neighbor = self.blocks.remove(i);
            merged = FreeBlock {
                offset: merged.offset.min(neighbor.offset),
                size: merged.size + neighbor.size,
            };
        }
        self.insert_sorted(merged);
        Ok(())
    }

    /// The blocks in list order (decreasing size, ties by offset).
    pub fn blocks(&self) -> &[FreeBlock] {
        &self.blocks
    }

    /// Total unreserved bytes.
    pub fn free_bytes(&self) -> usize {
        self.blocks.iter().map(|b| b.size).sum()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Insert before the first block that is smaller, or equal-sized with
    // a larger offset.
    fn insert_sorted(&mut self, block: FreeBlock) {
        let at = self
            .blocks
            .iter()
            .position(|b| {
                b.size < block.size || (b.size == block.size && b.offset > block.offset)
            })
            .unwrap_or(self.blocks.len());
        self.blocks.insert(at, block);
    }
}

impl fmt::Display for FreeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Freelist:")?;
        for block in &self.blocks {
            write!(f, "\n    {}", block)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    /// Every invariant the list promises: sort order, no overlap, no
    /// two adjacent blocks, free bytes within capacity.
    fn assert_invariants(list: &FreeList) {
        let blocks = list.blocks();
        for pair in blocks.windows(2) {
            let ordered = pair[0].size > pair[1].size
                || (pair[0].size == pair[1].size && pair[0].offset < pair[1].offset);
            assert!(ordered, "blocks out of order: {} then {}", pair[0], pair[1]);
        }
        let mut by_offset: Vec<_> = blocks.to_vec();
        by_offset.sort_by_key(|b| b.offset);
        for pair in by_offset.windows(2) {
            assert!(
                pair[0].offset + pair[0].size < pair[1].offset,
                "blocks overlap or touch: {} then {}",
                pair[0],
                pair[1]
            );
        }
        assert!(list.free_bytes() <= list.capacity());
    }

    #[test]
    fn starts_fully_free() {
        let list = FreeList::new(100);
        assert_eq!(list.blocks(), &[FreeBlock { offset: 0, size: 100 }]);
        assert_eq!(list.free_bytes(), 100);
    }

    #[test]
    fn allocate_takes_from_the_front_of_the_pool() {
        let mut list = FreeList::new(100);
        assert_eq!(list.allocate(6).unwrap(), 0);
        assert_eq!(list.allocate(10).unwrap(), 6);
        assert_eq!(list.blocks(), &[FreeBlock { offset: 16, size: 84 }]);
        assert_invariants(&list);
    }

    #[test]
    fn free_then_reallocate_reuses_the_same_offset() {
        // The worked pool example: two records, remove the first, and a
        // same-size request lands back on its offset.
        let mut list = FreeList::new(100);
        let first = list.allocate(6).unwrap();
        list.allocate(10).unwrap();
        list.free(6, first).unwrap();
        assert_eq!(
            list.blocks(),
            &[
                FreeBlock { offset: 16, size: 84 },
                FreeBlock { offset: 0, size: 6 },
            ]
        );
        assert_eq!(list.allocate(6).unwrap(), first);
        assert_invariants(&list);
    }

    #[test]
    fn best_fit_prefers_the_smallest_sufficient_block() {
        let mut list = FreeList::new(100);
        // Carve out [0,100) into alternating used/free stripes.
        let a = list.allocate(30).unwrap(); // 0..30
        let _b = list.allocate(20).unwrap(); // 30..50
        let c = list.allocate(10).unwrap(); // 50..60
        let _d = list.allocate(40).unwrap(); // 60..100
        list.free(30, a).unwrap();
        list.free(10, c).unwrap();
        // A 10-byte block and a 30-byte block are free; an 8-byte
        // request must take the 10-byte one.
        assert_eq!(list.allocate(8).unwrap(), c);
        assert_invariants(&list);
    }

    #[test]
    fn out_of_space_reserves_nothing() {
        let mut list = FreeList::new(50);
        list.allocate(40).unwrap();
        let before: Vec<_> = list.blocks().to_vec();
        assert!(matches!(
            list.allocate(20),
            Err(StoreError::OutOfSpace { requested: 20 })
        ));
        assert_eq!(list.blocks(), &before[..]);
    }

    #[test]
    fn free_rejects_ranges_outside_the_pool() {
        let mut list = FreeList::new(100);
        assert!(matches!(
            list.free(101, 0),
            Err(StoreError::InvalidRange { .. })
        ));
        assert!(matches!(
            list.free(10, 101),
            Err(StoreError::InvalidRange { .. })
        ));
        assert_eq!(list.free_bytes(), 100);
    }

    #[test]
    fn adjacent_frees_coalesce_into_one_block() {
        let mut list = FreeList::new(100);
        let a = list.allocate(10).unwrap(); // 0..10
        let b = list.allocate(10).unwrap(); // 10..20
        list.allocate(80).unwrap();
        list.free(10, a).unwrap();
        list.free(10, b).unwrap();
        assert_eq!(list.blocks(), &[FreeBlock { offset: 0, size: 20 }]);
        assert_invariants(&list);
    }

    #[test]
    fn a_free_can_bridge_blocks_on_both_sides() {
        let mut list = FreeList::new(30);
        let a = list.allocate(10).unwrap(); // 0..10
        let b = list.allocate(10).unwrap(); // 10..20
        let c = list.allocate(10).unwrap(); // 20..30
        list.free(10, a).unwrap();
        list.free(10, c).unwrap();
        assert_eq!(list.blocks().len(), 2);
        // Freeing the middle range chains both merges in one call.
        list.free(10, b).unwrap();
        assert_eq!(list.blocks(), &[FreeBlock { offset: 0, size: 30 }]);
        assert_invariants(&list);
    }

    #[test]
    fn equal_sizes_are_ordered_by_increasing_offset() {
        let mut list = FreeList::new(100);
        let a = list.allocate(10).unwrap(); // 0..10
        list.allocate(10).unwrap(); // 10..20
        let c = list.allocate(10).unwrap(); // 20..30
        list.allocate(10).unwrap(); // 30..40
        let e = list.allocate(10).unwrap(); // 40..50
        list.allocate(50).unwrap();
        list.free(10, c).unwrap();
        list.free(10, e).unwrap();
        list.free(10, a).unwrap();
        let tens: Vec<_> = list
            .blocks()
            .iter()
            .filter(|b| b.size == 10)
            .map(|b| b.offset)
            .collect();
        assert_eq!(tens, vec![a, c, e]);
        assert_invariants(&list);
    }

    #[test]
    fn random_allocate_free_interleaving_preserves_invariants() {
        let mut rng = StdRng::seed_from_u64(0x51AB);
        let mut list = FreeList::new(4096);
        let mut live: Vec<(usize, usize)> = Vec::new();

        for _ in 0..2000 {
            if rng.gen_bool(0.6) || live.is_empty() {
                let size = rng.gen_range(1..64);
                match list.allocate(size) {
                    Ok(offset) => live.push((size, offset)),
                    Err(StoreError::OutOfSpace { .. }) => {}
                    Err(other) => panic!("unexpected error: {other}"),
                }
            } else {
                let (size, offset) = live.swap_remove(rng.gen_range(0..live.len()));
                list.free(size, offset).unwrap();
            }
            assert_invariants(&list);
            let used: usize = live.iter().map(|(s, _)| s).sum();
            assert_eq!(list.free_bytes() + used, 4096);
        }
    }
}
