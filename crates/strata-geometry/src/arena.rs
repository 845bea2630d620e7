// Copyright 2026 strata contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Variable-size block storage over one contiguous, growable backing array.
//!
//! A [`BlockArena`] hands out [`BlockId`]s naming contiguous runs of elements
//! inside its backing array. Block ids are stable from allocation until
//! deallocation; the backing array may grow (and the bytes of a block may
//! relocate on an explicit resize), but the id and the logical contents of a
//! live block never change behind the caller's back.
//!
//! Slices borrowed through [`BlockArena::as_slice`] or
//! [`BlockArena::block_slice`] are valid until the next structural mutation
//! of the arena; the borrow checker enforces this bound.
//!
//! # Panics
//!
//! Passing a deallocated or never-allocated id to any method is a programmer
//! error and panics. Range overruns in [`BlockArena::set_data`] and
//! [`BlockArena::set_sub_data`] are checked before any element is written, so
//! a panicking call leaves the arena contents untouched.

use crate::transaction::BufferTransaction;
use std::ops::Range;

/// An opaque handle to a block of elements inside a [`BlockArena`].
///
/// Ids are small integers, recycled only after the block they named has been
/// deallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// Metadata for one block in the arena's block table.
#[derive(Debug, Clone, Copy)]
struct Block {
    /// First element of the block inside the backing array.
    offset: usize,
    /// Number of elements reserved for the block.
    capacity: usize,
    /// Number of elements currently in use (`<= capacity`).
    used: usize,
    /// Whether the id currently names an allocated block.
    live: bool,
}

/// A contiguous run of free elements inside the backing array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FreeRange {
    offset: usize,
    len: usize,
}

/// Element ranges written since the last device-buffer synchronization.
///
/// Consumed by the device-buffer layer: either everything must be re-uploaded
/// (the backing array was re-created or grew) or only the listed ranges.
#[derive(Debug)]
pub struct UnsyncedModifications {
    /// If `true`, the whole backing array must be pushed to the device.
    pub full_upload: bool,
    /// Modified element ranges, sorted and non-overlapping.
    pub ranges: Vec<Range<usize>>,
}

/// A dynamically growable contiguous array of fixed-size elements handing out
/// variable-length blocks identified by stable [`BlockId`]s.
#[derive(Debug)]
pub struct BlockArena<T: bytemuck::Pod> {
    /// The backing array. Its length is the arena capacity in elements.
    storage: Vec<T>,
    /// Block table indexed by [`BlockId`].
    blocks: Vec<Block>,
    /// Ids of deallocated blocks, available for reuse.
    free_ids: Vec<u32>,
    /// Free element ranges, sorted by offset, never adjacent.
    free_ranges: Vec<FreeRange>,
    /// Element ranges written since the last sync.
    modified_ranges: Vec<Range<usize>>,
    /// Set when the backing array grew and a full re-upload is required.
    full_upload_pending: bool,
}

impl<T: bytemuck::Pod> BlockArena<T> {
    /// Creates an arena with room for `initial_capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `initial_capacity` is zero.
    pub fn new(initial_capacity: usize) -> Self {
        assert!(initial_capacity > 0, "arena capacity must be non-zero");

        Self {
            storage: vec![T::zeroed(); initial_capacity],
            blocks: Vec::new(),
            free_ids: Vec::new(),
            free_ranges: vec![FreeRange {
                offset: 0,
                len: initial_capacity,
            }],
            modified_ranges: Vec::new(),
            full_upload_pending: true,
        }
    }

    /// Reserves a new block able to hold `count` elements and returns its id.
    ///
    /// The block's contents start zeroed and its used element count starts at
    /// 0. The backing array grows (amortized doubling) when free space is
    /// insufficient; growth never changes the id or contents of live blocks.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    pub fn allocate(&mut self, count: usize) -> BlockId {
        assert!(count > 0, "cannot allocate an empty block");

        let offset = self.find_space(count);
        self.storage[offset..offset + count].fill(T::zeroed());

        let block = Block {
            offset,
            capacity: count,
            used: 0,
            live: true,
        };

        let id = match self.free_ids.pop() {
            Some(id) => {
                self.blocks[id as usize] = block;
                id
            }
            None => {
                self.blocks.push(block);
                (self.blocks.len() - 1) as u32
            }
        };

        self.record_modified(offset..offset + count);
        BlockId(id)
    }

    /// Overwrites the contents of a live block, setting its used element
    /// count to `data.len()`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live or `data.len()` exceeds the block capacity.
    pub fn set_data(&mut self, id: BlockId, data: &[T]) {
        let block = *self.live_block(id);
        assert!(
            data.len() <= block.capacity,
            "data ({} elements) exceeds block capacity ({})",
            data.len(),
            block.capacity
        );

        self.storage[block.offset..block.offset + data.len()].copy_from_slice(data);
        self.blocks[id.0 as usize].used = data.len();
        self.record_modified(block.offset..block.offset + data.len());
    }

    /// Overwrites part of a live block starting at `element_offset`. The used
    /// element count grows to cover the written range if necessary.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live or the written range exceeds the block
    /// capacity. The range is checked before any element is written.
    pub fn set_sub_data(&mut self, id: BlockId, element_offset: usize, data: &[T]) {
        let block = *self.live_block(id);
        assert!(
            element_offset + data.len() <= block.capacity,
            "sub-data range {}..{} exceeds block capacity ({})",
            element_offset,
            element_offset + data.len(),
            block.capacity
        );

        let start = block.offset + element_offset;
        self.storage[start..start + data.len()].copy_from_slice(data);

        let block = &mut self.blocks[id.0 as usize];
        block.used = block.used.max(element_offset + data.len());
        self.record_modified(start..start + data.len());
    }

    /// Changes the used element count of a block, growing its capacity in
    /// place or through relocation if needed. `new_used` may be 0.
    ///
    /// Returns `true` if anything about the block changed that other copies
    /// of this arena need to learn about (location, capacity, or used count);
    /// the caller records a transaction exactly when this returns `true`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn resize_data(&mut self, id: BlockId, new_used: usize) -> bool {
        let block = *self.live_block(id);

        if new_used <= block.capacity {
            self.blocks[id.0 as usize].used = new_used;
            return new_used != block.used;
        }

        // Grow in place when the range immediately after the block is free.
        let growth = new_used - block.capacity;
        if self.carve_range_at(block.offset + block.capacity, growth) {
            let tail = block.offset + block.capacity;
            self.storage[tail..tail + growth].fill(T::zeroed());

            let block = &mut self.blocks[id.0 as usize];
            block.capacity = new_used;
            block.used = new_used;

            self.record_modified(tail..tail + growth);
            return true;
        }

        // Relocate: acquire a fresh range, move the occupied elements there.
        let new_offset = self.find_space(new_used);
        self.storage.copy_within(
            block.offset..block.offset + block.used,
            new_offset,
        );
        self.storage[new_offset + block.used..new_offset + new_used].fill(T::zeroed());
        self.release_range(block.offset, block.capacity);

        self.blocks[id.0 as usize] = Block {
            offset: new_offset,
            capacity: new_used,
            used: new_used,
            live: true,
        };

        self.record_modified(new_offset..new_offset + new_used);
        true
    }

    /// Frees a block. Its storage becomes available for later allocations
    /// (merging with adjacent free space) and its id becomes reusable once
    /// reissued by a later [`BlockArena::allocate`].
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn deallocate(&mut self, id: BlockId) {
        let block = *self.live_block(id);
        self.blocks[id.0 as usize].live = false;
        self.free_ids.push(id.0);
        self.release_range(block.offset, block.capacity);
    }

    /// Returns the element offset of a live block inside the backing array.
    pub fn offset_of(&self, id: BlockId) -> usize {
        self.live_block(id).offset
    }

    /// Returns the used element count of a live block.
    pub fn used_elements(&self, id: BlockId) -> usize {
        self.live_block(id).used
    }

    /// Returns the allocated capacity of a live block, in elements.
    pub fn capacity_of(&self, id: BlockId) -> usize {
        self.live_block(id).capacity
    }

    /// Returns the occupied elements of a live block.
    ///
    /// The borrow is valid until the next structural mutation of the arena.
    pub fn block_slice(&self, id: BlockId) -> &[T] {
        let block = self.live_block(id);
        &self.storage[block.offset..block.offset + block.used]
    }

    /// Returns the whole backing array.
    ///
    /// The borrow is valid until the next structural mutation of the arena.
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    /// Returns the size of the backing array in bytes.
    pub fn buffer_size_in_bytes(&self) -> usize {
        self.storage.len() * std::mem::size_of::<T>()
    }

    /// Returns `true` if `id` currently names a live block.
    pub fn is_live(&self, id: BlockId) -> bool {
        self.blocks
            .get(id.0 as usize)
            .is_some_and(|block| block.live)
    }

    /// Replays writes recorded against another arena onto this one.
    ///
    /// `id_for` maps each transaction to the block id it names in this arena,
    /// or `None` when the transaction addresses a different arena (e.g. index
    /// writes while replaying into a vertex arena). For each addressed
    /// transaction the block is brought to the source block's capacity
    /// (allocating or re-allocating under the same id as needed), the
    /// recorded element range is copied from `source`, and the source's used
    /// element count is adopted.
    ///
    /// Transactions whose source block is no longer live are skipped; the
    /// block was deallocated later in the same recorded history, so there is
    /// nothing left to converge to.
    pub fn apply_transactions(
        &mut self,
        transactions: &[BufferTransaction],
        source: &BlockArena<T>,
        id_for: impl Fn(&BufferTransaction) -> Option<BlockId>,
    ) {
        for transaction in transactions {
            let Some(id) = id_for(transaction) else {
                continue;
            };

            let index = id.0 as usize;
            let Some(src) = source.blocks.get(index).filter(|b| b.live) else {
                continue;
            };
            let src = *src;

            self.ensure_block(id, src.capacity);

            let dest = self.blocks[index];
            let start = transaction.offset.min(src.capacity);
            let end = (transaction.offset + transaction.count).min(src.capacity);
            if start < end {
                self.storage[dest.offset + start..dest.offset + end].copy_from_slice(
                    &source.storage[src.offset + start..src.offset + end],
                );
                self.record_modified(dest.offset + start..dest.offset + end);
            }
            self.blocks[index].used = src.used;
        }
    }

    /// Takes the modifications accumulated since the last call, leaving the
    /// arena marked as fully synchronized.
    pub fn take_unsynced_modifications(&mut self) -> UnsyncedModifications {
        let full_upload = self.full_upload_pending;
        self.full_upload_pending = false;

        let mut ranges = std::mem::take(&mut self.modified_ranges);
        if full_upload {
            ranges.clear();
            return UnsyncedModifications {
                full_upload,
                ranges,
            };
        }

        // Coalesce overlapping and adjacent ranges.
        ranges.sort_by_key(|r| r.start);
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }

        UnsyncedModifications {
            full_upload,
            ranges: merged,
        }
    }

    /// Marks the whole arena as modified, forcing the next synchronization to
    /// re-upload everything. Used after a failed partial upload.
    pub fn mark_fully_dirty(&mut self) {
        self.full_upload_pending = true;
        self.modified_ranges.clear();
    }

    /// Looks up a block, panicking if the id does not name a live block.
    fn live_block(&self, id: BlockId) -> &Block {
        let block = self
            .blocks
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("block id {} was never allocated", id.0));
        assert!(block.live, "block id {} has been deallocated", id.0);
        block
    }

    /// Brings the block table entry for `id` to a live block of exactly
    /// `capacity` elements, preserving nothing. Existing blocks with a
    /// different capacity are re-allocated; missing entries (including gaps
    /// below `id`) are created.
    fn ensure_block(&mut self, id: BlockId, capacity: usize) {
        let index = id.0 as usize;

        // Create dead placeholders for ids this arena has not seen yet.
        while self.blocks.len() <= index {
            self.blocks.push(Block {
                offset: 0,
                capacity: 0,
                used: 0,
                live: false,
            });
            self.free_ids.push((self.blocks.len() - 1) as u32);
        }

        let block = self.blocks[index];
        if block.live && block.capacity == capacity {
            return;
        }

        if block.live {
            self.release_range(block.offset, block.capacity);
        } else {
            self.free_ids.retain(|&free| free as usize != index);
        }

        let offset = self.find_space(capacity);
        self.storage[offset..offset + capacity].fill(T::zeroed());
        self.blocks[index] = Block {
            offset,
            capacity,
            used: 0,
            live: true,
        };
        self.record_modified(offset..offset + capacity);
    }

    /// Finds (or creates, by growing the backing array) a free range of
    /// `count` elements and removes it from the free list.
    fn find_space(&mut self, count: usize) -> usize {
        if let Some(index) = self.free_ranges.iter().position(|r| r.len >= count) {
            let range = &mut self.free_ranges[index];
            let offset = range.offset;
            range.offset += count;
            range.len -= count;
            if range.len == 0 {
                self.free_ranges.remove(index);
            }
            return offset;
        }

        // No free range fits: grow the backing array (amortized doubling).
        let old_len = self.storage.len();
        let new_len = (old_len * 2).max(old_len + count);
        self.storage.resize(new_len, T::zeroed());
        self.full_upload_pending = true;

        log::debug!(
            "BlockArena: backing array grew from {} to {} elements",
            old_len,
            new_len
        );

        self.release_range(old_len, new_len - old_len);
        self.find_space(count)
    }

    /// Returns `true` and removes the elements if the exact range
    /// `[offset, offset + len)` is currently free. Used for in-place growth.
    fn carve_range_at(&mut self, offset: usize, len: usize) -> bool {
        let Some(index) = self
            .free_ranges
            .iter()
            .position(|r| r.offset == offset && r.len >= len)
        else {
            return false;
        };

        let range = &mut self.free_ranges[index];
        range.offset += len;
        range.len -= len;
        if range.len == 0 {
            self.free_ranges.remove(index);
        }
        true
    }

    /// Returns a range of elements to the free list, merging with adjacent
    /// free ranges so free space does not fragment permanently.
    fn release_range(&mut self, offset: usize, len: usize) {
        let index = self
            .free_ranges
            .partition_point(|r| r.offset < offset);

        let merges_prev = index > 0 && {
            let prev = self.free_ranges[index - 1];
            prev.offset + prev.len == offset
        };
        let merges_next = index < self.free_ranges.len() && {
            let next = self.free_ranges[index];
            offset + len == next.offset
        };

        match (merges_prev, merges_next) {
            (true, true) => {
                let next_len = self.free_ranges[index].len;
                self.free_ranges[index - 1].len += len + next_len;
                self.free_ranges.remove(index);
            }
            (true, false) => self.free_ranges[index - 1].len += len,
            (false, true) => {
                let next = &mut self.free_ranges[index];
                next.offset = offset;
                next.len += len;
            }
            (false, false) => self.free_ranges.insert(index, FreeRange { offset, len }),
        }
    }

    /// Records an element range as modified since the last sync.
    fn record_modified(&mut self, range: Range<usize>) {
        if !self.full_upload_pending && !range.is_empty() {
            self.modified_ranges.push(range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{GeometrySlot, SlotKind};
    use crate::transaction::{BufferTransaction, TransactionTarget};

    fn filled(start: u32, count: usize) -> Vec<u32> {
        (start..start + count as u32).collect()
    }

    #[test]
    fn block_round_trip() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);

        for count in [1usize, 2, 7, 16] {
            let id = arena.allocate(count);
            let payload = filled(100, count);
            arena.set_data(id, &payload);

            assert_eq!(arena.used_elements(id), count);
            assert_eq!(arena.block_slice(id), payload.as_slice());
            arena.deallocate(id);
        }
    }

    #[test]
    fn allocated_blocks_start_zeroed() {
        let mut arena: BlockArena<u32> = BlockArena::new(8);

        let first = arena.allocate(8);
        arena.set_data(first, &filled(1, 8));
        arena.deallocate(first);

        // The new block reuses the freed storage but must not expose it.
        let second = arena.allocate(4);
        let offset = arena.offset_of(second);
        assert_eq!(&arena.as_slice()[offset..offset + 4], &[0, 0, 0, 0]);
        assert_eq!(arena.used_elements(second), 0);
    }

    #[test]
    fn ids_and_contents_stable_under_growth() {
        let mut arena: BlockArena<u32> = BlockArena::new(4);

        let a = arena.allocate(3);
        arena.set_data(a, &[7, 8, 9]);

        // Force several rounds of backing-array growth.
        let mut others = Vec::new();
        for i in 0..32 {
            let id = arena.allocate(5);
            arena.set_data(id, &filled(i * 10, 5));
            others.push(id);
        }

        assert_eq!(arena.block_slice(a), &[7, 8, 9]);
        for (i, id) in others.iter().enumerate() {
            assert_eq!(arena.block_slice(*id), filled(i as u32 * 10, 5).as_slice());
        }
    }

    #[test]
    fn deallocated_id_is_reused() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);

        let a = arena.allocate(4);
        let b = arena.allocate(4);
        arena.deallocate(a);

        let c = arena.allocate(2);
        assert_eq!(c, a, "freed id should be reissued");
        assert_ne!(c, b);
    }

    #[test]
    fn freed_space_is_merged_and_reusable() {
        let mut arena: BlockArena<u32> = BlockArena::new(12);

        let a = arena.allocate(4);
        let b = arena.allocate(4);
        let c = arena.allocate(4);

        // Free the first two blocks; their ranges merge into one 8-element
        // hole that a larger allocation can use without growing the array.
        arena.deallocate(a);
        arena.deallocate(b);

        let d = arena.allocate(8);
        assert_eq!(arena.offset_of(d), 0);
        assert_eq!(arena.buffer_size_in_bytes(), 12 * 4);
        let _ = c;
    }

    #[test]
    fn set_sub_data_extends_used_count() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);
        let id = arena.allocate(8);

        arena.set_sub_data(id, 2, &[5, 6]);
        assert_eq!(arena.used_elements(id), 4);

        arena.set_sub_data(id, 0, &[3, 4]);
        assert_eq!(arena.used_elements(id), 4);
        assert_eq!(arena.block_slice(id), &[3, 4, 5, 6]);
    }

    #[test]
    #[should_panic(expected = "exceeds block capacity")]
    fn set_sub_data_range_overrun_panics() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);
        let id = arena.allocate(4);
        arena.set_sub_data(id, 3, &[1, 2]);
    }

    #[test]
    #[should_panic(expected = "cannot allocate an empty block")]
    fn zero_length_allocation_panics() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);
        arena.allocate(0);
    }

    #[test]
    #[should_panic(expected = "has been deallocated")]
    fn dangling_id_access_panics() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);
        let id = arena.allocate(4);
        arena.deallocate(id);
        arena.used_elements(id);
    }

    #[test]
    fn resize_within_capacity_keeps_location() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);
        let id = arena.allocate(6);
        arena.set_data(id, &filled(1, 6));
        let offset = arena.offset_of(id);

        assert!(arena.resize_data(id, 3), "shrinking the used count changed the block");
        assert_eq!(arena.offset_of(id), offset);
        assert_eq!(arena.capacity_of(id), 6);
        assert_eq!(arena.block_slice(id), &[1, 2, 3]);

        assert!(!arena.resize_data(id, 3), "resizing to the current size is a no-op");
    }

    #[test]
    fn resize_growth_relocates_and_preserves_contents() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);
        let a = arena.allocate(4);
        let b = arena.allocate(4);
        arena.set_data(a, &[1, 2, 3, 4]);
        arena.set_data(b, &[9, 9, 9, 9]);

        // Block b sits right behind a, so a must relocate to grow.
        assert!(arena.resize_data(a, 10));
        assert_eq!(arena.capacity_of(a), 10);
        assert_eq!(arena.used_elements(a), 10);
        assert_eq!(&arena.block_slice(a)[..4], &[1, 2, 3, 4]);
        assert_eq!(&arena.block_slice(a)[4..], &[0; 6]);
        assert_eq!(arena.block_slice(b), &[9, 9, 9, 9]);
    }

    #[test]
    fn resize_grows_in_place_into_adjacent_free_space() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);
        let a = arena.allocate(4);
        arena.set_data(a, &[1, 2, 3, 4]);
        let offset = arena.offset_of(a);

        // The rest of the arena is free, so the block grows without moving.
        assert!(arena.resize_data(a, 12));
        assert_eq!(arena.offset_of(a), offset);
        assert_eq!(arena.capacity_of(a), 12);
    }

    fn regular_slot(vertex: BlockId, index: BlockId) -> GeometrySlot {
        GeometrySlot::new(SlotKind::Regular, vertex, index)
    }

    #[test]
    fn apply_transactions_converges_to_source() {
        let mut source: BlockArena<u32> = BlockArena::new(16);
        let mut replica: BlockArena<u32> = BlockArena::new(16);

        let id = source.allocate(6);
        source.set_data(id, &filled(10, 6));

        let slot = regular_slot(BlockId(0), id);
        let log = vec![
            BufferTransaction {
                slot,
                target: TransactionTarget::Indices,
                offset: 0,
                count: 6,
            },
            BufferTransaction {
                slot,
                target: TransactionTarget::Indices,
                offset: 2,
                count: 2,
            },
        ];

        replica.apply_transactions(&log, &source, |t| {
            (t.target == TransactionTarget::Indices).then(|| t.slot.index_block())
        });

        assert_eq!(replica.block_slice(id), source.block_slice(id));
        assert_eq!(replica.used_elements(id), 6);
    }

    #[test]
    fn apply_transactions_reallocates_on_capacity_mismatch() {
        let mut source: BlockArena<u32> = BlockArena::new(16);
        let mut replica: BlockArena<u32> = BlockArena::new(16);

        // Replica knows the id with a stale capacity.
        let id = source.allocate(4);
        source.set_data(id, &[1, 2, 3, 4]);
        let slot = regular_slot(BlockId(0), id);
        let log = vec![BufferTransaction {
            slot,
            target: TransactionTarget::Indices,
            offset: 0,
            count: 4,
        }];
        replica.apply_transactions(&log, &source, |t| Some(t.slot.index_block()));

        // Source reuses the id for a bigger block.
        source.deallocate(id);
        let id2 = source.allocate(8);
        assert_eq!(id2, id);
        source.set_data(id2, &filled(20, 8));

        let log = vec![BufferTransaction {
            slot: regular_slot(BlockId(0), id2),
            target: TransactionTarget::Indices,
            offset: 0,
            count: 8,
        }];
        replica.apply_transactions(&log, &source, |t| Some(t.slot.index_block()));

        assert_eq!(replica.capacity_of(id2), 8);
        assert_eq!(replica.block_slice(id2), source.block_slice(id2));
    }

    #[test]
    fn apply_transactions_skips_dead_source_blocks() {
        let mut source: BlockArena<u32> = BlockArena::new(16);
        let mut replica: BlockArena<u32> = BlockArena::new(16);

        let id = source.allocate(4);
        let slot = regular_slot(BlockId(0), id);
        let log = vec![BufferTransaction {
            slot,
            target: TransactionTarget::Indices,
            offset: 0,
            count: 4,
        }];
        source.deallocate(id);

        // The recorded write refers to a block that no longer exists in the
        // source; the replica must not create it.
        replica.apply_transactions(&log, &source, |t| Some(t.slot.index_block()));
        assert!(!replica.is_live(id));
    }

    #[test]
    fn modifications_are_coalesced() {
        let mut arena: BlockArena<u32> = BlockArena::new(16);
        // Consume the initial full-upload state.
        let initial = arena.take_unsynced_modifications();
        assert!(initial.full_upload);

        let id = arena.allocate(8);
        arena.set_sub_data(id, 0, &[1, 2]);
        arena.set_sub_data(id, 2, &[3, 4]);
        arena.set_sub_data(id, 6, &[7, 8]);

        let mods = arena.take_unsynced_modifications();
        assert!(!mods.full_upload);
        // allocate() marked the whole block and the sub-writes fall inside
        // it, so everything coalesces into a single range.
        let offset = arena.offset_of(id);
        assert_eq!(mods.ranges, vec![offset..offset + 8]);

        // Nothing pending afterwards.
        let mods = arena.take_unsynced_modifications();
        assert!(!mods.full_upload);
        assert!(mods.ranges.is_empty());
    }

    #[test]
    fn growth_forces_full_upload() {
        let mut arena: BlockArena<u32> = BlockArena::new(4);
        let _ = arena.take_unsynced_modifications();

        let _ = arena.allocate(16);
        let mods = arena.take_unsynced_modifications();
        assert!(mods.full_upload);
        assert!(mods.ranges.is_empty());
    }
}
