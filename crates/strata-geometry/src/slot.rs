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

//! The caller-facing handle naming a piece of stored geometry.
//!
//! A [`GeometrySlot`] packs a [`SlotKind`] and two block ids into a single
//! 64-bit value: the highest 2 bits hold the kind, the next 31 bits the
//! vertex block id, and the lowest 31 bits the index block id. The packing is
//! an internal encoding detail; callers only ever see the opaque handle and
//! the explicit accessors.

use crate::arena::BlockId;

/// The kind of geometry a [`GeometrySlot`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// The slot owns both its vertex block and its index block.
    Regular = 0,
    /// The slot owns only an index block; its vertex id refers to the vertex
    /// block of a pre-existing `Regular` slot. This lets several index
    /// orderings (alternate winding, partial draws) reuse one vertex payload
    /// without duplicating it.
    IndexRemap = 1,
}

/// Bits available for each block id within the packed handle.
const ID_MASK: u64 = 0x7FFF_FFFF;
/// Shift of the vertex block id within the packed handle.
const VERTEX_SHIFT: u64 = 31;
/// Shift of the slot kind within the packed handle.
const KIND_SHIFT: u64 = 62;

/// An opaque 64-bit handle naming a vertex block, an index block, and a
/// [`SlotKind`].
///
/// Slots are handed out by the geometry store and stay valid until the slot
/// is deallocated. For an [`SlotKind::IndexRemap`] slot the referenced vertex
/// block must outlive the remap slot; the store relies on caller discipline
/// for this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometrySlot(u64);

impl GeometrySlot {
    /// Packs a kind and two block ids into a slot handle.
    ///
    /// # Panics
    ///
    /// Panics if either block id does not fit into 31 bits.
    pub(crate) fn new(kind: SlotKind, vertex_block: BlockId, index_block: BlockId) -> Self {
        assert!(
            u64::from(vertex_block.0) <= ID_MASK,
            "vertex block id {} exceeds the 31-bit slot encoding",
            vertex_block.0
        );
        assert!(
            u64::from(index_block.0) <= ID_MASK,
            "index block id {} exceeds the 31-bit slot encoding",
            index_block.0
        );

        Self(
            ((kind as u64) << KIND_SHIFT)
                | (u64::from(vertex_block.0) << VERTEX_SHIFT)
                | u64::from(index_block.0),
        )
    }

    /// Returns the kind encoded in this slot.
    pub fn kind(&self) -> SlotKind {
        match self.0 >> KIND_SHIFT {
            0 => SlotKind::Regular,
            1 => SlotKind::IndexRemap,
            bits => unreachable!("corrupt slot handle: unknown kind {bits}"),
        }
    }

    /// Returns the vertex block id. For [`SlotKind::IndexRemap`] slots this
    /// is the vertex block of the referenced `Regular` slot.
    pub fn vertex_block(&self) -> BlockId {
        BlockId(((self.0 >> VERTEX_SHIFT) & ID_MASK) as u32)
    }

    /// Returns the index block id.
    pub fn index_block(&self) -> BlockId {
        BlockId((self.0 & ID_MASK) as u32)
    }

    /// Returns the raw 64-bit representation of the handle.
    pub fn to_bits(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_round_trips() {
        let cases = [
            (SlotKind::Regular, 0u32, 0u32),
            (SlotKind::Regular, 1, 2),
            (SlotKind::IndexRemap, 12345, 54321),
            (SlotKind::Regular, 0x7FFF_FFFF, 0x7FFF_FFFF),
            (SlotKind::IndexRemap, 0x7FFF_FFFF, 0),
        ];

        for (kind, vertex, index) in cases {
            let slot = GeometrySlot::new(kind, BlockId(vertex), BlockId(index));
            assert_eq!(slot.kind(), kind);
            assert_eq!(slot.vertex_block(), BlockId(vertex));
            assert_eq!(slot.index_block(), BlockId(index));
        }
    }

    #[test]
    fn different_kinds_are_distinct_handles() {
        let regular = GeometrySlot::new(SlotKind::Regular, BlockId(3), BlockId(4));
        let remap = GeometrySlot::new(SlotKind::IndexRemap, BlockId(3), BlockId(4));
        assert_ne!(regular, remap);
        assert_ne!(regular.to_bits(), remap.to_bits());
    }

    #[test]
    #[should_panic(expected = "exceeds the 31-bit slot encoding")]
    fn oversized_id_panics() {
        let _ = GeometrySlot::new(SlotKind::Regular, BlockId(0x8000_0000), BlockId(0));
    }
}
