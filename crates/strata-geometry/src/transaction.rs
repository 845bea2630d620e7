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

//! Recorded buffer mutations, replayed to keep frame buffers consistent.

use crate::slot::GeometrySlot;

/// Which of a slot's two blocks a transaction addresses.
///
/// One store-level write can touch both the vertex and the index block with
/// different element ranges, so each sub-write is recorded separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionTarget {
    /// The write addressed the slot's vertex block.
    Vertices,
    /// The write addressed the slot's index block.
    Indices,
}

/// An immutable record of one write into a frame buffer.
///
/// Means: between `offset` and `offset + count` elements of the addressed
/// block of `slot` were (re)written while the recording frame buffer was
/// current. Replay copies that range from an up-to-date arena, so applying
/// the same transaction twice is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferTransaction {
    /// The slot whose block was written.
    pub slot: GeometrySlot,
    /// Which of the slot's blocks was written.
    pub target: TransactionTarget,
    /// First written element, relative to the block start.
    pub offset: usize,
    /// Number of written elements.
    pub count: usize,
}
