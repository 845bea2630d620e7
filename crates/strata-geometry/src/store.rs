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

//! The slot-level geometry store orchestrating frame buffers.
//!
//! The store owns one vertex/index arena pair per frame buffer. Exactly one
//! frame buffer is writable at any time; the others are settling, either
//! still being read by the device or waiting to catch up on recorded
//! mutations. Per frame buffer the lifecycle is:
//!
//! ```text
//! Idle (no pending fence) → Writable (current) → AwaitingGpu (fence issued) → Idle
//! ```
//!
//! A frame buffer is writable for exactly the span between two consecutive
//! [`GeometryStore::on_frame_start`] calls that select it. The fence wait in
//! `on_frame_start` is the subsystem's only blocking point.

use crate::arena::BlockArena;
use crate::device_buffer::DeviceBuffer;
use crate::slot::{GeometrySlot, SlotKind};
use crate::stats::{FrameBufferStats, GeometryStoreStats};
use crate::transaction::{BufferTransaction, TransactionTarget};
use strata_core::math::Aabb;
use strata_core::renderer::{
    BufferId, BufferUsage, GraphicsDevice, MeshVertex, SyncObject, SyncObjectProvider,
    MAX_FRAMES_IN_FLIGHT,
};
use strata_core::ResourceError;

/// Configuration for a [`GeometryStore`].
#[derive(Debug, Clone)]
pub struct GeometryStoreConfig {
    /// Number of frame buffers rotated by [`GeometryStore::on_frame_start`].
    /// Must be at least 1.
    pub frame_buffers: usize,
    /// Initial vertex arena capacity per frame buffer, in elements.
    pub initial_vertex_capacity: usize,
    /// Initial index arena capacity per frame buffer, in elements.
    pub initial_index_capacity: usize,
}

impl Default for GeometryStoreConfig {
    fn default() -> Self {
        Self {
            frame_buffers: MAX_FRAMES_IN_FLIGHT,
            initial_vertex_capacity: 65536,
            initial_index_capacity: 131072,
        }
    }
}

/// Everything needed to issue a draw call for one slot.
///
/// The offsets are element offsets into the current frame buffer's device
/// buffers (see [`GeometryStore::buffer_objects`]). Stored indices are
/// relative to the slot's vertex block, so `first_vertex` is the base-vertex
/// value for the draw call. The values are invalidated by the next
/// structural mutation of the store and by the next frame rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParameters {
    /// Element offset of the slot's first vertex in the vertex buffer.
    pub first_vertex: usize,
    /// Element offset of the slot's first index in the index buffer.
    pub first_index: usize,
    /// Number of indices to draw.
    pub index_count: usize,
}

/// The storage for a single frame: one arena pair, the mutations recorded
/// while it was writable, its device buffers, and an optional pending fence.
#[derive(Debug)]
struct FrameBuffer {
    vertices: BlockArena<MeshVertex>,
    indices: BlockArena<u32>,
    transactions: Vec<BufferTransaction>,
    sync_object: Option<Box<dyn SyncObject>>,
    vertex_buffer: DeviceBuffer,
    index_buffer: DeviceBuffer,
}

impl FrameBuffer {
    /// Replays another frame buffer's recorded mutations onto this one,
    /// copying element data from `source` (which must be fully up to date).
    fn apply_transactions(&mut self, transactions: &[BufferTransaction], source: &FrameBuffer) {
        self.vertices
            .apply_transactions(transactions, &source.vertices, |t| {
                (t.target == TransactionTarget::Vertices).then(|| t.slot.vertex_block())
            });
        self.indices
            .apply_transactions(transactions, &source.indices, |t| {
                (t.target == TransactionTarget::Indices).then(|| t.slot.index_block())
            });
    }
}

/// Frame-buffered storage for all vertex and index data used by a renderer.
///
/// See the [module docs](crate::store) for the per-frame lifecycle and the
/// [crate docs](crate) for how mutations propagate between frame buffers.
///
/// # Panics
///
/// Misuse of the slot API (zero-size allocations, vertex writes into
/// [`SlotKind::IndexRemap`] slots, dangling slots) is a programmer error and
/// panics. Device failures are surfaced as [`ResourceError`]s.
#[derive(Debug)]
pub struct GeometryStore {
    frames: Vec<FrameBuffer>,
    current: usize,
}

impl GeometryStore {
    /// Creates a store with `config.frame_buffers` frame buffers, allocating
    /// one vertex and one index device buffer per frame.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if device buffer creation fails.
    ///
    /// # Panics
    ///
    /// Panics if the configuration asks for zero frame buffers or zero
    /// initial arena capacity.
    pub fn new(
        device: &dyn GraphicsDevice,
        config: GeometryStoreConfig,
    ) -> Result<Self, ResourceError> {
        assert!(
            config.frame_buffers >= 1,
            "geometry store needs at least one frame buffer"
        );

        let mut frames = Vec::with_capacity(config.frame_buffers);
        for frame in 0..config.frame_buffers {
            let vertices: BlockArena<MeshVertex> =
                BlockArena::new(config.initial_vertex_capacity);
            let indices: BlockArena<u32> = BlockArena::new(config.initial_index_capacity);

            let vertex_buffer = DeviceBuffer::new(
                device,
                format!("Geometry vertices [frame {frame}]"),
                BufferUsage::VERTEX | BufferUsage::COPY_DST,
                vertices.buffer_size_in_bytes(),
            )?;
            let index_buffer = DeviceBuffer::new(
                device,
                format!("Geometry indices [frame {frame}]"),
                BufferUsage::INDEX | BufferUsage::COPY_DST,
                indices.buffer_size_in_bytes(),
            )?;

            frames.push(FrameBuffer {
                vertices,
                indices,
                transactions: Vec::new(),
                sync_object: None,
                vertex_buffer,
                index_buffer,
            });
        }

        Ok(Self { frames, current: 0 })
    }

    /// Allocates storage for `num_vertices` vertices plus `num_indices`
    /// indices in the current frame buffer and returns a
    /// [`SlotKind::Regular`] slot owning both blocks.
    ///
    /// # Panics
    ///
    /// Panics if either count is zero.
    pub fn allocate_slot(&mut self, num_vertices: usize, num_indices: usize) -> GeometrySlot {
        assert!(num_vertices > 0, "slot must hold at least one vertex");
        assert!(num_indices > 0, "slot must hold at least one index");

        let frame = &mut self.frames[self.current];
        let vertex_block = frame.vertices.allocate(num_vertices);
        let index_block = frame.indices.allocate(num_indices);

        let slot = GeometrySlot::new(SlotKind::Regular, vertex_block, index_block);

        // Record the fresh (zeroed) blocks at full capacity so settling frame
        // buffers reproduce them exactly, including the zeroed tail.
        frame.transactions.push(BufferTransaction {
            slot,
            target: TransactionTarget::Vertices,
            offset: 0,
            count: num_vertices,
        });
        frame.transactions.push(BufferTransaction {
            slot,
            target: TransactionTarget::Indices,
            offset: 0,
            count: num_indices,
        });

        slot
    }

    /// Allocates an index block re-using the vertex data of an existing
    /// [`SlotKind::Regular`] slot, returning a [`SlotKind::IndexRemap`] slot.
    ///
    /// The referenced vertex block is shared, not owned: deallocating the
    /// remap slot leaves it alone, and it must outlive the remap slot.
    ///
    /// # Panics
    ///
    /// Panics if `num_indices` is zero or `vertex_slot` is not `Regular` (a
    /// remap slot cannot itself be re-remapped).
    pub fn allocate_index_slot(
        &mut self,
        vertex_slot: GeometrySlot,
        num_indices: usize,
    ) -> GeometrySlot {
        assert!(num_indices > 0, "slot must hold at least one index");
        assert!(
            vertex_slot.kind() == SlotKind::Regular,
            "the given slot does not own vertex data and cannot be used as an index remap base"
        );

        let frame = &mut self.frames[self.current];
        let index_block = frame.indices.allocate(num_indices);

        let slot = GeometrySlot::new(
            SlotKind::IndexRemap,
            vertex_slot.vertex_block(),
            index_block,
        );

        frame.transactions.push(BufferTransaction {
            slot,
            target: TransactionTarget::Indices,
            offset: 0,
            count: num_indices,
        });

        slot
    }

    /// Overwrites a slot's contents.
    ///
    /// For a [`SlotKind::Regular`] slot both `vertices` and `indices` must be
    /// non-empty; for a [`SlotKind::IndexRemap`] slot `vertices` must be
    /// empty (the slot owns no vertex block).
    ///
    /// # Panics
    ///
    /// Panics on the conditions above, or when a payload exceeds its block's
    /// capacity.
    pub fn update_data(&mut self, slot: GeometrySlot, vertices: &[MeshVertex], indices: &[u32]) {
        let frame = &mut self.frames[self.current];

        if slot.kind() == SlotKind::Regular {
            assert!(
                !vertices.is_empty(),
                "a regular slot update must supply vertex data"
            );
            frame.vertices.set_data(slot.vertex_block(), vertices);
            frame.transactions.push(BufferTransaction {
                slot,
                target: TransactionTarget::Vertices,
                offset: 0,
                count: vertices.len(),
            });
        } else {
            assert!(
                vertices.is_empty(),
                "this is an index remap slot, cannot update vertex data"
            );
        }

        assert!(!indices.is_empty(), "a slot update must supply index data");
        frame.indices.set_data(slot.index_block(), indices);
        frame.transactions.push(BufferTransaction {
            slot,
            target: TransactionTarget::Indices,
            offset: 0,
            count: indices.len(),
        });
    }

    /// Overwrites parts of a slot's contents, starting at `vertex_offset`
    /// elements into the vertex block and `index_offset` elements into the
    /// index block.
    ///
    /// # Panics
    ///
    /// Same conditions as [`GeometryStore::update_data`], plus a range check
    /// against each block's capacity before anything is written.
    pub fn update_sub_data(
        &mut self,
        slot: GeometrySlot,
        vertex_offset: usize,
        vertices: &[MeshVertex],
        index_offset: usize,
        indices: &[u32],
    ) {
        let frame = &mut self.frames[self.current];

        if slot.kind() == SlotKind::Regular {
            assert!(
                !vertices.is_empty(),
                "a regular slot update must supply vertex data"
            );
            frame
                .vertices
                .set_sub_data(slot.vertex_block(), vertex_offset, vertices);
            frame.transactions.push(BufferTransaction {
                slot,
                target: TransactionTarget::Vertices,
                offset: vertex_offset,
                count: vertices.len(),
            });
        } else {
            assert!(
                vertices.is_empty(),
                "this is an index remap slot, cannot update vertex data"
            );
        }

        assert!(!indices.is_empty(), "a slot update must supply index data");
        frame
            .indices
            .set_sub_data(slot.index_block(), index_offset, indices);
        frame.transactions.push(BufferTransaction {
            slot,
            target: TransactionTarget::Indices,
            offset: index_offset,
            count: indices.len(),
        });
    }

    /// Resizes a slot's used element counts, growing block capacities as
    /// needed. `vertex_size` must be 0 for [`SlotKind::IndexRemap`] slots.
    ///
    /// # Panics
    ///
    /// Panics when a non-zero `vertex_size` is given for an `IndexRemap`
    /// slot.
    pub fn resize_data(&mut self, slot: GeometrySlot, vertex_size: usize, index_size: usize) {
        let frame = &mut self.frames[self.current];

        if slot.kind() == SlotKind::Regular {
            if frame.vertices.resize_data(slot.vertex_block(), vertex_size) {
                frame.transactions.push(BufferTransaction {
                    slot,
                    target: TransactionTarget::Vertices,
                    offset: 0,
                    count: vertex_size,
                });
            }
        } else {
            assert!(
                vertex_size == 0,
                "this is an index remap slot, cannot resize vertex data"
            );
        }

        if frame.indices.resize_data(slot.index_block(), index_size) {
            frame.transactions.push(BufferTransaction {
                slot,
                target: TransactionTarget::Indices,
                offset: 0,
                count: index_size,
            });
        }
    }

    /// Frees a slot's storage in the current frame buffer.
    ///
    /// The index block is always released; the vertex block only for
    /// [`SlotKind::Regular`] slots (an `IndexRemap` slot never owns vertex
    /// data). Settling frame buffers release their copies lazily, when the
    /// block id is reissued and replayed.
    pub fn deallocate_slot(&mut self, slot: GeometrySlot) {
        let frame = &mut self.frames[self.current];

        if slot.kind() == SlotKind::Regular {
            frame.vertices.deallocate(slot.vertex_block());
        }
        frame.indices.deallocate(slot.index_block());
    }

    /// Returns the draw-call parameters for a slot in the current frame
    /// buffer. Pure read; no allocation.
    pub fn render_parameters(&self, slot: GeometrySlot) -> RenderParameters {
        let frame = &self.frames[self.current];

        RenderParameters {
            first_vertex: frame.vertices.offset_of(slot.vertex_block()),
            first_index: frame.indices.offset_of(slot.index_block()),
            index_count: frame.indices.used_elements(slot.index_block()),
        }
    }

    /// Walks the slot's indices over its vertex block and returns the
    /// enclosing axis-aligned bounding box. O(index count).
    ///
    /// Returns [`Aabb::INVALID`] when the slot has no indices yet.
    pub fn bounds(&self, slot: GeometrySlot) -> Aabb {
        let frame = &self.frames[self.current];

        let vertices = frame.vertices.block_slice(slot.vertex_block());
        frame
            .indices
            .block_slice(slot.index_block())
            .iter()
            .fold(Aabb::INVALID, |bounds, &index| {
                bounds.merged_with_point(vertices[index as usize].position)
            })
    }

    /// Marks the beginning of a frame: rotates to the next frame buffer,
    /// waits for the device to release it, and catches it up on everything
    /// recorded since it was last current.
    ///
    /// Blocks on the frame buffer's pending fence, if any. Replay happens in
    /// frame-buffer-index order and copies data from the previously current
    /// frame buffer, which is fully up to date by construction; the newly
    /// current frame buffer's own log is cleared afterwards, since every
    /// other frame buffer has already seen it.
    pub fn on_frame_start(&mut self) {
        let previous = self.current;
        self.current = (self.current + 1) % self.frames.len();

        // Wait for the device to finish reading this frame buffer.
        if let Some(sync) = self.frames[self.current].sync_object.take() {
            sync.wait();
        }

        for source_of_log in 0..self.frames.len() {
            if source_of_log == self.current {
                continue;
            }

            let log = std::mem::take(&mut self.frames[source_of_log].transactions);
            {
                let (dest, source) = two_frames_mut(&mut self.frames, self.current, previous);
                dest.apply_transactions(&log, source);
            }
            self.frames[source_of_log].transactions = log;
        }

        self.frames[self.current].transactions.clear();
    }

    /// Marks the end of the current frame: requests a fence for the frame
    /// buffer that was just written, to be waited on before it is reused.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if the provider cannot create a fence.
    pub fn on_frame_finished(
        &mut self,
        sync_provider: &dyn SyncObjectProvider,
    ) -> Result<(), ResourceError> {
        self.frames[self.current].sync_object = Some(sync_provider.create_sync_object()?);
        Ok(())
    }

    /// Returns the current frame buffer's device buffers as
    /// `(vertex_buffer, index_buffer)`.
    ///
    /// The handles change when [`GeometryStore::sync_to_buffer_objects`]
    /// re-creates an outgrown buffer, and refer to a different frame buffer
    /// after the next [`GeometryStore::on_frame_start`].
    pub fn buffer_objects(&self) -> (BufferId, BufferId) {
        let frame = &self.frames[self.current];
        (frame.vertex_buffer.id(), frame.index_buffer.id())
    }

    /// Pushes the current frame buffer's pending modifications to its device
    /// buffers.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if a device write or buffer re-creation
    /// fails. The failed data is re-sent on the next successful call.
    pub fn sync_to_buffer_objects(
        &mut self,
        device: &dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        let frame = &mut self.frames[self.current];
        frame
            .vertex_buffer
            .sync_from_arena(device, &mut frame.vertices)?;
        frame
            .index_buffer
            .sync_from_arena(device, &mut frame.indices)?;
        Ok(())
    }

    /// Destroys all device buffers owned by the store. Must be called during
    /// shutdown; afterwards the store must not be used again.
    pub fn destroy(&self, device: &dyn GraphicsDevice) {
        for frame in &self.frames {
            frame.vertex_buffer.destroy(device);
            frame.index_buffer.destroy(device);
        }
    }

    /// Reports per-frame-buffer memory usage.
    pub fn stats(&self) -> GeometryStoreStats {
        GeometryStoreStats {
            frame_buffers: self
                .frames
                .iter()
                .map(|frame| FrameBufferStats {
                    vertex_bytes: frame.vertices.buffer_size_in_bytes(),
                    index_bytes: frame.indices.buffer_size_in_bytes(),
                    transaction_count: frame.transactions.len(),
                    transaction_bytes: frame.transactions.capacity()
                        * std::mem::size_of::<BufferTransaction>(),
                })
                .collect(),
            current_frame: self.current,
        }
    }
}

/// Splits mutable access to two distinct frame buffers.
fn two_frames_mut(
    frames: &mut [FrameBuffer],
    dest: usize,
    source: usize,
) -> (&mut FrameBuffer, &FrameBuffer) {
    debug_assert_ne!(dest, source);
    if dest < source {
        let (head, tail) = frames.split_at_mut(source);
        (&mut head[dest], &tail[0])
    } else {
        let (head, tail) = frames.split_at_mut(dest);
        (&mut tail[0], &head[source])
    }
}
