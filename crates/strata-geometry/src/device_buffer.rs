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

//! A persistent GPU buffer mirroring one [`BlockArena`].
//!
//! Each frame buffer owns one [`DeviceBuffer`] per arena. The buffer is
//! created once, updated in place through `write_buffer()`, and only
//! re-created when the arena outgrows it. When the arena reports a full
//! upload (initial state or backing-array growth) the whole array is pushed;
//! otherwise only the modified byte ranges are.

use crate::arena::BlockArena;
use std::borrow::Cow;
use strata_core::renderer::{BufferDescriptor, BufferId, BufferUsage, GraphicsDevice};
use strata_core::ResourceError;

/// A device buffer kept in sync with a [`BlockArena`]'s backing array.
#[derive(Debug)]
pub struct DeviceBuffer {
    /// The current GPU buffer.
    id: BufferId,
    /// The size the GPU buffer was created with, in bytes.
    capacity_bytes: usize,
    /// Usage flags the buffer is (re-)created with.
    usage: BufferUsage,
    /// Debug label for logging and buffer descriptors.
    label: String,
}

impl DeviceBuffer {
    /// Creates the initial GPU buffer of `initial_bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if buffer creation fails.
    pub fn new(
        device: &dyn GraphicsDevice,
        label: String,
        usage: BufferUsage,
        initial_bytes: usize,
    ) -> Result<Self, ResourceError> {
        let id = device.create_buffer(&BufferDescriptor {
            label: Some(Cow::Borrowed(label.as_str())),
            size: initial_bytes as u64,
            usage,
        })?;

        Ok(Self {
            id,
            capacity_bytes: initial_bytes,
            usage,
            label,
        })
    }

    /// Returns the current GPU buffer handle.
    ///
    /// The handle changes when the buffer is re-created on growth, so callers
    /// must re-query it after [`DeviceBuffer::sync_from_arena`].
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Returns the size the GPU buffer was created with, in bytes.
    pub fn size_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Pushes the arena's unsynced modifications to the GPU buffer.
    ///
    /// Re-creates the buffer when the arena's backing array no longer fits.
    /// On a failed upload the arena is marked fully dirty so the next call
    /// re-uploads everything instead of silently losing the failed ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if buffer creation or a write fails.
    pub fn sync_from_arena<T: bytemuck::Pod>(
        &mut self,
        device: &dyn GraphicsDevice,
        arena: &mut BlockArena<T>,
    ) -> Result<(), ResourceError> {
        let modifications = arena.take_unsynced_modifications();
        let required_bytes = arena.buffer_size_in_bytes();

        if required_bytes > self.capacity_bytes {
            if let Err(error) = device.destroy_buffer(self.id) {
                log::warn!(
                    "DeviceBuffer({}): failed to destroy outgrown buffer: {:?}",
                    self.label,
                    error
                );
            }

            self.id = match device.create_buffer(&BufferDescriptor {
                label: Some(Cow::Borrowed(self.label.as_str())),
                size: required_bytes as u64,
                usage: self.usage,
            }) {
                Ok(id) => id,
                Err(error) => {
                    arena.mark_fully_dirty();
                    return Err(error);
                }
            };

            log::debug!(
                "DeviceBuffer({}): re-created, {} -> {} bytes",
                self.label,
                self.capacity_bytes,
                required_bytes
            );
            self.capacity_bytes = required_bytes;

            return self.upload_all(device, arena);
        }

        if modifications.full_upload {
            return self.upload_all(device, arena);
        }

        let element_size = std::mem::size_of::<T>();
        for range in &modifications.ranges {
            let bytes = bytemuck::cast_slice(&arena.as_slice()[range.clone()]);
            if let Err(error) =
                device.write_buffer(self.id, (range.start * element_size) as u64, bytes)
            {
                arena.mark_fully_dirty();
                return Err(error);
            }
        }

        Ok(())
    }

    /// Destroys the GPU buffer. Failures are logged, not propagated; there is
    /// nothing the caller can do about a buffer that will not die.
    pub fn destroy(&self, device: &dyn GraphicsDevice) {
        if let Err(error) = device.destroy_buffer(self.id) {
            log::warn!(
                "DeviceBuffer({}): failed to destroy buffer: {:?}",
                self.label,
                error
            );
        }
    }

    /// Uploads the arena's whole backing array.
    fn upload_all<T: bytemuck::Pod>(
        &self,
        device: &dyn GraphicsDevice,
        arena: &mut BlockArena<T>,
    ) -> Result<(), ResourceError> {
        if let Err(error) = device.write_buffer(self.id, 0, bytemuck::cast_slice(arena.as_slice()))
        {
            arena.mark_fully_dirty();
            return Err(error);
        }
        Ok(())
    }
}
