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

use crate::renderer::api::BufferDescriptor;
use crate::renderer::api::BufferId;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The buffer-object provider implemented by a concrete graphics backend.
///
/// Geometry storage asks the device for one vertex and one index buffer per
/// frame buffer and pushes arena contents into them. All failures are
/// *resource* faults reported by the backend; this subsystem propagates them
/// without masking or retrying.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a new GPU buffer.
    /// ## Arguments
    /// * `descriptor` - A reference to a `BufferDescriptor` containing the buffer configuration.
    /// ## Returns
    /// A `Result` containing the ID of the created buffer or an error if the creation fails.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Destroys a GPU buffer.
    /// ## Arguments
    /// * `id` - The ID of the buffer to be destroyed.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Writes data to a GPU buffer.
    /// ## Arguments
    /// * `id` - The ID of the buffer to write to.
    /// * `offset` - The offset in the buffer where the data will be written.
    /// * `data` - A slice of bytes containing the data to be written.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;
}
