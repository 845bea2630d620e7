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

//! Backend-agnostic data types for describing GPU resources.

/// The maximum number of frames that can be processed by the GPU at once.
/// This determines the default number of frame buffers kept by geometry
/// storage and other per-frame resources.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

pub mod buffer;
pub mod vertex;

pub use self::buffer::{BufferDescriptor, BufferId, BufferUsage};
pub use self::vertex::MeshVertex;
