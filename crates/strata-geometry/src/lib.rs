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

//! # Strata Geometry
//!
//! Frame-buffered storage for vertex and index data submitted by a scene
//! renderer.
//!
//! All geometry lives in a small number of large, contiguous backing arrays
//! managed by [`BlockArena`]. Callers receive stable [`GeometrySlot`] handles
//! and never touch raw storage. The [`GeometryStore`] keeps one vertex/index
//! arena pair per frame buffer, rotates which pair is writable each frame,
//! and uses device fences to avoid overwriting data the GPU is still reading.
//!
//! # Frame lifecycle
//!
//! ```text
//! on_frame_start()        on_frame_finished()
//!       │                        │
//!       ▼                        ▼
//! [rotate + fence wait]   [request fence]
//! [replay transactions]
//!       │   allocate / update / deallocate slots,
//!       └── sync_to_buffer_objects(), issue draw calls ──┘
//! ```
//!
//! Mutations made between the two calls are recorded as
//! [`BufferTransaction`]s and replayed onto the other frame buffers when they
//! next become writable, so every generation converges to the same contents.

#![warn(missing_docs)]

pub mod arena;
pub mod device_buffer;
pub mod slot;
pub mod stats;
pub mod store;
pub mod transaction;

pub use arena::{BlockArena, BlockId};
pub use device_buffer::DeviceBuffer;
pub use slot::{GeometrySlot, SlotKind};
pub use stats::{FrameBufferStats, GeometryStoreStats};
pub use store::{GeometryStore, GeometryStoreConfig, RenderParameters};
pub use transaction::{BufferTransaction, TransactionTarget};
