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

//! Memory-usage reporting for geometry storage.

/// Memory usage of a single frame buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameBufferStats {
    /// Size of the vertex arena's backing array in bytes.
    pub vertex_bytes: usize,
    /// Size of the index arena's backing array in bytes.
    pub index_bytes: usize,
    /// Number of transactions pending in this frame buffer's log.
    pub transaction_count: usize,
    /// Memory held by the transaction log in bytes.
    pub transaction_bytes: usize,
}

/// A snapshot of geometry storage memory usage across all frame buffers.
#[derive(Debug, Clone, Default)]
pub struct GeometryStoreStats {
    /// Per-frame-buffer usage, indexed by frame buffer.
    pub frame_buffers: Vec<FrameBufferStats>,
    /// Index of the currently writable frame buffer.
    pub current_frame: usize,
}

impl GeometryStoreStats {
    /// Total bytes held across all frame buffers, including log overhead.
    pub fn total_bytes(&self) -> usize {
        self.frame_buffers
            .iter()
            .map(|f| f.vertex_bytes + f.index_bytes + f.transaction_bytes)
            .sum()
    }
}
