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

//! Defines the interleaved vertex format stored in geometry buffers.

use crate::math::{Vec2, Vec3, Vec4};

/// A single interleaved mesh vertex as stored in vertex buffers.
///
/// The layout is `#[repr(C)]` and tightly packed (48 bytes) so a slice of
/// vertices can be reinterpreted as raw bytes for GPU upload via
/// [`bytemuck::cast_slice`].
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct MeshVertex {
    /// The vertex position in model space.
    pub position: Vec3,
    /// The vertex normal.
    pub normal: Vec3,
    /// The texture coordinates.
    pub tex_coord: Vec2,
    /// The vertex colour (RGBA).
    pub colour: Vec4,
}

impl MeshVertex {
    /// Creates a vertex with the given position, a zero normal, zero texture
    /// coordinates, and an opaque white colour.
    #[inline]
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            tex_coord: Vec2::ZERO,
            colour: Vec4::ONE,
        }
    }

    /// Creates a fully specified vertex.
    #[inline]
    pub const fn new(position: Vec3, normal: Vec3, tex_coord: Vec2, colour: Vec4) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            colour,
        }
    }
}

impl Default for MeshVertex {
    /// Returns the vertex produced by [`MeshVertex::from_position`] at the origin.
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        // 3 + 3 + 2 + 4 floats, no padding.
        assert_eq!(std::mem::size_of::<MeshVertex>(), 48);
    }

    #[test]
    fn vertex_slice_casts_to_bytes() {
        let vertices = [
            MeshVertex::from_position(Vec3::new(1.0, 2.0, 3.0)),
            MeshVertex::from_position(Vec3::new(4.0, 5.0, 6.0)),
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 2 * 48);
    }
}
