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

//! Provides the foundational mathematics primitives used by the geometry
//! subsystem.
//!
//! This module contains the vector types that make up vertex data and the
//! axis-aligned bounding box used for spatial queries. It is intentionally
//! small; only what the storage and culling paths need.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub mod geometry;
pub mod vector;

pub use self::geometry::Aabb;
pub use self::vector::{Vec2, Vec3, Vec4};
