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

//! Provides geometric primitive shapes for spatial calculations.

use super::Vec3;

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// An AABB is a rectangular prism aligned with the coordinate axes, defined by
/// its minimum and maximum corner points. It is a simple but highly efficient
/// volume for broad-phase visibility culling.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// An invalid `Aabb` where `min` components are positive infinity and `max` are negative infinity.
    ///
    /// This is useful as a neutral starting point for merging operations. Merging any
    /// valid `Aabb` with `INVALID` will result in that valid `Aabb`.
    pub const INVALID: Self = Self {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Creates a new `Aabb` from two corner points.
    ///
    /// This constructor automatically ensures that the `min` field holds the
    /// component-wise minimum and `max` holds the component-wise maximum,
    /// regardless of the order the points are passed in.
    #[inline]
    pub fn from_min_max(min_pt: Vec3, max_pt: Vec3) -> Self {
        Self {
            min: Vec3::new(
                min_pt.x.min(max_pt.x),
                min_pt.y.min(max_pt.y),
                min_pt.z.min(max_pt.z),
            ),
            max: Vec3::new(
                min_pt.x.max(max_pt.x),
                min_pt.y.max(max_pt.y),
                min_pt.z.max(max_pt.z),
            ),
        }
    }

    /// Creates a degenerate `Aabb` containing a single point (min and max are the same).
    #[inline]
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates an `Aabb` that tightly encloses a given set of points.
    ///
    /// # Returns
    ///
    /// Returns `Some(Aabb)` if the input slice is not empty, otherwise `None`.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut bounds = Self::from_point(points[0]);
        for point in points.iter().skip(1) {
            bounds = bounds.merged_with_point(*point);
        }

        Some(bounds)
    }

    /// Calculates the center point of the `Aabb`.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Calculates the half-extents (half the size on each axis) of the `Aabb`.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Calculates the full size (width, height, depth) of the `Aabb`.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Checks if the `Aabb` is valid (i.e., `min` <= `max` on all axes).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Checks if a point is contained within or on the boundary of the `Aabb`.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Creates a new `Aabb` that encompasses both this `Aabb` and another one.
    #[inline]
    pub fn merge(&self, other: &Aabb) -> Self {
        Self {
            min: Vec3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vec3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Creates a new `Aabb` that encompasses both this `Aabb` and an additional point.
    #[inline]
    pub fn merged_with_point(&self, point: Vec3) -> Self {
        Self {
            min: Vec3::new(
                self.min.x.min(point.x),
                self.min.y.min(point.y),
                self.min.z.min(point.z),
            ),
            max: Vec3::new(
                self.max.x.max(point.x),
                self.max.y.max(point.y),
                self.max.z.max(point.z),
            ),
        }
    }
}

impl Default for Aabb {
    /// Returns the default `Aabb`, which is `Aabb::INVALID`.
    #[inline]
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_min_max_reorders_corners() {
        let aabb = Aabb::from_min_max(Vec3::new(4.0, 5.0, 6.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.min, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn from_points_encloses_all() {
        let points = [
            Vec3::new(1.0, 0.0, -2.0),
            Vec3::new(-3.0, 4.0, 0.0),
            Vec3::new(2.0, -1.0, 5.0),
        ];
        let aabb = Aabb::from_points(&points).unwrap();
        assert_eq!(aabb.min, Vec3::new(-3.0, -1.0, -2.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 4.0, 5.0));
        for point in points {
            assert!(aabb.contains_point(point));
        }
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn invalid_is_merge_neutral() {
        let aabb = Aabb::from_min_max(Vec3::ZERO, Vec3::ONE);
        assert!(!Aabb::INVALID.is_valid());
        assert_eq!(Aabb::INVALID.merge(&aabb), aabb);

        let grown = Aabb::INVALID.merged_with_point(Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(grown, Aabb::from_point(Vec3::new(2.0, 2.0, 2.0)));
    }

    #[test]
    fn center_and_extents() {
        let aabb = Aabb::from_min_max(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(3.0, 2.0, 1.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(aabb.half_extents(), Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(aabb.size(), Vec3::new(4.0, 4.0, 4.0));
    }
}
