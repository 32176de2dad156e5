// Copyright 2025 eraflo
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

//! Plane equations, used for clip-plane culling.

use glam::{Vec3, Vec4};

/// A plane `dot(normal, p) + d = 0`.
///
/// Points with a positive signed distance are on the kept side when the plane
/// is used as a clip plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal of the plane.
    pub normal: Vec3,
    /// Signed offset along the normal.
    pub d: f32,
}

impl Plane {
    /// The equation fed to shaders when clipping is disabled; every point passes.
    pub const PASS_THROUGH: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a plane from a normal and offset.
    pub const fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// The horizontal plane `y = height`, keeping everything above it.
    ///
    /// Its equation is `(0, 1, 0, -height)`.
    pub fn horizontal(height: f32) -> Self {
        Self::new(Vec3::Y, -height)
    }

    /// Signed distance of `point` to the plane.
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Reflects `point` across the plane.
    #[inline]
    pub fn reflect_point(&self, point: Vec3) -> Vec3 {
        point - 2.0 * self.signed_distance(point) * self.normal
    }

    /// The 4-component equation as consumed by shaders.
    #[inline]
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(self.d)
    }
}
