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

use lagoon_core::math::{Extent2D, Mat4};

/// Perspective projection parameters of a camera node.
///
/// The aspect ratio is not stored here; it is taken from the window size
/// every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// The vertical field of view in radians.
    pub fov_y_radians: f32,
    /// The distance to the near clipping plane.
    pub z_near: f32,
    /// The distance to the far clipping plane.
    pub z_far: f32,
}

impl Camera {
    /// Creates a perspective camera.
    pub fn new_perspective(fov_y_radians: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y_radians,
            z_near,
            z_far,
        }
    }

    /// Calculates the projection matrix for a viewport of `size`.
    ///
    /// Right-handed with a `[0, 1]` depth range, as WebGPU expects.
    pub fn projection_matrix(&self, size: Extent2D) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_radians,
            size.aspect_ratio(),
            self.z_near,
            self.z_far,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(1.0, 0.1, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagoon_core::math::Vec4;

    #[test]
    fn projection_tracks_window_aspect() {
        let camera = Camera::default();
        let wide = camera.projection_matrix(Extent2D::new(1600, 800));
        let square = camera.projection_matrix(Extent2D::new(800, 800));
        assert!((square.x_axis.x / wide.x_axis.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn near_plane_maps_to_zero_depth() {
        let camera = Camera::default();
        let clip = camera.projection_matrix(Extent2D::new(800, 600))
            * Vec4::new(0.0, 0.0, -camera.z_near, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-5);
    }
}
