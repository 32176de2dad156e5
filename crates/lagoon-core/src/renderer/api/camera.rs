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

use crate::math::{Mat4, Vec3};

/// The matrices a pass renders with, resolved from a camera node.
///
/// Cameras follow the right-handed convention: they look down their local `-Z`
/// axis with `+Y` up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// World-to-view transform.
    pub view: Mat4,
    /// View-to-clip transform.
    pub projection: Mat4,
    /// World-space position of the eye.
    pub position: Vec3,
}

impl CameraView {
    /// Builds a view from the camera's world matrix and a projection.
    pub fn from_world(world: Mat4, projection: Mat4) -> Self {
        Self {
            view: world.inverse(),
            projection,
            position: world.w_axis.truncate(),
        }
    }

    /// Builds a look-at view from `eye` toward `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, projection: Mat4) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, up),
            projection,
            position: eye,
        }
    }

    /// `projection * view`.
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// The camera's local `+X` axis in world space.
    pub fn right(&self) -> Vec3 {
        self.view.row(0).truncate()
    }

    /// The camera's local `+Y` axis in world space.
    pub fn up(&self) -> Vec3 {
        self.view.row(1).truncate()
    }

    /// The camera's local `+Z` axis in world space, pointing behind the eye.
    pub fn backward(&self) -> Vec3 {
        self.view.row(2).truncate()
    }

    /// The direction the camera looks at.
    pub fn forward(&self) -> Vec3 {
        -self.backward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;

    #[test]
    fn axes_match_the_world_matrix() {
        let world = Mat4::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let view = CameraView::from_world(world, Mat4::IDENTITY);
        assert!(view.position.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
        assert!(view.backward().abs_diff_eq(world.z_axis.truncate(), 1e-6));
        assert!(view.right().abs_diff_eq(world.x_axis.truncate(), 1e-6));
        assert!(view.up().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn look_at_forward_points_to_target() {
        let view = CameraView::look_at(
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::ZERO,
            Vec3::Y,
            Mat4::IDENTITY,
        );
        let expected = (Vec3::ZERO - Vec3::new(-1.0, 1.0, 1.0)).normalize();
        assert!(view.forward().abs_diff_eq(expected, 1e-5));
    }
}
