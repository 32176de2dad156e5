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

use lagoon_core::math::{Mat4, Quat, Vec3};

/// Position, rotation and scale of a scene node in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The translation (position) of the node.
    pub translation: Vec3,
    /// The rotation of the node.
    pub rotation: Quat,
    /// The scale of the node.
    pub scale: Vec3,
}

impl Transform {
    /// Creates a new `Transform` with a given translation, rotation, and scale.
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// A translation with identity rotation and scale.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// A transform at `eye` whose `-Z` axis points at `target`.
    pub fn looking_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let view = Mat4::look_at_rh(eye, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        Self {
            translation: eye,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Returns the same transform with a uniform scale.
    pub fn with_scale(self, scale: Vec3) -> Self {
        Self { scale, ..self }
    }

    /// The local `-Z` axis in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The local `+X` axis in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// The world matrix, in `Scale -> Rotate -> Translate` order.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
