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

//! Light source types.
//!
//! A light component only carries photometric data. Its placement comes from the
//! transform of the scene node that owns it; the scene visitor resolves both into
//! a world-space [`Light`].

use crate::math::{LinearRgba, Vec3};

/// A light infinitely far away, shining along the forward axis of its node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Linear color of the light.
    pub color: LinearRgba,
    /// Scalar multiplier applied to `color`.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            intensity: 1.0,
        }
    }
}

/// A light emitting in every direction from the position of its node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Linear color of the light.
    pub color: LinearRgba,
    /// Scalar multiplier applied to `color`.
    pub intensity: f32,
    /// Distance at which the contribution fades to zero.
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            intensity: 1.0,
            range: 10.0,
        }
    }
}

/// The photometric part of a light, without placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// See [`DirectionalLight`].
    Directional(DirectionalLight),
    /// See [`PointLight`].
    Point(PointLight),
}

/// A light resolved into world space for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Photometric data.
    pub kind: LightKind,
    /// World-space position of the owning node.
    pub position: Vec3,
    /// Normalized world-space direction the light travels along.
    pub direction: Vec3,
}

impl Light {
    /// Color premultiplied by intensity.
    pub fn radiance(&self) -> Vec3 {
        match self.kind {
            LightKind::Directional(l) => l.color.to_vec3() * l.intensity,
            LightKind::Point(l) => l.color.to_vec3() * l.intensity,
        }
    }

    /// `true` for lights with a position (point lights).
    pub fn is_positional(&self) -> bool {
        matches!(self.kind, LightKind::Point(_))
    }

    /// The range of a positional light, `0.0` for directional lights.
    pub fn range(&self) -> f32 {
        match self.kind {
            LightKind::Directional(_) => 0.0,
            LightKind::Point(l) => l.range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radiance_is_premultiplied() {
        let light = Light {
            kind: LightKind::Directional(DirectionalLight {
                color: LinearRgba::rgb(1.0, 0.5, 0.0),
                intensity: 3.0,
            }),
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
        };
        assert_eq!(light.radiance(), Vec3::new(3.0, 1.5, 0.0));
        assert!(!light.is_positional());
        assert_eq!(light.range(), 0.0);
    }
}
