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

//! Planar reflection capture.
//!
//! The opaque world is rendered from a camera mirrored across the water plane
//! into a square, power-of-two offscreen target. Geometry below the water is
//! discarded with a clip plane so it cannot leak into the reflection.

use super::{
    FrameInputs, ForwardLane, LaneError, PassStats, RenderContext, RenderLane, SceneVisitor,
    ViewContext,
};
use lagoon_core::math::{Extent2D, LinearRgba, Plane, Vec3};
use lagoon_core::renderer::{
    CameraView, ClearValues, CommandEncoder, GraphicsDevice, RasterFeature, RenderError,
    RenderPassDescriptor, RenderTarget, RenderTargetDescriptor, RenderTargetId, ResourceError,
    TextureDescriptor, TextureFormat, TextureId, TextureViewDimension, Viewport,
};

/// The clip distance used for the water plane.
pub const REFLECTION_CLIP: RasterFeature = RasterFeature::ClipDistance(0);

/// Side of the reflection texture for a window `window_width` pixels wide.
///
/// Half the window width rounded up to a power of two; 800 gives 512.
pub fn reflection_resolution(window_width: u32) -> u32 {
    (window_width / 2).max(1).next_power_of_two()
}

/// Mirrors `live` across the horizontal plane `y = water_height`.
///
/// The eye moves to `(x, 2h - y, z)` and the pitch of the backward axis is
/// inverted. The right axis is kept, so the captured image is upside down
/// rather than mirrored left to right; the water shader flips it back.
pub fn mirror_camera(live: &CameraView, water_height: f32) -> CameraView {
    let position = live.position;
    let eye = Vec3::new(position.x, 2.0 * water_height - position.y, position.z);

    let backward = live.backward();
    let backward = Vec3::new(backward.x, -backward.y, backward.z);
    let up = backward.cross(live.right()).normalize();

    CameraView::look_at(eye, eye - backward, up, live.projection)
}

/// The color and depth textures the reflection is rendered into.
#[derive(Debug)]
pub struct OffscreenTarget {
    color: TextureId,
    depth: TextureId,
    target: RenderTargetId,
    size: Extent2D,
}

impl OffscreenTarget {
    /// Allocates a target sized for a `window_width` x `window_height` window.
    ///
    /// # Errors
    /// Fails if a texture cannot be created or the target is incomplete.
    pub fn setup(
        device: &dyn GraphicsDevice,
        window_width: u32,
        window_height: u32,
    ) -> Result<Self, ResourceError> {
        let side = reflection_resolution(window_width);
        let size = Extent2D::new(side, side);

        let color = device.create_texture(&TextureDescriptor {
            label: "Reflection Color",
            size,
            format: TextureFormat::Rgba8Unorm,
            dimension: TextureViewDimension::D2,
            sampled: true,
            render_attachment: true,
        })?;
        let depth = device.create_texture(&TextureDescriptor {
            label: "Reflection Depth",
            size,
            format: TextureFormat::Depth24Plus,
            dimension: TextureViewDimension::D2,
            sampled: false,
            render_attachment: true,
        })?;
        let target = device.create_render_target(&RenderTargetDescriptor {
            label: "Reflection Target",
            color,
            depth: Some(depth),
        })?;

        log::info!(
            "Allocated {}x{} reflection target for a {}x{} window",
            side,
            side,
            window_width,
            window_height
        );
        Ok(Self {
            color,
            depth,
            target,
            size,
        })
    }

    /// Releases the GPU resources.
    pub fn release(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        device.destroy_render_target(self.target)?;
        device.destroy_texture(self.color)?;
        device.destroy_texture(self.depth)
    }

    /// The texture the water samples.
    pub fn color_texture(&self) -> TextureId {
        self.color
    }

    /// The render target binding both attachments.
    pub fn render_target(&self) -> RenderTargetId {
        self.target
    }

    /// Size of both attachments.
    pub fn size(&self) -> Extent2D {
        self.size
    }
}

/// Renders the opaque scene and the sky from the mirrored camera.
#[derive(Debug)]
pub struct ReflectionLane {
    target: OffscreenTarget,
    water_height: f32,
    clear_color: LinearRgba,
}

impl ReflectionLane {
    /// Creates a lane rendering into `target` for water at `water_height`.
    pub fn new(target: OffscreenTarget, water_height: f32) -> Self {
        Self {
            target,
            water_height,
            clear_color: LinearRgba::BLACK,
        }
    }

    /// The offscreen target.
    pub fn target(&self) -> &OffscreenTarget {
        &self.target
    }

    /// Swaps the offscreen target, returning the previous one.
    pub fn replace_target(&mut self, target: OffscreenTarget) -> OffscreenTarget {
        std::mem::replace(&mut self.target, target)
    }

    /// Gives the offscreen target back, to release it.
    pub fn into_target(self) -> OffscreenTarget {
        self.target
    }

    /// The reflection plane height.
    pub fn water_height(&self) -> f32 {
        self.water_height
    }

    /// Moves the reflection plane.
    pub fn set_water_height(&mut self, height: f32) {
        self.water_height = height;
    }
}

impl RenderLane for ReflectionLane {
    fn strategy_name(&self) -> &'static str {
        "PlanarReflection"
    }

    fn render(
        &self,
        inputs: &FrameInputs<'_>,
        context: &mut RenderContext,
        encoder: &mut dyn CommandEncoder,
    ) -> Result<PassStats, LaneError> {
        // The live camera is registered by the visit, so it is mirrored afterwards.
        context.reset();
        SceneVisitor.visit(inputs.opaque, context)?;
        let live = context
            .camera()
            .ok_or(RenderError::MissingCamera {
                pass: self.strategy_name(),
            })?;
        let mirrored = mirror_camera(live, self.water_height);

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some(self.strategy_name()),
            target: RenderTarget::Offscreen(self.target.render_target()),
            clear: ClearValues::color_and_depth(self.clear_color),
        })?;
        pass.set_feature_enabled(REFLECTION_CLIP, true)?;
        pass.set_viewport(Viewport::from_extent(self.target.size()));

        let view = ViewContext {
            camera: &mirrored,
            clip_plane: Some(Plane::horizontal(self.water_height)),
            time: inputs.time,
        };
        let mut forward = ForwardLane::new(inputs.registry, context.lights(), view);
        let mut draws = forward.draw_collection(pass.as_mut(), context.opaque(), false)?;
        if let Some(skybox) = inputs.skybox {
            draws += forward.draw_collection(pass.as_mut(), skybox.drawcalls(), false)?;
        }

        pass.set_feature_enabled(REFLECTION_CLIP, false)?;
        pass.end()?;

        Ok(PassStats {
            draws,
            opaque_drawcalls: context.opaque().len(),
            transparent_drawcalls: context.transparent().len(),
            lights: context.lights().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lagoon_core::math::Mat4;

    #[test]
    fn reflection_resolution_rounds_half_width_up() {
        assert_eq!(reflection_resolution(800), 512);
        assert_eq!(reflection_resolution(1024), 512);
        assert_eq!(reflection_resolution(1280), 1024);
        assert_eq!(reflection_resolution(1), 1);
    }

    #[test]
    fn mirror_reflects_the_eye_across_the_water() {
        let eye = Vec3::new(1.5, 3.0, -2.0);
        let live = CameraView::look_at(eye, Vec3::ZERO, Vec3::Y, Mat4::IDENTITY);
        let mirrored = mirror_camera(&live, 0.5);
        assert_relative_eq!(mirrored.position.x, 1.5);
        assert_relative_eq!(mirrored.position.y, 2.0 * 0.5 - 3.0);
        assert_relative_eq!(mirrored.position.z, -2.0);
    }

    #[test]
    fn mirror_inverts_pitch_and_keeps_heading() {
        let eye = Vec3::new(0.0, 4.0, 6.0);
        let live = CameraView::look_at(eye, Vec3::new(0.0, 0.0, -2.0), Vec3::Y, Mat4::IDENTITY);
        let mirrored = mirror_camera(&live, 0.0);

        let forward = live.forward();
        let expected = Vec3::new(forward.x, -forward.y, forward.z);
        assert!(mirrored.forward().abs_diff_eq(expected, 1e-5));
        assert!(mirrored.right().abs_diff_eq(live.right(), 1e-5));
        assert_relative_eq!(mirrored.up().dot(mirrored.forward()), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn mirrored_point_lands_at_the_mirrored_image() {
        // A point above the water seen by the live camera must project to the
        // same spot as its reflection seen by the mirrored camera, up to the
        // vertical flip.
        let projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let live = CameraView::look_at(
            Vec3::new(0.0, 2.0, 5.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::Y,
            projection,
        );
        let mirrored = mirror_camera(&live, 0.0);
        let point = Vec3::new(0.7, 1.0, -1.0);
        let image = Vec3::new(point.x, -point.y, point.z);

        let a = live.view_projection().project_point3(point);
        let b = mirrored.view_projection().project_point3(image);
        assert_relative_eq!(a.x, b.x, epsilon = 1e-4);
        assert_relative_eq!(a.y, -b.y, epsilon = 1e-4);
    }
}
