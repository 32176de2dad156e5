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

//! The main pass: opaque geometry, the sky, then transparent geometry.

use super::{
    FrameInputs, ForwardLane, LaneError, PassStats, RenderContext, RenderLane, SceneVisitor,
    ViewContext,
};
use lagoon_core::math::LinearRgba;
use lagoon_core::renderer::{
    ClearValues, CommandEncoder, RenderError, RenderPassDescriptor, RenderTarget, Viewport,
};

/// Renders both scenes to the window surface.
///
/// Transparent drawcalls are drawn after every opaque drawcall and after the
/// sky, so they blend over the finished opaque image.
#[derive(Debug, Clone)]
pub struct MainLane {
    clear_color: LinearRgba,
}

impl Default for MainLane {
    fn default() -> Self {
        Self {
            clear_color: LinearRgba::rgb(0.1, 0.1, 0.1),
        }
    }
}

impl MainLane {
    /// Creates a lane clearing the surface to `clear_color`.
    pub fn new(clear_color: LinearRgba) -> Self {
        Self { clear_color }
    }
}

impl RenderLane for MainLane {
    fn strategy_name(&self) -> &'static str {
        "MainForward"
    }

    fn render(
        &self,
        inputs: &FrameInputs<'_>,
        context: &mut RenderContext,
        encoder: &mut dyn CommandEncoder,
    ) -> Result<PassStats, LaneError> {
        context.reset();
        let visitor = SceneVisitor;
        visitor.visit(inputs.opaque, context)?;
        visitor.visit(inputs.transparent, context)?;
        let camera = *context.camera().ok_or(RenderError::MissingCamera {
            pass: self.strategy_name(),
        })?;

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some(self.strategy_name()),
            target: RenderTarget::Surface,
            clear: ClearValues::color_and_depth(self.clear_color),
        })?;
        pass.set_viewport(Viewport::from_extent(inputs.window_size));

        let view = ViewContext {
            camera: &camera,
            clip_plane: None,
            time: inputs.time,
        };
        let mut forward = ForwardLane::new(inputs.registry, context.lights(), view);
        let mut draws = forward.draw_collection(pass.as_mut(), context.opaque(), false)?;
        if let Some(skybox) = inputs.skybox {
            draws += forward.draw_collection(pass.as_mut(), skybox.drawcalls(), false)?;
        }
        draws += forward.draw_collection(pass.as_mut(), context.transparent(), true)?;
        pass.end()?;

        Ok(PassStats {
            draws,
            opaque_drawcalls: context.opaque().len(),
            transparent_drawcalls: context.transparent().len(),
            lights: context.lights().len(),
        })
    }
}
