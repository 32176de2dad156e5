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

use crate::renderer::api::command::{
    CommandBufferId, RasterFeature, RenderPassDescriptor, Viewport,
};
use crate::renderer::api::mesh::Drawcall;
use crate::renderer::api::shader::{ProgramId, UniformLocation};
use crate::renderer::api::state::RenderState;
use crate::renderer::api::texture::TextureId;
use crate::renderer::api::uniform::UniformValue;
use crate::renderer::error::RenderError;

/// Records the commands of one frame.
pub trait CommandEncoder {
    /// Begins a render pass, closed by [`RenderPass::end`].
    ///
    /// # Errors
    /// Fails if the target of `descriptor` is unknown or unavailable.
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor,
    ) -> Result<Box<dyn RenderPass + 'encoder>, RenderError>;

    /// Finalizes recording and returns the buffer to submit.
    fn finish(self: Box<Self>) -> CommandBufferId;
}

/// An active render pass.
///
/// Program uniforms behave like program state: a value written through
/// [`RenderPass::set_uniform`] stays until overwritten, and every draw
/// captures the current values of the bound program.
///
/// Recording methods do not fail on their own; the first rejected command is
/// reported by [`RenderPass::end`]. A pass dropped without `end` is discarded.
pub trait RenderPass {
    /// Sets the viewport for subsequent draws.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Switches a rasterizer feature on or off.
    ///
    /// # Errors
    /// [`RenderError::FeatureUnsupported`] if the device cannot toggle it.
    fn set_feature_enabled(
        &mut self,
        feature: RasterFeature,
        enabled: bool,
    ) -> Result<(), RenderError>;

    /// Binds a program for subsequent uniform writes and draws.
    fn set_program(&mut self, program: ProgramId);

    /// Sets blending, depth and culling for subsequent draws.
    fn set_render_state(&mut self, state: &RenderState);

    /// Writes a value into the uniform block of the bound program.
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    /// Binds a texture to a slot of the bound program.
    fn bind_texture(&mut self, slot: u32, texture: TextureId);

    /// Issues an indexed draw.
    fn draw(&mut self, drawcall: &Drawcall);

    /// Closes the pass and hands its commands to the encoder.
    ///
    /// # Errors
    /// The first command the pass rejected (unknown program, mistyped
    /// uniform, missing texture slot), or a resource that no longer exists
    /// when the pass is encoded.
    fn end(self: Box<Self>) -> Result<(), RenderError>;
}
