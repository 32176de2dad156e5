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

use crate::math::Extent2D;
use crate::renderer::api::command::{CommandBufferId, RasterFeature};
use crate::renderer::api::mesh::{MeshId, Vertex};
use crate::renderer::api::shader::{ProgramDescriptor, ProgramId, UniformLayout};
use crate::renderer::api::target::{RenderTargetDescriptor, RenderTargetId};
use crate::renderer::api::texture::{TextureDescriptor, TextureId};
use crate::renderer::error::ResourceError;
use crate::renderer::traits::CommandEncoder;
use std::fmt::Debug;

/// Defines the interface to a logical graphics device, the factory for all GPU resources.
///
/// This trait is the central point of interaction with the rendering backend for
/// resource management. It abstracts over a concrete graphics API and hands out
/// opaque, type-safe handles (like [`TextureId`] or [`ProgramId`]).
///
/// Methods take `&self`; implementations keep their resource tables behind
/// interior mutability.
pub trait GraphicsDevice: Debug {
    /// Creates a texture. Its contents are undefined until written or rendered to.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Uploads tightly packed texels into one layer of a texture.
    fn write_texture(&self, texture: TextureId, layer: u32, data: &[u8])
        -> Result<(), ResourceError>;

    /// Destroys a texture.
    fn destroy_texture(&self, texture: TextureId) -> Result<(), ResourceError>;

    /// Binds textures into a render target.
    ///
    /// # Errors
    /// [`ResourceError::IncompleteRenderTarget`] if the attachments cannot be
    /// rendered to together (wrong formats, mismatched sizes, missing usage).
    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetId, ResourceError>;

    /// Destroys a render target. Its textures are left alive.
    fn destroy_render_target(&self, target: RenderTargetId) -> Result<(), ResourceError>;

    /// Compiles a program whose uniform block follows `layout`.
    fn create_program(
        &self,
        descriptor: &ProgramDescriptor,
        layout: &UniformLayout,
    ) -> Result<ProgramId, ResourceError>;

    /// Uploads vertex and index data into a mesh.
    fn create_mesh(
        &self,
        label: &str,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<MeshId, ResourceError>;

    /// Releases a mesh; drawing it afterwards is an error.
    fn destroy_mesh(&self, mesh: MeshId) -> Result<(), ResourceError>;

    /// Whether a render pass may enable `feature`.
    fn supports_feature(&self, feature: RasterFeature) -> bool;

    /// Current size of the window surface in pixels.
    fn surface_size(&self) -> Extent2D;

    /// Creates an encoder recording the commands of one frame.
    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder + '_>;

    /// Submits a finished command buffer to the queue.
    fn submit_command_buffer(&self, command_buffer: CommandBufferId);
}
