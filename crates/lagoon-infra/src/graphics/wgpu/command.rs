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

//! Command encoding for the `wgpu` backend.
//!
//! A [`WgpuRenderPass`] does not talk to `wgpu` while it is being recorded:
//! every draw snapshots the bound program's uniform block into a staging
//! buffer at a 256-byte aligned dynamic offset. When the pass ends the
//! staging buffer is uploaded once and the draws are replayed into a real
//! `wgpu::RenderPass`.

use super::conversions::IntoWgpu;
use super::device::{PassAttachments, PipelineKey, WgpuDevice};
use lagoon_core::math::Plane;
use lagoon_core::renderer::{
    ClearValues, CommandBufferId, CommandEncoder, Drawcall, GraphicsDevice, ProgramId,
    RasterFeature, RenderError, RenderPass, RenderPassDescriptor, RenderState, ResourceError, TextureId, UniformLocation,
    UniformValue, Viewport,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::Range;

/// Alignment of dynamic uniform offsets.
pub(crate) const UNIFORM_ALIGNMENT: u32 = 256;

/// Rounds `value` up to a multiple of `alignment`.
pub(crate) fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// What a pass needs to know about a program to record draws with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProgramInfo {
    /// Size of the uniform block in bytes.
    pub uniform_size: u32,
    /// Offset of the `ClipPlane` uniform, if the program declares one.
    pub clip_plane: Option<u32>,
    /// Number of texture slots.
    pub texture_slots: u32,
}

#[derive(Debug)]
struct ProgramBlock {
    info: ProgramInfo,
    block: Vec<u8>,
    textures: Vec<Option<TextureId>>,
}

impl ProgramBlock {
    fn new(info: ProgramInfo) -> Self {
        Self {
            info,
            block: vec![0; info.uniform_size as usize],
            textures: vec![None; info.texture_slots as usize],
        }
    }
}

/// A draw captured with everything needed to replay it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedDraw {
    pub program: ProgramId,
    pub state: RenderState,
    pub drawcall: Drawcall,
    pub uniform_offset: u32,
    pub uniform_size: u32,
    pub textures: Vec<Option<TextureId>>,
}

#[derive(Debug, Clone)]
pub(crate) enum PassCommand {
    Viewport(Viewport),
    Draw(RecordedDraw),
}

/// The backend-independent half of a render pass.
///
/// The first rejected command is kept and reported when the pass ends.
#[derive(Debug, Default)]
pub(crate) struct PassRecorder {
    programs: HashMap<ProgramId, ProgramBlock>,
    current: Option<ProgramId>,
    state: RenderState,
    clip_enabled: bool,
    staging: Vec<u8>,
    commands: Vec<PassCommand>,
    error: Option<RenderError>,
}

impl PassRecorder {
    fn reject(&mut self, error: RenderError) {
        log::debug!("Render pass: {error}");
        self.error.get_or_insert(error);
    }

    fn reject_command(&mut self, message: String) {
        self.reject(RenderError::InvalidPassCommand(message));
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(PassCommand::Viewport(viewport));
    }

    pub fn set_clip_enabled(&mut self, enabled: bool) {
        self.clip_enabled = enabled;
    }

    /// Binds `program`, asking `info` for its layout the first time it is seen.
    pub fn set_program(&mut self, program: ProgramId, info: impl FnOnce() -> Option<ProgramInfo>) {
        if let Entry::Vacant(entry) = self.programs.entry(program) {
            match info() {
                Some(info) => {
                    entry.insert(ProgramBlock::new(info));
                }
                None => {
                    self.current = None;
                    self.reject(ResourceError::InvalidHandle.into());
                    return;
                }
            }
        }
        self.current = Some(program);
    }

    pub fn set_render_state(&mut self, state: &RenderState) {
        self.state = *state;
    }

    pub fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let Some(bound) = self.current.and_then(|id| self.programs.get_mut(&id)) else {
            self.reject_command("uniform written without a bound program".to_string());
            return;
        };
        if value.kind() != Some(location.kind) {
            let message = format!("{value:?} does not fit a {:?} uniform", location.kind);
            self.reject_command(message);
            return;
        }
        match bound.block.get_mut(location.offset as usize..) {
            Some(dst) if dst.len() >= location.kind.size() as usize => {
                value.write_bytes(dst);
            }
            _ => {
                let message = format!("uniform offset {} is outside the block", location.offset);
                self.reject_command(message);
            }
        }
    }

    pub fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        let Some(bound) = self.current.and_then(|id| self.programs.get_mut(&id)) else {
            self.reject_command("texture bound without a bound program".to_string());
            return;
        };
        match bound.textures.get_mut(slot as usize) {
            Some(entry) => *entry = Some(texture),
            None => self.reject_command(format!("program has no texture slot {slot}")),
        }
    }

    pub fn draw(&mut self, drawcall: &Drawcall) {
        let bound = self
            .current
            .and_then(|id| self.programs.get(&id).map(|block| (id, block)));
        let Some((program, bound)) = bound else {
            self.reject_command("draw without a bound program".to_string());
            return;
        };

        let offset = align_to(self.staging.len() as u32, UNIFORM_ALIGNMENT);
        self.staging.resize(offset as usize, 0);
        self.staging.extend_from_slice(&bound.block);
        if !self.clip_enabled {
            if let Some(clip) = bound.info.clip_plane {
                let at = (offset + clip) as usize;
                UniformValue::Vec4(Plane::PASS_THROUGH).write_bytes(&mut self.staging[at..]);
            }
        }

        self.commands.push(PassCommand::Draw(RecordedDraw {
            program,
            state: self.state,
            drawcall: *drawcall,
            uniform_offset: offset,
            uniform_size: bound.info.uniform_size,
            textures: bound.textures.clone(),
        }));
    }

    /// The first rejected command, if any.
    pub fn take_error(&mut self) -> Option<RenderError> {
        self.error.take()
    }

    pub fn staging(&self) -> &[u8] {
        &self.staging
    }

    pub fn commands(&self) -> &[PassCommand] {
        &self.commands
    }
}

/// A `wgpu` command encoder for one frame.
#[derive(Debug)]
pub struct WgpuCommandEncoder {
    encoder: wgpu::CommandEncoder,
    device: WgpuDevice,
}

impl WgpuCommandEncoder {
    pub(crate) fn new(device: WgpuDevice, label: Option<&str>) -> Self {
        let encoder = device
            .wgpu_device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label });
        Self { encoder, device }
    }
}

impl CommandEncoder for WgpuCommandEncoder {
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor,
    ) -> Result<Box<dyn RenderPass + 'encoder>, RenderError> {
        let Self { encoder, device } = self;
        let attachments = device.pass_attachments(descriptor.target)?;
        Ok(Box::new(WgpuRenderPass {
            encoder,
            device,
            label: descriptor.label.map(str::to_owned),
            attachments,
            clear: descriptor.clear,
            recorder: PassRecorder::default(),
            ended: false,
        }))
    }

    fn finish(self: Box<Self>) -> CommandBufferId {
        let Self { encoder, device } = *self;
        device.register_command_buffer(encoder.finish())
    }
}

enum PreparedCommand {
    Viewport(Viewport),
    Draw {
        pipeline: wgpu::RenderPipeline,
        uniforms: wgpu::BindGroup,
        uniform_offset: u32,
        textures: wgpu::BindGroup,
        vertices: wgpu::Buffer,
        indices: wgpu::Buffer,
        range: Range<u32>,
    },
}

/// A render pass recorded on the CPU and replayed into `wgpu` when it ends.
pub struct WgpuRenderPass<'encoder> {
    encoder: &'encoder mut wgpu::CommandEncoder,
    device: &'encoder WgpuDevice,
    label: Option<String>,
    attachments: PassAttachments,
    clear: ClearValues,
    recorder: PassRecorder,
    ended: bool,
}

impl WgpuRenderPass<'_> {
    fn prepare(&self) -> Result<Vec<PreparedCommand>, ResourceError> {
        let device = self.device;
        let commands = self.recorder.commands();
        let buffer = if self.recorder.staging().is_empty() {
            None
        } else {
            Some(device.create_uniform_buffer(self.label.as_deref(), self.recorder.staging()))
        };

        let mut uniform_groups: HashMap<u32, wgpu::BindGroup> = HashMap::new();
        let mut prepared = Vec::with_capacity(commands.len());
        for command in commands {
            match command {
                PassCommand::Viewport(viewport) => {
                    prepared.push(PreparedCommand::Viewport(*viewport));
                }
                PassCommand::Draw(draw) => {
                    let Some(buffer) = buffer.as_ref() else {
                        continue;
                    };
                    let key = PipelineKey {
                        program: draw.program,
                        state: draw.state,
                        topology: draw.drawcall.topology,
                        color_format: self.attachments.color_format,
                        depth_format: self.attachments.depth_format,
                    };
                    let uniforms = uniform_groups
                        .entry(draw.uniform_size)
                        .or_insert_with(|| device.uniform_bind_group(buffer, draw.uniform_size))
                        .clone();
                    let (vertices, indices) = device.mesh_buffers(draw.drawcall.mesh)?;
                    let first = draw.drawcall.first_index;
                    prepared.push(PreparedCommand::Draw {
                        pipeline: device.render_pipeline(&key)?,
                        uniforms,
                        uniform_offset: draw.uniform_offset,
                        textures: device.texture_bind_group(draw.program, &draw.textures)?,
                        vertices,
                        indices,
                        range: first..first + draw.drawcall.index_count,
                    });
                }
            }
        }
        Ok(prepared)
    }

    fn replay(&mut self) -> Result<(), ResourceError> {
        let prepared = self.prepare()?;

        let color_load = match self.clear.color {
            Some(color) => wgpu::LoadOp::Clear(color.into_wgpu()),
            None => wgpu::LoadOp::Load,
        };
        let depth_load = match self.clear.depth {
            Some(depth) => wgpu::LoadOp::Clear(depth),
            None => wgpu::LoadOp::Load,
        };
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: &self.attachments.color,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
        };
        let depth_attachment =
            self.attachments
                .depth
                .as_ref()
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        let mut pass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label.as_deref(),
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment: depth_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for command in &prepared {
            match command {
                PreparedCommand::Viewport(v) => {
                    pass.set_viewport(v.x, v.y, v.width, v.height, 0.0, 1.0);
                }
                PreparedCommand::Draw {
                    pipeline,
                    uniforms,
                    uniform_offset,
                    textures,
                    vertices,
                    indices,
                    range,
                } => {
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, uniforms, &[*uniform_offset]);
                    pass.set_bind_group(1, textures, &[]);
                    pass.set_vertex_buffer(0, vertices.slice(..));
                    pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(range.clone(), 0, 0..1);
                }
            }
        }
        Ok(())
    }
}

impl RenderPass for WgpuRenderPass<'_> {
    fn set_viewport(&mut self, viewport: Viewport) {
        self.recorder.set_viewport(viewport);
    }

    fn set_feature_enabled(
        &mut self,
        feature: RasterFeature,
        enabled: bool,
    ) -> Result<(), RenderError> {
        if !self.device.supports_feature(feature) {
            return Err(RenderError::FeatureUnsupported(feature));
        }
        self.recorder.set_clip_enabled(enabled);
        Ok(())
    }

    fn set_program(&mut self, program: ProgramId) {
        let device = self.device;
        self.recorder
            .set_program(program, || device.program_info(program));
    }

    fn set_render_state(&mut self, state: &RenderState) {
        self.recorder.set_render_state(state);
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        self.recorder.set_uniform(location, value);
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        self.recorder.bind_texture(slot, texture);
    }

    fn draw(&mut self, drawcall: &Drawcall) {
        self.recorder.draw(drawcall);
    }

    fn end(mut self: Box<Self>) -> Result<(), RenderError> {
        self.ended = true;
        if let Some(error) = self.recorder.take_error() {
            return Err(error);
        }
        self.replay()?;
        Ok(())
    }
}

impl Drop for WgpuRenderPass<'_> {
    fn drop(&mut self) {
        if !self.ended {
            log::debug!(
                "Render pass '{}' dropped before it ended, {} commands discarded",
                self.label.as_deref().unwrap_or("unnamed"),
                self.recorder.commands().len()
            );
        }
    }
}
