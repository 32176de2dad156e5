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

use super::command::{align_to, ProgramInfo, WgpuCommandEncoder};
use super::conversions::IntoWgpu;
use lagoon_core::math::Extent2D;
use lagoon_core::renderer::{
    CommandBufferId, CommandEncoder, CompareFunction, GraphicsDevice, MeshId, PrimitiveTopology,
    ProgramDescriptor, ProgramId, RasterFeature, RenderError, RenderState, RenderTarget,
    RenderTargetDescriptor, RenderTargetId, ResourceError, ShaderError, TextureDescriptor,
    TextureFormat, TextureId, TextureViewDimension, UniformLayout, Vertex, CLIP_PLANE_UNIFORM,
};
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use wgpu::util::DeviceExt;

/// The attachments a render pass draws into.
#[derive(Debug, Clone)]
pub(crate) struct PassAttachments {
    pub color: wgpu::TextureView,
    pub depth: Option<wgpu::TextureView>,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
}

/// Everything a render pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub program: ProgramId,
    pub state: RenderState,
    pub topology: PrimitiveTopology,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
}

/// The properties of a texture that decide whether it can be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttachmentInfo {
    size: Extent2D,
    format: TextureFormat,
    dimension: TextureViewDimension,
    render_attachment: bool,
}

impl AttachmentInfo {
    fn of(descriptor: &TextureDescriptor) -> Self {
        Self {
            size: descriptor.size,
            format: descriptor.format,
            dimension: descriptor.dimension,
            render_attachment: descriptor.render_attachment,
        }
    }
}

/// Checks that a color and an optional depth texture form a complete target.
fn validate_target(
    label: &str,
    color: AttachmentInfo,
    depth: Option<AttachmentInfo>,
) -> Result<(), ResourceError> {
    let incomplete = |reason: &str| ResourceError::IncompleteRenderTarget {
        label: label.to_owned(),
        reason: reason.to_owned(),
    };
    if !color.render_attachment {
        return Err(incomplete("color texture is not a render attachment"));
    }
    if color.format.is_depth() {
        return Err(incomplete("color texture has a depth format"));
    }
    if color.dimension != TextureViewDimension::D2 {
        return Err(incomplete("color texture is not a 2D texture"));
    }
    if let Some(depth) = depth {
        if !depth.render_attachment {
            return Err(incomplete("depth texture is not a render attachment"));
        }
        if !depth.format.is_depth() {
            return Err(incomplete("depth texture has a color format"));
        }
        if depth.size != color.size {
            return Err(incomplete("attachments differ in size"));
        }
    }
    Ok(())
}

/// Picks what texture slot `slot` samples; `None` stands for the placeholder
/// of a slot that was never bound.
fn resolve_slot(
    slot: usize,
    bound: Option<TextureId>,
    expected: TextureViewDimension,
    dimension_of: impl Fn(TextureId) -> Option<TextureViewDimension>,
) -> Result<Option<TextureId>, ResourceError> {
    let Some(id) = bound else {
        return Ok(None);
    };
    match dimension_of(id) {
        None => Err(ResourceError::InvalidHandle),
        Some(dimension) if dimension != expected => Err(ResourceError::BackendError(format!(
            "texture {id:?} in slot {slot} is {dimension:?}, the program samples {expected:?}"
        ))),
        Some(_) => Ok(Some(id)),
    }
}

#[derive(Debug)]
struct TextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    info: AttachmentInfo,
}

#[derive(Debug, Clone, Copy)]
struct TargetEntry {
    color: TextureId,
    depth: Option<TextureId>,
}

#[derive(Debug)]
struct ProgramEntry {
    label: String,
    module: wgpu::ShaderModule,
    vertex_entry: &'static str,
    fragment_entry: &'static str,
    pipeline_layout: wgpu::PipelineLayout,
    texture_layout: wgpu::BindGroupLayout,
    texture_dimensions: Vec<TextureViewDimension>,
    info: ProgramInfo,
}

#[derive(Debug)]
struct MeshEntry {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
}

#[derive(Debug)]
struct WgpuDeviceInternal {
    device: wgpu::Device,
    queue: wgpu::Queue,
    uniform_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    placeholder_2d: wgpu::TextureView,
    placeholder_cube: wgpu::TextureView,

    textures: Mutex<HashMap<TextureId, TextureEntry>>,
    render_targets: Mutex<HashMap<RenderTargetId, TargetEntry>>,
    programs: Mutex<HashMap<ProgramId, ProgramEntry>>,
    meshes: Mutex<HashMap<MeshId, MeshEntry>>,
    pipelines: Mutex<HashMap<PipelineKey, wgpu::RenderPipeline>>,
    pending_command_buffers: Mutex<HashMap<CommandBufferId, wgpu::CommandBuffer>>,
    surface_frame: Mutex<Option<PassAttachments>>,
    surface_size: Mutex<Extent2D>,

    next_texture_id: AtomicUsize,
    next_target_id: AtomicUsize,
    next_program_id: AtomicUsize,
    next_mesh_id: AtomicUsize,
    next_command_buffer_id: AtomicU64,
}

/// The `wgpu` implementation of [`GraphicsDevice`].
///
/// Cloning is cheap; every clone shares the same resource tables.
#[derive(Debug, Clone)]
pub struct WgpuDevice {
    internal: Arc<WgpuDeviceInternal>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, ResourceError> {
    mutex
        .lock()
        .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned ({what}): {e}")))
}

/// A 1x1 opaque white texture bound to slots nothing was bound to.
fn placeholder(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    dimension: TextureViewDimension,
) -> wgpu::TextureView {
    let layers = match dimension {
        TextureViewDimension::D2 => 1,
        TextureViewDimension::Cube => 6,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Lagoon Placeholder Texture"),
        size: wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let white = vec![255u8; 4 * layers as usize];
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &white,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4),
            rows_per_image: Some(1),
        },
        wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: layers,
        },
    );
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Lagoon Placeholder View"),
        dimension: Some(dimension.into_wgpu()),
        ..Default::default()
    })
}

impl WgpuDevice {
    /// Wraps an opened `wgpu` device and its queue.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lagoon Uniform Block Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Lagoon Linear Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let placeholder_2d = placeholder(&device, &queue, TextureViewDimension::D2);
        let placeholder_cube = placeholder(&device, &queue, TextureViewDimension::Cube);

        log::info!("WgpuDevice: Created");
        Self {
            internal: Arc::new(WgpuDeviceInternal {
                device,
                queue,
                uniform_layout,
                sampler,
                placeholder_2d,
                placeholder_cube,
                textures: Mutex::new(HashMap::new()),
                render_targets: Mutex::new(HashMap::new()),
                programs: Mutex::new(HashMap::new()),
                meshes: Mutex::new(HashMap::new()),
                pipelines: Mutex::new(HashMap::new()),
                pending_command_buffers: Mutex::new(HashMap::new()),
                surface_frame: Mutex::new(None),
                surface_size: Mutex::new(Extent2D::default()),
                next_texture_id: AtomicUsize::new(0),
                next_target_id: AtomicUsize::new(0),
                next_program_id: AtomicUsize::new(0),
                next_mesh_id: AtomicUsize::new(0),
                next_command_buffer_id: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn wgpu_device(&self) -> &wgpu::Device {
        &self.internal.device
    }

    /// Records the window size reported to the renderer, zero when minimized.
    pub(crate) fn set_surface_size(&self, size: Extent2D) {
        match self.internal.surface_size.lock() {
            Ok(mut current) => *current = size,
            Err(e) => log::error!("WgpuDevice: Mutex poisoned (surface_size): {e}"),
        }
    }

    /// Installs (or clears) the attachments of the frame being rendered.
    pub(crate) fn set_surface_frame(&self, frame: Option<PassAttachments>) {
        match self.internal.surface_frame.lock() {
            Ok(mut current) => *current = frame,
            Err(e) => log::error!("WgpuDevice: Mutex poisoned (surface_frame): {e}"),
        }
    }

    pub(crate) fn pass_attachments(
        &self,
        target: RenderTarget,
    ) -> Result<PassAttachments, RenderError> {
        match target {
            RenderTarget::Surface => lock(&self.internal.surface_frame, "surface_frame")?
                .clone()
                .ok_or_else(|| {
                    RenderError::SurfaceAcquisitionFailed(
                        "no surface texture was acquired for this frame".to_owned(),
                    )
                }),
            RenderTarget::Offscreen(id) => {
                let target = lock(&self.internal.render_targets, "render_targets")?
                    .get(&id)
                    .copied()
                    .ok_or(ResourceError::InvalidHandle)?;
                let textures = lock(&self.internal.textures, "textures")?;
                let color = textures
                    .get(&target.color)
                    .ok_or(ResourceError::InvalidHandle)?;
                let depth = match target.depth {
                    Some(id) => Some(textures.get(&id).ok_or(ResourceError::InvalidHandle)?),
                    None => None,
                };
                Ok(PassAttachments {
                    color: color.view.clone(),
                    depth: depth.map(|d| d.view.clone()),
                    color_format: color.info.format.into_wgpu(),
                    depth_format: depth.map(|d| d.info.format.into_wgpu()),
                })
            }
        }
    }

    pub(crate) fn program_info(&self, program: ProgramId) -> Option<ProgramInfo> {
        let programs = lock(&self.internal.programs, "programs").ok()?;
        programs.get(&program).map(|p| p.info)
    }

    pub(crate) fn create_uniform_buffer(&self, label: Option<&str>, contents: &[u8]) -> wgpu::Buffer {
        self.internal
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents,
                usage: wgpu::BufferUsages::UNIFORM,
            })
    }

    pub(crate) fn uniform_bind_group(&self, buffer: &wgpu::Buffer, size: u32) -> wgpu::BindGroup {
        self.internal
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Lagoon Uniform Block"),
                layout: &self.internal.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer,
                        offset: 0,
                        size: NonZeroU64::new(size as u64),
                    }),
                }],
            })
    }

    /// Builds the sampler and texture group of `program` from the bound textures.
    ///
    /// Slots that were never bound sample a white placeholder.
    ///
    /// # Errors
    /// [`ResourceError::InvalidHandle`] if a bound texture was destroyed, and
    /// a backend error if its dimension differs from the slot.
    pub(crate) fn texture_bind_group(
        &self,
        program: ProgramId,
        bound: &[Option<TextureId>],
    ) -> Result<wgpu::BindGroup, ResourceError> {
        let programs = lock(&self.internal.programs, "programs")?;
        let entry = programs.get(&program).ok_or(ResourceError::InvalidHandle)?;
        let textures = lock(&self.internal.textures, "textures")?;

        let views = entry
            .texture_dimensions
            .iter()
            .enumerate()
            .map(|(slot, &dimension)| {
                let resolved = resolve_slot(slot, bound.get(slot).copied().flatten(), dimension, |id| {
                    textures.get(&id).map(|t| t.info.dimension)
                })?;
                Ok(match resolved.and_then(|id| textures.get(&id)) {
                    Some(texture) => texture.view.clone(),
                    None => match dimension {
                        TextureViewDimension::D2 => self.internal.placeholder_2d.clone(),
                        TextureViewDimension::Cube => self.internal.placeholder_cube.clone(),
                    },
                })
            })
            .collect::<Result<Vec<wgpu::TextureView>, ResourceError>>()?;

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Sampler(&self.internal.sampler),
        }];
        entries.extend(views.iter().enumerate().map(|(slot, view)| wgpu::BindGroupEntry {
            binding: slot as u32 + 1,
            resource: wgpu::BindingResource::TextureView(view),
        }));

        Ok(self
            .internal
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(entry.label.as_str()),
                layout: &entry.texture_layout,
                entries: &entries,
            }))
    }

    pub(crate) fn mesh_buffers(
        &self,
        mesh: MeshId,
    ) -> Result<(wgpu::Buffer, wgpu::Buffer), ResourceError> {
        let meshes = lock(&self.internal.meshes, "meshes")?;
        let entry = meshes.get(&mesh).ok_or(ResourceError::InvalidHandle)?;
        Ok((entry.vertices.clone(), entry.indices.clone()))
    }

    /// Returns the pipeline for `key`, creating and caching it on first use.
    pub(crate) fn render_pipeline(
        &self,
        key: &PipelineKey,
    ) -> Result<wgpu::RenderPipeline, ResourceError> {
        let mut pipelines = lock(&self.internal.pipelines, "pipelines")?;
        if let Some(pipeline) = pipelines.get(key) {
            return Ok(pipeline.clone());
        }

        let programs = lock(&self.internal.programs, "programs")?;
        let program = programs.get(&key.program).ok_or(ResourceError::InvalidHandle)?;
        let attributes = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2
        ];
        let depth_compare = if key.state.depth.test {
            key.state.depth.compare
        } else {
            CompareFunction::Always
        };

        let pipeline = self
            .internal
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(program.label.as_str()),
                layout: Some(&program.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &program.module,
                    entry_point: Some(program.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: Vertex::STRIDE,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology: key.topology.into_wgpu(),
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: key.state.cull.map(|cull| cull.into_wgpu()),
                    ..Default::default()
                },
                depth_stencil: key.depth_format.map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: key.state.depth.write,
                    depth_compare: depth_compare.into_wgpu(),
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &program.module,
                    entry_point: Some(program.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: key.color_format,
                        blend: key.state.blend.map(|blend| blend.into_wgpu()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            });
        log::debug!(
            "WgpuDevice: Created pipeline for '{}' ({:?})",
            program.label,
            key.state
        );
        pipelines.insert(*key, pipeline.clone());
        Ok(pipeline)
    }

    pub(crate) fn register_command_buffer(&self, buffer: wgpu::CommandBuffer) -> CommandBufferId {
        let id = CommandBufferId(
            self.internal
                .next_command_buffer_id
                .fetch_add(1, Ordering::Relaxed),
        );
        match self.internal.pending_command_buffers.lock() {
            Ok(mut pending) => {
                pending.insert(id, buffer);
            }
            Err(e) => log::error!("WgpuDevice: Mutex poisoned (pending_command_buffers): {e}"),
        }
        id
    }
}

impl GraphicsDevice for WgpuDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if descriptor.size.is_empty() {
            return Err(ResourceError::BackendError(format!(
                "Texture '{}' has an empty size",
                descriptor.label
            )));
        }
        let mut usage = wgpu::TextureUsages::empty();
        if descriptor.sampled {
            usage |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if descriptor.render_attachment {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        if descriptor.format.bytes_per_pixel().is_some() {
            usage |= wgpu::TextureUsages::COPY_DST;
        }

        let texture = self.internal.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(descriptor.label),
            size: wgpu::Extent3d {
                width: descriptor.size.width,
                height: descriptor.size.height,
                depth_or_array_layers: descriptor.layer_count(),
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: descriptor.format.into_wgpu(),
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(descriptor.label),
            dimension: Some(descriptor.dimension.into_wgpu()),
            ..Default::default()
        });

        let id = TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.internal.textures, "textures")?.insert(
            id,
            TextureEntry {
                texture,
                view,
                info: AttachmentInfo::of(descriptor),
            },
        );
        log::debug!(
            "WgpuDevice: Created texture '{}' {:?} ({}x{})",
            descriptor.label,
            id,
            descriptor.size.width,
            descriptor.size.height
        );
        Ok(id)
    }

    fn write_texture(
        &self,
        texture: TextureId,
        layer: u32,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let textures = lock(&self.internal.textures, "textures")?;
        let entry = textures.get(&texture).ok_or(ResourceError::InvalidHandle)?;
        let size = entry.info.size;
        let bytes_per_pixel = entry.info.format.bytes_per_pixel().ok_or_else(|| {
            ResourceError::BackendError(format!("{texture:?} cannot be written from the CPU"))
        })?;
        let expected = (bytes_per_pixel * size.width * size.height) as usize;
        if data.len() != expected {
            return Err(ResourceError::BackendError(format!(
                "Layer data for {texture:?} is {} bytes, expected {expected}",
                data.len()
            )));
        }
        if layer >= entry.texture.depth_or_array_layers() {
            return Err(ResourceError::BackendError(format!(
                "{texture:?} has no layer {layer}"
            )));
        }

        self.internal.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &entry.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_pixel * size.width),
                rows_per_image: Some(size.height),
            },
            size.into_wgpu(),
        );
        Ok(())
    }

    fn destroy_texture(&self, texture: TextureId) -> Result<(), ResourceError> {
        let removed = lock(&self.internal.textures, "textures")?.remove(&texture);
        match removed {
            Some(entry) => {
                entry.texture.destroy();
                log::debug!("WgpuDevice: Destroyed texture {texture:?}");
                Ok(())
            }
            None => Err(ResourceError::InvalidHandle),
        }
    }

    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetId, ResourceError> {
        {
            let textures = lock(&self.internal.textures, "textures")?;
            let color = textures
                .get(&descriptor.color)
                .ok_or(ResourceError::InvalidHandle)?;
            let depth = match descriptor.depth {
                Some(id) => Some(textures.get(&id).ok_or(ResourceError::InvalidHandle)?.info),
                None => None,
            };
            validate_target(descriptor.label, color.info, depth)?;
        }

        let id = RenderTargetId(self.internal.next_target_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.internal.render_targets, "render_targets")?.insert(
            id,
            TargetEntry {
                color: descriptor.color,
                depth: descriptor.depth,
            },
        );
        log::debug!(
            "WgpuDevice: Created render target '{}' {id:?}",
            descriptor.label
        );
        Ok(id)
    }

    fn destroy_render_target(&self, target: RenderTargetId) -> Result<(), ResourceError> {
        lock(&self.internal.render_targets, "render_targets")?
            .remove(&target)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_program(
        &self,
        descriptor: &ProgramDescriptor,
        layout: &UniformLayout,
    ) -> Result<ProgramId, ResourceError> {
        let device = &self.internal.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&*descriptor.label),
            source: wgpu::ShaderSource::Wgsl(descriptor.source.clone()),
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::CompilationError {
                label: descriptor.label.to_string(),
                details: error.to_string(),
            }
            .into());
        }

        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        }];
        entries.extend(descriptor.textures.iter().enumerate().map(|(slot, texture)| {
            wgpu::BindGroupLayoutEntry {
                binding: slot as u32 + 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: texture.dimension.into_wgpu(),
                    multisampled: false,
                },
                count: None,
            }
        }));
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&*descriptor.label),
            entries: &entries,
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&*descriptor.label),
            bind_group_layouts: &[&self.internal.uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let info = ProgramInfo {
            uniform_size: align_to(layout.size().max(16), 16),
            clip_plane: layout.location(CLIP_PLANE_UNIFORM).map(|l| l.offset),
            texture_slots: descriptor.textures.len() as u32,
        };
        let id = ProgramId(self.internal.next_program_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.internal.programs, "programs")?.insert(
            id,
            ProgramEntry {
                label: descriptor.label.to_string(),
                module,
                vertex_entry: descriptor.vertex_entry,
                fragment_entry: descriptor.fragment_entry,
                pipeline_layout,
                texture_layout,
                texture_dimensions: descriptor.textures.iter().map(|t| t.dimension).collect(),
                info,
            },
        );
        log::info!(
            "WgpuDevice: Compiled program '{}' {id:?} ({} uniform bytes)",
            descriptor.label,
            info.uniform_size
        );
        Ok(id)
    }

    fn create_mesh(
        &self,
        label: &str,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<MeshId, ResourceError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(ResourceError::BackendError(format!(
                "Mesh '{label}' has no geometry"
            )));
        }
        let device = &self.internal.device;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let id = MeshId(self.internal.next_mesh_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.internal.meshes, "meshes")?.insert(
            id,
            MeshEntry {
                vertices: vertex_buffer,
                indices: index_buffer,
            },
        );
        log::debug!(
            "WgpuDevice: Created mesh '{label}' {id:?} ({} vertices, {} indices)",
            vertices.len(),
            indices.len()
        );
        Ok(id)
    }

    fn destroy_mesh(&self, mesh: MeshId) -> Result<(), ResourceError> {
        // Passes already recorded keep their own buffer handles.
        match lock(&self.internal.meshes, "meshes")?.remove(&mesh) {
            Some(_) => {
                log::debug!("WgpuDevice: Destroyed mesh {mesh:?}");
                Ok(())
            }
            None => Err(ResourceError::InvalidHandle),
        }
    }

    /// Clip distance 0 is emulated by the shaders, which discard fragments
    /// behind the `ClipPlane` uniform.
    fn supports_feature(&self, feature: RasterFeature) -> bool {
        matches!(feature, RasterFeature::ClipDistance(0))
    }

    fn surface_size(&self) -> Extent2D {
        match self.internal.surface_size.lock() {
            Ok(size) => *size,
            Err(e) => {
                log::error!("WgpuDevice: Mutex poisoned (surface_size): {e}");
                Extent2D::default()
            }
        }
    }

    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder + '_> {
        Box::new(WgpuCommandEncoder::new(self.clone(), label))
    }

    fn submit_command_buffer(&self, command_buffer: CommandBufferId) {
        let buffer = match self.internal.pending_command_buffers.lock() {
            Ok(mut pending) => pending.remove(&command_buffer),
            Err(e) => {
                log::error!("WgpuDevice: Mutex poisoned (pending_command_buffers): {e}");
                return;
            }
        };
        match buffer {
            Some(buffer) => {
                self.internal.queue.submit(std::iter::once(buffer));
            }
            None => log::warn!("WgpuDevice: {command_buffer:?} was already submitted or never finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(size: Extent2D) -> AttachmentInfo {
        AttachmentInfo {
            size,
            format: TextureFormat::Rgba8Unorm,
            dimension: TextureViewDimension::D2,
            render_attachment: true,
        }
    }

    fn depth(size: Extent2D) -> AttachmentInfo {
        AttachmentInfo {
            format: TextureFormat::Depth24Plus,
            ..color(size)
        }
    }

    fn reason(result: Result<(), ResourceError>) -> String {
        match result {
            Err(ResourceError::IncompleteRenderTarget { reason, .. }) => reason,
            other => panic!("expected an incomplete target, got {other:?}"),
        }
    }

    #[test]
    fn matching_color_and_depth_form_a_target() {
        let size = Extent2D::new(512, 512);
        assert!(validate_target("reflection", color(size), Some(depth(size))).is_ok());
        assert!(validate_target("reflection", color(size), None).is_ok());
    }

    #[test]
    fn mismatched_sizes_are_incomplete() {
        let result = validate_target(
            "reflection",
            color(Extent2D::new(512, 512)),
            Some(depth(Extent2D::new(256, 256))),
        );
        assert_eq!(reason(result), "attachments differ in size");
    }

    #[test]
    fn swapped_formats_are_incomplete() {
        let size = Extent2D::new(64, 64);
        assert_eq!(
            reason(validate_target("t", depth(size), None)),
            "color texture has a depth format"
        );
        assert_eq!(
            reason(validate_target("t", color(size), Some(color(size)))),
            "depth texture has a color format"
        );
    }

    #[test]
    fn unbound_slots_use_the_placeholder() {
        let resolved = resolve_slot(0, None, TextureViewDimension::D2, |_| None);
        assert_eq!(resolved, Ok(None));
    }

    #[test]
    fn destroyed_textures_are_invalid_handles() {
        let resolved = resolve_slot(0, Some(TextureId(3)), TextureViewDimension::D2, |_| None);
        assert_eq!(resolved, Err(ResourceError::InvalidHandle));
    }

    #[test]
    fn slot_dimension_must_match() {
        let cube = |_| Some(TextureViewDimension::Cube);
        assert!(matches!(
            resolve_slot(1, Some(TextureId(3)), TextureViewDimension::D2, cube),
            Err(ResourceError::BackendError(_))
        ));
        assert_eq!(
            resolve_slot(1, Some(TextureId(3)), TextureViewDimension::Cube, cube),
            Ok(Some(TextureId(3)))
        );
    }

    #[test]
    fn sample_only_textures_cannot_be_attached() {
        let size = Extent2D::new(64, 64);
        let sampled = AttachmentInfo {
            render_attachment: false,
            ..color(size)
        };
        assert_eq!(
            reason(validate_target("t", sampled, None)),
            "color texture is not a render attachment"
        );
    }
}
