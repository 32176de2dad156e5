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

use super::context::WgpuGraphicsContext;
use super::device::{PassAttachments, WgpuDevice};
use lagoon_core::math::Extent2D;
use lagoon_core::renderer::{GraphicsDevice, RenderError};
use std::fmt;
use std::sync::Arc;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Owns the window surface and drives frame acquisition and presentation.
///
/// Each frame is bracketed by [`WgpuRenderSystem::begin_frame`] and
/// [`WgpuRenderSystem::end_frame`]; passes targeting the surface in between
/// render into the acquired texture and the system's depth buffer.
pub struct WgpuRenderSystem {
    context: WgpuGraphicsContext,
    device: WgpuDevice,
    depth_view: wgpu::TextureView,
    frame: Option<wgpu::SurfaceTexture>,
    frame_count: u64,
}

impl fmt::Debug for WgpuRenderSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuRenderSystem")
            .field("adapter", &self.context.adapter_name)
            .field("backend", &self.context.adapter_backend)
            .field("size", &self.context.size())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

fn create_depth_view(device: &wgpu::Device, size: Extent2D) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Lagoon Surface Depth"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl WgpuRenderSystem {
    /// Initializes `wgpu` for `window`, blocking until the device is ready.
    pub fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let context = pollster::block_on(WgpuGraphicsContext::new(window))
            .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;
        let device = WgpuDevice::new(context.device.clone(), context.queue.clone());
        device.set_surface_size(context.size());
        let depth_view = create_depth_view(&context.device, context.size());

        log::info!(
            "WgpuRenderSystem: Initialized on \"{}\" ({:?})",
            context.adapter_name,
            context.adapter_backend
        );
        Ok(Self {
            context,
            device,
            depth_view,
            frame: None,
            frame_count: 0,
        })
    }

    /// The device resources are created with.
    pub fn device(&self) -> &WgpuDevice {
        &self.device
    }

    /// The name of the adapter in use.
    pub fn adapter_name(&self) -> &str {
        &self.context.adapter_name
    }

    /// Number of frames presented so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Follows a window resize. A zero size marks the window as minimized.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = Extent2D::new(width, height);
        self.device.set_surface_size(size);
        if size.is_empty() {
            return;
        }
        self.context.resize(width, height);
        self.depth_view = create_depth_view(&self.context.device, size);
        log::debug!("WgpuRenderSystem: Resized to {width}x{height}");
    }

    /// Acquires the next surface texture.
    ///
    /// Returns `Ok(false)` when the frame should be skipped: the window is
    /// minimized, or the surface had to be reconfigured.
    pub fn begin_frame(&mut self) -> Result<bool, RenderError> {
        if self.device.surface_size().is_empty() {
            return Ok(false);
        }
        let frame = match self.context.get_current_texture() {
            Ok(frame) => frame,
            Err(e @ wgpu::SurfaceError::Lost) | Err(e @ wgpu::SurfaceError::Outdated) => {
                log::warn!("WgpuRenderSystem: Surface {e:?}, reconfiguring");
                self.context.reconfigure();
                return Ok(false);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("WgpuRenderSystem: Timed out acquiring the surface texture");
                return Ok(false);
            }
            Err(e) => return Err(RenderError::SurfaceAcquisitionFailed(e.to_string())),
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.device.set_surface_frame(Some(PassAttachments {
            color: view,
            depth: Some(self.depth_view.clone()),
            color_format: self.context.surface_format(),
            depth_format: Some(DEPTH_FORMAT),
        }));
        self.frame = Some(frame);
        Ok(true)
    }

    /// Presents the acquired texture. Command buffers must be submitted first.
    pub fn end_frame(&mut self) {
        self.device.set_surface_frame(None);
        if let Some(frame) = self.frame.take() {
            frame.present();
            self.frame_count += 1;
        }
    }
}
