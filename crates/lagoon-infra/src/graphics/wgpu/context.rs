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

use anyhow::anyhow;
use lagoon_core::math::Extent2D;
use std::sync::Arc;
use winit::window::Window;

/// Holds the core `wgpu` state: the surface, adapter, device and queue.
///
/// `wgpu::Device` and `wgpu::Queue` are cheap handles; the resource tables of
/// [`super::WgpuDevice`] keep their own clones.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    /// The window surface frames are presented to.
    pub surface: wgpu::Surface<'static>,
    /// The physical adapter.
    pub adapter: wgpu::Adapter,
    /// The logical device.
    pub device: wgpu::Device,
    /// The submission queue.
    pub queue: wgpu::Queue,
    /// The current surface configuration.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// The adapter's name, for logs.
    pub adapter_name: String,
    /// The backend API in use.
    pub adapter_backend: wgpu::Backend,
}

impl WgpuGraphicsContext {
    /// Creates the surface for `window`, picks an adapter and opens a device.
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        log::info!("WgpuGraphicsContext: Initializing...");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let size = window.inner_size();

        let surface = instance
            .create_surface(window)
            .map_err(|e| anyhow!("Failed to create wgpu surface: {e}"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to find a suitable wgpu adapter: {e}"))?;

        let info = adapter.get_info();
        log::info!(
            "WgpuGraphicsContext: Selected adapter: \"{}\" ({:?})",
            info.name,
            info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lagoon Logical Device"),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to create wgpu device: {e}"))?;

        device.on_uncaptured_error(std::sync::Arc::new(|error| {
            log::error!("WGPU uncaptured error: {error}");
        }));

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported format"))?;
        let present_mode = if capabilities
            .present_modes
            .contains(&wgpu::PresentMode::Mailbox)
        {
            wgpu::PresentMode::Mailbox
        } else {
            wgpu::PresentMode::Fifo
        };
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "WgpuGraphicsContext: Surface configured ({}x{}, {:?}, {:?})",
            surface_config.width,
            surface_config.height,
            format,
            present_mode
        );

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            surface_config,
            adapter_name: info.name,
            adapter_backend: info.backend,
        })
    }

    /// Reconfigures the surface. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("WgpuGraphicsContext: Ignoring resize to {width}x{height}");
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();
    }

    /// Applies the current configuration again, after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Acquires the next texture to present.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// The configured surface size.
    pub fn size(&self) -> Extent2D {
        Extent2D::new(self.surface_config.width, self.surface_config.height)
    }

    /// The surface's color format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }
}
