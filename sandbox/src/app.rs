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

//! The winit application driving the lagoon.

use crate::camera::CameraController;
use crate::scene::{self, LagoonScene, EYE};
use crate::Args;
use anyhow::{anyhow, Context};
use lagoon_core::math::{Extent2D, Vec3};
use lagoon_core::renderer::GraphicsDevice;
use lagoon_data::LagoonConfig;
use lagoon_infra::WgpuRenderSystem;
use lagoon_lanes::materials::{water, MaterialLibrary};
use lagoon_lanes::{MaterialRegistry, WaterRenderer};
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Everything that exists once the window is up.
struct Running {
    window: Arc<Window>,
    system: WgpuRenderSystem,
    renderer: WaterRenderer,
    scene: LagoonScene,
    controller: CameraController,
    started: Instant,
    last_frame: Instant,
}

impl Running {
    fn new(window: Arc<Window>, config: &LagoonConfig) -> anyhow::Result<Self> {
        let system = WgpuRenderSystem::new(window.clone())?;
        let device: &dyn GraphicsDevice = system.device();

        let mut registry = MaterialRegistry::new();
        let library = MaterialLibrary::build(device, &mut registry)?;
        let scene = scene::build(device, &library, config)?;

        let mut renderer = WaterRenderer::new(registry, device.surface_size());
        renderer.set_skybox(Some(scene.skybox.clone()));
        if config.reflection.enabled {
            renderer.enable_reflection(
                device,
                config.water.height,
                config.reflection.resize_policy,
            )?;
        }
        renderer.add_reflective_material(scene.water.clone())?;

        let now = Instant::now();
        Ok(Self {
            window,
            system,
            renderer,
            scene,
            controller: CameraController::looking_at(EYE, Vec3::ZERO),
            started: now,
            last_frame: now,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> anyhow::Result<()> {
        self.system.resize(size.width, size.height);
        self.renderer
            .resize(self.system.device(), Extent2D::new(size.width, size.height))?;
        Ok(())
    }

    fn frame(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.controller.update(dt);
        if let Some(node) = self.scene.opaque.node_mut(self.scene.camera) {
            node.transform = self.controller.transform();
        }

        if !self.system.begin_frame()? {
            return Ok(());
        }
        let result = self.renderer.render_frame(
            self.system.device(),
            &self.scene.opaque,
            &self.scene.transparent,
            self.started.elapsed().as_secs_f32(),
        );
        self.system.end_frame();
        let stats = result?;
        log::trace!("Frame {}: {stats:?}", self.system.frame_count());
        Ok(())
    }

    fn toggle_water_transparency(&self) {
        let transparent = !self.scene.water.read().is_transparent();
        water::set_transparent(&self.scene.water, transparent);
        log::info!(
            "Water is now {}",
            if transparent { "transparent" } else { "opaque" }
        );
    }
}

/// The sandbox state owned by the event loop.
pub struct SandboxApp {
    args: Args,
    config: LagoonConfig,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl SandboxApp {
    /// Creates the application; the window is opened on the first resume.
    pub fn new(args: Args, config: LagoonConfig) -> Self {
        Self {
            args,
            config,
            running: None,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn into_result(self) -> anyhow::Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn reload_config(&mut self) -> anyhow::Result<()> {
        let Some(path) = &self.args.config else {
            log::info!("No configuration file given, nothing to reload");
            return Ok(());
        };
        let config = match LagoonConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Keeping the current configuration: {e}");
                return Ok(());
            }
        };
        if let Some(running) = &mut self.running {
            running.scene.apply_config(running.system.device(), &config)?;
            running.renderer.set_water_height(config.water.height);
            running
                .renderer
                .set_resize_policy(config.reflection.resize_policy);
        }
        self.config = config;
        Ok(())
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: KeyEvent) -> anyhow::Result<()> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return Ok(());
        };
        let pressed = event.state == ElementState::Pressed;
        if let Some(running) = &mut self.running {
            if running.controller.set_key(code, pressed) {
                return Ok(());
            }
        }
        if !pressed || event.repeat {
            return Ok(());
        }
        match code {
            KeyCode::Escape => {
                log::info!("Escape pressed, exiting...");
                event_loop.exit();
            }
            KeyCode::KeyT => {
                if let Some(running) = &self.running {
                    running.toggle_water_transparency();
                }
            }
            KeyCode::KeyR => self.reload_config()?,
            _ => {}
        }
        Ok(())
    }
}

impl ApplicationHandler for SandboxApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        log::info!("Application resumed. Initializing window and renderer...");

        let attributes = Window::default_attributes()
            .with_title("Lagoon")
            .with_inner_size(PhysicalSize::new(self.args.width, self.args.height));
        let result = event_loop
            .create_window(attributes)
            .map_err(|e| anyhow!("Failed to create the window: {e}"))
            .and_then(|window| {
                Running::new(Arc::new(window), &self.config).context("Failed to set up rendering")
            });
        match result {
            Ok(running) => {
                log::info!(
                    "Ready on \"{}\". WASD to move, hold the right mouse button to look, \
                     T toggles water transparency, R reloads the config, Escape quits.",
                    running.system.adapter_name()
                );
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let result = match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => match &mut self.running {
                Some(running) => running.resize(size),
                None => Ok(()),
            },
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, event),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => {
                if let Some(running) = &mut self.running {
                    running
                        .controller
                        .set_looking(state == ElementState::Pressed);
                }
                Ok(())
            }
            WindowEvent::RedrawRequested => match &mut self.running {
                Some(running) => running.frame(),
                None => Ok(()),
            },
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let (DeviceEvent::MouseMotion { delta }, Some(running)) = (event, &mut self.running) {
            running.controller.rotate(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}
