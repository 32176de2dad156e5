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

//! The frame pipeline: reflection capture, then the main pass, in one submission.

use super::{
    reflection_resolution, FrameInputs, LaneError, MainLane, MaterialRegistry, OffscreenTarget,
    ReflectionLane, RenderContext, RenderLane, Skybox,
};
use lagoon_core::math::Extent2D;
use lagoon_core::renderer::{GraphicsDevice, ResourceError, ShaderError, TextureId};
use lagoon_data::{MaterialHandle, ReflectionResizePolicy, Scene};

/// Texture slot reflective materials sample the reflection from.
pub const REFLECTION_TEXTURE: &str = "ReflectionTexture";

/// Float uniform weighting the reflection term: 1 while a reflection is
/// captured, 0 otherwise.
pub const REFLECTION_STRENGTH: &str = "ReflectionStrength";

/// Points `material` at the captured reflection, or detaches it.
fn bind_reflection(material: &MaterialHandle, texture: Option<TextureId>) -> Result<(), ShaderError> {
    let mut material = material.write();
    match texture {
        Some(texture) => {
            material.set_uniform_value(REFLECTION_TEXTURE, texture)?;
            material.set_uniform_value(REFLECTION_STRENGTH, 1.0_f32)?;
        }
        None => {
            material.clear_value(REFLECTION_TEXTURE);
            material.set_uniform_value(REFLECTION_STRENGTH, 0.0_f32)?;
        }
    }
    Ok(())
}

/// Counters of one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// GPU draws of the reflection pass.
    pub reflection_draws: u32,
    /// GPU draws of the main pass.
    pub main_draws: u32,
    /// Opaque drawcalls collected by the main pass.
    pub opaque_drawcalls: usize,
    /// Transparent drawcalls collected by the main pass.
    pub transparent_drawcalls: usize,
    /// Lights collected by the main pass.
    pub lights: usize,
}

/// Owns the lanes and the per-pass context, and records whole frames.
#[derive(Debug)]
pub struct WaterRenderer {
    registry: MaterialRegistry,
    context: RenderContext,
    reflection: Option<ReflectionLane>,
    resize_policy: ReflectionResizePolicy,
    reflective: Vec<MaterialHandle>,
    main: MainLane,
    skybox: Option<Skybox>,
}

impl WaterRenderer {
    /// Creates a renderer without reflection for a window of `window_size`.
    pub fn new(registry: MaterialRegistry, window_size: Extent2D) -> Self {
        Self {
            registry,
            context: RenderContext::new(window_size),
            reflection: None,
            resize_policy: ReflectionResizePolicy::default(),
            reflective: Vec::new(),
            main: MainLane::default(),
            skybox: None,
        }
    }

    /// The program bindings.
    pub fn registry(&self) -> &MaterialRegistry {
        &self.registry
    }

    /// The program bindings, to register more programs.
    pub fn registry_mut(&mut self) -> &mut MaterialRegistry {
        &mut self.registry
    }

    /// What the last pass collected.
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Replaces the main lane, e.g. to change its clear color.
    pub fn set_main_lane(&mut self, lane: MainLane) {
        self.main = lane;
    }

    /// Sets or removes the sky.
    pub fn set_skybox(&mut self, skybox: Option<Skybox>) {
        self.skybox = skybox;
    }

    /// Allocates the reflection target and enables the reflection pass.
    ///
    /// Does nothing but update the settings if the pass is already enabled.
    pub fn enable_reflection(
        &mut self,
        device: &dyn GraphicsDevice,
        water_height: f32,
        resize_policy: ReflectionResizePolicy,
    ) -> Result<(), LaneError> {
        self.resize_policy = resize_policy;
        if let Some(lane) = &mut self.reflection {
            lane.set_water_height(water_height);
            return Ok(());
        }
        let size = self.context.window_size();
        let target = OffscreenTarget::setup(device, size.width, size.height)?;
        self.reflection = Some(ReflectionLane::new(target, water_height));
        self.rebind_reflection()?;
        Ok(())
    }

    /// Releases the reflection target and disables the reflection pass.
    ///
    /// Reflective materials stop sampling the released texture.
    pub fn disable_reflection(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        let Some(lane) = self.reflection.take() else {
            return Ok(());
        };
        for material in &self.reflective {
            bind_reflection(material, None)?;
        }
        log::info!("Reflection pass disabled");
        lane.into_target().release(device)
    }

    /// The texture holding the last captured reflection.
    pub fn reflection_texture(&self) -> Option<TextureId> {
        self.reflection
            .as_ref()
            .map(|lane| lane.target().color_texture())
    }

    /// Size of the reflection target, if the pass is enabled.
    pub fn reflection_size(&self) -> Option<Extent2D> {
        self.reflection.as_ref().map(|lane| lane.target().size())
    }

    /// Moves the reflection plane.
    pub fn set_water_height(&mut self, height: f32) {
        if let Some(lane) = &mut self.reflection {
            lane.set_water_height(height);
        }
    }

    /// Changes how the reflection target follows window resizes.
    pub fn set_resize_policy(&mut self, policy: ReflectionResizePolicy) {
        self.resize_policy = policy;
    }

    /// Registers a material sampling [`REFLECTION_TEXTURE`], weighted by
    /// [`REFLECTION_STRENGTH`].
    ///
    /// The texture is bound now and again whenever the target is reallocated.
    ///
    /// # Errors
    /// [`ShaderError::MissingUniform`] if the program lacks the slot or the
    /// uniform.
    pub fn add_reflective_material(&mut self, material: MaterialHandle) -> Result<(), ShaderError> {
        let program = material.read().program().clone();
        if program.texture_slot(REFLECTION_TEXTURE).is_none() {
            return Err(ShaderError::MissingUniform {
                program: program.label().to_string(),
                name: REFLECTION_TEXTURE.to_string(),
            });
        }
        bind_reflection(&material, self.reflection_texture())?;
        self.reflective.push(material);
        Ok(())
    }

    fn rebind_reflection(&self) -> Result<(), ShaderError> {
        let texture = self.reflection_texture();
        for material in &self.reflective {
            bind_reflection(material, texture)?;
        }
        Ok(())
    }

    /// Follows a window resize.
    ///
    /// Cameras pick the new aspect ratio up on the next frame. With
    /// [`ReflectionResizePolicy::FollowWindow`] the reflection target is
    /// reallocated when its power-of-two side changes.
    pub fn resize(&mut self, device: &dyn GraphicsDevice, size: Extent2D) -> Result<(), LaneError> {
        self.context.set_window_size(size);
        if self.resize_policy != ReflectionResizePolicy::FollowWindow || size.is_empty() {
            return Ok(());
        }
        let Some(lane) = &mut self.reflection else {
            return Ok(());
        };
        let side = reflection_resolution(size.width);
        if lane.target().size() == Extent2D::new(side, side) {
            return Ok(());
        }
        let target = OffscreenTarget::setup(device, size.width, size.height)?;
        lane.replace_target(target).release(device)?;
        self.rebind_reflection()?;
        Ok(())
    }

    /// Records, submits and returns the statistics of one frame.
    ///
    /// The reflection pass runs first when enabled; its texture is then read by
    /// reflective materials in the main pass.
    pub fn render_frame(
        &mut self,
        device: &dyn GraphicsDevice,
        opaque: &Scene,
        transparent: &Scene,
        time: f32,
    ) -> Result<FrameStats, LaneError> {
        let window_size = device.surface_size();
        if window_size.is_empty() {
            log::trace!("Skipping frame for an empty surface");
            return Ok(FrameStats::default());
        }
        self.context.set_window_size(window_size);

        let inputs = FrameInputs {
            opaque,
            transparent,
            registry: &self.registry,
            skybox: self.skybox.as_ref(),
            window_size,
            time,
        };

        let mut encoder = device.create_command_encoder(Some("Lagoon Frame"));
        let mut stats = FrameStats::default();

        if let Some(reflection) = &self.reflection {
            let pass = reflection.render(&inputs, &mut self.context, encoder.as_mut())?;
            stats.reflection_draws = pass.draws;
        }

        let pass = self
            .main
            .render(&inputs, &mut self.context, encoder.as_mut())?;
        stats.main_draws = pass.draws;
        stats.opaque_drawcalls = pass.opaque_drawcalls;
        stats.transparent_drawcalls = pass.transparent_drawcalls;
        stats.lights = pass.lights;

        device.submit_command_buffer(encoder.finish());
        log::debug!("Frame recorded: {stats:?}");
        Ok(stats)
    }
}
