//! A graphics device that records every command instead of talking to a GPU.

#![allow(dead_code)]

use lagoon_core::math::Extent2D;
use lagoon_core::renderer::{
    CommandBufferId, CommandEncoder, Drawcall, GraphicsDevice, MeshId, ProgramDescriptor,
    ProgramId, RasterFeature, RenderError, RenderPass, RenderPassDescriptor, RenderState,
    RenderTarget, RenderTargetDescriptor, RenderTargetId, ResourceError, TextureDescriptor,
    TextureId, UniformLayout, UniformLocation, UniformValue, Vertex, Viewport,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginPass(RenderTarget),
    EndPass,
    Viewport(Viewport),
    Feature(RasterFeature, bool),
    Program(ProgramId),
    State(RenderState),
    Uniform(UniformLocation, UniformValue),
    Texture(u32, TextureId),
    Draw(Drawcall),
    Submit,
}

#[derive(Debug)]
pub struct MockGraphicsDevice {
    commands: Mutex<Vec<Command>>,
    textures: Mutex<HashMap<TextureId, Extent2D>>,
    targets: Mutex<HashMap<RenderTargetId, TextureId>>,
    programs: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    surface_size: Mutex<Extent2D>,
    clip_supported: bool,
    pass_failure: Mutex<Option<RenderError>>,
}

impl MockGraphicsDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            textures: Mutex::new(HashMap::new()),
            targets: Mutex::new(HashMap::new()),
            programs: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            surface_size: Mutex::new(Extent2D::new(width, height)),
            clip_supported: true,
            pass_failure: Mutex::new(None),
        }
    }

    /// A device that cannot enable user clip distances.
    pub fn without_clip(width: u32, height: u32) -> Self {
        Self {
            clip_supported: false,
            ..Self::new(width, height)
        }
    }

    pub fn set_surface_size(&self, width: u32, height: u32) {
        *self.surface_size.lock().unwrap() = Extent2D::new(width, height);
    }

    /// Makes the next pass report `error` when it ends, as a backend does
    /// for a rejected command or a destroyed resource.
    pub fn fail_next_pass(&self, error: RenderError) {
        *self.pass_failure.lock().unwrap() = Some(error);
    }

    /// Drains the recorded commands.
    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }

    pub fn live_textures(&self) -> usize {
        self.textures.lock().unwrap().len()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.lock().unwrap().len()
    }

    pub fn texture_size(&self, texture: TextureId) -> Option<Extent2D> {
        self.textures.lock().unwrap().get(&texture).copied()
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn record(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }
}

struct MockCommandEncoder<'a> {
    device: &'a MockGraphicsDevice,
}

struct MockRenderPass<'a> {
    device: &'a MockGraphicsDevice,
}

impl CommandEncoder for MockCommandEncoder<'_> {
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor,
    ) -> Result<Box<dyn RenderPass + 'encoder>, RenderError> {
        if let RenderTarget::Offscreen(target) = descriptor.target {
            if !self.device.targets.lock().unwrap().contains_key(&target) {
                return Err(ResourceError::InvalidHandle.into());
            }
        }
        self.device.record(Command::BeginPass(descriptor.target));
        Ok(Box::new(MockRenderPass {
            device: self.device,
        }))
    }

    fn finish(self: Box<Self>) -> CommandBufferId {
        CommandBufferId(0)
    }
}

impl RenderPass for MockRenderPass<'_> {
    fn set_viewport(&mut self, viewport: Viewport) {
        self.device.record(Command::Viewport(viewport));
    }

    fn set_feature_enabled(
        &mut self,
        feature: RasterFeature,
        enabled: bool,
    ) -> Result<(), RenderError> {
        if !self.device.supports_feature(feature) {
            return Err(RenderError::FeatureUnsupported(feature));
        }
        self.device.record(Command::Feature(feature, enabled));
        Ok(())
    }

    fn set_program(&mut self, program: ProgramId) {
        self.device.record(Command::Program(program));
    }

    fn set_render_state(&mut self, state: &RenderState) {
        self.device.record(Command::State(*state));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        self.device.record(Command::Uniform(location, *value));
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        self.device.record(Command::Texture(slot, texture));
    }

    fn draw(&mut self, drawcall: &Drawcall) {
        self.device.record(Command::Draw(*drawcall));
    }

    fn end(self: Box<Self>) -> Result<(), RenderError> {
        if let Some(error) = self.device.pass_failure.lock().unwrap().take() {
            return Err(error);
        }
        self.device.record(Command::EndPass);
        Ok(())
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        let id = TextureId(self.next());
        self.textures.lock().unwrap().insert(id, descriptor.size);
        Ok(id)
    }

    fn write_texture(&self, texture: TextureId, _: u32, _: &[u8]) -> Result<(), ResourceError> {
        if self.textures.lock().unwrap().contains_key(&texture) {
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn destroy_texture(&self, texture: TextureId) -> Result<(), ResourceError> {
        self.textures
            .lock()
            .unwrap()
            .remove(&texture)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetId, ResourceError> {
        let textures = self.textures.lock().unwrap();
        let color = textures.get(&descriptor.color);
        let depth = descriptor.depth.map(|d| textures.get(&d));
        match (color, depth) {
            (Some(c), Some(Some(d))) if c != d => Err(ResourceError::IncompleteRenderTarget {
                label: descriptor.label.to_string(),
                reason: "attachment sizes differ".to_string(),
            }),
            (Some(_), None | Some(Some(_))) => {
                let id = RenderTargetId(self.next());
                self.targets.lock().unwrap().insert(id, descriptor.color);
                Ok(id)
            }
            _ => Err(ResourceError::InvalidHandle),
        }
    }

    fn destroy_render_target(&self, target: RenderTargetId) -> Result<(), ResourceError> {
        self.targets
            .lock()
            .unwrap()
            .remove(&target)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_program(
        &self,
        descriptor: &ProgramDescriptor,
        _layout: &UniformLayout,
    ) -> Result<ProgramId, ResourceError> {
        let mut programs = self.programs.lock().unwrap();
        programs.push(descriptor.label.to_string());
        Ok(ProgramId(programs.len() - 1))
    }

    fn create_mesh(
        &self,
        _label: &str,
        _vertices: &[Vertex],
        _indices: &[u32],
    ) -> Result<MeshId, ResourceError> {
        Ok(MeshId(self.next()))
    }

    fn destroy_mesh(&self, _mesh: MeshId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn supports_feature(&self, feature: RasterFeature) -> bool {
        match feature {
            RasterFeature::ClipDistance(_) => self.clip_supported,
        }
    }

    fn surface_size(&self) -> Extent2D {
        *self.surface_size.lock().unwrap()
    }

    fn create_command_encoder(&self, _label: Option<&str>) -> Box<dyn CommandEncoder + '_> {
        Box::new(MockCommandEncoder { device: self })
    }

    fn submit_command_buffer(&self, _command_buffer: CommandBufferId) {
        self.record(Command::Submit);
    }
}

/// The commands recorded between the `n`-th `BeginPass` and its `EndPass`.
pub fn pass(commands: &[Command], n: usize) -> &[Command] {
    let begins: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Command::BeginPass(_)))
        .map(|(i, _)| i)
        .collect();
    let start = begins[n];
    let end = commands[start..]
        .iter()
        .position(|c| *c == Command::EndPass)
        .map_or(commands.len(), |offset| start + offset);
    &commands[start..=end.min(commands.len() - 1)]
}

/// The meshes drawn, in order.
pub fn drawn_meshes(commands: &[Command]) -> Vec<MeshId> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::Draw(drawcall) => Some(drawcall.mesh),
            _ => None,
        })
        .collect()
}

/// The render states set, in order.
pub fn states(commands: &[Command]) -> Vec<RenderState> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::State(state) => Some(*state),
            _ => None,
        })
        .collect()
}

/// The values written to `location` while `program` was bound.
pub fn uniform_writes(
    commands: &[Command],
    program: ProgramId,
    location: UniformLocation,
) -> Vec<UniformValue> {
    let mut bound = None;
    commands
        .iter()
        .filter_map(|c| match c {
            Command::Program(p) => {
                bound = Some(*p);
                None
            }
            Command::Uniform(loc, value) if bound == Some(program) && *loc == location => {
                Some(*value)
            }
            _ => None,
        })
        .collect()
}
