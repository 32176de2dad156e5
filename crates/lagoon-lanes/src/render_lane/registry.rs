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

//! The material registry: which uniform bindings drive each program.
//!
//! Every program drawn by a lane must be registered with a [`TransformBinding`]
//! and a [`LightBinding`]. Bindings resolve their uniform locations when they
//! are built, so a program missing a uniform fails at start-up rather than
//! while drawing.

use lagoon_core::math::{Mat4, Plane, Vec4};
use lagoon_core::renderer::{
    CameraView, Light, ProgramId, RenderError, RenderPass, ShaderError, ShaderProgram,
    UniformLocation, UniformValue, CLIP_PLANE_UNIFORM,
};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// The camera-dependent inputs of a pass.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    /// The camera the pass renders from.
    pub camera: &'a CameraView,
    /// The active clip plane, `None` when clipping is off.
    pub clip_plane: Option<Plane>,
    /// Seconds since start-up.
    pub time: f32,
}

impl ViewContext<'_> {
    /// The clip plane equation, or the pass-through equation when clipping is off.
    pub fn clip_equation(&self) -> Vec4 {
        self.clip_plane
            .map_or(Plane::PASS_THROUGH, |plane| plane.to_vec4())
    }
}

/// Writes the transform uniforms of a shader family.
pub trait TransformBinding: Debug + Send + Sync {
    /// Writes the uniforms for a draw with `world`.
    ///
    /// `camera_changed` is `true` for the first draw of the program in a pass;
    /// camera-wide values only need writing then.
    fn apply(
        &self,
        pass: &mut dyn RenderPass,
        world: &Mat4,
        view: &ViewContext<'_>,
        camera_changed: bool,
    );
}

/// Writes the light uniforms of a shader family, one batch at a time.
pub trait LightBinding: Debug + Send + Sync {
    /// Number of lights one draw can shade. `0` for unlit families.
    fn capacity(&self) -> usize;

    /// Writes up to [`capacity`](Self::capacity) lights starting at `light_index`
    /// and advances it past them.
    ///
    /// Returns `false`, writing nothing, when no light is left.
    fn update_lights(
        &self,
        pass: &mut dyn RenderPass,
        lights: &[Light],
        light_index: &mut usize,
    ) -> bool;

    /// Prepares a draw that has no light to shade.
    fn clear_lights(&self, _pass: &mut dyn RenderPass) {}
}

/// A binding that can be built from the program it will drive.
pub trait ResolveBinding: Sized {
    /// Resolves every uniform the binding writes.
    ///
    /// # Errors
    /// [`ShaderError::MissingUniform`] if `program` lacks one of them.
    fn resolve(program: &ShaderProgram) -> Result<Self, ShaderError>;
}

/// World matrix, view-projection and camera position, plus `Time` and the clip
/// plane when the program declares them.
#[derive(Debug, Clone, Copy)]
pub struct StandardTransformBinding {
    world: UniformLocation,
    view_projection: UniformLocation,
    camera_position: UniformLocation,
    time: Option<UniformLocation>,
    clip_plane: Option<UniformLocation>,
}

impl ResolveBinding for StandardTransformBinding {
    fn resolve(program: &ShaderProgram) -> Result<Self, ShaderError> {
        Ok(Self {
            world: program.uniform("WorldMatrix")?,
            view_projection: program.uniform("ViewProjection")?,
            camera_position: program.uniform("CameraPosition")?,
            time: program.layout().location("Time"),
            clip_plane: program.layout().location(CLIP_PLANE_UNIFORM),
        })
    }
}

impl TransformBinding for StandardTransformBinding {
    fn apply(
        &self,
        pass: &mut dyn RenderPass,
        world: &Mat4,
        view: &ViewContext<'_>,
        camera_changed: bool,
    ) {
        pass.set_uniform(self.world, &UniformValue::Mat4(*world));
        if !camera_changed {
            return;
        }
        pass.set_uniform(
            self.view_projection,
            &UniformValue::Mat4(view.camera.view_projection()),
        );
        pass.set_uniform(
            self.camera_position,
            &UniformValue::Vec3(view.camera.position),
        );
        if let Some(time) = self.time {
            pass.set_uniform(time, &UniformValue::Float(view.time));
        }
        if let Some(clip_plane) = self.clip_plane {
            pass.set_uniform(clip_plane, &UniformValue::Vec4(view.clip_equation()));
        }
    }
}

/// The forward light block shared by the lit families.
///
/// Per light: `LightColor` (radiance), `LightPosition` (`w = 1` for point
/// lights, `0` for directional ones), `LightDirection` and `LightAttenuation`
/// (`x` = range). `LightCount` is the size of the batch and `LightIndirect` is
/// `1` only for the first batch, so ambient light is added once.
#[derive(Debug, Clone)]
pub struct DefaultLightBinding {
    color: Vec<UniformLocation>,
    position: Vec<UniformLocation>,
    direction: Vec<UniformLocation>,
    attenuation: Vec<UniformLocation>,
    count: UniformLocation,
    indirect: UniformLocation,
}

impl ResolveBinding for DefaultLightBinding {
    fn resolve(program: &ShaderProgram) -> Result<Self, ShaderError> {
        Ok(Self {
            color: program.uniform_array("LightColor")?,
            position: program.uniform_array("LightPosition")?,
            direction: program.uniform_array("LightDirection")?,
            attenuation: program.uniform_array("LightAttenuation")?,
            count: program.uniform("LightCount")?,
            indirect: program.uniform("LightIndirect")?,
        })
    }
}

impl LightBinding for DefaultLightBinding {
    fn capacity(&self) -> usize {
        self.color
            .len()
            .min(self.position.len())
            .min(self.direction.len())
            .min(self.attenuation.len())
    }

    fn update_lights(
        &self,
        pass: &mut dyn RenderPass,
        lights: &[Light],
        light_index: &mut usize,
    ) -> bool {
        let start = *light_index;
        if start >= lights.len() || self.capacity() == 0 {
            return false;
        }
        let batch = &lights[start..lights.len().min(start + self.capacity())];

        for (slot, light) in batch.iter().enumerate() {
            let w = if light.is_positional() { 1.0 } else { 0.0 };
            pass.set_uniform(
                self.color[slot],
                &UniformValue::Vec4(light.radiance().extend(1.0)),
            );
            pass.set_uniform(
                self.position[slot],
                &UniformValue::Vec4(light.position.extend(w)),
            );
            pass.set_uniform(
                self.direction[slot],
                &UniformValue::Vec4(light.direction.extend(0.0)),
            );
            pass.set_uniform(
                self.attenuation[slot],
                &UniformValue::Vec4(Vec4::new(light.range(), 0.0, 0.0, 0.0)),
            );
        }
        pass.set_uniform(self.count, &UniformValue::Int(batch.len() as i32));
        pass.set_uniform(self.indirect, &UniformValue::Int(i32::from(start == 0)));

        *light_index = start + batch.len();
        true
    }

    fn clear_lights(&self, pass: &mut dyn RenderPass) {
        pass.set_uniform(self.count, &UniformValue::Int(0));
        pass.set_uniform(self.indirect, &UniformValue::Int(1));
    }
}

/// The light binding of unlit families.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLights;

impl ResolveBinding for NoLights {
    fn resolve(_program: &ShaderProgram) -> Result<Self, ShaderError> {
        Ok(Self)
    }
}

impl LightBinding for NoLights {
    fn capacity(&self) -> usize {
        0
    }

    fn update_lights(&self, _: &mut dyn RenderPass, _: &[Light], _: &mut usize) -> bool {
        false
    }
}

/// A program together with the bindings that drive it.
#[derive(Debug)]
pub struct RegisteredProgram {
    program: Arc<ShaderProgram>,
    transform: Box<dyn TransformBinding>,
    lights: Box<dyn LightBinding>,
}

impl RegisteredProgram {
    /// The program.
    pub fn program(&self) -> &Arc<ShaderProgram> {
        &self.program
    }

    /// Its transform binding.
    pub fn transform(&self) -> &dyn TransformBinding {
        self.transform.as_ref()
    }

    /// Its light binding.
    pub fn lights(&self) -> &dyn LightBinding {
        self.lights.as_ref()
    }
}

/// Maps programs to their bindings.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    programs: HashMap<ProgramId, RegisteredProgram>,
}

impl MaterialRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `program`, resolving both bindings against it.
    ///
    /// # Errors
    /// [`ShaderError::MissingUniform`] if the program lacks a uniform one of
    /// the bindings writes.
    pub fn register<T, L>(&mut self, program: Arc<ShaderProgram>) -> Result<(), ShaderError>
    where
        T: TransformBinding + ResolveBinding + 'static,
        L: LightBinding + ResolveBinding + 'static,
    {
        let transform = T::resolve(&program)?;
        let lights = L::resolve(&program)?;
        self.register_with(program, Box::new(transform), Box::new(lights));
        Ok(())
    }

    /// Registers `program` with already-resolved bindings.
    ///
    /// Registering a program twice replaces its bindings.
    pub fn register_with(
        &mut self,
        program: Arc<ShaderProgram>,
        transform: Box<dyn TransformBinding>,
        lights: Box<dyn LightBinding>,
    ) {
        log::debug!(
            "Registered program '{}' ({:?}) with light capacity {}",
            program.label(),
            program.id(),
            lights.capacity()
        );
        self.programs.insert(
            program.id(),
            RegisteredProgram {
                program,
                transform,
                lights,
            },
        );
    }

    /// Looks up the bindings of `id`.
    ///
    /// # Errors
    /// [`RenderError::UnregisteredProgram`] if `id` was never registered.
    pub fn get(&self, id: ProgramId) -> Result<&RegisteredProgram, RenderError> {
        self.programs
            .get(&id)
            .ok_or(RenderError::UnregisteredProgram(id))
    }

    /// `true` if `id` is registered.
    pub fn contains(&self, id: ProgramId) -> bool {
        self.programs.contains_key(&id)
    }

    /// Number of registered programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagoon_core::renderer::{ProgramDescriptor, UniformDecl, UniformKind};

    fn program(id: usize, uniforms: Vec<UniformDecl>) -> Arc<ShaderProgram> {
        let descriptor = ProgramDescriptor {
            label: "registry".into(),
            source: "".into(),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            uniforms,
            textures: vec![],
        };
        Arc::new(ShaderProgram::new(ProgramId(id), &descriptor).unwrap())
    }

    fn lit_uniforms() -> Vec<UniformDecl> {
        vec![
            UniformDecl::new("WorldMatrix", UniformKind::Mat4),
            UniformDecl::new("ViewProjection", UniformKind::Mat4),
            UniformDecl::new("CameraPosition", UniformKind::Vec3),
            UniformDecl::new("LightCount", UniformKind::Int),
            UniformDecl::new("LightIndirect", UniformKind::Int),
            UniformDecl::array("LightColor", UniformKind::Vec4, 3),
            UniformDecl::array("LightPosition", UniformKind::Vec4, 3),
            UniformDecl::array("LightDirection", UniformKind::Vec4, 3),
            UniformDecl::array("LightAttenuation", UniformKind::Vec4, 3),
        ]
    }

    #[test]
    fn capacity_comes_from_the_light_arrays() {
        let binding = DefaultLightBinding::resolve(&program(0, lit_uniforms())).unwrap();
        assert_eq!(binding.capacity(), 3);
    }

    #[test]
    fn missing_uniform_fails_registration() {
        let mut registry = MaterialRegistry::new();
        let mut uniforms = lit_uniforms();
        uniforms.retain(|u| u.name != "LightIndirect");
        let err = registry
            .register::<StandardTransformBinding, DefaultLightBinding>(program(1, uniforms))
            .unwrap_err();
        assert_eq!(
            err,
            ShaderError::MissingUniform {
                program: "registry".into(),
                name: "LightIndirect".into(),
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn unregistered_lookup_is_an_error() {
        let mut registry = MaterialRegistry::new();
        registry
            .register::<StandardTransformBinding, DefaultLightBinding>(program(2, lit_uniforms()))
            .unwrap();
        assert!(registry.get(ProgramId(2)).is_ok());
        assert!(matches!(
            registry.get(ProgramId(3)),
            Err(RenderError::UnregisteredProgram(ProgramId(3)))
        ));
    }

    #[test]
    fn optional_transform_uniforms_are_skipped() {
        let binding = StandardTransformBinding::resolve(&program(4, lit_uniforms())).unwrap();
        assert!(binding.time.is_none());
        assert!(binding.clip_plane.is_none());
    }
}
