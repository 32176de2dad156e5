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

//! The sea floor: procedural sand lit like any opaque surface, with caustics
//! below the water line.

use super::{light_uniforms, transform_uniforms};
use crate::render_lane::shaders::{with_common, SAND_WGSL};
use lagoon_core::renderer::{ProgramDescriptor, ShaderError, ShaderProgram, UniformDecl, UniformKind};
use lagoon_data::{LagoonConfig, Material, MaterialHandle};
use std::sync::Arc;

/// The program of the family.
pub fn descriptor() -> ProgramDescriptor {
    let mut uniforms = transform_uniforms(true);
    uniforms.extend([
        UniformDecl::new("SandColor", UniformKind::Vec4),
        UniformDecl::new("CausticsColor", UniformKind::Vec4),
        UniformDecl::new("TextureScale", UniformKind::Float),
        UniformDecl::new("WaterHeight", UniformKind::Float),
        UniformDecl::new("CausticsIntensity", UniformKind::Float),
        UniformDecl::new("CausticsOffset", UniformKind::Float),
        UniformDecl::new("CausticsScale", UniformKind::Float),
        UniformDecl::new("CausticsSpeed", UniformKind::Float),
        UniformDecl::new("CausticsThickness", UniformKind::Float),
        UniformDecl::new("Shininess", UniformKind::Float),
    ]);
    uniforms.extend(light_uniforms());
    ProgramDescriptor {
        label: "sand".into(),
        source: with_common(SAND_WGSL).into(),
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
        uniforms,
        textures: vec![],
    }
}

/// An opaque sand material configured from `config`.
pub fn material(
    program: &Arc<ShaderProgram>,
    config: &LagoonConfig,
) -> Result<MaterialHandle, ShaderError> {
    let mut material = Material::new("sand", program.clone());
    material.set_uniform_value("Shininess", 8.0_f32)?;
    let handle = MaterialHandle::new(material);
    config.apply_to_sand(&handle)?;
    Ok(handle)
}
