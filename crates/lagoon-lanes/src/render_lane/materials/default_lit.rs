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

//! Flat-colored Blinn-Phong surfaces.

use super::{light_uniforms, transform_uniforms};
use crate::render_lane::shaders::{with_common, DEFAULT_LIT_WGSL};
use lagoon_core::math::LinearRgba;
use lagoon_core::renderer::{ProgramDescriptor, ShaderError, ShaderProgram, UniformDecl, UniformKind};
use lagoon_data::{Material, MaterialHandle};
use std::sync::Arc;

/// The program of the family.
pub fn descriptor() -> ProgramDescriptor {
    let mut uniforms = transform_uniforms(true);
    uniforms.extend([
        UniformDecl::new("Color", UniformKind::Vec4),
        UniformDecl::new("AmbientColor", UniformKind::Vec4),
        UniformDecl::new("Shininess", UniformKind::Float),
    ]);
    uniforms.extend(light_uniforms());
    ProgramDescriptor {
        label: "default_lit".into(),
        source: with_common(DEFAULT_LIT_WGSL).into(),
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
        uniforms,
        textures: vec![],
    }
}

/// An opaque material of `color`.
pub fn material(
    program: &Arc<ShaderProgram>,
    name: &str,
    color: LinearRgba,
) -> Result<MaterialHandle, ShaderError> {
    let mut material = Material::new(name, program.clone());
    material.set_uniform_value("Color", color)?;
    material.set_uniform_value("AmbientColor", LinearRgba::rgb(0.12, 0.13, 0.16))?;
    material.set_uniform_value("Shininess", 32.0_f32)?;
    Ok(material.into())
}
