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

//! The water surface.

use super::{light_uniforms, transform_uniforms};
use crate::render_lane::shaders::{with_common, WATER_WGSL};
use crate::render_lane::{REFLECTION_STRENGTH, REFLECTION_TEXTURE};
use lagoon_core::renderer::{
    BlendState, ProgramDescriptor, ShaderError, ShaderProgram, TextureSlot, TextureViewDimension,
    UniformDecl, UniformKind,
};
use lagoon_data::{LagoonConfig, Material, MaterialHandle};
use std::sync::Arc;

/// The program of the family.
///
/// The water lives in the transparent scene and is never drawn by the
/// reflection pass, so it has no clip plane.
pub fn descriptor() -> ProgramDescriptor {
    let mut uniforms = transform_uniforms(false);
    uniforms.extend([
        UniformDecl::new("TroughColor", UniformKind::Vec4),
        UniformDecl::new("SurfaceColor", UniformKind::Vec4),
        UniformDecl::new("PeakColor", UniformKind::Vec4),
        UniformDecl::new("Opacity", UniformKind::Float),
        UniformDecl::new("TroughThreshold", UniformKind::Float),
        UniformDecl::new("TroughTransition", UniformKind::Float),
        UniformDecl::new("PeakThreshold", UniformKind::Float),
        UniformDecl::new("PeakTransition", UniformKind::Float),
        UniformDecl::new("FresnelPower", UniformKind::Float),
        UniformDecl::new("FresnelStrength", UniformKind::Float),
        UniformDecl::new("ReflectionDistortion", UniformKind::Float),
        UniformDecl::new(REFLECTION_STRENGTH, UniformKind::Float),
        UniformDecl::new("WaveAmplitude", UniformKind::Float),
        UniformDecl::new("WaveFrequency", UniformKind::Float),
        UniformDecl::new("WavePersistence", UniformKind::Float),
        UniformDecl::new("WaveLacunarity", UniformKind::Float),
        UniformDecl::new("WaveOctaves", UniformKind::Int),
        UniformDecl::new("WaveSpeed", UniformKind::Float),
        UniformDecl::new("Shininess", UniformKind::Float),
    ]);
    uniforms.extend(light_uniforms());
    ProgramDescriptor {
        label: "water".into(),
        source: with_common(WATER_WGSL).into(),
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
        uniforms,
        textures: vec![TextureSlot::new(REFLECTION_TEXTURE, TextureViewDimension::D2)],
    }
}

/// A transparent water material configured from `config`.
///
/// The reflection texture is bound by the renderer, see
/// `WaterRenderer::add_reflective_material`.
pub fn material(
    program: &Arc<ShaderProgram>,
    config: &LagoonConfig,
) -> Result<MaterialHandle, ShaderError> {
    let mut material = Material::new("water", program.clone());
    material.set_uniform_value("Shininess", 96.0_f32)?;
    let handle = MaterialHandle::new(material);
    set_transparent(&handle, true);
    config.apply_to_water(&handle)?;
    Ok(handle)
}

/// Switches the water between alpha blending and an opaque surface.
///
/// Models using it move to the other drawcall collection on the next visit.
pub fn set_transparent(material: &MaterialHandle, transparent: bool) {
    let mut material = material.write();
    // Seen from below as well.
    material.set_cull(None);
    if transparent {
        material.set_blend_state(Some(BlendState::ALPHA_BLENDING));
        material.set_depth_write(false);
    } else {
        material.set_blend_state(None);
        material.set_depth_write(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagoon_core::renderer::{ProgramId, UniformValue};

    fn program() -> Arc<ShaderProgram> {
        Arc::new(ShaderProgram::new(ProgramId(1), &descriptor()).unwrap())
    }

    #[test]
    fn water_starts_transparent_without_depth_write() {
        let water = material(&program(), &LagoonConfig::default()).unwrap();
        let water = water.read();
        assert!(water.is_transparent());
        assert!(!water.depth_write());
        assert_eq!(water.cull(), None);
    }

    #[test]
    fn toggling_transparency_restores_depth_write() {
        let water = material(&program(), &LagoonConfig::default()).unwrap();
        set_transparent(&water, false);
        assert!(!water.read().is_transparent());
        assert!(water.read().depth_write());
    }

    #[test]
    fn config_reaches_the_material() {
        let mut config = LagoonConfig::default();
        config.waves.octaves = 3;
        let water = material(&program(), &config).unwrap();
        assert_eq!(water.read().uniform_value("WaveOctaves"), Some(UniformValue::Int(3)));
    }
}
