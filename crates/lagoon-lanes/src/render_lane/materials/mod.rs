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

//! The built-in material families.
//!
//! A family is a program (WGSL source plus uniform declarations), the bindings
//! it is registered with, and constructors for its materials.

pub mod default_lit;
pub mod sand;
pub mod skybox;
pub mod water;

use super::{DefaultLightBinding, LaneError, MaterialRegistry, NoLights, StandardTransformBinding};
use lagoon_core::renderer::{GraphicsDevice, ShaderProgram, UniformDecl, UniformKind};
use std::sync::Arc;

/// Lights shaded per draw by the lit families.
pub const LIGHT_CAPACITY: u32 = 4;

/// The uniforms written by [`StandardTransformBinding`], in block order.
fn transform_uniforms(clip_plane: bool) -> Vec<UniformDecl> {
    let mut uniforms = vec![
        UniformDecl::new("WorldMatrix", UniformKind::Mat4),
        UniformDecl::new("ViewProjection", UniformKind::Mat4),
        UniformDecl::new("CameraPosition", UniformKind::Vec3),
        UniformDecl::new("Time", UniformKind::Float),
    ];
    if clip_plane {
        uniforms.push(UniformDecl::new("ClipPlane", UniformKind::Vec4));
    }
    uniforms
}

/// The uniforms written by [`DefaultLightBinding`], in block order.
fn light_uniforms() -> [UniformDecl; 6] {
    [
        UniformDecl::new("LightCount", UniformKind::Int),
        UniformDecl::new("LightIndirect", UniformKind::Int),
        UniformDecl::array("LightColor", UniformKind::Vec4, LIGHT_CAPACITY),
        UniformDecl::array("LightPosition", UniformKind::Vec4, LIGHT_CAPACITY),
        UniformDecl::array("LightDirection", UniformKind::Vec4, LIGHT_CAPACITY),
        UniformDecl::array("LightAttenuation", UniformKind::Vec4, LIGHT_CAPACITY),
    ]
}

/// The compiled programs of every family, registered with their bindings.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    /// See [`default_lit`].
    pub default_lit: Arc<ShaderProgram>,
    /// See [`water`].
    pub water: Arc<ShaderProgram>,
    /// See [`sand`].
    pub sand: Arc<ShaderProgram>,
    /// See [`skybox`].
    pub skybox: Arc<ShaderProgram>,
}

impl MaterialLibrary {
    /// Compiles every family on `device` and registers it in `registry`.
    ///
    /// # Errors
    /// Any compilation or registration failure; nothing is deferred to draw time.
    pub fn build(
        device: &dyn GraphicsDevice,
        registry: &mut MaterialRegistry,
    ) -> Result<Self, LaneError> {
        let default_lit = Arc::new(ShaderProgram::build(device, &default_lit::descriptor())?);
        registry.register::<StandardTransformBinding, DefaultLightBinding>(default_lit.clone())?;

        let water = Arc::new(ShaderProgram::build(device, &water::descriptor())?);
        registry.register::<StandardTransformBinding, DefaultLightBinding>(water.clone())?;

        let sand = Arc::new(ShaderProgram::build(device, &sand::descriptor())?);
        registry.register::<StandardTransformBinding, DefaultLightBinding>(sand.clone())?;

        let skybox = Arc::new(ShaderProgram::build(device, &skybox::descriptor())?);
        registry.register::<skybox::SkyTransformBinding, NoLights>(skybox.clone())?;

        log::info!("Built {} material programs", registry.len());
        Ok(Self {
            default_lit,
            water,
            sand,
            skybox,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagoon_core::renderer::ProgramDescriptor;

    fn snake_case(name: &str) -> String {
        let mut out = String::new();
        for (i, c) in name.chars().enumerate() {
            if c.is_ascii_uppercase() {
                if i > 0 {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    fn wgsl_block_fields(source: &str) -> Vec<String> {
        let start = source.find("struct Uniforms {").unwrap();
        let body = &source[start..];
        let end = body.find("};").unwrap();
        body[..end]
            .lines()
            .skip(1)
            .filter_map(|line| line.trim().split_once(':'))
            .map(|(name, _)| name.trim().to_string())
            .collect()
    }

    fn assert_block_matches(descriptor: ProgramDescriptor) {
        let declared: Vec<String> = descriptor
            .uniforms
            .iter()
            .map(|u| snake_case(&u.name))
            .collect();
        assert_eq!(
            declared,
            wgsl_block_fields(&descriptor.source),
            "uniform block of '{}' is out of sync with its WGSL",
            descriptor.label
        );
    }

    #[test]
    fn declarations_follow_wgsl_blocks() {
        assert_block_matches(default_lit::descriptor());
        assert_block_matches(water::descriptor());
        assert_block_matches(sand::descriptor());
        assert_block_matches(skybox::descriptor());
    }

    #[test]
    fn lit_families_resolve_their_bindings() {
        use crate::render_lane::{LightBinding, ResolveBinding};
        use lagoon_core::renderer::ProgramId;

        for descriptor in [
            default_lit::descriptor(),
            water::descriptor(),
            sand::descriptor(),
        ] {
            let program = ShaderProgram::new(ProgramId(0), &descriptor).unwrap();
            StandardTransformBinding::resolve(&program).unwrap();
            let lights = DefaultLightBinding::resolve(&program).unwrap();
            assert_eq!(lights.capacity(), LIGHT_CAPACITY as usize);
        }
    }
}
