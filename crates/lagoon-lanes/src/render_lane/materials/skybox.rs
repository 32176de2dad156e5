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

//! A procedural gradient sky.
//!
//! Drawn with the unit cube around the camera: the translation is stripped
//! from the view and the vertex shader pins depth to the far plane, so the
//! material compares with `LessEqual` and never writes depth.

use crate::render_lane::shaders::{with_common, SKYBOX_WGSL};
use crate::render_lane::{ResolveBinding, TransformBinding, ViewContext};
use lagoon_core::math::{LinearRgba, Mat3, Mat4, Vec3};
use lagoon_core::renderer::{
    CompareFunction, ProgramDescriptor, RenderPass, ShaderError, ShaderProgram, UniformDecl,
    UniformKind, UniformLocation, UniformValue,
};
use lagoon_data::{Material, MaterialHandle};
use std::sync::Arc;

/// Writes the rotation-only view-projection of the sky.
#[derive(Debug, Clone, Copy)]
pub struct SkyTransformBinding {
    view_projection: UniformLocation,
}

impl ResolveBinding for SkyTransformBinding {
    fn resolve(program: &ShaderProgram) -> Result<Self, ShaderError> {
        Ok(Self {
            view_projection: program.uniform("ViewProjection")?,
        })
    }
}

impl TransformBinding for SkyTransformBinding {
    fn apply(
        &self,
        pass: &mut dyn RenderPass,
        _world: &Mat4,
        view: &ViewContext<'_>,
        camera_changed: bool,
    ) {
        if camera_changed {
            let rotation = Mat4::from_mat3(Mat3::from_mat4(view.camera.view));
            pass.set_uniform(
                self.view_projection,
                &UniformValue::Mat4(view.camera.projection * rotation),
            );
        }
    }
}

/// The program of the family.
pub fn descriptor() -> ProgramDescriptor {
    ProgramDescriptor {
        label: "skybox".into(),
        source: with_common(SKYBOX_WGSL).into(),
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
        uniforms: vec![
            UniformDecl::new("ViewProjection", UniformKind::Mat4),
            UniformDecl::new("HorizonColor", UniformKind::Vec4),
            UniformDecl::new("ZenithColor", UniformKind::Vec4),
            UniformDecl::new("GroundColor", UniformKind::Vec4),
            UniformDecl::new("SunDirection", UniformKind::Vec3),
            UniformDecl::new("SunSize", UniformKind::Float),
        ],
        textures: vec![],
    }
}

/// A daylight sky with the sun shining along `sun_direction`.
pub fn material(
    program: &Arc<ShaderProgram>,
    sun_direction: Vec3,
) -> Result<MaterialHandle, ShaderError> {
    let mut material = Material::new("skybox", program.clone());
    material.set_uniform_value("HorizonColor", LinearRgba::rgb(0.62, 0.74, 0.86))?;
    material.set_uniform_value("ZenithColor", LinearRgba::rgb(0.12, 0.32, 0.65))?;
    material.set_uniform_value("GroundColor", LinearRgba::rgb(0.05, 0.08, 0.1))?;
    material.set_uniform_value("SunDirection", sun_direction.normalize_or_zero())?;
    material.set_uniform_value("SunSize", 0.002_f32)?;
    material.set_depth_write(false);
    material.set_depth_compare(CompareFunction::LessEqual);
    material.set_cull(None);
    Ok(material.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagoon_core::renderer::{CameraView, ProgramId};

    #[test]
    fn sky_is_unlit_background() {
        let program = Arc::new(ShaderProgram::new(ProgramId(3), &descriptor()).unwrap());
        let sky = material(&program, Vec3::NEG_Y).unwrap();
        let sky = sky.read();
        assert!(!sky.is_transparent());
        assert!(!sky.depth_write());
        assert_eq!(sky.depth_compare(), CompareFunction::LessEqual);
    }

    #[test]
    fn view_translation_is_ignored() {
        let near = CameraView::look_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, Mat4::IDENTITY);
        let far = CameraView::look_at(
            Vec3::new(50.0, 3.0, 9.0),
            Vec3::new(50.0, 3.0, 8.0),
            Vec3::Y,
            Mat4::IDENTITY,
        );
        let strip = |c: &CameraView| Mat4::from_mat3(Mat3::from_mat4(c.view));
        assert!(strip(&near).abs_diff_eq(strip(&far), 1e-6));
    }
}
