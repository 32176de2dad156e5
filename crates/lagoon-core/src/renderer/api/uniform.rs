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

//! Values written into uniform blocks.

use crate::math::{LinearRgba, Mat4, Vec2, Vec3, Vec4};
use crate::renderer::api::shader::UniformKind;
use crate::renderer::api::texture::TextureId;

/// A value a material or binding assigns to a uniform.
///
/// `Texture` is not part of the uniform block; it targets a texture slot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Texture(TextureId),
}

impl UniformValue {
    /// The block type this value fits, `None` for textures.
    pub fn kind(&self) -> Option<UniformKind> {
        match self {
            UniformValue::Float(_) => Some(UniformKind::Float),
            UniformValue::Int(_) => Some(UniformKind::Int),
            UniformValue::Vec2(_) => Some(UniformKind::Vec2),
            UniformValue::Vec3(_) => Some(UniformKind::Vec3),
            UniformValue::Vec4(_) => Some(UniformKind::Vec4),
            UniformValue::Mat4(_) => Some(UniformKind::Mat4),
            UniformValue::Texture(_) => None,
        }
    }

    /// Copies the value's bytes to the start of `dst`.
    ///
    /// Returns the number of bytes written; textures write nothing.
    pub fn write_bytes(&self, dst: &mut [u8]) -> usize {
        let bytes: &[u8] = match self {
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::Vec2(v) => bytemuck::bytes_of(v),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v),
            UniformValue::Vec4(v) => bytemuck::bytes_of(v),
            UniformValue::Mat4(v) => bytemuck::bytes_of(v),
            UniformValue::Texture(_) => &[],
        };
        let len = bytes.len().min(dst.len());
        dst[..len].copy_from_slice(&bytes[..len]);
        len
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

impl From<LinearRgba> for UniformValue {
    fn from(c: LinearRgba) -> Self {
        UniformValue::Vec4(c.to_vec4())
    }
}

impl From<TextureId> for UniformValue {
    fn from(id: TextureId) -> Self {
        UniformValue::Texture(id)
    }
}
