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

//! Shader programs and their uniform layouts.
//!
//! Every program exposes exactly one uniform block. The block is declared as an
//! ordered list of [`UniformDecl`]s; [`UniformLayout`] assigns offsets to them
//! using the WGSL uniform address space rules, so the WGSL struct written in
//! the same order matches byte for byte.

use crate::renderer::api::texture::TextureViewDimension;
use crate::renderer::error::{ResourceError, ShaderError};
use crate::renderer::traits::GraphicsDevice;
use std::borrow::Cow;

/// Name of the uniform backends override when clip culling is disabled.
pub const CLIP_PLANE_UNIFORM: &str = "ClipPlane";

/// An opaque handle to a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub usize);

/// The type of a uniform block member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// `f32`
    Float,
    /// `i32`
    Int,
    /// `vec2<f32>`
    Vec2,
    /// `vec3<f32>`
    Vec3,
    /// `vec4<f32>`
    Vec4,
    /// `mat4x4<f32>`
    Mat4,
}

impl UniformKind {
    /// Size in bytes.
    pub const fn size(self) -> u32 {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }

    /// Alignment in bytes.
    pub const fn align(self) -> u32 {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 | UniformKind::Mat4 => 16,
        }
    }
}

/// Declares one member of a program's uniform block.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDecl {
    /// Member name, identical to the WGSL struct field.
    pub name: Cow<'static, str>,
    /// Member type.
    pub kind: UniformKind,
    /// Element count for array members.
    pub array_len: Option<u32>,
}

impl UniformDecl {
    /// A single-valued member.
    pub const fn new(name: &'static str, kind: UniformKind) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind,
            array_len: None,
        }
    }

    /// An array member of `len` elements.
    pub const fn array(name: &'static str, kind: UniformKind, len: u32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind,
            array_len: Some(len),
        }
    }
}

/// Where a uniform value lives inside the program's block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    /// Byte offset in the block.
    pub offset: u32,
    /// Expected value type.
    pub kind: UniformKind,
}

#[derive(Debug, Clone, PartialEq)]
struct LayoutEntry {
    name: Cow<'static, str>,
    kind: UniformKind,
    offset: u32,
    array_len: Option<u32>,
    stride: u32,
}

/// Byte layout of a uniform block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UniformLayout {
    entries: Vec<LayoutEntry>,
    size: u32,
}

const fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

impl UniformLayout {
    /// Lays out `decls` in order.
    ///
    /// Arrays must use 16-byte strided element types (`vec4`, `mat4`), and
    /// names must be unique. The block size is rounded up to 16 bytes.
    pub fn new(decls: &[UniformDecl]) -> Result<Self, ShaderError> {
        let mut entries: Vec<LayoutEntry> = Vec::with_capacity(decls.len());
        let mut cursor = 0u32;

        for decl in decls {
            if entries.iter().any(|e| e.name == decl.name) {
                return Err(ShaderError::DuplicateUniform(decl.name.to_string()));
            }

            let (align, stride, total) = match decl.array_len {
                None => (decl.kind.align(), decl.kind.size(), decl.kind.size()),
                Some(len) => {
                    if decl.kind.size() % 16 != 0 {
                        return Err(ShaderError::UnsupportedArray {
                            name: decl.name.to_string(),
                            kind: decl.kind,
                        });
                    }
                    (16, decl.kind.size(), decl.kind.size() * len)
                }
            };

            let offset = round_up(cursor, align);
            entries.push(LayoutEntry {
                name: decl.name.clone(),
                kind: decl.kind,
                offset,
                array_len: decl.array_len,
                stride,
            });
            cursor = offset + total;
        }

        Ok(Self {
            entries,
            size: round_up(cursor.max(16), 16),
        })
    }

    /// Total block size in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// `true` if a member named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// The location of a member, or of the first element for arrays.
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.element(name, 0)
    }

    /// The location of element `index` of an array member.
    ///
    /// Index `0` of a non-array member is the member itself.
    pub fn element(&self, name: &str, index: u32) -> Option<UniformLocation> {
        let entry = self.entries.iter().find(|e| e.name == name)?;
        if index >= entry.array_len.unwrap_or(1) {
            return None;
        }
        Some(UniformLocation {
            offset: entry.offset + index * entry.stride,
            kind: entry.kind,
        })
    }

    /// Element count of a member; `1` for non-arrays.
    pub fn len_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.array_len.unwrap_or(1))
    }
}

/// A texture binding declared by a program.
///
/// Slot `i` of [`ProgramDescriptor::textures`] is bound at `@group(1) @binding(i + 1)`;
/// binding `0` of that group is the shared sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlot {
    /// The name materials use to assign a texture to this slot.
    pub name: Cow<'static, str>,
    /// The view dimension the shader samples.
    pub dimension: TextureViewDimension,
}

impl TextureSlot {
    /// Declares a slot.
    pub const fn new(name: &'static str, dimension: TextureViewDimension) -> Self {
        Self {
            name: Cow::Borrowed(name),
            dimension,
        }
    }
}

/// Everything a backend needs to build a program.
#[derive(Debug, Clone)]
pub struct ProgramDescriptor {
    /// Debug label.
    pub label: Cow<'static, str>,
    /// WGSL source.
    pub source: Cow<'static, str>,
    /// Vertex entry point.
    pub vertex_entry: &'static str,
    /// Fragment entry point.
    pub fragment_entry: &'static str,
    /// Members of the uniform block, in WGSL declaration order.
    pub uniforms: Vec<UniformDecl>,
    /// Texture slots, in binding order.
    pub textures: Vec<TextureSlot>,
}

/// A compiled program together with its reflected layout.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    id: ProgramId,
    label: String,
    layout: UniformLayout,
    textures: Vec<TextureSlot>,
}

impl ShaderProgram {
    /// Validates the layout of `descriptor` and asks `device` to compile it.
    ///
    /// Any failure is a setup error; nothing is deferred to draw time.
    pub fn build(
        device: &dyn GraphicsDevice,
        descriptor: &ProgramDescriptor,
    ) -> Result<Self, ResourceError> {
        let layout = UniformLayout::new(&descriptor.uniforms)?;
        let id = device.create_program(descriptor, &layout)?;
        log::debug!(
            "Built program '{}' as {:?} ({} uniform bytes, {} texture slots)",
            descriptor.label,
            id,
            layout.size(),
            descriptor.textures.len()
        );
        Ok(Self::with_layout(id, descriptor, layout))
    }

    /// Wraps a program the backend already compiled under `id`.
    pub fn new(id: ProgramId, descriptor: &ProgramDescriptor) -> Result<Self, ShaderError> {
        let layout = UniformLayout::new(&descriptor.uniforms)?;
        Ok(Self::with_layout(id, descriptor, layout))
    }

    fn with_layout(id: ProgramId, descriptor: &ProgramDescriptor, layout: UniformLayout) -> Self {
        Self {
            id,
            label: descriptor.label.to_string(),
            layout,
            textures: descriptor.textures.clone(),
        }
    }

    /// The backend handle.
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The uniform block layout.
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// The declared texture slots.
    pub fn textures(&self) -> &[TextureSlot] {
        &self.textures
    }

    /// The slot index of the texture named `name`.
    pub fn texture_slot(&self, name: &str) -> Option<u32> {
        self.textures
            .iter()
            .position(|t| t.name == name)
            .map(|i| i as u32)
    }

    /// Resolves a uniform location, failing if the program lacks it.
    pub fn uniform(&self, name: &str) -> Result<UniformLocation, ShaderError> {
        self.layout
            .location(name)
            .ok_or_else(|| ShaderError::MissingUniform {
                program: self.label.clone(),
                name: name.to_string(),
            })
    }

    /// Resolves every element location of an array uniform.
    pub fn uniform_array(&self, name: &str) -> Result<Vec<UniformLocation>, ShaderError> {
        let len = self
            .layout
            .len_of(name)
            .ok_or_else(|| ShaderError::MissingUniform {
                program: self.label.clone(),
                name: name.to_string(),
            })?;
        Ok((0..len)
            .filter_map(|i| self.layout.element(name, i))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_pack_after_vec3() {
        let layout = UniformLayout::new(&[
            UniformDecl::new("CameraPosition", UniformKind::Vec3),
            UniformDecl::new("Time", UniformKind::Float),
            UniformDecl::new("WorldMatrix", UniformKind::Mat4),
        ])
        .unwrap();

        assert_eq!(layout.location("CameraPosition").unwrap().offset, 0);
        assert_eq!(layout.location("Time").unwrap().offset, 12);
        assert_eq!(layout.location("WorldMatrix").unwrap().offset, 16);
        assert_eq!(layout.size(), 80);
    }

    #[test]
    fn vec2_is_eight_byte_aligned() {
        let layout = UniformLayout::new(&[
            UniformDecl::new("A", UniformKind::Float),
            UniformDecl::new("B", UniformKind::Vec2),
            UniformDecl::new("C", UniformKind::Int),
        ])
        .unwrap();

        assert_eq!(layout.location("B").unwrap().offset, 8);
        assert_eq!(layout.location("C").unwrap().offset, 16);
        assert_eq!(layout.size(), 32);
    }

    #[test]
    fn arrays_use_sixteen_byte_stride() {
        let layout = UniformLayout::new(&[
            UniformDecl::new("LightCount", UniformKind::Int),
            UniformDecl::array("LightColor", UniformKind::Vec4, 4),
            UniformDecl::new("LightIndirect", UniformKind::Float),
        ])
        .unwrap();

        assert_eq!(layout.location("LightColor").unwrap().offset, 16);
        assert_eq!(layout.element("LightColor", 3).unwrap().offset, 64);
        assert!(layout.element("LightColor", 4).is_none());
        assert_eq!(layout.location("LightIndirect").unwrap().offset, 80);
        assert_eq!(layout.len_of("LightColor"), Some(4));
        assert_eq!(layout.size(), 96);
    }

    #[test]
    fn scalar_arrays_are_rejected() {
        let err = UniformLayout::new(&[UniformDecl::array("Bad", UniformKind::Float, 4)])
            .unwrap_err();
        assert!(matches!(err, ShaderError::UnsupportedArray { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = UniformLayout::new(&[
            UniformDecl::new("Color", UniformKind::Vec3),
            UniformDecl::new("Color", UniformKind::Vec4),
        ])
        .unwrap_err();
        assert_eq!(err, ShaderError::DuplicateUniform("Color".to_string()));
    }

    #[test]
    fn empty_block_still_has_a_minimum_size() {
        assert_eq!(UniformLayout::new(&[]).unwrap().size(), 16);
    }
}
