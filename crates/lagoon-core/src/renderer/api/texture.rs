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

//! Texture descriptions.

use crate::math::Extent2D;

/// An opaque handle to a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// Pixel formats understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA, linear.
    Rgba8Unorm,
    /// 8-bit RGBA, sRGB-encoded.
    Rgba8UnormSrgb,
    /// 24-bit depth.
    Depth24Plus,
    /// 32-bit float depth.
    Depth32Float,
}

impl TextureFormat {
    /// `true` for depth formats.
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::Depth24Plus | TextureFormat::Depth32Float)
    }

    /// Bytes per texel for formats that can be uploaded from the CPU.
    pub fn bytes_per_pixel(self) -> Option<u32> {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => Some(4),
            TextureFormat::Depth24Plus | TextureFormat::Depth32Float => None,
        }
    }
}

/// How a texture is viewed when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureViewDimension {
    /// A single 2D image.
    #[default]
    D2,
    /// Six square layers sampled by direction.
    Cube,
}

/// Describes a texture to create.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// Debug label.
    pub label: &'a str,
    /// Size of one layer.
    pub size: Extent2D,
    /// Pixel format.
    pub format: TextureFormat,
    /// `Cube` textures have six layers.
    pub dimension: TextureViewDimension,
    /// Whether shaders may sample the texture.
    pub sampled: bool,
    /// Whether the texture may be attached to a render target.
    pub render_attachment: bool,
}

impl TextureDescriptor<'_> {
    /// Number of array layers implied by the dimension.
    pub fn layer_count(&self) -> u32 {
        match self.dimension {
            TextureViewDimension::D2 => 1,
            TextureViewDimension::Cube => 6,
        }
    }
}
