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

//! Vertex format and draw commands.

use std::mem;

/// An opaque handle to GPU-resident vertex and index buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// The single vertex layout shared by every Lagoon mesh.
///
/// Locations: `0` position, `1` normal, `2` texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Size of one vertex in bytes.
    pub const STRIDE: u64 = mem::size_of::<Vertex>() as u64;
}

/// How indices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Every three indices form a triangle.
    #[default]
    TriangleList,
    /// Every two indices form a line.
    LineList,
}

/// A single indexed draw submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Drawcall {
    /// The mesh whose buffers are drawn.
    pub mesh: MeshId,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// First index in the index buffer.
    pub first_index: u32,
    /// Number of indices to draw.
    pub index_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 32);
    }
}
