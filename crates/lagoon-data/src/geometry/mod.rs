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

//! Procedural mesh builders and GPU mesh handles.

mod cube;
mod grid;

pub use self::cube::build_cube;
pub use self::grid::{build_grid, build_height_grid};

use lagoon_core::renderer::{
    Drawcall, GraphicsDevice, MeshId, PrimitiveTopology, ResourceError, Vertex,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the mesh builders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A grid needs at least two vertices along each axis.
    #[error("a grid needs at least 2x2 vertices, got {columns}x{rows}")]
    DegenerateGrid {
        /// Requested vertex count along X.
        columns: u32,
        /// Requested vertex count along Z.
        rows: u32,
    },
}

/// Vertices and triangle-list indices built on the CPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex buffer contents.
    pub vertices: Vec<Vertex>,
    /// Index buffer contents, three per triangle.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Uploads the data and wraps it in a single-submesh [`Mesh`].
    pub fn upload(
        &self,
        device: &dyn GraphicsDevice,
        label: &str,
    ) -> Result<Arc<Mesh>, ResourceError> {
        let id = device.create_mesh(label, &self.vertices, &self.indices)?;
        log::debug!(
            "Uploaded mesh '{label}' as {id:?}: {} vertices, {} indices",
            self.vertex_count(),
            self.index_count()
        );
        Ok(Arc::new(Mesh::single(id, self.indices.len() as u32)))
    }
}

/// A GPU mesh and the drawcalls of its submeshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    id: MeshId,
    submeshes: Vec<Drawcall>,
}

impl Mesh {
    /// Wraps an uploaded mesh with explicit submesh ranges.
    pub fn new(id: MeshId, submeshes: Vec<Drawcall>) -> Self {
        Self { id, submeshes }
    }

    /// A mesh drawn as a single triangle list of `index_count` indices.
    pub fn single(id: MeshId, index_count: u32) -> Self {
        Self::new(
            id,
            vec![Drawcall {
                mesh: id,
                topology: PrimitiveTopology::TriangleList,
                first_index: 0,
                index_count,
            }],
        )
    }

    /// The backend handle.
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// The submesh drawcalls in order.
    pub fn submeshes(&self) -> &[Drawcall] {
        &self.submeshes
    }
}
