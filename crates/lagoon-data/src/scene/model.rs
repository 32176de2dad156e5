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

use super::SceneError;
use crate::geometry::Mesh;
use crate::material::MaterialHandle;
use lagoon_core::renderer::Drawcall;
use std::sync::Arc;

/// A mesh drawn with one or more materials.
///
/// Submesh `i` uses material `i`; submeshes past the last material reuse it.
#[derive(Debug, Clone)]
pub struct Model {
    mesh: Arc<Mesh>,
    materials: Vec<MaterialHandle>,
}

impl Model {
    /// Creates a model.
    ///
    /// # Errors
    /// [`SceneError::ModelWithoutMaterial`] if `materials` is empty.
    pub fn new(mesh: Arc<Mesh>, materials: Vec<MaterialHandle>) -> Result<Self, SceneError> {
        if materials.is_empty() {
            return Err(SceneError::ModelWithoutMaterial(mesh.id()));
        }
        Ok(Self { mesh, materials })
    }

    /// A model drawing every submesh with `material`.
    pub fn with_material(mesh: Arc<Mesh>, material: MaterialHandle) -> Self {
        Self {
            mesh,
            materials: vec![material],
        }
    }

    /// The shared mesh.
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// The materials, in submesh order.
    pub fn materials(&self) -> &[MaterialHandle] {
        &self.materials
    }

    /// Each submesh drawcall with the material it is drawn with.
    pub fn submeshes(&self) -> impl Iterator<Item = (&Drawcall, &MaterialHandle)> {
        let last = self.materials.len() - 1;
        self.mesh
            .submeshes()
            .iter()
            .enumerate()
            .map(move |(i, drawcall)| (drawcall, &self.materials[i.min(last)]))
    }

    /// `true` if any material of the model blends.
    pub fn is_transparent(&self) -> bool {
        self.materials.iter().any(|m| m.read().is_transparent())
    }
}
