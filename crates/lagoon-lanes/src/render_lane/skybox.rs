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

use super::DrawcallInfo;
use lagoon_core::math::Mat4;
use lagoon_data::Model;

/// The sky, drawn after opaque geometry and before transparent geometry.
///
/// It is not part of either scene: both passes draw it explicitly so it is
/// captured by the reflection as well.
#[derive(Debug, Clone)]
pub struct Skybox {
    drawcalls: Vec<DrawcallInfo>,
}

impl Skybox {
    /// Wraps a model, usually the unit cube with the skybox material.
    pub fn new(model: &Model) -> Self {
        let drawcalls = model
            .submeshes()
            .map(|(drawcall, material)| DrawcallInfo {
                material: material.clone(),
                drawcall: *drawcall,
                world_matrix: Mat4::IDENTITY,
            })
            .collect();
        Self { drawcalls }
    }

    /// The drawcalls, in submesh order.
    pub fn drawcalls(&self) -> &[DrawcallInfo] {
        &self.drawcalls
    }
}
