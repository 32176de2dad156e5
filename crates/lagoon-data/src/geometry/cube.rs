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

use super::MeshData;
use lagoon_core::math::Vec3;
use lagoon_core::renderer::Vertex;

/// Builds a unit cube centred on the origin.
///
/// Each face has its own four vertices so normals stay flat; triangles wind
/// counter-clockwise when seen from outside.
pub fn build_cube() -> MeshData {
    // (normal, tangent u, tangent v) per face, with u x v == normal.
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    const CORNERS: [(f32, f32); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in FACES {
        let base = vertices.len() as u32;
        for (s, t) in CORNERS {
            let position = normal * 0.5 + u * (s - 0.5) + v * (t - 0.5);
            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                tex_coord: [s, t],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_four_vertices_per_face() {
        let cube = build_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
    }

    #[test]
    fn triangles_wind_outward() {
        let cube = build_cube();
        for tri in cube.indices.chunks_exact(3) {
            let p = |k: usize| Vec3::from_array(cube.vertices[tri[k] as usize].position);
            let geometric = (p(1) - p(0)).cross(p(2) - p(0)).normalize();
            let declared = Vec3::from_array(cube.vertices[tri[0] as usize].normal);
            assert!(geometric.abs_diff_eq(declared, 1e-5));
            // The face centre lies along the normal, so outward means positive.
            assert!(p(0).dot(declared) > 0.0);
        }
    }

    #[test]
    fn cube_fits_the_unit_box() {
        let cube = build_cube();
        for v in &cube.vertices {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
    }
}
