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

use super::{GeometryError, MeshData};
use lagoon_core::math::Vec3;
use lagoon_core::renderer::Vertex;

/// Builds a flat grid of `columns * rows` vertices over the unit square of the
/// XZ plane, centred on the origin.
///
/// Normals point up. Texture coordinates are the integer grid indices, so a
/// texture repeats once per cell unless the shader scales them.
///
/// # Errors
/// [`GeometryError::DegenerateGrid`] if either dimension is below 2.
pub fn build_grid(columns: u32, rows: u32) -> Result<MeshData, GeometryError> {
    build_height_grid(columns, rows, |_, _| 0.0)
}

/// Builds the grid of [`build_grid`] with every vertex raised to `height(x, z)`.
///
/// `x` and `z` are the unit-square coordinates in `[-0.5, 0.5]`. Normals are
/// derived from the neighbouring heights by central differences, one-sided on
/// the borders.
pub fn build_height_grid<F>(columns: u32, rows: u32, height: F) -> Result<MeshData, GeometryError>
where
    F: Fn(f32, f32) -> f32,
{
    if columns < 2 || rows < 2 {
        return Err(GeometryError::DegenerateGrid { columns, rows });
    }

    let cols = columns as usize;
    let rows_n = rows as usize;

    let mut positions = Vec::with_capacity(cols * rows_n);
    for j in 0..rows_n {
        for i in 0..cols {
            let x = i as f32 / (cols - 1) as f32 - 0.5;
            let z = j as f32 / (rows_n - 1) as f32 - 0.5;
            positions.push(Vec3::new(x, height(x, z), z));
        }
    }

    let mut vertices = Vec::with_capacity(positions.len());
    for j in 0..rows_n {
        for i in 0..cols {
            let index = j * cols + i;
            let prev_x = if i > 0 { index - 1 } else { index };
            let next_x = if i + 1 < cols { index + 1 } else { index };
            let prev_z = if j > 0 { index - cols } else { index };
            let next_z = if j + 1 < rows_n { index + cols } else { index };

            let slope_x = (positions[next_x].y - positions[prev_x].y)
                / (positions[next_x].x - positions[prev_x].x);
            let slope_z = (positions[next_z].y - positions[prev_z].y)
                / (positions[next_z].z - positions[prev_z].z);
            let normal = Vec3::new(-slope_x, 1.0, -slope_z).normalize();

            vertices.push(Vertex {
                position: positions[index].to_array(),
                normal: normal.to_array(),
                tex_coord: [i as f32, j as f32],
            });
        }
    }

    let mut indices = Vec::with_capacity(6 * (cols - 1) * (rows_n - 1));
    for j in 1..rows {
        for i in 1..columns {
            let top_right = j * columns + i;
            let top_left = top_right - 1;
            let bottom_right = top_right - columns;
            let bottom_left = bottom_right - 1;

            indices.extend_from_slice(&[top_left, bottom_right, bottom_left]);
            indices.extend_from_slice(&[bottom_right, top_left, top_right]);
        }
    }

    Ok(MeshData { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_normal(mesh: &MeshData, tri: &[u32]) -> Vec3 {
        let p = |k: usize| Vec3::from_array(mesh.vertices[tri[k] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0)).normalize()
    }

    #[test]
    fn counts_match_dimensions() {
        for (columns, rows) in [(2, 2), (3, 5), (17, 4), (128, 128)] {
            let mesh = build_grid(columns, rows).unwrap();
            assert_eq!(mesh.vertex_count(), (columns * rows) as usize);
            assert_eq!(
                mesh.index_count(),
                (6 * (columns - 1) * (rows - 1)) as usize
            );
            let vertex_count = mesh.vertex_count() as u32;
            assert!(mesh.indices.iter().all(|&i| i < vertex_count));
        }
    }

    #[test]
    fn every_triangle_faces_up() {
        let mesh = build_grid(6, 4).unwrap();
        for tri in mesh.indices.chunks_exact(3) {
            let normal = triangle_normal(&mesh, tri);
            assert!(normal.abs_diff_eq(Vec3::Y, 1e-5), "triangle {tri:?} has normal {normal}");
        }
    }

    #[test]
    fn first_quad_uses_documented_indices() {
        let mesh = build_grid(3, 2).unwrap();
        // top_right = 1*3 + 1 = 4
        assert_eq!(&mesh.indices[..6], &[3, 1, 0, 1, 3, 4]);
    }

    #[test]
    fn grid_spans_unit_square_with_integer_uvs() {
        let mesh = build_grid(5, 3).unwrap();
        let first = mesh.vertices[0];
        let last = mesh.vertices[mesh.vertex_count() - 1];
        assert_eq!(first.position, [-0.5, 0.0, -0.5]);
        assert_eq!(last.position, [0.5, 0.0, 0.5]);
        assert_eq!(first.tex_coord, [0.0, 0.0]);
        assert_eq!(last.tex_coord, [4.0, 2.0]);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn degenerate_dimensions_are_rejected() {
        assert_eq!(
            build_grid(1, 8).unwrap_err(),
            GeometryError::DegenerateGrid { columns: 1, rows: 8 }
        );
        assert!(build_grid(4, 0).is_err());
    }

    #[test]
    fn height_grid_normals_follow_slope() {
        let mesh = build_height_grid(4, 4, |x, _| x).unwrap();
        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert_relative_eq!(n.x, expected.x, epsilon = 1e-5);
            assert_relative_eq!(n.y, expected.y, epsilon = 1e-5);
            assert_relative_eq!(n.z, 0.0, epsilon = 1e-5);
            assert_relative_eq!(v.position[1], v.position[0]);
        }
    }
}
