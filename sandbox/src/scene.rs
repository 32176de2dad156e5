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

//! Builds the lagoon: the opaque scene above and below the water, the water
//! itself, and the sky.

use anyhow::Context;
use lagoon_core::math::{LinearRgba, Vec3};
use lagoon_core::renderer::{DirectionalLight, GraphicsDevice, LightKind, PointLight};
use lagoon_data::config::GridConfig;
use lagoon_data::geometry::{build_cube, build_grid, build_height_grid};
use lagoon_data::{
    Camera, LagoonConfig, MaterialHandle, Mesh, Model, NodeId, NodeKind, Scene, SceneNode,
    Transform,
};
use lagoon_lanes::materials::{default_lit, sand, skybox, water, MaterialLibrary};
use lagoon_lanes::Skybox;
use std::sync::Arc;

/// Where the camera starts.
pub const EYE: Vec3 = Vec3::new(0.0, 4.0, 12.0);

/// The scenes and the handles the sandbox edits while running.
#[derive(Debug)]
pub struct LagoonScene {
    /// Camera, lights, crates and sand.
    pub opaque: Scene,
    /// The water surface.
    pub transparent: Scene,
    /// The camera node in the opaque scene.
    pub camera: NodeId,
    /// The sand node in the opaque scene.
    pub sea_floor_node: NodeId,
    /// The water node in the transparent scene.
    pub water_node: NodeId,
    /// The water material, shared with the renderer for reflections.
    pub water: MaterialHandle,
    /// The sand material.
    pub sand: MaterialHandle,
    /// The sky.
    pub skybox: Skybox,
    shape: TerrainShape,
}

/// The settings baked into the sand and water meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TerrainShape {
    grid: GridConfig,
    sand_height: f32,
    dune_height: f32,
    world_scale: f32,
}

impl TerrainShape {
    fn of(config: &LagoonConfig) -> Self {
        Self {
            grid: config.grid,
            sand_height: config.sand.height,
            dune_height: config.sand.dune_height,
            world_scale: config.world_scale,
        }
    }
}

impl LagoonScene {
    /// Pushes a reloaded configuration into the materials and the terrain.
    ///
    /// The sand and water meshes are rebuilt when the grid, the sand heights
    /// or the world scale changed.
    pub fn apply_config(
        &mut self,
        device: &dyn GraphicsDevice,
        config: &LagoonConfig,
    ) -> anyhow::Result<()> {
        config.apply_to_water(&self.water)?;
        config.apply_to_sand(&self.sand)?;

        let shape = TerrainShape::of(config);
        if shape != self.shape {
            let (sea_floor, surface) = upload_terrain(device, config)?;
            let old_floor = swap_mesh(&mut self.opaque, self.sea_floor_node, sea_floor)?;
            let old_surface = swap_mesh(&mut self.transparent, self.water_node, surface)?;
            device.destroy_mesh(old_floor.id())?;
            device.destroy_mesh(old_surface.id())?;
            log::info!(
                "Terrain rebuilt: {}x{} grid, world scale {}",
                config.grid.columns,
                config.grid.rows,
                config.world_scale
            );
            self.shape = shape;
        }

        if let Some(node) = self.opaque.node_mut(self.sea_floor_node) {
            node.transform = sea_floor_transform(config);
        }
        if let Some(node) = self.transparent.node_mut(self.water_node) {
            node.transform = water_transform(config);
        }
        Ok(())
    }
}

/// Replaces the mesh of the model at `id`, returning the previous one.
fn swap_mesh(scene: &mut Scene, id: NodeId, mesh: Arc<Mesh>) -> anyhow::Result<Arc<Mesh>> {
    let scene_name = scene.name().to_owned();
    let node = scene
        .node_mut(id)
        .with_context(|| format!("node {id:?} is missing from '{scene_name}'"))?;
    let NodeKind::Model(model) = &node.kind else {
        anyhow::bail!("node '{}' is not a model", node.name);
    };
    let old = model.mesh().clone();
    node.kind = NodeKind::Model(Model::new(mesh, model.materials().to_vec())?);
    Ok(old)
}

fn sea_floor_transform(config: &LagoonConfig) -> Transform {
    Transform::IDENTITY.with_scale(Vec3::splat(config.world_scale))
}

fn water_transform(config: &LagoonConfig) -> Transform {
    Transform::from_translation(Vec3::new(0.0, config.water.height, 0.0)).with_scale(Vec3::new(
        config.world_scale,
        1.0,
        config.world_scale,
    ))
}

/// Builds and uploads the sand and water grids.
fn upload_terrain(
    device: &dyn GraphicsDevice,
    config: &LagoonConfig,
) -> anyhow::Result<(Arc<Mesh>, Arc<Mesh>)> {
    let grid = config.grid;
    let sea_floor = build_height_grid(grid.columns, grid.rows, |x, z| dunes(config, x, z))?
        .upload(device, "sand")
        .context("uploading the sea floor")?;
    let surface = build_grid(grid.columns, grid.rows)?
        .upload(device, "water")
        .context("uploading the water surface")?;
    Ok((sea_floor, surface))
}

/// Sand height at unit-grid coordinates, before scaling to world units.
fn dunes(config: &LagoonConfig, x: f32, z: f32) -> f32 {
    let scale = config.world_scale;
    let (wx, wz) = (x * scale, z * scale);
    let ripple = (wx * 0.35).sin() * (wz * 0.27).cos() + 0.5 * (wx * 0.11 + wz * 0.19).sin();
    (config.sand.height + config.sand.dune_height * ripple) / scale
}

/// Uploads every mesh and assembles both scenes.
pub fn build(
    device: &dyn GraphicsDevice,
    library: &MaterialLibrary,
    config: &LagoonConfig,
) -> anyhow::Result<LagoonScene> {
    let cube = build_cube()
        .upload(device, "cube")
        .context("uploading the cube")?;
    let (sea_floor, surface) = upload_terrain(device, config)?;

    let mut opaque = Scene::new("opaque");
    let camera = opaque.add_node(SceneNode::camera(
        "eye",
        Transform::looking_at(EYE, Vec3::ZERO, Vec3::Y),
        Camera::new_perspective(1.0, 0.1, 200.0),
    ));

    let sun = Transform::looking_at(Vec3::new(6.0, 12.0, 4.0), Vec3::ZERO, Vec3::Y);
    opaque.add_node(SceneNode::light(
        "sun",
        sun,
        LightKind::Directional(DirectionalLight {
            color: LinearRgba::rgb(1.0, 0.95, 0.85),
            intensity: 1.1,
        }),
    ));
    let lamps = [
        (Vec3::new(-4.0, 2.5, 2.0), LinearRgba::rgb(1.0, 0.6, 0.3)),
        (Vec3::new(4.0, 2.0, -3.0), LinearRgba::rgb(0.3, 0.7, 1.0)),
    ];
    for (i, (position, color)) in lamps.into_iter().enumerate() {
        opaque.add_node(SceneNode::light(
            format!("lamp {i}"),
            Transform::from_translation(position),
            LightKind::Point(PointLight {
                color,
                intensity: 2.0,
                range: 12.0,
            }),
        ));
    }

    let crates = [
        ("crate", Vec3::new(0.0, 0.6, 0.0), LinearRgba::rgb(0.8, 0.5, 0.2)),
        ("post", Vec3::new(-3.0, 0.2, -2.0), LinearRgba::rgb(0.55, 0.55, 0.6)),
        ("buoy", Vec3::new(3.5, 0.1, 1.5), LinearRgba::rgb(0.9, 0.2, 0.15)),
    ];
    for (name, position, color) in crates {
        let material = default_lit::material(&library.default_lit, name, color)?;
        opaque.add_node(SceneNode::model(
            name,
            Transform::from_translation(position),
            Model::with_material(cube.clone(), material),
        ));
    }

    let sand = sand::material(&library.sand, config)?;
    let sea_floor_node = opaque.add_node(SceneNode::model(
        "sea floor",
        sea_floor_transform(config),
        Model::with_material(sea_floor, sand.clone()),
    ));

    let water = water::material(&library.water, config)?;
    let mut transparent = Scene::new("transparent");
    let water_node = transparent.add_node(SceneNode::model(
        "water",
        water_transform(config),
        Model::with_material(surface, water.clone()),
    ));

    let sky = skybox::material(&library.skybox, sun.forward())?;
    let skybox = Skybox::new(&Model::with_material(cube, sky));

    log::info!(
        "Scene built: {} opaque and {} transparent nodes, {}x{} grid",
        opaque.len(),
        transparent.len(),
        config.grid.columns,
        config.grid.rows
    );
    Ok(LagoonScene {
        opaque,
        transparent,
        camera,
        sea_floor_node,
        water_node,
        water,
        sand,
        skybox,
        shape: TerrainShape::of(config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dunes_stay_around_the_sand_plane() {
        let config = LagoonConfig::default();
        for (x, z) in [(-0.5, -0.5), (0.0, 0.0), (0.25, -0.4), (0.5, 0.5)] {
            let world = dunes(&config, x, z) * config.world_scale;
            let spread = 1.5 * config.sand.dune_height;
            assert!((world - config.sand.height).abs() <= spread + 1e-4);
        }
    }

    #[test]
    fn sea_floor_stays_below_the_water() {
        let config = LagoonConfig::default();
        let highest = config.sand.height + 1.5 * config.sand.dune_height;
        assert!(highest < config.water.height);
    }

    #[test]
    fn sand_and_grid_changes_reshape_the_terrain() {
        let base = LagoonConfig::default();
        let mut tinted = base;
        tinted.water.height += 0.5;
        assert_eq!(TerrainShape::of(&base), TerrainShape::of(&tinted));

        let mut deeper = base;
        deeper.sand.height -= 1.0;
        assert_ne!(TerrainShape::of(&base), TerrainShape::of(&deeper));

        let mut duned = base;
        duned.sand.dune_height *= 2.0;
        assert_ne!(TerrainShape::of(&base), TerrainShape::of(&duned));

        let mut finer = base;
        finer.grid.columns += 1;
        assert_ne!(TerrainShape::of(&base), TerrainShape::of(&finer));
    }

    #[test]
    fn terrain_transforms_follow_world_scale() {
        let mut config = LagoonConfig::default();
        config.world_scale = 30.0;
        config.water.height = 0.25;
        let floor = sea_floor_transform(&config);
        assert_eq!(floor.scale, Vec3::splat(30.0));
        let water = water_transform(&config);
        assert_eq!(water.scale, Vec3::new(30.0, 1.0, 30.0));
        assert_eq!(water.translation, Vec3::new(0.0, 0.25, 0.0));
    }

    #[test]
    fn bundled_config_parses() {
        let config = LagoonConfig::from_ron_str(include_str!("../assets/lagoon.ron")).unwrap();
        assert!(config.reflection.enabled);
        assert_eq!(config.grid.columns, 160);
    }
}
