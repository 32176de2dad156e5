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

//! Turns scene graphs into the camera, lights and drawcalls of a pass.

use super::{DrawcallInfo, RenderContext};
use lagoon_core::math::Mat4;
use lagoon_core::renderer::{CameraView, Light};
use lagoon_data::{NodeKind, Scene};
use thiserror::Error;

/// A scene broke a traversal invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisitError {
    /// A pass can only have one camera.
    #[error("camera '{node}' in scene '{scene}' would be the second camera of the pass")]
    CameraAlreadyRegistered {
        /// The scene being visited.
        scene: String,
        /// The offending camera node.
        node: String,
    },
}

/// Walks a [`Scene`] in insertion order, filling a [`RenderContext`].
///
/// - Camera nodes become the camera of the pass, projected for the context's
///   window size.
/// - Light nodes are resolved to world space and appended in order.
/// - Model nodes emit one [`DrawcallInfo`] per submesh into the opaque or the
///   transparent collection, depending on their materials at visit time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SceneVisitor;

impl SceneVisitor {
    /// Visits every node of `scene`.
    ///
    /// The context is not reset; visiting several scenes accumulates into it.
    pub fn visit(&self, scene: &Scene, context: &mut RenderContext) -> Result<(), VisitError> {
        for node in scene.nodes() {
            match &node.kind {
                NodeKind::Camera(camera) => {
                    // Scale would skew the view; only placement matters.
                    let world = Mat4::from_rotation_translation(
                        node.transform.rotation,
                        node.transform.translation,
                    );
                    let projection = camera.projection_matrix(context.window_size());
                    if !context.register_camera(CameraView::from_world(world, projection)) {
                        return Err(VisitError::CameraAlreadyRegistered {
                            scene: scene.name().to_string(),
                            node: node.name.clone(),
                        });
                    }
                }
                NodeKind::Light(kind) => context.push_light(Light {
                    kind: *kind,
                    position: node.transform.translation,
                    direction: node.transform.forward().normalize_or_zero(),
                }),
                NodeKind::Model(model) => {
                    let transparent = model.is_transparent();
                    let world_matrix = node.transform.to_mat4();
                    for (drawcall, material) in model.submeshes() {
                        context.push_drawcall(
                            transparent,
                            DrawcallInfo {
                                material: material.clone(),
                                drawcall: *drawcall,
                                world_matrix,
                            },
                        );
                    }
                }
            }
        }
        log::trace!(
            "Visited scene '{}': {} opaque, {} transparent drawcalls so far",
            scene.name(),
            context.opaque().len(),
            context.transparent().len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lagoon_core::math::{Extent2D, Vec3};
    use lagoon_core::renderer::{
        BlendState, DirectionalLight, LightKind, MeshId, PointLight, ProgramDescriptor, ProgramId,
        ShaderProgram,
    };
    use lagoon_data::{Camera, Material, MaterialHandle, Mesh, Model, SceneNode, Transform};
    use std::sync::Arc;

    fn material() -> MaterialHandle {
        let descriptor = ProgramDescriptor {
            label: "visit".into(),
            source: "".into(),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            uniforms: vec![],
            textures: vec![],
        };
        let program = Arc::new(ShaderProgram::new(ProgramId(0), &descriptor).unwrap());
        MaterialHandle::new(Material::new("m", program))
    }

    fn model(material: &MaterialHandle) -> Model {
        Model::with_material(Arc::new(Mesh::single(MeshId(0), 36)), material.clone())
    }

    fn context() -> RenderContext {
        RenderContext::new(Extent2D::new(800, 600))
    }

    #[test]
    fn models_are_split_by_transparency() {
        let solid = material();
        let glass = material();
        glass.write().set_blend_state(Some(BlendState::ALPHA_BLENDING));

        let mut scene = Scene::new("world");
        scene.add_node(SceneNode::model("cube", Transform::IDENTITY, model(&solid)));
        scene.add_node(SceneNode::model("pane", Transform::IDENTITY, model(&glass)));

        let mut ctx = context();
        SceneVisitor.visit(&scene, &mut ctx).unwrap();
        assert_eq!(ctx.opaque().len(), 1);
        assert_eq!(ctx.transparent().len(), 1);
        assert!(ctx.transparent()[0].material.ptr_eq(&glass));
    }

    #[test]
    fn lights_are_resolved_in_order() {
        let mut scene = Scene::new("lights");
        scene.add_node(SceneNode::light(
            "sun",
            Transform::looking_at(Vec3::Y, Vec3::ZERO, Vec3::Z),
            LightKind::Directional(DirectionalLight::default()),
        ));
        scene.add_node(SceneNode::light(
            "lamp",
            Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            LightKind::Point(PointLight::default()),
        ));

        let mut ctx = context();
        SceneVisitor.visit(&scene, &mut ctx).unwrap();
        let lights = ctx.lights();
        assert_eq!(lights.len(), 2);
        assert!(lights[0].direction.abs_diff_eq(Vec3::NEG_Y, 1e-5));
        assert_eq!(lights[1].position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn camera_uses_window_aspect_and_ignores_scale() {
        let eye = Vec3::new(0.0, 2.0, 5.0);
        let mut scene = Scene::new("eye");
        scene.add_node(SceneNode::camera(
            "main",
            Transform::looking_at(eye, Vec3::ZERO, Vec3::Y).with_scale(Vec3::splat(4.0)),
            Camera::default(),
        ));

        let mut ctx = context();
        SceneVisitor.visit(&scene, &mut ctx).unwrap();
        let camera = ctx.camera().unwrap();
        assert!(camera.position.abs_diff_eq(eye, 1e-5));
        assert_relative_eq!(camera.right().length(), 1.0, epsilon = 1e-5);
        assert_eq!(
            camera.projection,
            Camera::default().projection_matrix(Extent2D::new(800, 600))
        );
    }

    #[test]
    fn second_camera_fails_the_visit() {
        let mut opaque = Scene::new("opaque");
        opaque.add_node(SceneNode::camera("a", Transform::IDENTITY, Camera::default()));
        let mut transparent = Scene::new("transparent");
        transparent.add_node(SceneNode::camera("b", Transform::IDENTITY, Camera::default()));

        let mut ctx = context();
        SceneVisitor.visit(&opaque, &mut ctx).unwrap();
        assert_eq!(
            SceneVisitor.visit(&transparent, &mut ctx),
            Err(VisitError::CameraAlreadyRegistered {
                scene: "transparent".into(),
                node: "b".into(),
            })
        );
    }

    #[test]
    fn revisiting_after_reset_is_idempotent() {
        let solid = material();
        let mut scene = Scene::new("world");
        scene.add_node(SceneNode::camera("eye", Transform::IDENTITY, Camera::default()));
        scene.add_node(SceneNode::model(
            "cube",
            Transform::from_translation(Vec3::X),
            model(&solid),
        ));

        let mut ctx = context();
        SceneVisitor.visit(&scene, &mut ctx).unwrap();
        let first: Vec<_> = ctx
            .opaque()
            .iter()
            .map(|i| (i.drawcall, i.world_matrix))
            .collect();
        ctx.reset();
        SceneVisitor.visit(&scene, &mut ctx).unwrap();
        let second: Vec<_> = ctx
            .opaque()
            .iter()
            .map(|i| (i.drawcall, i.world_matrix))
            .collect();
        assert_eq!(first, second);
        assert!(ctx.transparent().is_empty());
    }
}
