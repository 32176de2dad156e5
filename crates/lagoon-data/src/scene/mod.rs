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

//! The scene graph.
//!
//! A [`Scene`] is a flat, ordered list of nodes. Lagoon keeps two of them, one
//! for opaque and one for transparent geometry; the split decides draw order.
//! Topology is fixed after setup, only transforms and node payloads change.

mod camera;
mod model;
mod transform;

pub use self::camera::Camera;
pub use self::model::Model;
pub use self::transform::Transform;

use lagoon_core::renderer::{LightKind, MeshId};
use thiserror::Error;

/// Errors raised while building a scene.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Models need at least one material.
    #[error("model using mesh {0:?} has no material")]
    ModelWithoutMaterial(MeshId),
}

/// What a node is.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The viewpoint of a pass.
    Camera(Camera),
    /// A light source.
    Light(LightKind),
    /// Drawable geometry.
    Model(Model),
}

/// A named node with its world transform.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Debug name.
    pub name: String,
    /// World transform.
    pub transform: Transform,
    /// Payload.
    pub kind: NodeKind,
}

impl SceneNode {
    /// Creates a node.
    pub fn new(name: impl Into<String>, transform: Transform, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform,
            kind,
        }
    }

    /// A camera node.
    pub fn camera(name: impl Into<String>, transform: Transform, camera: Camera) -> Self {
        Self::new(name, transform, NodeKind::Camera(camera))
    }

    /// A light node.
    pub fn light(name: impl Into<String>, transform: Transform, light: LightKind) -> Self {
        Self::new(name, transform, NodeKind::Light(light))
    }

    /// A model node.
    pub fn model(name: impl Into<String>, transform: Transform, model: Model) -> Self {
        Self::new(name, transform, NodeKind::Model(model))
    }
}

/// Index of a node inside its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// An ordered collection of nodes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    name: String,
    nodes: Vec<SceneNode>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// The debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a node; traversal follows insertion order.
    pub fn add_node(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// The nodes in insertion order.
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// A node by id.
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// A node by id, mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the scene has no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
