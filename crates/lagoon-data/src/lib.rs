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

//! # Lagoon Data
//!
//! CPU-side data consumed by the render lanes: mesh builders, materials,
//! models, the scene graph and the runtime configuration.

#![warn(missing_docs)]

pub mod config;
pub mod geometry;
pub mod material;
pub mod scene;

pub use config::{ConfigError, LagoonConfig, ReflectionResizePolicy};
pub use geometry::{GeometryError, Mesh, MeshData};
pub use material::{Material, MaterialHandle, MaterialValue};
pub use scene::{Camera, Model, NodeId, NodeKind, Scene, SceneError, SceneNode, Transform};
