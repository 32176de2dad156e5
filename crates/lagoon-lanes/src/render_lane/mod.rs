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

//! Rendering lanes - the per-frame hot path.
//!
//! The lanes only speak the abstractions of `lagoon-core` (`CommandEncoder`,
//! `RenderPass`, ids); the concrete backend lives in `lagoon-infra`.

mod context;
mod forward;
mod main_lane;
pub mod materials;
mod pipeline;
mod reflection;
mod registry;
pub mod shaders;
mod skybox;
mod visitor;

pub use context::*;
pub use forward::*;
pub use main_lane::*;
pub use pipeline::*;
pub use reflection::*;
pub use registry::*;
pub use skybox::*;
pub use visitor::*;

use lagoon_core::math::Extent2D;
use lagoon_core::renderer::{CommandEncoder, RenderError, ResourceError, ShaderError};
use lagoon_data::Scene;
use thiserror::Error;

/// Errors a lane can raise while recording a frame.
#[derive(Debug, Error)]
pub enum LaneError {
    /// A GPU state or resource failure.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A scene broke a traversal invariant.
    #[error(transparent)]
    Visit(#[from] VisitError),
    /// A resource could not be created.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// A program does not match what its bindings need.
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Everything a lane reads to record its pass.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    /// The scene holding opaque geometry, the camera and the lights.
    pub opaque: &'a Scene,
    /// The scene holding blended geometry.
    pub transparent: &'a Scene,
    /// Program bindings.
    pub registry: &'a MaterialRegistry,
    /// The sky drawn between opaque and transparent geometry.
    pub skybox: Option<&'a Skybox>,
    /// Current window size, in pixels.
    pub window_size: Extent2D,
    /// Seconds since start-up.
    pub time: f32,
}

/// What a lane recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// GPU draws issued, light batches included.
    pub draws: u32,
    /// Entries in the opaque collection.
    pub opaque_drawcalls: usize,
    /// Entries in the transparent collection.
    pub transparent_drawcalls: usize,
    /// Lights collected.
    pub lights: usize,
}

/// A rendering strategy recording one pass of a frame.
pub trait RenderLane {
    /// Returns a human-readable identifier for this lane, used in logs and pass labels.
    fn strategy_name(&self) -> &'static str;

    /// Visits the scenes this lane needs into `context` and records its pass.
    ///
    /// The context is reset first; on return it holds what the lane collected.
    fn render(
        &self,
        inputs: &FrameInputs<'_>,
        context: &mut RenderContext,
        encoder: &mut dyn CommandEncoder,
    ) -> Result<PassStats, LaneError>;
}
