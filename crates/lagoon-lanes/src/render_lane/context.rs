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

//! Per-pass state shared by the scene visitor and the lanes.

use lagoon_core::math::{Extent2D, Mat4};
use lagoon_core::renderer::{CameraView, Drawcall, Light};
use lagoon_data::MaterialHandle;

/// Index of the opaque drawcall collection.
pub const OPAQUE: usize = 0;
/// Index of the transparent drawcall collection.
pub const TRANSPARENT: usize = 1;

/// One submesh ready to draw, with the material and world matrix it uses.
#[derive(Debug, Clone)]
pub struct DrawcallInfo {
    /// The material, shared with the model that emitted the draw.
    pub material: MaterialHandle,
    /// The GPU draw command.
    pub drawcall: Drawcall,
    /// The world matrix of the owning node.
    pub world_matrix: Mat4,
}

/// A bucket of drawcalls recorded for one pass.
pub type DrawcallCollection = Vec<DrawcallInfo>;

/// The camera, lights and drawcalls collected for one pass.
///
/// Reset at the start of every pass. The camera slot is written at most once
/// between resets.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    window_size: Extent2D,
    camera: Option<CameraView>,
    lights: Vec<Light>,
    collections: [DrawcallCollection; 2],
}

impl RenderContext {
    /// Creates an empty context for a window of `window_size`.
    pub fn new(window_size: Extent2D) -> Self {
        Self {
            window_size,
            ..Default::default()
        }
    }

    /// Clears the camera, lights and both collections. The window size is kept.
    pub fn reset(&mut self) {
        self.camera = None;
        self.lights.clear();
        for collection in &mut self.collections {
            collection.clear();
        }
    }

    /// The window size cameras derive their aspect ratio from.
    pub fn window_size(&self) -> Extent2D {
        self.window_size
    }

    /// Updates the window size.
    pub fn set_window_size(&mut self, size: Extent2D) {
        self.window_size = size;
    }

    /// The registered camera, if any.
    pub fn camera(&self) -> Option<&CameraView> {
        self.camera.as_ref()
    }

    /// Registers the camera of the pass.
    ///
    /// Returns `false` and leaves the slot untouched if a camera is already set.
    pub fn register_camera(&mut self, camera: CameraView) -> bool {
        if self.camera.is_some() {
            return false;
        }
        self.camera = Some(camera);
        true
    }

    /// The lights, in traversal order.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Appends a light.
    pub fn push_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Appends a drawcall to the opaque or the transparent collection.
    pub fn push_drawcall(&mut self, transparent: bool, info: DrawcallInfo) {
        self.collections[usize::from(transparent)].push(info);
    }

    /// A collection by index ([`OPAQUE`] or [`TRANSPARENT`]).
    ///
    /// # Panics
    /// If `index` is not `0` or `1`.
    pub fn collection(&self, index: usize) -> &[DrawcallInfo] {
        &self.collections[index]
    }

    /// The opaque collection.
    pub fn opaque(&self) -> &[DrawcallInfo] {
        &self.collections[OPAQUE]
    }

    /// The transparent collection.
    pub fn transparent(&self) -> &[DrawcallInfo] {
        &self.collections[TRANSPARENT]
    }
}
