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

//! The forward drawcall loop shared by every pass.
//!
//! Each drawcall is drawn once per light batch. The first batch writes the
//! surface as the material asks; later batches add their light on top of it
//! with additive blending, without touching depth.

use super::{DrawcallInfo, MaterialRegistry, ViewContext};
use lagoon_core::renderer::{
    BlendState, CompareFunction, DepthState, Light, ProgramId, RenderError, RenderPass,
    RenderState, UniformValue,
};
use lagoon_data::{Material, MaterialValue};
use std::collections::HashSet;

/// The render state of one light batch.
///
/// - First batch of an opaque pass: no blending, the material's depth write.
/// - First batch of a transparent pass: the material's blend state and depth write.
/// - Later batches: `One, One` (opaque) or `SrcAlpha, One` (transparent)
///   blending, depth write off, depth compare `LessEqual`.
pub fn lighting_render_state(
    material: &Material,
    is_transparent_pass: bool,
    first: bool,
) -> RenderState {
    let cull = material.cull();
    if first {
        let blend = if is_transparent_pass {
            material.blend_state()
        } else {
            None
        };
        return RenderState {
            blend,
            depth: DepthState {
                test: material.depth_test(),
                write: material.depth_write(),
                compare: material.depth_compare(),
            },
            cull,
        };
    }

    let blend = if is_transparent_pass {
        BlendState::ALPHA_ADDITIVE
    } else {
        BlendState::ADDITIVE
    };
    RenderState {
        blend: Some(blend),
        depth: DepthState {
            test: material.depth_test(),
            write: false,
            compare: CompareFunction::LessEqual,
        },
        cull,
    }
}

/// Draws drawcall collections with forward multi-light accumulation.
///
/// One `ForwardLane` lives for one render pass: it remembers which programs
/// already received the camera uniforms in that pass.
#[derive(Debug)]
pub struct ForwardLane<'a> {
    registry: &'a MaterialRegistry,
    lights: &'a [Light],
    view: ViewContext<'a>,
    programs_seen: HashSet<ProgramId>,
}

impl<'a> ForwardLane<'a> {
    /// Prepares the loop for a pass seen through `view`.
    pub fn new(registry: &'a MaterialRegistry, lights: &'a [Light], view: ViewContext<'a>) -> Self {
        Self {
            registry,
            lights,
            view,
            programs_seen: HashSet::new(),
        }
    }

    /// Draws every entry of `collection` in order and returns the number of GPU draws.
    ///
    /// # Errors
    /// [`RenderError::UnregisteredProgram`] if a material uses a program the
    /// registry does not know.
    pub fn draw_collection(
        &mut self,
        pass: &mut dyn RenderPass,
        collection: &[DrawcallInfo],
        is_transparent_pass: bool,
    ) -> Result<u32, RenderError> {
        let mut draws = 0;
        for info in collection {
            draws += self.draw(pass, info, is_transparent_pass)?;
        }
        Ok(draws)
    }

    /// Draws one entry with as many light batches as needed.
    ///
    /// With `N` lights and a capacity of `K` this issues `max(1, ceil(N / K))`
    /// draws; unlit programs draw once.
    pub fn draw(
        &mut self,
        pass: &mut dyn RenderPass,
        info: &DrawcallInfo,
        is_transparent_pass: bool,
    ) -> Result<u32, RenderError> {
        let material = info.material.read();
        let program = material.program().id();
        let entry = self.registry.get(program)?;

        pass.set_program(program);
        for value in material.values() {
            match value {
                MaterialValue::Uniform(location, value) => pass.set_uniform(*location, value),
                MaterialValue::Texture(slot, UniformValue::Texture(texture)) => {
                    pass.bind_texture(*slot, *texture)
                }
                MaterialValue::Texture(..) => {}
            }
        }
        let camera_changed = self.programs_seen.insert(program);
        entry
            .transform()
            .apply(pass, &info.world_matrix, &self.view, camera_changed);

        let lights = entry.lights();
        let mut light_index = 0;
        let mut draws = 0;
        loop {
            let first = draws == 0;
            if !lights.update_lights(pass, self.lights, &mut light_index) {
                if !first {
                    break;
                }
                lights.clear_lights(pass);
            }
            pass.set_render_state(&lighting_render_state(&material, is_transparent_pass, first));
            pass.draw(&info.drawcall);
            draws += 1;
        }
        log::trace!(
            "Drew '{}' with {} light batch(es)",
            material.name(),
            draws
        );
        Ok(draws)
    }
}
