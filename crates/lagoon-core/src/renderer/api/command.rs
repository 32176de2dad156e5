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

//! Types describing render passes and their dynamic state.

use crate::math::{Extent2D, LinearRgba};
use crate::renderer::api::target::RenderTargetId;

/// An opaque handle to a finished command buffer, ready for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandBufferId(pub u64);

/// Where a render pass writes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The window surface of the current frame.
    Surface,
    /// An offscreen render target.
    Offscreen(RenderTargetId),
}

/// Values used to clear the attachments when a pass begins.
///
/// `None` keeps the previous contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValues {
    /// Clear color for the color attachment.
    pub color: Option<LinearRgba>,
    /// Clear depth for the depth attachment.
    pub depth: Option<f32>,
}

impl ClearValues {
    /// Clears color to `color` and depth to the far plane.
    pub fn color_and_depth(color: LinearRgba) -> Self {
        Self {
            color: Some(color),
            depth: Some(1.0),
        }
    }
}

/// Describes a render pass to begin.
#[derive(Debug, Clone)]
pub struct RenderPassDescriptor<'a> {
    /// Debug label.
    pub label: Option<&'a str>,
    /// The target the pass renders into.
    pub target: RenderTarget,
    /// How the attachments are initialized.
    pub clear: ClearValues,
}

/// A rectangle of the target the rasterizer maps clip space onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// A viewport covering the whole of `extent`.
    pub fn from_extent(extent: Extent2D) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
        }
    }
}

/// Rasterizer features a pass can switch on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFeature {
    /// User clip distance `n`, fed by the `ClipPlane` uniform.
    ClipDistance(u32),
}
