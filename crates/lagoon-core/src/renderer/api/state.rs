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

//! Fixed-function state: blending, depth testing and culling.

use serde::{Deserialize, Serialize};

/// The operation combining the weighted source and destination colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendOperation {
    /// `src * src_factor + dst * dst_factor`
    #[default]
    Add,
    /// `src * src_factor - dst * dst_factor`
    Subtract,
    /// `dst * dst_factor - src * src_factor`
    ReverseSubtract,
}

/// A weight applied to the source or destination color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// A blend equation and its four factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendState {
    /// The operation shared by the color and alpha channels.
    pub equation: BlendOperation,
    /// Factor applied to the source color.
    pub src_color: BlendFactor,
    /// Factor applied to the destination color.
    pub dst_color: BlendFactor,
    /// Factor applied to the source alpha.
    pub src_alpha: BlendFactor,
    /// Factor applied to the destination alpha.
    pub dst_alpha: BlendFactor,
}

impl BlendState {
    /// Source overwrites the destination.
    pub const REPLACE: Self = Self::uniform(BlendFactor::One, BlendFactor::Zero);

    /// Classic "over" compositing with straight alpha.
    pub const ALPHA_BLENDING: Self = Self {
        equation: BlendOperation::Add,
        src_color: BlendFactor::SrcAlpha,
        dst_color: BlendFactor::OneMinusSrcAlpha,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::OneMinusSrcAlpha,
    };

    /// Source is added to the destination.
    pub const ADDITIVE: Self = Self::uniform(BlendFactor::One, BlendFactor::One);

    /// Source weighted by its alpha is added to the destination.
    pub const ALPHA_ADDITIVE: Self = Self {
        equation: BlendOperation::Add,
        src_color: BlendFactor::SrcAlpha,
        dst_color: BlendFactor::One,
        src_alpha: BlendFactor::Zero,
        dst_alpha: BlendFactor::One,
    };

    /// The same factors for color and alpha, added together.
    pub const fn uniform(src: BlendFactor, dst: BlendFactor) -> Self {
        Self {
            equation: BlendOperation::Add,
            src_color: src,
            dst_color: dst,
            src_alpha: src,
            dst_alpha: dst,
        }
    }

    /// `true` unless the state is equivalent to a plain overwrite.
    pub fn blends(&self) -> bool {
        *self != Self::REPLACE
    }
}

/// The comparison used by the depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum CompareFunction {
    #[default]
    Less,
    LessEqual,
    Equal,
    Always,
}

/// Depth test and depth write configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthState {
    /// Whether fragments are tested against the depth buffer.
    pub test: bool,
    /// Whether passing fragments write their depth.
    pub write: bool,
    /// The test comparison.
    pub compare: CompareFunction,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test: true,
            write: true,
            compare: CompareFunction::Less,
        }
    }
}

/// Which faces are discarded by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum CullMode {
    Front,
    Back,
}

/// The complete fixed-function state of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderState {
    /// `None` disables blending.
    pub blend: Option<BlendState>,
    /// Depth configuration.
    pub depth: DepthState,
    /// `None` draws both faces.
    pub cull: Option<CullMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_replace_does_not_blend() {
        assert!(!BlendState::REPLACE.blends());
        assert!(BlendState::ALPHA_BLENDING.blends());
        assert!(BlendState::ADDITIVE.blends());
    }

    #[test]
    fn uniform_uses_same_factors_for_alpha() {
        let state = BlendState::uniform(BlendFactor::DstColor, BlendFactor::Zero);
        assert_eq!(state.src_alpha, BlendFactor::DstColor);
        assert_eq!(state.dst_alpha, BlendFactor::Zero);
    }
}
