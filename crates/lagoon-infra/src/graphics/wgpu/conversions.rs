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

//! Conversions from the backend-agnostic `lagoon-core` types to `wgpu` types.

use lagoon_core::math::{Extent2D, LinearRgba};
use lagoon_core::renderer::{
    BlendFactor, BlendOperation, BlendState, CompareFunction, CullMode, PrimitiveTopology,
    TextureFormat, TextureViewDimension,
};

/// A trait for converting `lagoon-core` types into their `wgpu` counterparts.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a WGPU-compatible type.
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::Extent3d> for Extent2D {
    fn into_wgpu(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

impl IntoWgpu<wgpu::Color> for LinearRgba {
    fn into_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl IntoWgpu<wgpu::TextureFormat> for TextureFormat {
    fn into_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureFormat::Depth24Plus => wgpu::TextureFormat::Depth24Plus,
            TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
        }
    }
}

impl IntoWgpu<wgpu::TextureViewDimension> for TextureViewDimension {
    fn into_wgpu(self) -> wgpu::TextureViewDimension {
        match self {
            TextureViewDimension::D2 => wgpu::TextureViewDimension::D2,
            TextureViewDimension::Cube => wgpu::TextureViewDimension::Cube,
        }
    }
}

impl IntoWgpu<wgpu::CompareFunction> for CompareFunction {
    fn into_wgpu(self) -> wgpu::CompareFunction {
        match self {
            CompareFunction::Less => wgpu::CompareFunction::Less,
            CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareFunction::Equal => wgpu::CompareFunction::Equal,
            CompareFunction::Always => wgpu::CompareFunction::Always,
        }
    }
}

impl IntoWgpu<wgpu::BlendFactor> for BlendFactor {
    fn into_wgpu(self) -> wgpu::BlendFactor {
        match self {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::SrcColor => wgpu::BlendFactor::Src,
            BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
            BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendFactor::DstColor => wgpu::BlendFactor::Dst,
            BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
            BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
            BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
        }
    }
}

impl IntoWgpu<wgpu::BlendOperation> for BlendOperation {
    fn into_wgpu(self) -> wgpu::BlendOperation {
        match self {
            BlendOperation::Add => wgpu::BlendOperation::Add,
            BlendOperation::Subtract => wgpu::BlendOperation::Subtract,
            BlendOperation::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
        }
    }
}

impl IntoWgpu<wgpu::BlendState> for BlendState {
    fn into_wgpu(self) -> wgpu::BlendState {
        let operation = self.equation.into_wgpu();
        wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: self.src_color.into_wgpu(),
                dst_factor: self.dst_color.into_wgpu(),
                operation,
            },
            alpha: wgpu::BlendComponent {
                src_factor: self.src_alpha.into_wgpu(),
                dst_factor: self.dst_alpha.into_wgpu(),
                operation,
            },
        }
    }
}

impl IntoWgpu<wgpu::Face> for CullMode {
    fn into_wgpu(self) -> wgpu::Face {
        match self {
            CullMode::Front => wgpu::Face::Front,
            CullMode::Back => wgpu::Face::Back,
        }
    }
}

impl IntoWgpu<wgpu::PrimitiveTopology> for PrimitiveTopology {
    fn into_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_blending_maps_factor_by_factor() {
        let blend: wgpu::BlendState = BlendState::ALPHA_BLENDING.into_wgpu();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(blend.color.operation, wgpu::BlendOperation::Add);
    }

    #[test]
    fn additive_blending_adds_both_sides() {
        let blend: wgpu::BlendState = BlendState::ADDITIVE.into_wgpu();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.alpha.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn extent_is_a_single_layer() {
        let size: wgpu::Extent3d = Extent2D::new(512, 256).into_wgpu();
        assert_eq!((size.width, size.height, size.depth_or_array_layers), (512, 256, 1));
    }

    #[test]
    fn depth_formats_stay_depth_formats() {
        for format in [TextureFormat::Depth24Plus, TextureFormat::Depth32Float] {
            let converted: wgpu::TextureFormat = format.into_wgpu();
            assert!(converted.has_depth_aspect());
        }
    }
}
