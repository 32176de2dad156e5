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

//! Plain data types exchanged through the rendering traits.

pub mod camera;
pub mod command;
pub mod mesh;
pub mod shader;
pub mod state;
pub mod target;
pub mod texture;
pub mod uniform;

pub use self::camera::CameraView;
pub use self::command::{
    ClearValues, CommandBufferId, RasterFeature, RenderPassDescriptor, RenderTarget, Viewport,
};
pub use self::mesh::{Drawcall, MeshId, PrimitiveTopology, Vertex};
pub use self::shader::{
    ProgramDescriptor, ProgramId, ShaderProgram, TextureSlot, UniformDecl, UniformKind,
    UniformLayout, UniformLocation, CLIP_PLANE_UNIFORM,
};
pub use self::state::{
    BlendFactor, BlendOperation, BlendState, CompareFunction, CullMode, DepthState, RenderState,
};
pub use self::target::{RenderTargetDescriptor, RenderTargetId};
pub use self::texture::{TextureDescriptor, TextureFormat, TextureId, TextureViewDimension};
pub use self::uniform::UniformValue;
