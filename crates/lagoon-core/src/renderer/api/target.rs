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

use crate::renderer::api::texture::TextureId;

/// An opaque handle to an offscreen render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub usize);

/// Binds a color texture and an optional depth texture into one target.
///
/// The target has a single color draw buffer.
#[derive(Debug, Clone)]
pub struct RenderTargetDescriptor<'a> {
    /// Debug label.
    pub label: &'a str,
    /// The color attachment.
    pub color: TextureId,
    /// The depth attachment.
    pub depth: Option<TextureId>,
}
