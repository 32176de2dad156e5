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

//! Built-in WGSL sources of the Lagoon material families.
//!
//! Every program is compiled from [`COMMON_WGSL`] followed by its own source;
//! use [`with_common`] to assemble them.
//!
//! Binding conventions shared with the backend:
//! - `@group(0) @binding(0)`: the uniform block, laid out like the program's
//!   `UniformDecl` list.
//! - `@group(1) @binding(0)`: the sampler, then one texture per slot from
//!   `@binding(1)`.

/// Vertex layout, noise and Blinn-Phong helpers.
pub const COMMON_WGSL: &str = include_str!("common.wgsl");

/// Flat-colored Blinn-Phong surface with the forward light block.
pub const DEFAULT_LIT_WGSL: &str = include_str!("default_lit.wgsl");

/// Wave displacement, color bands and the Fresnel-weighted reflection.
pub const WATER_WGSL: &str = include_str!("water.wgsl");

/// Procedural sand and caustics.
pub const SAND_WGSL: &str = include_str!("sand.wgsl");

/// Gradient sky at the far plane.
pub const SKYBOX_WGSL: &str = include_str!("skybox.wgsl");

/// Prepends the shared prelude to `source`.
pub fn with_common(source: &str) -> String {
    format!("{COMMON_WGSL}\n{source}")
}
