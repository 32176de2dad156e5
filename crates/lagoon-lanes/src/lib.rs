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

//! Hot-path render lanes for Lagoon.
//!
//! A frame runs two lanes: the reflection lane captures the opaque world from a
//! mirrored camera into an offscreen target, and the main lane draws opaque
//! geometry, the sky and then transparent geometry to the window surface. Both
//! feed their drawcalls through the same forward lighting loop.

#![warn(missing_docs)]

pub mod render_lane;

pub use render_lane::*;
