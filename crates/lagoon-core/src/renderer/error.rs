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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::command::RasterFeature;
use crate::renderer::api::shader::{ProgramId, UniformKind};
use std::fmt;

/// An error related to the declaration, validation or compilation of a shader program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// The backend failed to compile the program source.
    CompilationError {
        /// A descriptive label for the program.
        label: String,
        /// Detailed error messages from the shader compiler.
        details: String,
    },
    /// Two uniforms of the same program share a name.
    DuplicateUniform(String),
    /// A uniform array uses an element type whose stride is not 16-byte aligned.
    UnsupportedArray {
        /// The name of the offending uniform.
        name: String,
        /// The element kind that cannot be laid out as an array.
        kind: UniformKind,
    },
    /// A uniform required by a binding is not declared by the program.
    MissingUniform {
        /// The label of the program.
        program: String,
        /// The uniform name that was looked up.
        name: String,
    },
    /// A value was assigned to a uniform of a different type.
    TypeMismatch {
        /// The uniform name.
        name: String,
        /// The declared kind.
        expected: UniformKind,
        /// A description of the value that was provided.
        found: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationError { label, details } => {
                write!(f, "Program '{label}' did not compile: {details}")
            }
            ShaderError::DuplicateUniform(name) => {
                write!(f, "Uniform '{name}' is declared more than once")
            }
            ShaderError::UnsupportedArray { name, kind } => {
                write!(
                    f,
                    "Uniform array '{name}' of {kind:?} is not 16-byte strided"
                )
            }
            ShaderError::MissingUniform { program, name } => {
                write!(f, "Program '{program}' has no uniform named '{name}'")
            }
            ShaderError::TypeMismatch {
                name,
                expected,
                found,
            } => {
                write!(f, "Uniform '{name}' expects {expected:?}, got {found}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// The attachments of a render target cannot be rendered to together.
    IncompleteRenderTarget {
        /// The label of the render target.
        label: String,
        /// Why the target is incomplete.
        reason: String,
    },
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Program resource error: {err}"),
            ResourceError::InvalidHandle => write!(f, "Handle does not name a live resource"),
            ResourceError::IncompleteRenderTarget { label, reason } => {
                write!(f, "Render target '{label}' is incomplete: {reason}")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend rejected the resource: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// A high-level error raised while recording or submitting a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// Failed to acquire the next frame from the surface.
    SurfaceAcquisitionFailed(String),
    /// The device cannot toggle the requested rasterizer feature.
    FeatureUnsupported(RasterFeature),
    /// A pass was executed without a camera being registered for it.
    MissingCamera {
        /// The label of the pass.
        pass: &'static str,
    },
    /// A drawcall uses a program that was never registered with the material registry.
    UnregisteredProgram(ProgramId),
    /// A command recorded into a pass does not fit the bound program.
    InvalidPassCommand(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "Graphics backend could not start: {msg}")
            }
            RenderError::SurfaceAcquisitionFailed(msg) => {
                write!(f, "No surface texture to render into: {msg}")
            }
            RenderError::FeatureUnsupported(feature) => {
                write!(f, "Rasterizer feature {feature:?} is not supported")
            }
            RenderError::MissingCamera { pass } => {
                write!(f, "No camera was registered for the '{pass}' pass")
            }
            RenderError::UnregisteredProgram(id) => {
                write!(f, "Program {id:?} has no registered bindings")
            }
            RenderError::InvalidPassCommand(msg) => {
                write!(f, "Pass command rejected: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Resource error while rendering: {err}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::ResourceError(ResourceError::Shader(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::MissingUniform {
            program: "water".to_string(),
            name: "Time".to_string(),
        };
        assert_eq!(format!("{err}"), "Program 'water' has no uniform named 'Time'");
    }

    #[test]
    fn render_error_wraps_shader_error() {
        let render_err: RenderError = ShaderError::DuplicateUniform("Color".to_string()).into();
        assert_eq!(
            format!("{render_err}"),
            "Resource error while rendering: Program resource error: Uniform 'Color' is declared more than once"
        );
        assert!(render_err.source().is_some());
        assert!(render_err.source().and_then(|e| e.source()).is_some());
    }

    #[test]
    fn missing_camera_names_the_pass() {
        let err = RenderError::MissingCamera { pass: "reflection" };
        assert_eq!(
            format!("{err}"),
            "No camera was registered for the 'reflection' pass"
        );
    }
}
