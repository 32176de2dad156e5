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

//! Runtime configuration, stored as RON.
//!
//! Every section has defaults, so a file only needs the values it changes.

use crate::material::MaterialHandle;
use lagoon_core::math::LinearRgba;
use lagoon_core::renderer::ShaderError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid RON for [`LagoonConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The values are well-formed but unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Whether the reflection target follows window resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReflectionResizePolicy {
    /// Sized once from the initial window.
    #[default]
    Fixed,
    /// Reallocated whenever its derived size changes.
    FollowWindow,
}

/// Vertex resolution of the water and sand grids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Vertices along X.
    pub columns: u32,
    /// Vertices along Z.
    pub rows: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 128,
            rows: 128,
        }
    }
}

/// Surface appearance of the water.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterParams {
    /// World height of the undisturbed surface; also the reflection plane.
    pub height: f32,
    /// Alpha of the surface.
    pub opacity: f32,
    /// Color in the wave troughs.
    pub trough_color: LinearRgba,
    /// Color between troughs and peaks.
    pub surface_color: LinearRgba,
    /// Color on the wave crests.
    pub peak_color: LinearRgba,
    /// Wave height below which the trough color applies.
    pub trough_threshold: f32,
    /// Blend width around the trough threshold.
    pub trough_transition: f32,
    /// Wave height above which the peak color applies.
    pub peak_threshold: f32,
    /// Blend width around the peak threshold.
    pub peak_transition: f32,
    /// Exponent of the Fresnel term.
    pub fresnel_power: f32,
    /// Weight of the reflection at grazing angles.
    pub fresnel_strength: f32,
    /// How far surface normals shift the reflection lookup.
    pub reflection_distortion: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            height: 0.0,
            opacity: 0.75,
            trough_color: LinearRgba::rgb(0.01, 0.07, 0.16),
            surface_color: LinearRgba::rgb(0.03, 0.22, 0.35),
            peak_color: LinearRgba::rgb(0.55, 0.75, 0.85),
            trough_threshold: -0.02,
            trough_transition: 0.08,
            peak_threshold: 0.06,
            peak_transition: 0.04,
            fresnel_power: 5.0,
            fresnel_strength: 0.9,
            reflection_distortion: 0.03,
        }
    }
}

impl WaterParams {
    /// Pushes the surface parameters into a water material.
    pub fn apply(&self, material: &MaterialHandle) -> Result<(), ShaderError> {
        let mut material = material.write();
        material.set_uniform_value("Opacity", self.opacity)?;
        material.set_uniform_value("TroughColor", self.trough_color)?;
        material.set_uniform_value("SurfaceColor", self.surface_color)?;
        material.set_uniform_value("PeakColor", self.peak_color)?;
        material.set_uniform_value("TroughThreshold", self.trough_threshold)?;
        material.set_uniform_value("TroughTransition", self.trough_transition)?;
        material.set_uniform_value("PeakThreshold", self.peak_threshold)?;
        material.set_uniform_value("PeakTransition", self.peak_transition)?;
        material.set_uniform_value("FresnelPower", self.fresnel_power)?;
        material.set_uniform_value("FresnelStrength", self.fresnel_strength)?;
        material.set_uniform_value("ReflectionDistortion", self.reflection_distortion)
    }
}

/// Fractal wave coefficients fed to the water vertex shader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Height of the first octave.
    pub amplitude: f32,
    /// Spatial frequency of the first octave.
    pub frequency: f32,
    /// Amplitude multiplier between octaves.
    pub persistence: f32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// Number of octaves.
    pub octaves: i32,
    /// Time multiplier.
    pub speed: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude: 0.06,
            frequency: 0.35,
            persistence: 0.5,
            lacunarity: 2.0,
            octaves: 5,
            speed: 0.6,
        }
    }
}

impl WaveParams {
    /// Pushes the wave coefficients into a water material.
    pub fn apply(&self, material: &MaterialHandle) -> Result<(), ShaderError> {
        let mut material = material.write();
        material.set_uniform_value("WaveAmplitude", self.amplitude)?;
        material.set_uniform_value("WaveFrequency", self.frequency)?;
        material.set_uniform_value("WavePersistence", self.persistence)?;
        material.set_uniform_value("WaveLacunarity", self.lacunarity)?;
        material.set_uniform_value("WaveOctaves", self.octaves)?;
        material.set_uniform_value("WaveSpeed", self.speed)
    }
}

/// The sea floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandParams {
    /// World height of the sand plane.
    pub height: f32,
    /// Height of the dunes added on top of the plane.
    pub dune_height: f32,
    /// Base albedo.
    pub color: LinearRgba,
    /// Scale applied to the integer grid coordinates before texturing.
    pub texture_scale: f32,
}

impl Default for SandParams {
    fn default() -> Self {
        Self {
            height: -1.2,
            dune_height: 0.6,
            color: LinearRgba::rgb(0.76, 0.66, 0.45),
            texture_scale: 0.25,
        }
    }
}

impl SandParams {
    /// Pushes the albedo parameters into a sand material.
    pub fn apply(&self, material: &MaterialHandle) -> Result<(), ShaderError> {
        let mut material = material.write();
        material.set_uniform_value("SandColor", self.color)?;
        material.set_uniform_value("TextureScale", self.texture_scale)
    }
}

/// Caustics projected onto the submerged sand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CausticsParams {
    /// Color of the light pattern.
    pub color: LinearRgba,
    /// Brightness of the pattern.
    pub intensity: f32,
    /// Phase offset between the two pattern layers.
    pub offset: f32,
    /// Spatial scale of the pattern.
    pub scale: f32,
    /// Animation speed.
    pub speed: f32,
    /// Width of the bright lines.
    pub thickness: f32,
}

impl Default for CausticsParams {
    fn default() -> Self {
        Self {
            color: LinearRgba::rgb(0.8, 0.95, 1.0),
            intensity: 0.7,
            offset: 0.37,
            scale: 0.6,
            speed: 0.35,
            thickness: 0.12,
        }
    }
}

impl CausticsParams {
    /// Pushes the caustics parameters into a sand material.
    pub fn apply(&self, material: &MaterialHandle) -> Result<(), ShaderError> {
        let mut material = material.write();
        material.set_uniform_value("CausticsColor", self.color)?;
        material.set_uniform_value("CausticsIntensity", self.intensity)?;
        material.set_uniform_value("CausticsOffset", self.offset)?;
        material.set_uniform_value("CausticsScale", self.scale)?;
        material.set_uniform_value("CausticsSpeed", self.speed)?;
        material.set_uniform_value("CausticsThickness", self.thickness)
    }
}

/// Reflection capture settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionConfig {
    /// Disables the reflection pass entirely when `false`.
    pub enabled: bool,
    /// See [`ReflectionResizePolicy`].
    pub resize_policy: ReflectionResizePolicy,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resize_policy: ReflectionResizePolicy::Fixed,
        }
    }
}

/// The complete runtime configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagoonConfig {
    /// Grid resolution shared by water and sand.
    pub grid: GridConfig,
    /// World size of the water and sand planes.
    pub world_scale: f32,
    /// Water appearance.
    pub water: WaterParams,
    /// Wave motion.
    pub waves: WaveParams,
    /// Sea floor.
    pub sand: SandParams,
    /// Caustics.
    pub caustics: CausticsParams,
    /// Reflection capture.
    pub reflection: ReflectionConfig,
}

impl Default for LagoonConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            world_scale: 20.0,
            water: WaterParams::default(),
            waves: WaveParams::default(),
            sand: SandParams::default(),
            caustics: CausticsParams::default(),
            reflection: ReflectionConfig::default(),
        }
    }
}

impl LagoonConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&source)?;
        log::info!("Loaded configuration from '{}'", path.display());
        Ok(config)
    }

    /// Applies the water and wave sections to a water material.
    pub fn apply_to_water(&self, material: &MaterialHandle) -> Result<(), ShaderError> {
        self.water.apply(material)?;
        self.waves.apply(material)
    }

    /// Applies the sand and caustics sections to a sand material.
    ///
    /// Caustics only show below the water surface, so the water height is
    /// written as well.
    pub fn apply_to_sand(&self, material: &MaterialHandle) -> Result<(), ShaderError> {
        self.sand.apply(material)?;
        self.caustics.apply(material)?;
        material
            .write()
            .set_uniform_value("WaterHeight", self.water.height)
    }

    /// Checks the values a renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns < 2 || self.grid.rows < 2 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 2x2, got {}x{}",
                self.grid.columns, self.grid.rows
            )));
        }
        if self.world_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "world_scale must be positive, got {}",
                self.world_scale
            )));
        }
        if self.waves.octaves < 1 {
            return Err(ConfigError::Invalid(format!(
                "waves.octaves must be at least 1, got {}",
                self.waves.octaves
            )));
        }
        Ok(())
    }
}
