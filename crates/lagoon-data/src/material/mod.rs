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

//! Materials: a shared program plus the values and fixed-function state to draw with.

use lagoon_core::renderer::{
    BlendState, CompareFunction, CullMode, ShaderError, ShaderProgram, UniformLocation, UniformValue,
};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A material value already resolved against its program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialValue {
    /// A member of the uniform block.
    Uniform(UniformLocation, UniformValue),
    /// A texture bound to a slot.
    Texture(u32, UniformValue),
}

/// A shader program with the values and fixed-function state to draw it with.
///
/// Transparency is not stored: it follows from the blend state, so changing
/// the blend state of a shared material reclassifies every model using it.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    program: Arc<ShaderProgram>,
    values: BTreeMap<String, MaterialValue>,
    blend: Option<BlendState>,
    depth_test: bool,
    depth_write: bool,
    depth_compare: CompareFunction,
    cull: Option<CullMode>,
}

impl Material {
    /// An opaque material: no blending, depth test and write on, back faces culled.
    pub fn new(name: impl Into<String>, program: Arc<ShaderProgram>) -> Self {
        Self {
            name: name.into(),
            program,
            values: BTreeMap::new(),
            blend: None,
            depth_test: true,
            depth_write: true,
            depth_compare: CompareFunction::Less,
            cull: Some(CullMode::Back),
        }
    }

    /// The debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared program.
    pub fn program(&self) -> &Arc<ShaderProgram> {
        &self.program
    }

    /// Assigns a value to the uniform or texture slot called `name`.
    ///
    /// # Errors
    /// [`ShaderError::MissingUniform`] if the program declares no such member or
    /// slot, [`ShaderError::TypeMismatch`] if the value has the wrong type.
    pub fn set_uniform_value(
        &mut self,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<(), ShaderError> {
        let value = value.into();
        let resolved = match value.kind() {
            None => {
                let slot = self.program.texture_slot(name).ok_or_else(|| {
                    ShaderError::MissingUniform {
                        program: self.program.label().to_string(),
                        name: name.to_string(),
                    }
                })?;
                MaterialValue::Texture(slot, value)
            }
            Some(kind) => {
                let location = self.program.uniform(name)?;
                if location.kind != kind {
                    return Err(ShaderError::TypeMismatch {
                        name: name.to_string(),
                        expected: location.kind,
                        found: format!("{kind:?}"),
                    });
                }
                MaterialValue::Uniform(location, value)
            }
        };
        self.values.insert(name.to_string(), resolved);
        Ok(())
    }

    /// Removes the value assigned to `name`; returns whether there was one.
    ///
    /// A texture slot left without a value is not bound by draws.
    pub fn clear_value(&mut self, name: &str) -> bool {
        self.values.remove(name).is_some()
    }

    /// The value assigned to `name`, if any.
    pub fn uniform_value(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).map(|v| match *v {
            MaterialValue::Uniform(_, value) | MaterialValue::Texture(_, value) => value,
        })
    }

    /// Every assigned value, in name order.
    pub fn values(&self) -> impl Iterator<Item = &MaterialValue> {
        self.values.values()
    }

    /// The blend state; `None` overwrites the target.
    pub fn blend_state(&self) -> Option<BlendState> {
        self.blend
    }

    /// Replaces the blend state.
    pub fn set_blend_state(&mut self, blend: Option<BlendState>) {
        self.blend = blend;
    }

    /// Whether draws test against the depth buffer.
    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    /// Enables or disables the depth test.
    pub fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    /// Whether draws write depth.
    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    /// Enables or disables depth writes.
    pub fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    /// The depth comparison of the first lighting batch.
    pub fn depth_compare(&self) -> CompareFunction {
        self.depth_compare
    }

    /// Replaces the depth comparison; geometry drawn at the far plane needs
    /// [`CompareFunction::LessEqual`].
    pub fn set_depth_compare(&mut self, compare: CompareFunction) {
        self.depth_compare = compare;
    }

    /// Face culling.
    pub fn cull(&self) -> Option<CullMode> {
        self.cull
    }

    /// Replaces face culling.
    pub fn set_cull(&mut self, cull: Option<CullMode>) {
        self.cull = cull;
    }

    /// `true` if the blend state actually blends.
    pub fn is_transparent(&self) -> bool {
        self.blend.is_some_and(|b| b.blends())
    }
}

/// A reference-counted, mutable handle to a [`Material`].
///
/// Models share materials through this handle; edits are visible to every
/// model on the next visit.
#[derive(Debug, Clone)]
pub struct MaterialHandle(Arc<RwLock<Material>>);

impl MaterialHandle {
    /// Wraps a material.
    pub fn new(material: Material) -> Self {
        Self(Arc::new(RwLock::new(material)))
    }

    /// Read access.
    pub fn read(&self) -> RwLockReadGuard<'_, Material> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Material> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` if both handles point at the same material.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Material> for MaterialHandle {
    fn from(material: Material) -> Self {
        Self::new(material)
    }
}
