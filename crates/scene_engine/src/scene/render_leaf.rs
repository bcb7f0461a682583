//! Render leaf capability
//!
//! A scene node carrying a `RenderLeaf` is drawn by the external renderer.
//! The core never touches geometry or shaders: `asset` is an opaque key the
//! asset collaborator resolves, and `material` is handed through unchanged.

use serde::{Deserialize, Serialize};

use super::LightAffiliation;
use crate::error::SceneResult;
use crate::foundation::math::Vec4;
use crate::lighting::{LightHandle, LightRegistry};

/// Phong material parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Ambient reflectance (RGBA)
    pub ambient: [f32; 4],
    /// Diffuse reflectance (RGBA)
    pub diffuse: [f32; 4],
    /// Specular reflectance (RGBA)
    pub specular: [f32; 4],
    /// Opacity, 1.0 is fully opaque
    pub transparency: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.1, 0.1, 0.1, 1.0],
            transparency: 1.0,
        }
    }
}

impl Material {
    /// Ambient reflectance as a vector
    pub fn ambient(&self) -> Vec4 {
        Vec4::from(self.ambient)
    }

    /// Diffuse reflectance as a vector
    pub fn diffuse(&self) -> Vec4 {
        Vec4::from(self.diffuse)
    }

    /// Specular reflectance as a vector
    pub fn specular(&self) -> Vec4 {
        Vec4::from(self.specular)
    }
}

/// Drawable payload attached to a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct RenderLeaf {
    /// Display name, used in logs
    pub name: String,
    /// Opaque model key resolved by the asset collaborator
    pub asset: String,
    /// Surface parameters
    pub material: Material,
    affiliation: LightAffiliation,
}

impl RenderLeaf {
    /// Create a leaf with the default material and no affiliated lights
    pub fn new(name: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset: asset.into(),
            material: Material::default(),
            affiliation: LightAffiliation::new(),
        }
    }

    /// Builder pattern: Set material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Affiliate a local light with this leaf (see [`LightAffiliation::add_affected_light`])
    pub fn add_affected_light(&mut self, registry: &LightRegistry, handle: LightHandle) -> SceneResult<bool> {
        self.affiliation.add_affected_light(registry, handle)
    }

    /// Explicitly affiliated lights
    pub fn affiliation(&self) -> &LightAffiliation {
        &self.affiliation
    }
}
