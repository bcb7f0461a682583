//! Light record

use crate::foundation::math::{Vec3, Vec4};

/// Point light as consumed by the renderer
///
/// `power` is a per-channel multiplier and may exceed 1.0 for HDR lighting.
/// `falloff_class` selects an attenuation curve implemented by the shading
/// collaborator; the scene core only stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// World space position
    pub position: Vec3,
    /// RGBA color
    pub color: Vec4,
    /// Per-channel intensity
    pub power: Vec4,
    /// Attenuation curve selector
    pub falloff_class: u32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            power: Vec4::new(1.0, 1.0, 1.0, 1.0),
            falloff_class: 0,
        }
    }
}

impl Light {
    /// Create a point light
    pub fn point(position: Vec3, color: Vec4, power: Vec4, falloff_class: u32) -> Self {
        Self {
            position,
            color,
            power,
            falloff_class,
        }
    }
}
