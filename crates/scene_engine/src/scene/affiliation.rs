//! Per-object light affiliation
//!
//! A render leaf keeps the set of local lights that should shade it. Global
//! lights are never stored here; the consumer adds them when it resolves the
//! final light list (see `Scene::resolve_lights`).

use std::collections::BTreeSet;

use crate::error::SceneResult;
use crate::lighting::{LightHandle, LightRegistry};

/// Explicit set of lights affecting one object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightAffiliation {
    lights: BTreeSet<LightHandle>,
}

impl LightAffiliation {
    /// Create an empty affiliation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a light after checking it exists in `registry`
    ///
    /// Idempotent. Returns whether the handle was newly added.
    pub fn add_affected_light(&mut self, registry: &LightRegistry, handle: LightHandle) -> SceneResult<bool> {
        registry.validate(handle)?;
        Ok(self.lights.insert(handle))
    }

    /// Handles added so far, in registration order
    pub fn affected_lights(&self) -> &BTreeSet<LightHandle> {
        &self.lights
    }

    /// Whether `handle` is affiliated
    pub fn contains(&self, handle: LightHandle) -> bool {
        self.lights.contains(&handle)
    }

    /// Number of affiliated lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// True when no light is affiliated
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Check every stored handle against `registry`
    pub(crate) fn validate_against(&self, registry: &LightRegistry) -> SceneResult<()> {
        self.lights.iter().try_for_each(|handle| registry.validate(*handle))
    }
}
