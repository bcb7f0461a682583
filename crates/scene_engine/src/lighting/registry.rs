//! Light Registry for stable light identity
//!
//! The registry is a dense, append-only store. Lights are never removed and
//! handles are never reused, so a handle that resolves once resolves for the
//! registry's whole lifetime. Each registry instance stamps its handles with
//! its own id, which makes handles from another registry fail to resolve.

use std::sync::atomic::{AtomicU32, Ordering};

use super::Light;
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::Vec4;

static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(1);

/// Stable reference to a light stored in a [`LightRegistry`]
///
/// Deliberately not constructible from a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightHandle {
    registry: u32,
    index: usize,
}

impl LightHandle {
    /// Dense slot index inside the issuing registry (e.g. a shader array slot)
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone)]
struct LightEntry {
    light: Light,
    global: bool,
}

/// Central store for scene lights
#[derive(Debug)]
pub struct LightRegistry {
    id: u32,
    entries: Vec<LightEntry>,
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LightRegistry {
    /// Create an empty registry with a fresh identity
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            entries: Vec::new(),
        }
    }

    /// Append a light and return its handle
    ///
    /// Global lights (e.g. a sun) illuminate every object and bypass
    /// per-object affiliation.
    pub fn add_light(&mut self, light: Light, is_global: bool) -> LightHandle {
        let handle = LightHandle {
            registry: self.id,
            index: self.entries.len(),
        };
        log::debug!(
            "Registered {} light #{} at {:?}",
            if is_global { "global" } else { "local" },
            handle.index,
            light.position
        );
        self.entries.push(LightEntry { light, global: is_global });
        handle
    }

    /// Resolve a handle to its light record
    pub fn get(&self, handle: LightHandle) -> SceneResult<&Light> {
        self.entry(handle).map(|entry| &entry.light)
    }

    /// Whether the handle refers to a global light
    pub fn is_global(&self, handle: LightHandle) -> SceneResult<bool> {
        self.entry(handle).map(|entry| entry.global)
    }

    /// Whether the handle was issued by this registry
    pub fn contains(&self, handle: LightHandle) -> bool {
        self.entry(handle).is_ok()
    }

    /// Fail with `UnknownLightHandle` unless the handle was issued here
    pub fn validate(&self, handle: LightHandle) -> SceneResult<()> {
        self.entry(handle).map(|_| ())
    }

    /// Change a light's color in place
    pub fn set_color(&mut self, handle: LightHandle, color: Vec4) -> SceneResult<()> {
        self.entry_mut(handle)?.light.color = color;
        Ok(())
    }

    /// Change a light's power in place
    pub fn set_power(&mut self, handle: LightHandle, power: Vec4) -> SceneResult<()> {
        self.entry_mut(handle)?.light.power = power;
        Ok(())
    }

    /// Handles of all global lights, in registration order
    pub fn global_lights(&self) -> Vec<LightHandle> {
        self.handles_where(|entry| entry.global)
    }

    /// Handles of all local lights, in registration order
    pub fn local_lights(&self) -> Vec<LightHandle> {
        self.handles_where(|entry| !entry.global)
    }

    /// Iterate over `(handle, light, is_global)` in registration order
    pub fn iter(&self) -> impl Iterator<Item = (LightHandle, &Light, bool)> + '_ {
        self.entries.iter().enumerate().map(move |(index, entry)| {
            (LightHandle { registry: self.id, index }, &entry.light, entry.global)
        })
    }

    /// Number of registered lights
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no light has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn handles_where(&self, predicate: impl Fn(&LightEntry) -> bool) -> Vec<LightHandle> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| predicate(entry))
            .map(|(index, _)| LightHandle { registry: self.id, index })
            .collect()
    }

    fn entry(&self, handle: LightHandle) -> SceneResult<&LightEntry> {
        if handle.registry != self.id {
            return Err(SceneError::UnknownLightHandle(handle));
        }
        self.entries
            .get(handle.index)
            .ok_or(SceneError::UnknownLightHandle(handle))
    }

    fn entry_mut(&mut self, handle: LightHandle) -> SceneResult<&mut LightEntry> {
        if handle.registry != self.id {
            return Err(SceneError::UnknownLightHandle(handle));
        }
        self.entries
            .get_mut(handle.index)
            .ok_or(SceneError::UnknownLightHandle(handle))
    }
}
