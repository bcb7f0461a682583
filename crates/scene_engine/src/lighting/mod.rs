//! Point lights and the append-only light registry
//!
//! Lights are not part of the node hierarchy: their positions are world-space
//! values held by the [`LightRegistry`]. Render leaves refer to them through
//! [`LightHandle`]s (see `scene::affiliation`).

mod light;
mod registry;

pub use light::Light;
pub use registry::{LightHandle, LightRegistry};
