//! Scene management system
//!
//! A tree of spatially related nodes whose world poses are composed top-down
//! from their parents. Nodes are either static or orbiting; either kind can
//! carry a [`RenderLeaf`] that the renderer draws.
//!
//! ## Architecture
//!
//! ```text
//! Scene (composition root)
//!   ├── SceneGraph   (node arena, parent → children)
//!   ├── LightRegistry
//!   └── DisplacementIntegrator
//! ```
//!
//! Per frame, [`Scene::advance`] ticks the jump integrator, then every orbit,
//! then recomputes world poses, so render traversal never sees a pose that
//! lags a frame behind its parent.

mod affiliation;
mod node;
mod orbit;
mod render_leaf;
mod scene_graph;
mod scene_manager;

pub use affiliation::LightAffiliation;
pub use node::{Node, NodeId, NodeKind};
pub use orbit::{Orbit, OrbitParameters};
pub use render_leaf::{Material, RenderLeaf};
pub use scene_graph::{DepthFirst, SceneGraph};
pub use scene_manager::{RenderItem, Scene};
