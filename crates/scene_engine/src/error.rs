//! Scene core errors
//!
//! Every failure in the scene core is local and synchronous: it is returned
//! from the call that detected it and nothing is retried internally. The
//! caller decides whether to abort the frame or skip the offending node or
//! light.

use thiserror::Error;

use crate::lighting::LightHandle;
use crate::scene::NodeId;

/// Result alias used throughout the scene core
pub type SceneResult<T> = Result<T, SceneError>;

/// Scene core errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A pose component (position, rotation, scale or parent matrix) was
    /// non-finite, or a scale component was negative
    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    /// The requested tree mutation would make a node its own ancestor
    #[error("Cycle detected: {child:?} is an ancestor of {parent:?}")]
    CycleDetected {
        /// Node that was asked to receive the child
        parent: NodeId,
        /// Node that would have been attached
        child: NodeId,
    },

    /// Orbit speed, radius, eccentricity or angle out of range
    #[error("Invalid orbit parameters: {0}")]
    InvalidOrbitParameters(String),

    /// Handle was never issued by the registry it was used with
    #[error("Unknown light handle: {0:?}")]
    UnknownLightHandle(LightHandle),

    /// Frame delta was negative or non-finite
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(f32),

    /// Node handle is stale or belongs to another scene graph
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    /// Jump launch velocity, gravity or ground level out of range
    #[error("Invalid jump parameters: {0}")]
    InvalidJumpParameters(String),

    /// The root node cannot be removed or given a parent
    #[error("The root node cannot be removed or re-parented")]
    RootNodeLocked,

    /// Operation needs a node carrying a render leaf
    #[error("Node {0:?} has no render leaf")]
    NotARenderLeaf(NodeId),
}

/// Reject negative or non-finite frame deltas
pub(crate) fn validate_timestep(dt: f32) -> SceneResult<()> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidTimestep(dt))
    }
}
