//! Scene graph nodes
//!
//! Nodes live in the [`SceneGraph`](super::SceneGraph) arena and are referred
//! to by [`NodeId`]. The parent link is a plain id used for upward queries;
//! ownership follows the `children` lists.

use slotmap::new_key_type;

use super::{Orbit, RenderLeaf};
use crate::error::SceneResult;
use crate::foundation::math::{matrix_translation, Mat4, Transform, Vec3};

new_key_type! {
    /// Opaque handle to a node in a scene graph
    pub struct NodeId;
}

/// How a node's local transform is produced
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Local transform is set directly
    Static,
    /// Local position is derived from the orbit every frame
    Orbiting(Orbit),
}

/// A node of the scene tree
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    kind: NodeKind,
    /// Configured transform; for orbiting nodes only rotation and scale are used
    base: Transform,
    /// Effective local transform fed into pose composition
    local: Transform,
    world: Mat4,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    leaf: Option<RenderLeaf>,
}

impl Node {
    /// Create a node whose local transform is set directly
    pub fn new_static(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Static,
            base: transform.clone(),
            local: transform,
            world: Mat4::identity(),
            parent: None,
            children: Vec::new(),
            leaf: None,
        }
    }

    /// Create an orbiting node
    ///
    /// `base` supplies rotation and scale; its position is ignored because the
    /// orbit owns it.
    pub fn new_orbiting(name: impl Into<String>, base: Transform, orbit: Orbit) -> SceneResult<Self> {
        let local = orbit.local_transform(&base)?;
        Ok(Self {
            name: name.into(),
            kind: NodeKind::Orbiting(orbit),
            base,
            local,
            world: Mat4::identity(),
            parent: None,
            children: Vec::new(),
            leaf: None,
        })
    }

    /// Builder pattern: Attach a render leaf
    pub fn with_leaf(mut self, leaf: RenderLeaf) -> Self {
        self.leaf = Some(leaf);
        self
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Static or orbiting
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Orbit state, if this is an orbiting node
    pub fn orbit(&self) -> Option<&Orbit> {
        match &self.kind {
            NodeKind::Orbiting(orbit) => Some(orbit),
            NodeKind::Static => None,
        }
    }

    /// Effective local transform
    pub fn local_transform(&self) -> &Transform {
        &self.local
    }

    /// World matrix from the most recent pose update
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    /// World position from the most recent pose update
    pub fn world_position(&self) -> Vec3 {
        matrix_translation(&self.world)
    }

    /// Parent node, `None` for the root and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Render payload, if this node is drawn
    pub fn leaf(&self) -> Option<&RenderLeaf> {
        self.leaf.as_ref()
    }

    pub(super) fn leaf_mut(&mut self) -> Option<&mut RenderLeaf> {
        self.leaf.as_mut()
    }

    pub(super) fn orbit_mut(&mut self) -> Option<&mut Orbit> {
        match &mut self.kind {
            NodeKind::Orbiting(orbit) => Some(orbit),
            NodeKind::Static => None,
        }
    }

    /// Replace the configured transform
    ///
    /// For orbiting nodes the position component is discarded and the local
    /// transform is re-derived from the orbit.
    pub(super) fn set_transform(&mut self, transform: Transform) -> SceneResult<()> {
        match &self.kind {
            NodeKind::Static => {
                self.local = transform.clone();
            }
            NodeKind::Orbiting(orbit) => {
                self.local = orbit.local_transform(&transform)?;
            }
        }
        self.base = transform;
        Ok(())
    }

    /// Recompute the local transform from the orbit (no-op for static nodes)
    pub(super) fn refresh_local(&mut self) -> SceneResult<()> {
        if let NodeKind::Orbiting(orbit) = &self.kind {
            self.local = orbit.local_transform(&self.base)?;
        }
        Ok(())
    }

    /// Orbit and local transform this node would have after `dt` seconds
    ///
    /// The node itself is not modified. Static nodes yield `None`.
    pub(super) fn ticked_orbit(&self, dt: f32) -> SceneResult<Option<(Orbit, Transform)>> {
        let Some(orbit) = self.orbit() else {
            return Ok(None);
        };
        let mut orbit = orbit.clone();
        orbit.tick(dt)?;
        let local = orbit.local_transform(&self.base)?;
        Ok(Some((orbit, local)))
    }

    pub(super) fn commit_orbit(&mut self, orbit: Orbit, local: Transform) {
        if let NodeKind::Orbiting(slot) = &mut self.kind {
            *slot = orbit;
            self.local = local;
        }
    }

    pub(super) fn set_world(&mut self, world: Mat4) {
        self.world = world;
    }
}
