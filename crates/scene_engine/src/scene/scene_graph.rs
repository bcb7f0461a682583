//! Hierarchical scene graph
//!
//! Arena of [`Node`]s keyed by [`NodeId`]. The tree is strictly single-owner:
//! a node appears in at most one `children` list, removing a node removes its
//! whole subtree, and `add_child` refuses any mutation that would make a node
//! its own ancestor.
//!
//! World poses are computed top-down from the root: a node's world matrix is
//! always finalised before any of its children are visited. Sibling order is
//! insertion order but siblings never read each other's poses.

use slotmap::{SecondaryMap, SlotMap};

use super::{Node, NodeId, Orbit, OrbitParameters};
use crate::error::{validate_timestep, SceneError, SceneResult};
use crate::foundation::math::{is_finite_matrix, Mat4, Transform};

/// Orbits advanced by a tick but not yet written back
type PendingOrbits = SecondaryMap<NodeId, (Orbit, Transform)>;

/// Tree of scene nodes with a fixed root
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl SceneGraph {
    /// Create a graph whose root is `root`
    ///
    /// The root has an implicit identity parent pose.
    pub fn new(root: Node) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(root);
        Self { nodes, root }
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` refers to a live node of this graph
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> SceneResult<&Node> {
        self.nodes.get(id).ok_or(SceneError::UnknownNode(id))
    }

    pub(super) fn get_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Insert a node without a parent
    ///
    /// The node is a root candidate until it is attached with [`add_child`](Self::add_child).
    /// Any parent or children links carried by `node` are cleared.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = self.nodes.insert(node);
        log::debug!("Inserted node {:?} '{}'", id, self.nodes[id].name());
        id
    }

    /// Insert `node` directly under `parent`
    pub fn insert_child(&mut self, parent: NodeId, node: Node) -> SceneResult<NodeId> {
        // Check before inserting so a bad parent never leaves an orphan behind
        self.get(parent)?;
        let id = self.insert(node);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Make `child` the last child of `parent`
    ///
    /// Ownership moves: if `child` already had a parent it is removed from
    /// that parent's children first. Fails with `CycleDetected` when `child`
    /// is `parent` or one of its ancestors; the tree is untouched on failure.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.get(parent)?;
        self.get(child)?;
        if child == self.root {
            return Err(SceneError::RootNodeLocked);
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(SceneError::CycleDetected { parent, child });
        }

        self.unlink_from_parent(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        log::debug!("Attached {:?} under {:?}", child, parent);
        Ok(())
    }

    /// Remove `node` from its parent's children without destroying it
    ///
    /// The subtree stays in the arena as a root candidate. No-op for nodes
    /// without a parent.
    pub fn detach(&mut self, node: NodeId) -> SceneResult<()> {
        self.get(node)?;
        self.unlink_from_parent(node);
        Ok(())
    }

    /// Destroy `node` and its whole subtree
    ///
    /// Returns the number of nodes removed.
    pub fn remove(&mut self, node: NodeId) -> SceneResult<usize> {
        self.get(node)?;
        if node == self.root {
            return Err(SceneError::RootNodeLocked);
        }
        self.unlink_from_parent(node);

        let doomed: Vec<NodeId> = self.depth_first(node).collect();
        for id in &doomed {
            self.nodes.remove(*id);
        }
        log::debug!("Removed {} node(s) starting at {:?}", doomed.len(), node);
        Ok(doomed.len())
    }

    /// True when `ancestor` appears on the parent chain of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(Node::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(Node::parent);
        }
        false
    }

    /// Replace a node's configured transform
    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform) -> SceneResult<()> {
        self.get_mut(id)?.set_transform(transform)
    }

    /// Change speed, radius and eccentricity of an orbiting node
    pub fn set_orbit_parameters(
        &mut self,
        id: NodeId,
        angular_speed: f32,
        radius: f32,
        eccentricity: f32,
    ) -> SceneResult<()> {
        self.update_orbit(id, |orbit| orbit.set_parameters(angular_speed, radius, eccentricity))
    }

    /// Replace every orbit parameter of an orbiting node
    pub fn replace_orbit_parameters(&mut self, id: NodeId, params: OrbitParameters) -> SceneResult<()> {
        self.update_orbit(id, |orbit| orbit.replace_parameters(params))
    }

    /// Override the orbit angle of an orbiting node
    pub fn set_orbit_angle(&mut self, id: NodeId, angle: f32) -> SceneResult<()> {
        self.update_orbit(id, |orbit| orbit.set_angle(angle))
    }

    /// Toggle facing the direction of travel
    pub fn set_orbit_facing(&mut self, id: NodeId, face_direction: bool) -> SceneResult<()> {
        self.update_orbit(id, |orbit| {
            orbit.set_face_direction(face_direction);
            Ok(())
        })
    }

    /// Advance every orbiting node in the tree by `dt` and re-derive its local
    /// transform
    ///
    /// Nodes detached from the root are not ticked. Either every orbit
    /// advances or, on error, none does.
    pub fn tick_orbits(&mut self, dt: f32) -> SceneResult<()> {
        let ticked = self.plan_orbits(dt)?;
        self.commit_orbits(ticked);
        Ok(())
    }

    /// Recompute world matrices for the tree under the root
    ///
    /// Parents are always finalised before their children. Nothing is written
    /// unless every matrix is valid.
    pub fn update_world_poses(&mut self) -> SceneResult<()> {
        let poses = self.plan_world_poses(&SecondaryMap::new())?;
        self.commit_world_poses(poses);
        Ok(())
    }

    /// Tick orbits and recompute world poses as one step
    ///
    /// Both stages are computed before anything is written, so a failure in
    /// either leaves the graph exactly as it was.
    pub fn step(&mut self, dt: f32) -> SceneResult<()> {
        let ticked = self.plan_orbits(dt)?;
        let poses = self.plan_world_poses(&ticked)?;
        self.commit_orbits(ticked);
        self.commit_world_poses(poses);
        Ok(())
    }

    /// World matrix of a node from the most recent pose update
    pub fn world_matrix(&self, id: NodeId) -> SceneResult<Mat4> {
        Ok(*self.get(id)?.world_matrix())
    }

    /// Depth-first, parent-before-children walk starting at `start`
    pub fn depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        let stack = if self.nodes.contains_key(start) { vec![start] } else { Vec::new() };
        DepthFirst { graph: self, stack }
    }

    /// Depth-first walk of the tree under the root
    pub fn traverse(&self) -> DepthFirst<'_> {
        self.depth_first(self.root)
    }

    fn unlink_from_parent(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child].parent.take() {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|id| *id != child);
            }
        }
    }

    fn plan_orbits(&self, dt: f32) -> SceneResult<PendingOrbits> {
        validate_timestep(dt)?;
        let mut ticked = SecondaryMap::new();
        for id in self.traverse() {
            if let Some(update) = self.get(id)?.ticked_orbit(dt)? {
                ticked.insert(id, update);
            }
        }
        Ok(ticked)
    }

    fn commit_orbits(&mut self, ticked: PendingOrbits) {
        for (id, (orbit, local)) in ticked {
            if let Some(node) = self.nodes.get_mut(id) {
                node.commit_orbit(orbit, local);
            }
        }
    }

    /// World matrices for the tree under the root, reading local transforms
    /// from `pending` where present
    fn plan_world_poses(&self, pending: &PendingOrbits) -> SceneResult<Vec<(NodeId, Mat4)>> {
        let mut poses = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, Mat4::identity())];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let local = pending.get(id).map_or_else(|| node.local_transform(), |(_, local)| local);
            let world = local.world_matrix(&parent_world)?;
            if !is_finite_matrix(&world) {
                return Err(SceneError::InvalidTransform(format!(
                    "world matrix of node '{}' is not finite",
                    node.name()
                )));
            }
            poses.push((id, world));
            // Reverse so children are visited in insertion order
            stack.extend(node.children().iter().rev().map(|child| (*child, world)));
        }
        Ok(poses)
    }

    fn commit_world_poses(&mut self, poses: Vec<(NodeId, Mat4)>) {
        let count = poses.len();
        for (id, world) in poses {
            if let Some(node) = self.nodes.get_mut(id) {
                node.set_world(world);
            }
        }
        log::trace!("Updated world poses for {} node(s)", count);
    }

    /// Apply `change` to a copy of the node's orbit and commit only if the
    /// change and the re-derived local transform both succeed
    fn update_orbit(
        &mut self,
        id: NodeId,
        change: impl FnOnce(&mut Orbit) -> SceneResult<()>,
    ) -> SceneResult<()> {
        let node = self.get_mut(id)?;
        let mut orbit = node
            .orbit()
            .cloned()
            .ok_or_else(|| SceneError::InvalidOrbitParameters(format!("node {:?} is not orbiting", id)))?;
        change(&mut orbit)?;

        let mut updated = node.clone();
        if let Some(slot) = updated.orbit_mut() {
            *slot = orbit;
        }
        updated.refresh_local()?;
        *node = updated;
        Ok(())
    }
}

/// Iterator returned by [`SceneGraph::depth_first`]
pub struct DepthFirst<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        if let Some(node) = self.graph.nodes.get(id) {
            self.stack.extend(node.children().iter().rev().copied());
        }
        Some(id)
    }
}
