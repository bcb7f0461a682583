//! Scene - composition root of the scene core
//!
//! Owns the node tree, the light registry and the jump integrator, and runs
//! the per-frame update in a fixed order:
//!
//! 1. integrator tick (vertical jump offset)
//! 2. orbit tick for every orbiting node
//! 3. world pose update, parents before children
//!
//! Render leaves only exist inside the tree. There is no way to detach a
//! leaf and leave it dangling: it is either re-parented or removed.

use std::collections::BTreeSet;

use super::{Node, NodeId, OrbitParameters, RenderLeaf, SceneGraph};
use crate::error::{validate_timestep, SceneError, SceneResult};
use crate::foundation::math::{Mat4, Transform, Vec4};
use crate::lighting::{Light, LightHandle, LightRegistry};
use crate::physics::{DisplacementIntegrator, JumpConfig};

/// One drawable object produced by [`Scene::render_items`]
#[derive(Debug, Clone)]
pub struct RenderItem<'a> {
    /// Node carrying the leaf
    pub node: NodeId,
    /// Drawable payload
    pub leaf: &'a RenderLeaf,
    /// World matrix from the last pose update
    pub world: Mat4,
    /// Explicitly affiliated lights; global lights are not included
    pub affected_lights: &'a BTreeSet<LightHandle>,
}

/// Scene context passed through the application lifecycle
#[derive(Debug)]
pub struct Scene {
    graph: SceneGraph,
    lights: LightRegistry,
    integrator: DisplacementIntegrator,
    frame: u64,
    elapsed: f32,
}

impl Scene {
    /// Create a scene with the default jump constants
    pub fn new(root: Node, ground_level: f32) -> SceneResult<Self> {
        Self::with_jump_config(root, ground_level, JumpConfig::default())
    }

    /// Create a scene with custom jump constants
    pub fn with_jump_config(root: Node, ground_level: f32, jump: JumpConfig) -> SceneResult<Self> {
        let lights = LightRegistry::new();
        if let Some(leaf) = root.leaf() {
            leaf.affiliation().validate_against(&lights)?;
        }
        let integrator = DisplacementIntegrator::with_config(ground_level, jump)?;
        let mut graph = SceneGraph::new(root);
        graph.update_world_poses()?;

        log::info!("Scene created (ground level {:.2})", ground_level);
        Ok(Self {
            graph,
            lights,
            integrator,
            frame: 0,
            elapsed: 0.0,
        })
    }

    /// Advance the scene by `dt` seconds
    ///
    /// `dt` is checked before anything is mutated. The jump is ticked on a
    /// copy that is kept only once the orbit and pose step succeeds, so a
    /// failed frame leaves the whole scene as it was.
    pub fn advance(&mut self, dt: f32) -> SceneResult<()> {
        validate_timestep(dt)?;

        let mut integrator = self.integrator.clone();
        integrator.tick(dt)?;
        self.graph.step(dt)?;
        self.integrator = integrator;

        self.frame += 1;
        self.elapsed += dt;
        log::trace!(
            "Frame {} advanced by {:.4}s (jump offset {:.3})",
            self.frame,
            dt,
            self.integrator.current_offset()
        );
        Ok(())
    }

    /// Recompute world poses without advancing time
    ///
    /// Useful after building or editing the tree, before the first frame.
    pub fn refresh_poses(&mut self) -> SceneResult<()> {
        self.graph.update_world_poses()
    }

    // ------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------

    /// Attach a render leaf under `parent`, or under the root when `None`
    ///
    /// Every affiliated light must come from this scene's registry.
    pub fn add_leaf_object(
        &mut self,
        leaf: RenderLeaf,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> SceneResult<NodeId> {
        let name = leaf.name.clone();
        self.add_node(Node::new_static(name, transform).with_leaf(leaf), parent)
    }

    /// Attach any node (static or orbiting, with or without a leaf)
    pub fn add_node(&mut self, node: Node, parent: Option<NodeId>) -> SceneResult<NodeId> {
        if let Some(leaf) = node.leaf() {
            leaf.affiliation().validate_against(&self.lights)?;
        }
        let parent = parent.unwrap_or_else(|| self.graph.root());
        self.graph.insert_child(parent, node)
    }

    /// Move `node` and its subtree under `new_parent`
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> SceneResult<()> {
        self.graph.add_child(new_parent, node)
    }

    /// Destroy `node` and its subtree, returning how many nodes were removed
    pub fn remove_node(&mut self, node: NodeId) -> SceneResult<usize> {
        self.graph.remove(node)
    }

    /// Replace a node's configured transform
    pub fn set_local_transform(&mut self, node: NodeId, transform: Transform) -> SceneResult<()> {
        self.graph.set_local_transform(node, transform)
    }

    /// Change speed, radius and eccentricity of an orbiting node
    pub fn set_orbit_parameters(
        &mut self,
        node: NodeId,
        angular_speed: f32,
        radius: f32,
        eccentricity: f32,
    ) -> SceneResult<()> {
        self.graph.set_orbit_parameters(node, angular_speed, radius, eccentricity)
    }

    /// Replace every orbit parameter of an orbiting node
    pub fn replace_orbit_parameters(&mut self, node: NodeId, params: OrbitParameters) -> SceneResult<()> {
        self.graph.replace_orbit_parameters(node, params)
    }

    /// Override the orbit angle of an orbiting node
    pub fn set_orbit_angle(&mut self, node: NodeId, angle: f32) -> SceneResult<()> {
        self.graph.set_orbit_angle(node, angle)
    }

    /// Toggle facing the direction of travel on an orbiting node
    pub fn set_orbit_facing(&mut self, node: NodeId, face_direction: bool) -> SceneResult<()> {
        self.graph.set_orbit_facing(node, face_direction)
    }

    /// Read access to the tree
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    // ------------------------------------------------------------------
    // Lights
    // ------------------------------------------------------------------

    /// Register a light
    pub fn add_light(&mut self, light: Light, is_global: bool) -> LightHandle {
        self.lights.add_light(light, is_global)
    }

    /// Affiliate a light with the leaf carried by `node`
    ///
    /// Returns whether the handle was newly added.
    pub fn add_affected_light(&mut self, node: NodeId, handle: LightHandle) -> SceneResult<bool> {
        let lights = &self.lights;
        let leaf = self
            .graph
            .get_mut(node)?
            .leaf_mut()
            .ok_or(SceneError::NotARenderLeaf(node))?;
        leaf.add_affected_light(lights, handle)
    }

    /// Change a light's color
    pub fn set_light_color(&mut self, handle: LightHandle, color: Vec4) -> SceneResult<()> {
        self.lights.set_color(handle, color)
    }

    /// Change a light's power
    pub fn set_light_power(&mut self, handle: LightHandle, power: Vec4) -> SceneResult<()> {
        self.lights.set_power(handle, power)
    }

    /// Read access to the light registry
    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    /// Lights that shade `item`: every global light, then the explicit ones
    ///
    /// A global light that was also affiliated explicitly appears once.
    pub fn resolve_lights(&self, item: &RenderItem<'_>) -> SceneResult<Vec<LightHandle>> {
        let mut resolved = self.lights.global_lights();
        for handle in item.affected_lights {
            if !self.lights.is_global(*handle)? {
                resolved.push(*handle);
            }
        }
        Ok(resolved)
    }

    // ------------------------------------------------------------------
    // Jump
    // ------------------------------------------------------------------

    /// Start a jump if the integrator is grounded
    pub fn request_jump(&mut self) -> bool {
        self.integrator.request_jump()
    }

    /// Vertical offset above the ground level
    pub fn current_offset(&self) -> f32 {
        self.integrator.current_offset()
    }

    /// Read access to the jump integrator
    pub fn integrator(&self) -> &DisplacementIntegrator {
        &self.integrator
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Every render leaf reachable from the root, parents before children
    pub fn render_items(&self) -> Vec<RenderItem<'_>> {
        self.graph
            .traverse()
            .filter_map(|id| {
                let node = self.graph.get(id).ok()?;
                let leaf = node.leaf()?;
                Some(RenderItem {
                    node: id,
                    leaf,
                    world: *node.world_matrix(),
                    affected_lights: leaf.affiliation().affected_lights(),
                })
            })
            .collect()
    }

    /// Frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds advanced so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::JumpPhase;
    use approx::assert_relative_eq;

    fn scene() -> Scene {
        Scene::new(Node::new_static("root", Transform::identity()), 0.0).unwrap()
    }

    fn at(x: f32, y: f32, z: f32) -> Transform {
        Transform::from_position(Vec3::new(x, y, z)).unwrap()
    }

    #[test]
    fn test_leaf_defaults_to_root() {
        let mut scene = scene();
        let id = scene.add_leaf_object(RenderLeaf::new("house", "monster_house"), at(1.0, 0.0, 0.0), None).unwrap();

        assert_eq!(scene.graph().get(id).unwrap().parent(), Some(scene.root()));
        assert_eq!(scene.graph().get(id).unwrap().name(), "house");
    }

    #[test]
    fn test_leaf_with_foreign_light_is_rejected() {
        let mut scene = scene();
        let mut other = LightRegistry::new();
        let foreign = other.add_light(Light::default(), false);
        let mut leaf = RenderLeaf::new("lamp", "lamp");
        leaf.add_affected_light(&other, foreign).unwrap();

        assert_eq!(
            scene.add_leaf_object(leaf, Transform::identity(), None),
            Err(SceneError::UnknownLightHandle(foreign))
        );
        assert_eq!(scene.graph().len(), 1);
    }

    #[test]
    fn test_add_affected_light_needs_leaf() {
        let mut scene = scene();
        let lamp = scene.add_light(Light::default(), false);
        let group = scene.add_node(Node::new_static("group", Transform::identity()), None).unwrap();
        let leaf = scene.add_leaf_object(RenderLeaf::new("floor", "floor"), Transform::identity(), Some(group)).unwrap();

        assert_eq!(scene.add_affected_light(group, lamp), Err(SceneError::NotARenderLeaf(group)));
        assert_eq!(scene.add_affected_light(leaf, lamp), Ok(true));
        assert_eq!(scene.add_affected_light(leaf, lamp), Ok(false));
    }

    #[test]
    fn test_resolve_lights_puts_globals_first() {
        let mut scene = scene();
        let lamp = scene.add_light(Light::default(), false);
        let sun = scene.add_light(Light::default(), true);
        let unrelated = scene.add_light(Light::default(), false);
        let id = scene.add_leaf_object(RenderLeaf::new("house", "house"), Transform::identity(), None).unwrap();
        scene.add_affected_light(id, lamp).unwrap();
        scene.add_affected_light(id, sun).unwrap();

        let items = scene.render_items();
        let resolved = scene.resolve_lights(&items[0]).unwrap();

        assert_eq!(resolved, vec![sun, lamp]);
        assert!(!resolved.contains(&unrelated));
    }

    #[test]
    fn test_reparent_moves_subtree() {
        let mut scene = scene();
        let a = scene.add_node(Node::new_static("a", at(10.0, 0.0, 0.0)), None).unwrap();
        let b = scene.add_node(Node::new_static("b", at(0.0, 0.0, -10.0)), None).unwrap();
        let leaf = scene.add_leaf_object(RenderLeaf::new("crate", "crate"), at(0.0, 1.0, 0.0), Some(a)).unwrap();

        scene.reparent(leaf, b).unwrap();
        scene.advance(0.0).unwrap();

        assert_relative_eq!(
            scene.graph().get(leaf).unwrap().world_position(),
            Vec3::new(0.0, 1.0, -10.0),
            epsilon = 1e-5
        );
        assert_eq!(scene.reparent(scene.root(), b), Err(SceneError::RootNodeLocked));
        assert_eq!(scene.reparent(b, leaf), Err(SceneError::CycleDetected { parent: leaf, child: b }));
    }

    #[test]
    fn test_removed_leaf_leaves_render_items() {
        let mut scene = scene();
        let keep = scene.add_leaf_object(RenderLeaf::new("keep", "keep"), Transform::identity(), None).unwrap();
        let drop = scene.add_leaf_object(RenderLeaf::new("drop", "drop"), Transform::identity(), None).unwrap();

        scene.remove_node(drop).unwrap();

        let nodes: Vec<NodeId> = scene.render_items().iter().map(|item| item.node).collect();
        assert_eq!(nodes, vec![keep]);
    }

    #[test]
    fn test_jump_runs_through_advance() {
        let mut scene = scene();
        assert!(scene.request_jump());
        scene.advance(0.25).unwrap();

        assert_eq!(scene.integrator().phase(), JumpPhase::Ascending);
        assert!(scene.current_offset() > 0.0);

        for _ in 0..20 {
            scene.advance(0.1).unwrap();
        }
        assert_eq!(scene.integrator().phase(), JumpPhase::Grounded);
        assert_eq!(scene.current_offset(), 0.0);
    }

    #[test]
    fn test_invalid_dt_counts_no_frame() {
        let mut scene = scene();
        scene.advance(0.5).unwrap();

        assert!(matches!(scene.advance(f32::NAN), Err(SceneError::InvalidTimestep(_))));
        assert_eq!(scene.advance(-1.0), Err(SceneError::InvalidTimestep(-1.0)));
        assert_eq!(scene.frame_count(), 1);
        assert_relative_eq!(scene.elapsed(), 0.5);
    }
}
