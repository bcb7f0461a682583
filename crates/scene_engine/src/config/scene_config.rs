//! Scene description files
//!
//! A [`SceneConfig`] names every light once and refers to lights by name from
//! the leaves that they shade. [`SceneConfig::build`] resolves those names to
//! registry handles and assembles a ready [`Scene`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::camera::{CameraRig, CameraRigConfig};
use crate::foundation::math::{utils, Transform, Vec3, Vec4};
use crate::lighting::{Light, LightHandle};
use crate::physics::JumpConfig;
use crate::scene::{Material, Node, NodeId, Orbit, OrbitParameters, RenderLeaf, Scene};

/// Complete scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Height the jump integrator treats as the floor
    pub ground_level: f32,
    /// Jump constants
    pub jump: JumpConfig,
    /// Player camera distances and starting mode
    pub camera: CameraRigConfig,
    /// Lights, registered in order
    pub lights: Vec<LightConfig>,
    /// Root of the node tree
    pub root: NodeConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ground_level: 0.0,
            jump: JumpConfig::default(),
            camera: CameraRigConfig::default(),
            lights: Vec::new(),
            root: NodeConfig::named("root"),
        }
    }
}

impl Config for SceneConfig {}

/// A named point light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Name leaves use to refer to this light
    pub name: String,
    /// World position
    pub position: [f32; 3],
    /// RGBA color
    pub color: [f32; 4],
    /// RGBA power
    pub power: [f32; 4],
    /// Attenuation curve selector
    pub falloff_class: u32,
    /// Shades every object, regardless of affiliation
    pub global: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        let light = Light::default();
        Self {
            name: String::new(),
            position: light.position.into(),
            color: light.color.into(),
            power: light.power.into(),
            falloff_class: light.falloff_class,
            global: false,
        }
    }
}

impl LightConfig {
    fn to_light(&self) -> Light {
        Light::point(
            Vec3::from(self.position),
            Vec4::from(self.color),
            Vec4::from(self.power),
            self.falloff_class,
        )
    }
}

/// Node transform with the rotation given as Euler angles in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Offset from the parent
    pub position: [f32; 3],
    /// Rotation about X, Y, Z in degrees
    pub rotation_degrees: [f32; 3],
    /// Per-axis scale
    pub scale: [f32; 3],
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation_degrees: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl TransformConfig {
    /// Validated transform
    pub fn to_transform(&self) -> Result<Transform, ConfigError> {
        Ok(Transform::from_euler_degrees(
            Vec3::from(self.position),
            Vec3::from(self.rotation_degrees),
            Vec3::from(self.scale),
        )?)
    }
}

/// Orbit description, angles in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Radians per second
    pub angular_speed: f32,
    /// Semi-major axis
    pub radius: f32,
    /// In [0, 1)
    pub eccentricity: f32,
    /// Tilt of the orbit plane about the parent's X axis
    pub inclination_degrees: f32,
    /// Starting angle along the orbit
    pub start_angle_degrees: f32,
    /// Turn the node towards its direction of travel
    pub face_direction: bool,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            angular_speed: 0.0,
            radius: 0.0,
            eccentricity: 0.0,
            inclination_degrees: 0.0,
            start_angle_degrees: 0.0,
            face_direction: false,
        }
    }
}

impl OrbitConfig {
    /// Validated orbit positioned at its starting angle
    pub fn to_orbit(&self) -> Result<Orbit, ConfigError> {
        let params = OrbitParameters {
            angular_speed: self.angular_speed,
            radius: self.radius,
            eccentricity: self.eccentricity,
            inclination: utils::deg_to_rad(self.inclination_degrees),
            face_direction: self.face_direction,
        };
        let mut orbit = Orbit::new(params)?;
        orbit.set_angle(utils::deg_to_rad(self.start_angle_degrees))?;
        Ok(orbit)
    }
}

/// Render payload of a node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafConfig {
    /// Asset key handed to the renderer
    pub asset: String,
    /// Phong material
    pub material: Material,
    /// Names of local lights shading this leaf
    pub lights: Vec<String>,
}

/// A node and its subtree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Unique node name
    pub name: String,
    /// Local transform; for orbiting nodes the position is ignored
    pub transform: TransformConfig,
    /// Makes this an orbiting node
    pub orbit: Option<OrbitConfig>,
    /// Makes this node drawable
    pub leaf: Option<LeafConfig>,
    /// Child nodes, in order
    pub children: Vec<NodeConfig>,
}

impl NodeConfig {
    /// Static node with an identity transform
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Node without any leaf light affiliations; those are added once the
    /// light handles exist
    fn to_node(&self) -> Result<Node, ConfigError> {
        let transform = self.transform.to_transform()?;
        let node = match &self.orbit {
            Some(orbit) => Node::new_orbiting(self.name.as_str(), transform, orbit.to_orbit()?)?,
            None => Node::new_static(self.name.as_str(), transform),
        };
        Ok(match &self.leaf {
            Some(leaf) => node.with_leaf(RenderLeaf::new(self.name.as_str(), leaf.asset.as_str()).with_material(leaf.material)),
            None => node,
        })
    }
}

/// Output of [`SceneConfig::build`]
#[derive(Debug)]
pub struct BuiltScene {
    /// The assembled scene, poses already computed
    pub scene: Scene,
    /// Light handles by configured name
    pub lights: HashMap<String, LightHandle>,
    /// Node ids by configured name
    pub nodes: HashMap<String, NodeId>,
    /// Player camera
    pub camera: CameraRig,
}

impl BuiltScene {
    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(name).copied()
    }

    /// Look up a light by name
    pub fn light(&self, name: &str) -> Option<LightHandle> {
        self.lights.get(name).copied()
    }
}

impl SceneConfig {
    /// Assemble the scene this description names
    pub fn build(&self) -> Result<BuiltScene, ConfigError> {
        let camera = CameraRig::new(self.camera)?;
        let mut scene = Scene::with_jump_config(self.root.to_node()?, self.ground_level, self.jump)?;

        let mut lights = HashMap::new();
        for light in &self.lights {
            if lights.contains_key(&light.name) {
                return Err(ConfigError::DuplicateName(light.name.clone()));
            }
            let handle = scene.add_light(light.to_light(), light.global);
            lights.insert(light.name.clone(), handle);
        }

        let mut nodes = HashMap::new();
        let root = scene.root();
        nodes.insert(self.root.name.clone(), root);
        affiliate(&mut scene, root, &self.root, &lights)?;
        for child in &self.root.children {
            build_subtree(&mut scene, root, child, &lights, &mut nodes)?;
        }

        scene.refresh_poses()?;
        log::info!(
            "Built scene: {} node(s), {} light(s), {} render leaf(s)",
            scene.graph().len(),
            scene.lights().len(),
            scene.render_items().len()
        );
        Ok(BuiltScene { scene, lights, nodes, camera })
    }
}

fn build_subtree(
    scene: &mut Scene,
    parent: NodeId,
    config: &NodeConfig,
    lights: &HashMap<String, LightHandle>,
    nodes: &mut HashMap<String, NodeId>,
) -> Result<(), ConfigError> {
    if nodes.contains_key(&config.name) {
        return Err(ConfigError::DuplicateName(config.name.clone()));
    }
    let id = scene.add_node(config.to_node()?, Some(parent))?;
    nodes.insert(config.name.clone(), id);
    affiliate(scene, id, config, lights)?;

    for child in &config.children {
        build_subtree(scene, id, child, lights, nodes)?;
    }
    Ok(())
}

fn affiliate(
    scene: &mut Scene,
    id: NodeId,
    config: &NodeConfig,
    lights: &HashMap<String, LightHandle>,
) -> Result<(), ConfigError> {
    let Some(leaf) = &config.leaf else {
        return Ok(());
    };
    for name in &leaf.lights {
        let handle = lights
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownLight(name.clone()))?;
        scene.add_affected_light(id, handle)?;
    }
    Ok(())
}
