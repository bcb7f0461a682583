//! Integration tests for light resolution across a scene tree

use std::collections::HashMap;

use crate::foundation::math::{Transform, Vec3, Vec4};
use crate::lighting::{Light, LightHandle};
use crate::scene::{Node, NodeId, RenderLeaf, Scene};

struct Moonbase {
    scene: Scene,
    sun: LightHandle,
    interior: LightHandle,
    greenhouse_lamp: LightHandle,
    nodes: HashMap<&'static str, NodeId>,
}

fn moonbase() -> Moonbase {
    let mut scene = Scene::new(Node::new_static("root", Transform::identity()), 0.0).unwrap();
    let white = Vec4::new(1.0, 1.0, 1.0, 1.0);
    let sun = scene.add_light(Light::point(Vec3::new(0.0, 500.0, 0.0), white, Vec4::new(50.0, 50.0, 50.0, 1.0), 0), true);
    let interior = scene.add_light(Light::point(Vec3::new(0.0, 3.0, 0.0), white, Vec4::new(5.0, 6.0, 5.0, 1.0), 3), false);
    let greenhouse_lamp = scene.add_light(Light::point(Vec3::new(8.0, 2.0, 0.0), white, Vec4::new(4.0, 4.0, 4.0, 1.0), 3), false);

    let mut nodes = HashMap::new();
    let floor = scene.add_leaf_object(RenderLeaf::new("floor", "moon_floor"), Transform::identity(), None).unwrap();
    let house = scene.add_leaf_object(RenderLeaf::new("house", "house"), Transform::identity(), None).unwrap();
    let greenhouse = scene
        .add_leaf_object(
            RenderLeaf::new("greenhouse", "greenhouse"),
            Transform::from_position(Vec3::new(8.0, 0.0, 0.0)).unwrap(),
            Some(house),
        )
        .unwrap();
    scene.add_affected_light(house, interior).unwrap();
    scene.add_affected_light(greenhouse, greenhouse_lamp).unwrap();
    scene.add_affected_light(greenhouse, interior).unwrap();
    nodes.insert("floor", floor);
    nodes.insert("house", house);
    nodes.insert("greenhouse", greenhouse);

    scene.advance(0.0).unwrap();
    Moonbase { scene, sun, interior, greenhouse_lamp, nodes }
}

fn resolved_for(base: &Moonbase, name: &str) -> Vec<LightHandle> {
    let node = base.nodes[name];
    let items = base.scene.render_items();
    let item = items.iter().find(|item| item.node == node).unwrap();
    base.scene.resolve_lights(item).unwrap()
}

#[test]
fn test_global_light_reaches_every_leaf() {
    let base = moonbase();
    assert_eq!(resolved_for(&base, "floor"), vec![base.sun]);
    assert_eq!(resolved_for(&base, "house"), vec![base.sun, base.interior]);
    assert_eq!(resolved_for(&base, "greenhouse"), vec![base.sun, base.interior, base.greenhouse_lamp]);
}

#[test]
fn test_affiliation_is_not_inherited() {
    let mut base = moonbase();
    let porch = base
        .scene
        .add_leaf_object(RenderLeaf::new("porch", "porch"), Transform::identity(), Some(base.nodes["house"]))
        .unwrap();
    base.nodes.insert("porch", porch);

    assert_eq!(resolved_for(&base, "porch"), vec![base.sun]);
}

#[test]
fn test_mutated_light_visible_through_existing_handles() {
    let mut base = moonbase();
    base.scene.set_light_power(base.interior, Vec4::new(15.0, 20.0, 25.0, 1.0)).unwrap();
    base.scene.set_light_color(base.interior, Vec4::new(1.0, 0.5, 0.2, 1.0)).unwrap();

    let resolved = resolved_for(&base, "house");
    let interior = base.scene.lights().get(resolved[1]).unwrap();
    assert_eq!(interior.power, Vec4::new(15.0, 20.0, 25.0, 1.0));
    assert_eq!(interior.color, Vec4::new(1.0, 0.5, 0.2, 1.0));
    assert_eq!(interior.position, Vec3::new(0.0, 3.0, 0.0));
}

#[test]
fn test_affiliation_survives_reparent() {
    let mut base = moonbase();
    let greenhouse = base.nodes["greenhouse"];
    base.scene.reparent(greenhouse, base.scene.root()).unwrap();
    base.scene.advance(0.0).unwrap();

    assert_eq!(resolved_for(&base, "greenhouse"), vec![base.sun, base.interior, base.greenhouse_lamp]);
}
