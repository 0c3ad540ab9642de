//! Scene Adapter Tests
//!
//! Tests for:
//! - Scene: node creation, lookup by name, traversal order
//! - Hierarchy editing: attach / attach_at keep world transforms at the
//!   current time
//! - Recording scope: keyed vs static writes, scope restore on drop
//! - Evaluation: local / world matrices from static values and keys
//! - Node cloning and user properties

use glam::{Affine3A, Quat, Vec3};
use motion_retarget::scene::transform::Transform;
use motion_retarget::scene::{ChannelMask, NodeHandle, Scene};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn translation(m: &Affine3A) -> Vec3 {
    Vec3::from(m.translation)
}

fn set_transform(scene: &mut Scene, node: NodeHandle, transform: Transform) {
    if let Some(n) = scene.get_node_mut(node) {
        n.transform = transform;
    }
}

// ============================================================================
// Node Creation & Lookup
// ============================================================================

#[test]
fn scene_starts_with_root_only() {
    let scene = Scene::new();
    assert!(scene.is_empty());
    assert_eq!(scene.len(), 1);
    assert!(scene.traverse().is_empty());
    assert!(scene.is_root(scene.root()));
}

#[test]
fn create_node_hangs_below_root() {
    let mut scene = Scene::new();
    let a = scene.create_node("Hips");
    assert_eq!(scene.parent(a), Some(scene.root()));
    assert_eq!(scene.name(a), Some("Hips"));
    assert_eq!(scene.find_by_name("Hips"), Some(a));
    assert_eq!(scene.find_by_name("Spine"), None);
}

#[test]
fn traverse_is_preorder() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_child("b", a);
    let c = scene.create_child("c", b);
    let d = scene.create_child("d", a);
    let e = scene.create_node("e");

    assert_eq!(scene.traverse(), vec![a, b, c, d, e]);
}

// ============================================================================
// Hierarchy Editing
// ============================================================================

#[test]
fn attach_keeps_world_transform() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    set_transform(&mut scene, a, Transform::from_position(Vec3::new(0.0, 5.0, 0.0)));
    set_transform(&mut scene, b, Transform::from_position(Vec3::new(1.0, 1.0, 1.0)));

    assert!(scene.attach(b, a));
    assert_eq!(scene.parent(b), Some(a));
    assert_eq!(scene.children(a), &[b]);
    assert!(vec3_approx(translation(&scene.node_tm(b, 0)), Vec3::new(1.0, 1.0, 1.0)));
    assert!(vec3_approx(scene.local_trs(b, 0).position, Vec3::new(1.0, -4.0, 1.0)));
}

#[test]
fn attach_uses_current_time() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    set_transform(&mut scene, b, Transform::from_position(Vec3::new(1.0, 1.0, 1.0)));
    {
        let mut rec = scene.record();
        rec.set_position(a, 0, Vec3::ZERO);
        rec.set_position(a, 480, Vec3::new(0.0, 6.0, 0.0));
    }

    scene.set_time(480);
    assert_eq!(scene.time(), 480);
    assert!(scene.attach(b, a));
    assert!(vec3_approx(scene.local_trs(b, 0).position, Vec3::new(1.0, -5.0, 1.0)));
    assert!(vec3_approx(translation(&scene.node_tm(b, 480)), Vec3::new(1.0, 1.0, 1.0)));
}

#[test]
fn attach_at_inserts_at_slot() {
    let mut scene = Scene::new();
    let p = scene.create_node("p");
    let a = scene.create_child("a", p);
    let b = scene.create_child("b", p);
    let c = scene.create_node("c");

    assert!(scene.attach_at(c, p, 1));
    assert_eq!(scene.children(p), &[a, c, b]);
}

#[test]
fn attach_rejects_cycles_and_root() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_child("b", a);

    assert!(!scene.attach(a, b));
    assert!(!scene.attach(scene.root(), a));
    assert_eq!(scene.parent(b), Some(a));
}

#[test]
fn attach_between_equal_worlds_keeps_local_exactly() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let c = scene.create_child("c", a);
    let local = Transform {
        position: Vec3::new(0.3, 0.7, -1.1),
        rotation: Quat::from_rotation_y(0.4),
        scale: Vec3::ONE,
    };
    set_transform(&mut scene, c, local);

    assert!(scene.attach(c, b));
    assert_eq!(scene.local_trs(c, 0), local);
}

// ============================================================================
// Recording Scope
// ============================================================================

#[test]
fn writes_outside_scope_are_static() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    scene.set_position(a, 480, Vec3::X);

    let node = scene.get_node(a).expect("node");
    assert_eq!(node.transform.position, Vec3::X);
    assert!(node.channels.position.is_empty());
}

#[test]
fn writes_inside_scope_are_keys() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    {
        let mut rec = scene.record();
        assert!(rec.is_recording());
        rec.set_position(a, 0, Vec3::ZERO);
        rec.set_position(a, 160, Vec3::new(2.0, 0.0, 0.0));
    }
    assert!(!scene.is_recording());

    let node = scene.get_node(a).expect("node");
    assert_eq!(node.channels.position.num_keys(), 2);
    assert_eq!(node.transform.position, Vec3::ZERO);
    assert!(vec3_approx(scene.local_trs(a, 80).position, Vec3::X));
}

#[test]
fn nested_scope_restores_outer_state() {
    let mut scene = Scene::new();
    let mut outer = scene.record();
    {
        let inner = outer.record();
        assert!(inner.is_recording());
    }
    assert!(outer.is_recording());
    drop(outer);
    assert!(!scene.is_recording());
}

#[test]
fn delete_keys_honours_mask() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    {
        let mut rec = scene.record();
        rec.set_local_tm(a, 0, &Affine3A::from_scale(Vec3::splat(2.0)));
    }
    scene.delete_keys(a, ChannelMask::SCALE);

    let ch = &scene.get_node(a).expect("node").channels;
    assert!(ch.scale.is_empty());
    assert_eq!(ch.position.num_keys(), 1);

    scene.delete_keys(a, ChannelMask::ALL);
    assert!(scene.get_node(a).expect("node").channels.is_empty());
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn node_tm_composes_parent_chain() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_child("b", a);
    let scaled = Transform {
        position: Vec3::new(0.0, 0.0, 1.0),
        rotation: Quat::IDENTITY,
        scale: Vec3::splat(2.0),
    };
    set_transform(&mut scene, a, scaled);
    set_transform(&mut scene, b, Transform::from_position(Vec3::X));

    let world = scene.node_tm(b, 0);
    assert!(vec3_approx(translation(&world), Vec3::new(2.0, 0.0, 1.0)));
    assert_eq!(scene.parent_tm(b, 0), scene.node_tm(a, 0));
}

// ============================================================================
// Cloning & Properties
// ============================================================================

#[test]
fn clone_node_copies_everything_but_children() {
    let mut scene = Scene::new();
    let p = scene.create_node("p");
    let a = scene.create_child("a", p);
    let _child = scene.create_child("child", a);
    if let Some(props) = scene.props_mut(a) {
        props.set_int("LMTBone", 7);
    }
    set_transform(&mut scene, a, Transform::from_position(Vec3::Y));

    let copy = scene.clone_node(a).expect("clone");
    assert_eq!(scene.name(copy), Some("a"));
    assert_eq!(scene.parent(copy), Some(p));
    assert_eq!(scene.children(p).last(), Some(&copy));
    assert!(scene.children(copy).is_empty());
    assert_eq!(scene.props(copy).and_then(|props| props.get_int("LMTBone")), Some(7));
    assert_eq!(scene.node_tm(copy, 0), scene.node_tm(a, 0));
}
