//! Scale Handle Tests
//!
//! Tests for:
//! - Planning: tree roots, bone-only recursion, no scene mutation
//! - Applying: node split, sibling order, tags, world transforms kept
//! - Re-planning an already split hierarchy reuses handles
//! - Accumulated scale down the tree and keys on every handle
//! - Translation compensation below scaled bones

use glam::{Vec3, Vec4};
use motion_retarget::motion::{InterpolationMode, KeyframeTrack, MotionClip, MotionTrack, TrackType};
use motion_retarget::retarget::{
    BONE_INDEX_KEY, BoneRegistry, FrameSchedule, SCALE_HANDLE, ScaleHandleTree, compensate,
    is_scale_handle,
};
use motion_retarget::scene::transform::Transform;
use motion_retarget::scene::{NodeHandle, Scene};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Helpers
// ============================================================================

fn add_bone(
    scene: &mut Scene,
    name: &str,
    parent: Option<NodeHandle>,
    index: i32,
    position: Vec3,
) -> NodeHandle {
    let node = match parent {
        Some(p) => scene.create_child(name, p),
        None => scene.create_node(name),
    };
    if let Some(n) = scene.get_node_mut(node) {
        n.transform = Transform::from_position(position);
        n.props.set_int(BONE_INDEX_KEY, index);
    }
    node
}

fn scale_track(bone: i32, from: f32, to: f32, frames: u32) -> MotionTrack {
    let keys = KeyframeTrack::new(
        vec![0.0, (frames - 1) as f32],
        vec![Vec4::splat(from), Vec4::splat(to)],
        InterpolationMode::Linear,
    );
    MotionTrack::keyed(TrackType::LocalScale, bone, keys)
}

/// Arm(0) -> Forearm(1) -> Hand(2), plus a Spine(3) sibling under the
/// scene root.
struct Rig {
    scene: Scene,
    arm: NodeHandle,
    forearm: NodeHandle,
    hand: NodeHandle,
}

fn rig() -> Rig {
    let mut scene = Scene::new();
    let arm = add_bone(&mut scene, "Arm", None, 0, Vec3::new(0.0, 0.0, 10.0));
    let forearm = add_bone(&mut scene, "Forearm", Some(arm), 1, Vec3::new(0.0, 4.0, 0.0));
    let hand = add_bone(&mut scene, "Hand", Some(forearm), 2, Vec3::new(0.0, 3.0, 0.0));
    add_bone(&mut scene, "Spine", None, 3, Vec3::ZERO);
    Rig {
        scene,
        arm,
        forearm,
        hand,
    }
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn plan_roots_at_outermost_scaled_bone() {
    let r = rig();
    let tree = ScaleHandleTree::plan(&r.scene, &[(r.forearm, 1), (r.arm, 0)]);

    assert_eq!(tree.roots().len(), 1);
    let nodes = tree.nodes();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].bone, r.arm);
    assert_eq!(nodes[0].source_track, Some(0));
    assert_eq!(nodes[1].bone, r.forearm);
    assert_eq!(nodes[1].source_track, Some(1));
    assert_eq!(nodes[1].parent, Some(0));
    assert_eq!(nodes[2].bone, r.hand);
    assert_eq!(nodes[2].source_track, None);
    assert!(nodes.iter().all(|n| n.scale_handle.is_none()));
}

#[test]
fn plan_does_not_touch_the_scene() {
    let r = rig();
    let before = r.scene.traverse();
    let _tree = ScaleHandleTree::plan(&r.scene, &[(r.arm, 0)]);
    assert_eq!(r.scene.traverse(), before);
}

#[test]
fn plan_skips_non_bone_children() {
    let mut r = rig();
    r.scene.create_child("ArmMesh", r.arm);
    let tree = ScaleHandleTree::plan(&r.scene, &[(r.arm, 0)]);
    assert_eq!(tree.nodes().len(), 3);
}

#[test]
fn duplicate_scale_track_keeps_first() {
    let r = rig();
    let tree = ScaleHandleTree::plan(&r.scene, &[(r.hand, 4), (r.hand, 7)]);
    assert_eq!(tree.nodes().len(), 1);
    assert_eq!(tree.nodes()[0].source_track, Some(4));
}

// ============================================================================
// Applying
// ============================================================================

#[test]
fn apply_splits_bone_into_motion_node_and_handle() {
    let mut r = rig();
    let spine = r.scene.find_by_name("Spine").expect("spine");
    let forearm_world = r.scene.node_tm(r.forearm, 0);

    let mut tree = ScaleHandleTree::plan(&r.scene, &[(r.arm, 0)]);
    let created = tree.apply(&mut r.scene);
    assert_eq!(created, 3);

    let arm_sp = r.scene.find_by_name("Arm_sp").expect("motion node");
    let root_children = r.scene.children(r.scene.root()).to_vec();
    assert_eq!(root_children, vec![arm_sp, spine], "motion node takes the bone's slot");

    let forearm_sp = r.scene.find_by_name("Forearm_sp").expect("forearm motion node");
    assert_eq!(r.scene.children(arm_sp), &[forearm_sp, r.arm]);
    assert!(r.scene.children(r.arm).is_empty());
    assert!(is_scale_handle(&r.scene, r.arm));
    assert_eq!(r.scene.props(arm_sp).and_then(|p| p.get_int(BONE_INDEX_KEY)), Some(0));
    assert_eq!(r.scene.props(r.arm).and_then(|p| p.get_string("r1")), Some(""));

    assert_eq!(tree.nodes()[0].scene_node, arm_sp);
    assert_eq!(tree.nodes()[0].scale_handle, Some(r.arm));
    assert!(r.scene.node_tm(forearm_sp, 0).abs_diff_eq(forearm_world, EPSILON));
    assert!(r.scene.node_tm(r.forearm, 0).abs_diff_eq(forearm_world, EPSILON));
}

#[test]
fn replanning_reuses_existing_handles() {
    let mut r = rig();
    let mut tree = ScaleHandleTree::plan(&r.scene, &[(r.arm, 0)]);
    tree.apply(&mut r.scene);
    let count = r.scene.len();

    let registry = BoneRegistry::scan(&mut r.scene);
    let arm_sp = registry.lookup_node(0).expect("arm");
    assert_eq!(r.scene.name(arm_sp), Some("Arm_sp"));

    let mut again = ScaleHandleTree::plan(&r.scene, &[(arm_sp, 0)]);
    assert_eq!(again.nodes().len(), 3);
    assert!(again.nodes().iter().all(|n| n.scale_handle.is_some()));
    assert_eq!(again.apply(&mut r.scene), 0);
    assert_eq!(r.scene.len(), count);
    assert!(again.covers(arm_sp));
}

// ============================================================================
// Accumulated Scale
// ============================================================================

#[test]
fn accumulated_scale_multiplies_down_the_tree() {
    let mut r = rig();
    let clip = MotionClip::new(
        "grow",
        10,
        vec![scale_track(0, 1.0, 2.0, 10), scale_track(1, 3.0, 3.0, 10)],
    );
    let schedule = FrameSchedule::new(10, 30, 30, 0);

    let mut tree = ScaleHandleTree::plan(&r.scene, &[(r.arm, 0), (r.forearm, 1)]);
    tree.apply(&mut r.scene);
    tree.populate_scale(&mut r.scene, &clip, &schedule);

    let nodes = tree.nodes();
    for t in 0..schedule.len() {
        let local_arm = clip.tracks[0].interpolate(schedule.secs[t], 30.0).truncate();
        let local_forearm = clip.tracks[1].interpolate(schedule.secs[t], 30.0).truncate();

        assert!(vec3_approx(nodes[0].accumulated_scale[t], local_arm));
        assert!(vec3_approx(nodes[1].accumulated_scale[t], local_forearm * nodes[0].accumulated_scale[t]));
        assert!(vec3_approx(nodes[2].accumulated_scale[t], nodes[1].accumulated_scale[t]));
    }
    assert!(vec3_approx(nodes[2].accumulated_scale[9], Vec3::splat(6.0)));

    // Every handle carries its accumulated scale, including untracked ones
    let hand_scale = r.scene.local_trs(r.hand, schedule.ticks[9]).scale;
    assert!(vec3_approx(hand_scale, Vec3::splat(6.0)), "got {hand_scale}");
    let arm_keys = &r.scene.get_node(r.arm).expect("arm").channels.scale;
    assert_eq!(arm_keys.num_keys(), 10);
}

// ============================================================================
// Compensation
// ============================================================================

#[test]
fn compensation_scales_child_offsets() {
    let mut r = rig();
    let clip = MotionClip::new("grow", 10, vec![scale_track(0, 1.0, 2.0, 10)]);
    let schedule = FrameSchedule::new(10, 30, 30, 0);

    let mut tree = ScaleHandleTree::plan(&r.scene, &[(r.arm, 0)]);
    tree.apply(&mut r.scene);
    tree.populate_scale(&mut r.scene, &clip, &schedule);
    compensate(&mut r.scene, &tree, &schedule);

    let forearm_sp = r.scene.find_by_name("Forearm_sp").expect("forearm");
    let hand_sp = r.scene.find_by_name("Hand_sp").expect("hand");

    let first = r.scene.local_trs(forearm_sp, 0).position;
    let last = r.scene.local_trs(forearm_sp, schedule.ticks[9]).position;
    assert!(vec3_approx(first, Vec3::new(0.0, 4.0, 0.0)), "got {first}");
    assert!(vec3_approx(last, Vec3::new(0.0, 8.0, 0.0)), "got {last}");

    // Nested offsets use the accumulated scale once, not squared
    let hand = r.scene.local_trs(hand_sp, schedule.ticks[9]).position;
    assert!(vec3_approx(hand, Vec3::new(0.0, 6.0, 0.0)), "got {hand}");

    // Handles are never compensated
    let arm = r.scene.get_node(r.arm).expect("arm");
    assert!(arm.channels.position.keys().iter().all(|k| k.value == Vec3::ZERO));
    assert_eq!(arm.props.get_int(BONE_INDEX_KEY), Some(SCALE_HANDLE));
}
