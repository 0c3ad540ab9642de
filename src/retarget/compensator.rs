use glam::Vec3;

use crate::retarget::handles::{ScaleHandleTree, is_bone, is_scale_handle};
use crate::retarget::schedule::FrameSchedule;
use crate::scene::Scene;

/// Rewrites child translations below every motion node so offsets carry the
/// accumulated scale of their parent.
///
/// Must run after every other channel of the motion is keyed. Parents are
/// settled before their children since the tree is stored in pre-order.
///
/// Bone children are measured from their freshly keyed pose. Other children
/// (meshes, helpers) carry no motion of their own, so their offset is taken
/// from the static transform; their position keys are compensator output
/// and never a base.
pub fn compensate(scene: &mut Scene, tree: &ScaleHandleTree, schedule: &FrameSchedule) {
    for pair in tree.nodes() {
        let parent = pair.scene_node;
        let parent_inv: Vec<_> = schedule
            .ticks
            .iter()
            .map(|&t| scene.node_tm(parent, t).inverse())
            .collect();

        let children: Vec<_> = scene
            .children(parent)
            .iter()
            .copied()
            .filter(|&c| !is_scale_handle(scene, c))
            .collect();

        for child in children {
            let static_offset = if is_bone(scene, child) {
                None
            } else {
                scene.get_node(child).map(|n| n.transform.position)
            };

            let offsets: Vec<Vec3> = schedule
                .ticks
                .iter()
                .zip(&parent_inv)
                .zip(&pair.accumulated_scale)
                .map(|((&t, inv), &scale)| {
                    let base = static_offset.unwrap_or_else(|| {
                        Vec3::from((*inv * scene.node_tm(child, t)).translation)
                    });
                    base * scale
                })
                .collect();

            let mut rec = scene.record();
            for (&t, &offset) in schedule.ticks.iter().zip(&offsets) {
                rec.set_position(child, t, offset);
            }
        }
    }
}
