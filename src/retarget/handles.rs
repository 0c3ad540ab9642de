//! Scale-handle synthesis.
//!
//! The host folds a node's scale into its children's translations, which
//! the authored format never does. A bone with a scale track is therefore
//! split in two:
//!
//! ```text
//! parent                      parent
//! └── bone          =>        └── bone_sp       (motion node, takes the bone's index)
//!     ├── child                   ├── child
//!     └── child                   ├── child
//!                                 └── bone      (scale handle, index -2, leaf)
//! ```
//!
//! Position and rotation keys land on the motion node; scale keys land on
//! the handle, which has no children to distort. The translation
//! compensator then scales child offsets explicitly.
//!
//! Synthesis is planned into a [`ScaleHandleTree`] from the untouched
//! hierarchy first, then applied top-down in one pass.

use glam::{Affine3A, Vec3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::motion::MotionClip;
use crate::retarget::record::{BONE_INDEX_KEY, ROW_KEYS, SCALE_HANDLE};
use crate::retarget::schedule::FrameSchedule;
use crate::scene::{NodeHandle, Scene};

/// Suffix of a motion node split off a scaled bone.
pub const MOTION_NODE_SUFFIX: &str = "_sp";

/// Whether `node` is a synthesized scale handle.
#[must_use]
pub fn is_scale_handle(scene: &Scene, node: NodeHandle) -> bool {
    scene
        .props(node)
        .and_then(|p| p.get_int(BONE_INDEX_KEY))
        .is_some_and(|i| i == SCALE_HANDLE)
}

pub(crate) fn is_bone(scene: &Scene, node: NodeHandle) -> bool {
    scene.props(node).is_some_and(|p| p.contains(BONE_INDEX_KEY))
}

/// One bone taking part in scale synthesis.
#[derive(Debug, Clone)]
pub struct TrackPairNode {
    /// The registered bone this entry was planned from.
    pub bone: NodeHandle,
    /// Node carrying position and rotation keys.
    pub scene_node: NodeHandle,
    /// Node carrying scale keys. `None` until synthesized.
    pub scale_handle: Option<NodeHandle>,
    /// Index of the bone's own scale track in the clip.
    pub source_track: Option<usize>,
    pub parent: Option<usize>,
    pub children: SmallVec<[usize; 4]>,
    /// Product of this bone's scale with every ancestor's, one per output
    /// frame.
    pub accumulated_scale: Vec<Vec3>,
}

/// Arena of [`TrackPairNode`]s in depth-first pre-order, so every parent
/// precedes its children.
#[derive(Debug, Clone, Default)]
pub struct ScaleHandleTree {
    nodes: Vec<TrackPairNode>,
    roots: Vec<usize>,
}

impl ScaleHandleTree {
    /// Plans synthesis for the given scale tracks without touching the scene.
    ///
    /// `scale_tracks` pairs each bone node with the index of its scale track,
    /// in track order; a bone listed twice keeps its first track. Roots are
    /// the bones with no scale-tracked ancestor. Below a root every bone
    /// child joins the tree, tracked or not, so accumulated scale reaches
    /// the whole subtree.
    #[must_use]
    pub fn plan(scene: &Scene, scale_tracks: &[(NodeHandle, usize)]) -> Self {
        let mut by_node: FxHashMap<NodeHandle, usize> = FxHashMap::default();
        let mut ordered = Vec::with_capacity(scale_tracks.len());
        for &(node, track) in scale_tracks {
            if by_node.contains_key(&node) {
                log::debug!("scale handles: ignoring duplicate scale track {track}");
                continue;
            }
            by_node.insert(node, track);
            ordered.push(node);
        }

        let mut tree = Self::default();
        for node in ordered {
            if !Self::is_tree_root(scene, &by_node, node) {
                continue;
            }
            let root = tree.plan_node(scene, &by_node, node, None);
            tree.roots.push(root);
        }
        tree
    }

    fn is_tree_root(scene: &Scene, by_node: &FxHashMap<NodeHandle, usize>, node: NodeHandle) -> bool {
        let mut current = scene.parent(node);
        while let Some(p) = current {
            if scene.is_root(p) {
                return true;
            }
            if by_node.contains_key(&p) {
                return false;
            }
            current = scene.parent(p);
        }
        true
    }

    fn plan_node(
        &mut self,
        scene: &Scene,
        by_node: &FxHashMap<NodeHandle, usize>,
        bone: NodeHandle,
        parent: Option<usize>,
    ) -> usize {
        let existing = scene
            .children(bone)
            .iter()
            .copied()
            .find(|&c| is_scale_handle(scene, c));

        let index = self.nodes.len();
        self.nodes.push(TrackPairNode {
            bone,
            scene_node: bone,
            scale_handle: existing,
            source_track: by_node.get(&bone).copied(),
            parent,
            children: SmallVec::new(),
            accumulated_scale: Vec::new(),
        });

        for &child in scene.children(bone) {
            if !is_bone(scene, child) || is_scale_handle(scene, child) {
                continue;
            }
            let c = self.plan_node(scene, by_node, child, Some(index));
            self.nodes[index].children.push(c);
        }
        index
    }

    /// Inserts every missing scale handle. Returns how many were created.
    ///
    /// Runs parents before children: a child bone has already been moved
    /// under its parent's motion node when its own split happens.
    pub fn apply(&mut self, scene: &mut Scene) -> usize {
        let mut created = 0;
        for pair in &mut self.nodes {
            if pair.scale_handle.is_some() {
                log::debug!("scale handles: reusing handle of {:?}", scene.name(pair.bone));
                continue;
            }
            if let Some(motion_node) = split_bone(scene, pair.bone) {
                pair.scene_node = motion_node;
                pair.scale_handle = Some(pair.bone);
                created += 1;
            }
        }
        created
    }

    /// Samples the scale tracks, accumulates them down the tree and keys the
    /// result onto every scale handle.
    pub fn populate_scale(&mut self, scene: &mut Scene, clip: &MotionClip, schedule: &FrameSchedule) {
        for i in 0..self.nodes.len() {
            let parent_scale = self.nodes[i]
                .parent
                .map(|p| self.nodes[p].accumulated_scale.clone());
            let track = self.nodes[i].source_track.and_then(|t| clip.track(t));

            let accumulated = schedule
                .secs
                .iter()
                .enumerate()
                .map(|(t, &secs)| {
                    let local = track.map_or(Vec3::ONE, |tr| {
                        tr.interpolate(secs, schedule.motion_rate).truncate()
                    });
                    let inherited = parent_scale.as_ref().and_then(|p| p.get(t).copied());
                    local * inherited.unwrap_or(Vec3::ONE)
                })
                .collect();
            self.nodes[i].accumulated_scale = accumulated;
        }

        let mut rec = scene.record();
        for pair in &self.nodes {
            let Some(handle) = pair.scale_handle else {
                continue;
            };
            for (&time, &scale) in schedule.ticks.iter().zip(&pair.accumulated_scale) {
                rec.set_local_tm(handle, time, &Affine3A::from_scale(scale));
            }
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[TrackPairNode] {
        &self.nodes
    }

    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` was planned into the tree, either as the original bone
    /// or as the motion node that replaced it.
    #[must_use]
    pub fn covers(&self, node: NodeHandle) -> bool {
        self.nodes.iter().any(|n| n.bone == node || n.scene_node == node)
    }
}

/// Splits `bone` into a motion node and a scale handle.
///
/// The copy takes the bone's place and index under its parent and adopts
/// its children in order; the bone itself becomes the copy's last child,
/// is tagged as a handle and has its rest rows cleared so the next scan
/// recaptures them.
fn split_bone(scene: &mut Scene, bone: NodeHandle) -> Option<NodeHandle> {
    let parent = scene.parent(bone)?;
    let slot = scene.children(parent).iter().position(|&c| c == bone)?;
    let name = format!("{}{MOTION_NODE_SUFFIX}", scene.name(bone)?);

    let motion_node = scene.clone_node(bone)?;
    scene.set_name(motion_node, &name);
    scene.attach_at(motion_node, parent, slot);

    let children = scene.children(bone).to_vec();
    for child in children {
        scene.attach(child, motion_node);
    }
    scene.attach(bone, motion_node);

    let props = scene.props_mut(bone)?;
    props.set_int(BONE_INDEX_KEY, SCALE_HANDLE);
    for key in ROW_KEYS {
        props.set_string(key, "");
    }

    log::debug!("scale handles: split {name}");
    Some(motion_node)
}
