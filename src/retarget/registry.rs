use glam::Affine3A;

use crate::retarget::handles::{is_bone, is_scale_handle};
use crate::retarget::record::{BONE_INDEX_KEY, BoneRecord, CORRUPTED, PersistedRecord, UNBOUND};
use crate::scene::{ChannelMask, NodeHandle, Scene};
use crate::time::TimeValue;

/// Boolean user property marking an IK end bone.
pub const NUB_KEY: &str = "isnub";
/// Alias suffix for nub bones (`isnub = true`).
pub const IK_TARGET_SUFFIX: &str = "_IKTarget";
/// Alias suffix for the other end of an IK chain (`isnub = false`).
pub const IK_NUB_SUFFIX: &str = "_IKNub";

/// Time at which corrupted records recapture their rest pose.
const CAPTURE_TIME: TimeValue = 0;

/// A scene node annotated with a bone index.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneEntry {
    pub index: i32,
    pub node: NodeHandle,
    /// Local transform relative to the parent.
    pub rest_pose: Affine3A,
    /// Node animated in place of `node`, when the bone is driven by IK.
    pub ik_alias: Option<NodeHandle>,
}

impl BoneEntry {
    /// The node keyframes should be written to.
    #[inline]
    #[must_use]
    pub fn target(&self) -> NodeHandle {
        self.ik_alias.unwrap_or(self.node)
    }
}

/// Bone lookup context for one import.
///
/// Built from a full scene traversal and rebuilt whenever the hierarchy
/// changes. It holds handles only; the scene owns the nodes.
#[derive(Debug, Clone, Default)]
pub struct BoneRegistry {
    entries: Vec<BoneEntry>,
}

impl BoneRegistry {
    /// Scans `scene` and repairs corrupted bone records along the way.
    pub fn scan(scene: &mut Scene) -> Self {
        let mut registry = Self::default();
        registry.rescan(scene);
        registry
    }

    /// Replaces every entry with a fresh traversal of `scene`.
    ///
    /// Records with missing or unreadable fields get their rest pose
    /// recaptured from the live hierarchy and written back. Afterwards the
    /// [`CORRUPTED`] index is rewritten to [`UNBOUND`], unless some bone is
    /// already unbound, in which case the scan stops short of that repair.
    pub fn rescan(&mut self, scene: &mut Scene) {
        self.entries.clear();

        let bones: Vec<NodeHandle> = scene
            .traverse()
            .into_iter()
            .filter(|&h| scene.props(h).is_some_and(|p| p.contains(BONE_INDEX_KEY)))
            .collect();

        for node in bones {
            let Some(entry) = Self::read_entry(scene, node) else {
                continue;
            };
            self.entries.push(entry);
        }

        if self.entries.iter().any(|e| e.index == UNBOUND) {
            return;
        }

        for entry in &mut self.entries {
            if entry.index == CORRUPTED {
                log::debug!("bone registry: unbinding corrupted index on {:?}", scene.name(entry.node));
                entry.index = UNBOUND;
                if let Some(props) = scene.props_mut(entry.node) {
                    props.set_int(BONE_INDEX_KEY, UNBOUND);
                }
            }
        }
    }

    fn read_entry(scene: &mut Scene, node: NodeHandle) -> Option<BoneEntry> {
        let persisted = BoneRecord::read(scene.props(node)?);
        let ik_alias = Self::resolve_alias(scene, node);

        let record = match persisted {
            PersistedRecord::Valid(record) => record,
            PersistedRecord::Corrupted(mut record) => {
                let local = scene.parent_tm(node, CAPTURE_TIME).inverse()
                    * scene.node_tm(node, CAPTURE_TIME);
                record.set_rest_pose(&local);
                log::debug!("bone registry: recaptured rest pose of {:?}", scene.name(node));
                record.write(scene.props_mut(node)?);
                record
            }
        };

        Some(BoneEntry {
            index: record.index,
            node,
            rest_pose: record.rest_pose(),
            ik_alias,
        })
    }

    fn resolve_alias(scene: &Scene, node: NodeHandle) -> Option<NodeHandle> {
        let is_nub = scene.props(node)?.get_bool(NUB_KEY)?;
        let suffix = if is_nub { IK_TARGET_SUFFIX } else { IK_NUB_SUFFIX };
        let name = format!("{}{suffix}", scene.name(node)?);
        scene.find_by_name(&name)
    }

    #[must_use]
    pub fn entries(&self) -> &[BoneEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry carrying `index`.
    #[must_use]
    pub fn lookup(&self, index: i32) -> Option<&BoneEntry> {
        self.entries.iter().find(|e| e.index == index)
    }

    #[must_use]
    pub fn lookup_node(&self, index: i32) -> Option<NodeHandle> {
        self.lookup(index).map(|e| e.node)
    }

    /// Snapshots every bone's local transform at `time` as its rest pose.
    ///
    /// Only the in-memory entries change; the persisted records keep the
    /// pose the scene was authored with.
    pub fn capture_pose(&mut self, scene: &Scene, time: TimeValue) {
        for entry in &mut self.entries {
            entry.rest_pose = scene.parent_tm(entry.node, time).inverse() * scene.node_tm(entry.node, time);
        }
    }

    /// Keys every bone's rest pose at `time`.
    pub fn restore_pose(&self, scene: &mut Scene, time: TimeValue) {
        let mut rec = scene.record();
        for entry in &self.entries {
            rec.set_local_tm(entry.node, time, &entry.rest_pose);
        }
    }

    /// Keys every bone's current local transform at `time`, so the pose
    /// holds steady up to that point.
    pub fn lock_pose(&self, scene: &mut Scene, time: TimeValue) {
        let mut rec = scene.record();
        for entry in &self.entries {
            let local = rec.parent_tm(entry.node, time).inverse() * rec.node_tm(entry.node, time);
            rec.set_local_tm(entry.node, time, &local);
        }
    }

    /// Removes every position, rotation and scale key from registered bones
    /// and their IK aliases.
    ///
    /// Position keys of non-bone nodes hanging off a split bone are dropped
    /// too: they only ever hold compensated offsets from an earlier import.
    pub fn reset_animation_channels(&self, scene: &mut Scene) {
        for entry in &self.entries {
            scene.delete_keys(entry.node, ChannelMask::ALL);
            if let Some(alias) = entry.ik_alias {
                scene.delete_keys(alias, ChannelMask::ALL);
            }

            let children = scene.children(entry.node);
            if !children.iter().any(|&c| is_scale_handle(scene, c)) {
                continue;
            }
            let attached: Vec<NodeHandle> = children
                .iter()
                .copied()
                .filter(|&c| !is_bone(scene, c))
                .collect();
            for node in attached {
                scene.delete_keys(node, ChannelMask::POSITION);
            }
        }
    }
}
