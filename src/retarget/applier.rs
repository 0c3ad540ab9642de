use glam::Quat;

use crate::motion::{KeyframeCursor, MotionClip, MotionTrack, TrackType};
use crate::retarget::basis::{correct_point, correct_rotation};
use crate::retarget::handles::ScaleHandleTree;
use crate::retarget::registry::BoneRegistry;
use crate::retarget::report::Diagnostic;
use crate::retarget::schedule::FrameSchedule;
use crate::scene::{NodeHandle, Scene};

/// Writes authored position and rotation tracks onto bone channels, one key
/// per output frame.
///
/// Scale tracks are left to the scale-handle tree. The only scale tracks
/// written here are those the tree does not cover and whose target is a
/// leaf; the rest are dropped with a diagnostic.
pub struct TrackApplier<'a> {
    schedule: &'a FrameSchedule,
    unit_scale: f32,
}

impl<'a> TrackApplier<'a> {
    #[must_use]
    pub fn new(schedule: &'a FrameSchedule, unit_scale: f32) -> Self {
        Self {
            schedule,
            unit_scale,
        }
    }

    pub fn apply(
        &self,
        scene: &mut Scene,
        registry: &BoneRegistry,
        clip: &MotionClip,
        tree: &ScaleHandleTree,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for (index, track) in clip.tracks.iter().enumerate() {
            let Some(entry) = registry.lookup(track.bone_id) else {
                log::warn!("Couldn't find bone {} for track {index}", track.bone_id);
                diagnostics.push(Diagnostic::UnresolvedBone {
                    track: index,
                    bone_id: track.bone_id,
                });
                continue;
            };
            let target = entry.target();

            match track.track_type {
                TrackType::AbsolutePosition | TrackType::LocalPosition => {
                    self.apply_position(scene, track, target);
                }
                TrackType::AbsoluteRotation | TrackType::LocalRotation => {
                    self.apply_rotation(scene, track, target);
                }
                TrackType::LocalScale => {
                    if tree.covers(entry.node) {
                        continue;
                    }
                    if scene.get_node(target).is_some_and(|n| n.is_leaf()) {
                        self.apply_scale(scene, track, target);
                    } else {
                        log::warn!(
                            "Dropping scale track {index}: bone {} has children",
                            track.bone_id
                        );
                        diagnostics.push(Diagnostic::ScaleOnNonLeaf {
                            track: index,
                            bone_id: track.bone_id,
                        });
                    }
                }
            }
        }

        diagnostics
    }

    /// Correction applies to world-space tracks and to bones hanging
    /// straight off the scene root.
    fn needs_basis(scene: &Scene, track: &MotionTrack, target: NodeHandle) -> bool {
        track.track_type.is_absolute() || scene.parent(target).is_some_and(|p| scene.is_root(p))
    }

    fn apply_position(&self, scene: &mut Scene, track: &MotionTrack, target: NodeHandle) {
        let corrected = Self::needs_basis(scene, track, target);
        let mut cursor = KeyframeCursor::default();
        let mut rec = scene.record();

        for (&time, &secs) in self.schedule.ticks.iter().zip(&self.schedule.secs) {
            let sample = track.interpolate_with_cursor(secs, self.schedule.motion_rate, &mut cursor);
            let mut value = sample.truncate() * self.unit_scale;
            if corrected {
                value = correct_point(value);
            }
            rec.set_position(target, time, value);
        }
    }

    fn apply_rotation(&self, scene: &mut Scene, track: &MotionTrack, target: NodeHandle) {
        let corrected = Self::needs_basis(scene, track, target);
        let mut cursor = KeyframeCursor::default();
        let mut rec = scene.record();

        for (&time, &secs) in self.schedule.ticks.iter().zip(&self.schedule.secs) {
            let sample = track.interpolate_with_cursor(secs, self.schedule.motion_rate, &mut cursor);
            // Authored and host rotations turn in opposite senses.
            let mut value = Quat::from_vec4(sample).conjugate();
            if corrected {
                value = correct_rotation(value);
            }
            rec.set_rotation(target, time, value);
        }
    }

    fn apply_scale(&self, scene: &mut Scene, track: &MotionTrack, target: NodeHandle) {
        let mut cursor = KeyframeCursor::default();
        let mut rec = scene.record();

        for (&time, &secs) in self.schedule.ticks.iter().zip(&self.schedule.secs) {
            let sample = track.interpolate_with_cursor(secs, self.schedule.motion_rate, &mut cursor);
            rec.set_scale(target, time, sample.truncate());
        }
    }
}
