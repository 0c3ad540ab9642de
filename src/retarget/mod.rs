//! Motion retargeting engine.
//!
//! Import pipeline for one motion:
//! 1. [`BoneRegistry`]: maps authored bone indices to scene nodes
//! 2. [`ScaleHandleTree`]: splits scaled bones so scale stays off the
//!    translation chain
//! 3. [`TrackApplier`]: keys position and rotation, with axis correction
//! 4. [`compensate`]: rescales child offsets under every split bone
//!
//! [`MotionImporter`] drives the pipeline over a whole asset.

pub mod applier;
pub mod basis;
pub mod compensator;
pub mod handles;
pub mod importer;
pub mod record;
pub mod registry;
pub mod report;
pub mod schedule;

pub use applier::TrackApplier;
pub use basis::{CORRECTION_BASIS, correct_point, correct_rotation};
pub use compensator::compensate;
pub use handles::{MOTION_NODE_SUFFIX, ScaleHandleTree, TrackPairNode, is_scale_handle};
pub use importer::{MotionImporter, import_file};
pub use record::{BONE_INDEX_KEY, BoneRecord, CORRUPTED, PersistedRecord, SCALE_HANDLE, UNBOUND};
pub use registry::{BoneEntry, BoneRegistry, IK_NUB_SUFFIX, IK_TARGET_SUFFIX, NUB_KEY};
pub use report::{Diagnostic, ImportReport, MotionRange};
pub use schedule::FrameSchedule;
