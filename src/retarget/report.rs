use thiserror::Error;

use crate::time::{Interval, TimeValue};

/// A non-fatal problem met while importing. The affected track is skipped
/// and the import carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("track {track}: no bone with index {bone_id}")]
    UnresolvedBone { track: usize, bone_id: i32 },

    #[error("track {track}: scale on bone {bone_id} has children and no scale handle, dropped")]
    ScaleOnNonLeaf { track: usize, bone_id: i32 },
}

/// Where one motion landed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionRange {
    /// Slot of the motion in its asset.
    pub motion: usize,
    pub range: Interval,
    /// Start tick of whatever follows this motion.
    pub next_start: TimeValue,
}

/// Summary of a finished import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub diagnostics: Vec<Diagnostic>,
    pub ranges: Vec<MotionRange>,
    /// Scale handles inserted into the hierarchy. Reused handles are not
    /// counted.
    pub handles_created: usize,
}

impl ImportReport {
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
