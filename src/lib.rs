pub mod config;
pub mod errors;
pub mod motion;
pub mod retarget;
pub mod scene;
pub mod time;

pub use config::{ImportFlags, ImportSettings, MotionSelection};
pub use errors::{Result, RetargetError};
pub use motion::{JsonMotionReader, MotionAsset, MotionClip, MotionReader, MotionTrack, TrackType};
pub use retarget::{BoneRegistry, Diagnostic, ImportReport, MotionImporter, import_file};
pub use scene::{NodeHandle, Scene};
pub use time::{Interval, TICKS_PER_SECOND, TimeValue};
