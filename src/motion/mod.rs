//! Authored motion model.
//!
//! - `TrackType` / `MotionTrack`: typed per-bone channels, keyed or continuous
//! - `KeyframeTrack`: frame-addressed keys with cursor sampling
//! - `MotionClip` / `MotionAsset`: animations and their container
//! - `MotionReader`: loads assets from disk

pub mod asset;
pub mod clip;
pub mod tracks;
pub mod values;

pub use asset::{JsonMotionReader, MotionAsset, MotionReader};
pub use clip::{MotionClip, MotionTrack, TrackCurve, TrackData, TrackType};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
