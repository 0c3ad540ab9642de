use std::fmt;
use std::sync::Arc;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::motion::tracks::{KeyframeCursor, KeyframeTrack};

/// What an authored track animates and in which space.
///
/// `Absolute` tracks are expressed in the authored world-axis convention;
/// `Local` tracks are relative to the parent bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    AbsolutePosition,
    LocalPosition,
    AbsoluteRotation,
    LocalRotation,
    LocalScale,
}

impl TrackType {
    #[inline]
    #[must_use]
    pub fn is_absolute(self) -> bool {
        matches!(self, Self::AbsolutePosition | Self::AbsoluteRotation)
    }

    #[inline]
    #[must_use]
    pub fn is_rotation(self) -> bool {
        matches!(self, Self::AbsoluteRotation | Self::LocalRotation)
    }

    #[inline]
    #[must_use]
    pub fn is_scale(self) -> bool {
        matches!(self, Self::LocalScale)
    }

    /// Value a track of this type reports when it has nothing to sample.
    #[must_use]
    pub fn rest_value(self) -> Vec4 {
        match self {
            Self::AbsolutePosition | Self::LocalPosition => Vec4::ZERO,
            Self::AbsoluteRotation | Self::LocalRotation => Vec4::W,
            Self::LocalScale => Vec4::ONE,
        }
    }
}

/// Continuous sampler over elapsed seconds.
#[derive(Clone)]
pub struct TrackCurve(Arc<dyn Fn(f32) -> Vec4 + Send + Sync>);

impl TrackCurve {
    pub fn new(f: impl Fn(f32) -> Vec4 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    #[must_use]
    pub fn eval(&self, secs: f32) -> Vec4 {
        (self.0)(secs)
    }
}

impl fmt::Debug for TrackCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrackCurve(..)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackData {
    /// Discrete keys addressed in authored frames.
    Keyed(KeyframeTrack<Vec4>),
    /// Continuous function of seconds. Not serialisable.
    #[serde(skip)]
    Curve(TrackCurve),
}

/// One authored channel targeting one bone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionTrack {
    pub track_type: TrackType,
    pub bone_id: i32,
    pub data: TrackData,
}

impl MotionTrack {
    #[must_use]
    pub fn keyed(track_type: TrackType, bone_id: i32, keys: KeyframeTrack<Vec4>) -> Self {
        Self {
            track_type,
            bone_id,
            data: TrackData::Keyed(keys),
        }
    }

    pub fn curve(
        track_type: TrackType,
        bone_id: i32,
        f: impl Fn(f32) -> Vec4 + Send + Sync + 'static,
    ) -> Self {
        Self {
            track_type,
            bone_id,
            data: TrackData::Curve(TrackCurve::new(f)),
        }
    }

    /// Samples the track `secs` seconds into the motion, with keys laid out
    /// at `frame_rate` frames per second.
    #[must_use]
    pub fn interpolate(&self, secs: f32, frame_rate: f32) -> Vec4 {
        self.interpolate_with_cursor(secs, frame_rate, &mut KeyframeCursor::default())
    }

    /// Cursor-accelerated variant of [`interpolate`](Self::interpolate) for
    /// walks with increasing time.
    pub fn interpolate_with_cursor(
        &self,
        secs: f32,
        frame_rate: f32,
        cursor: &mut KeyframeCursor,
    ) -> Vec4 {
        let raw = match &self.data {
            TrackData::Keyed(keys) => keys
                .sample_with_cursor(secs * frame_rate, cursor)
                .unwrap_or_else(|| self.track_type.rest_value()),
            TrackData::Curve(curve) => curve.eval(secs),
        };

        if self.track_type.is_rotation() {
            let len = raw.length();
            if len > 1e-8 {
                return raw / len;
            }
            return self.track_type.rest_value();
        }
        raw
    }

    /// Number of discrete keys; zero for continuous tracks.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        match &self.data {
            TrackData::Keyed(keys) => keys.num_frames(),
            TrackData::Curve(_) => 0,
        }
    }

    /// Authored frame of key `index`.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<f32> {
        match &self.data {
            TrackData::Keyed(keys) => keys.frame(index),
            TrackData::Curve(_) => None,
        }
    }

    /// Value of key `index`.
    #[must_use]
    pub fn evaluate(&self, index: usize) -> Option<Vec4> {
        match &self.data {
            TrackData::Keyed(keys) => keys.evaluate(index),
            TrackData::Curve(_) => None,
        }
    }
}

/// One animation: a frame count and its tracks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MotionClip {
    #[serde(default)]
    pub name: String,
    pub num_frames: u32,
    #[serde(default)]
    pub tracks: Vec<MotionTrack>,
}

impl MotionClip {
    #[must_use]
    pub fn new(name: &str, num_frames: u32, tracks: Vec<MotionTrack>) -> Self {
        Self {
            name: name.to_owned(),
            num_frames,
            tracks,
        }
    }

    #[inline]
    #[must_use]
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    #[must_use]
    pub fn track(&self, index: usize) -> Option<&MotionTrack> {
        self.tracks.get(index)
    }
}
