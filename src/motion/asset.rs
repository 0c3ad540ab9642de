//! Motion containers and readers.
//!
//! A [`MotionAsset`] is an ordered list of motion slots; a slot may be empty.
//! Readers decode a container into that model and validate it before any
//! scene work starts, so a load failure never leaves a half-imported scene.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RetargetError};
use crate::motion::clip::{MotionClip, TrackData};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MotionAsset {
    pub motions: Vec<Option<MotionClip>>,
}

impl MotionAsset {
    #[must_use]
    pub fn new(motions: Vec<Option<MotionClip>>) -> Self {
        Self { motions }
    }

    /// Number of slots, empty ones included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.motions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    /// The motion in slot `index`, if the slot exists and is filled.
    #[must_use]
    pub fn motion(&self, index: usize) -> Option<&MotionClip> {
        self.motions.get(index)?.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&MotionClip>> {
        self.motions.iter().map(Option::as_ref)
    }

    /// Display labels for every slot: the motion's name, its slot number
    /// if unnamed, or `--[Empty]--` for empty slots.
    #[must_use]
    pub fn motion_names(&self) -> Vec<String> {
        self.motions
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(clip) if !clip.name.is_empty() => clip.name.clone(),
                Some(_) => i.to_string(),
                None => "--[Empty]--".to_owned(),
            })
            .collect()
    }

    /// Rejects structurally broken keyed tracks.
    pub fn validate(&self) -> Result<()> {
        for (m, clip) in self.motions.iter().enumerate() {
            let Some(clip) = clip else { continue };
            for (t, track) in clip.tracks.iter().enumerate() {
                if let TrackData::Keyed(keys) = &track.data {
                    keys.validate().map_err(|e| {
                        RetargetError::MalformedAsset(format!("motion {m}, track {t}: {e}"))
                    })?;
                }
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let asset: Self = serde_json::from_str(json)?;
        asset.validate()?;
        Ok(asset)
    }
}

/// Source of motion assets.
pub trait MotionReader {
    fn read(&self, path: &Path) -> Result<MotionAsset>;
}

/// Reads motion assets stored as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMotionReader;

impl MotionReader for JsonMotionReader {
    fn read(&self, path: &Path) -> Result<MotionAsset> {
        let text = fs::read_to_string(path)?;
        MotionAsset::from_json_str(&text)
    }
}
