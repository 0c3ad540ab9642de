//! Import Settings
//!
//! User-facing options of a motion import, persisted as JSON next to the
//! host's other plugin configuration.
//!
//! ```rust,ignore
//! use motion_retarget::config::{ImportSettings, MotionSelection};
//!
//! let settings = ImportSettings {
//!     unit_scale: 100.0,
//!     selection: MotionSelection::Single(3),
//!     ..Default::default()
//! };
//! settings.save("motion_import.json")?;
//! ```

use std::fs;
use std::path::Path;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RetargetError};

/// Highest accepted frame rate index (`30 * (index + 1)` = 120 fps).
pub const MAX_FRAME_RATE_INDEX: u32 = 3;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ImportFlags: u8 {
        /// Keep the scene's frame rate and resample motions onto it instead
        /// of switching the scene to the motion rate.
        const RESAMPLE = 1 << 0;
    }
}

/// Which motions of an asset get imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionSelection {
    /// Every non-empty motion, sequenced back-to-back on one timeline.
    #[default]
    All,
    /// A single motion slot.
    Single(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Multiplier applied to every authored position.
    pub unit_scale: f32,
    /// Motion frame rate selector: `30 * (index + 1)` frames per second.
    pub frame_rate_index: u32,
    pub flags: ImportFlags,
    pub selection: MotionSelection,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            unit_scale: 1.0,
            frame_rate_index: 0,
            flags: ImportFlags::empty(),
            selection: MotionSelection::All,
        }
    }
}

impl ImportSettings {
    /// Frame rate the authored keys are laid out at.
    #[inline]
    #[must_use]
    pub fn frame_rate(&self) -> u32 {
        30 * (self.frame_rate_index + 1)
    }

    #[inline]
    #[must_use]
    pub fn resample(&self) -> bool {
        self.flags.contains(ImportFlags::RESAMPLE)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.unit_scale.is_finite() || self.unit_scale == 0.0 {
            return Err(RetargetError::InvalidSettings(format!(
                "unit scale must be finite and non-zero, got {}",
                self.unit_scale
            )));
        }
        if self.frame_rate_index > MAX_FRAME_RATE_INDEX {
            return Err(RetargetError::InvalidSettings(format!(
                "frame rate index {} is above {MAX_FRAME_RATE_INDEX}",
                self.frame_rate_index
            )));
        }
        Ok(())
    }

    /// Loads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}
