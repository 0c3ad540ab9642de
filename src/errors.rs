//! Error Types
//!
//! This module defines the error types used throughout the importer.
//!
//! # Overview
//!
//! [`RetargetError`] covers the failures that abort an import:
//! - Motion asset loading and decoding errors
//! - Motion selection errors (empty or missing slots)
//! - Invalid import settings
//!
//! Problems discovered *while* an import mutates the scene (unresolved bone
//! ids, scale tracks that cannot be isolated) are not errors. They are
//! reported as [`Diagnostic`](crate::retarget::Diagnostic) values and the
//! import carries on.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, RetargetError>`.
//!
//! ```rust,ignore
//! use motion_retarget::errors::Result;
//!
//! fn load_settings() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for motion import.
#[derive(Error, Debug)]
pub enum RetargetError {
    // ========================================================================
    // I/O & Decoding Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parse error (motion assets and settings files).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The motion container decoded but its content is unusable.
    #[error("Malformed motion asset: {0}")]
    MalformedAsset(String),

    // ========================================================================
    // Selection Errors
    // ========================================================================
    /// The selected motion slot exists but holds no animation.
    #[error("Motion slot {index} is empty")]
    EmptyMotion {
        /// Index of the selected slot
        index: usize,
    },

    /// The selected motion index is past the end of the asset.
    #[error("Motion index out of bounds: {index} (asset holds {count})")]
    MotionOutOfRange {
        /// The requested index
        index: usize,
        /// Number of slots in the asset
        count: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Import settings failed validation.
    #[error("Invalid import settings: {0}")]
    InvalidSettings(String),
}

/// Alias for `Result<T, RetargetError>`.
pub type Result<T> = std::result::Result<T, RetargetError>;
