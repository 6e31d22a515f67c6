//! Typed errors for input validation and persistent stores.
//!
//! Everything else travels as `anyhow::Error`; these variants exist so callers
//! can tell a rejected request apart from an operational failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodError {
    #[error("Invalid mood: {given}. Supported moods: {supported}")]
    UnknownMood { given: String, supported: String },
    #[error("Invalid activity: {given}. Supported activities: {supported}")]
    UnknownActivity { given: String, supported: String },
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("Invalid seed set: {0}")]
    InvalidSeedSet(String),
    #[error("Calibration already running for user `{0}`")]
    CalibrationInProgress(String),
    #[error("Calibration failed: no valid heart rate readings")]
    NoHeartRateReadings,
    #[error("Feedback store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
