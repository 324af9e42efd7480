// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for timeline operations.

use crate::content::ContentId;
use crate::event::EventId;
use thiserror::Error;

/// Timeline errors
///
/// Every variant is local to the operation that produced it. Nothing here
/// stops the clock or touches other controllers.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Track index does not exist
    #[error("Unknown track: {0}")]
    UnknownTrack(usize),

    /// Track is locked against edits
    #[error("Track {0} is locked")]
    TrackLocked(usize),

    /// Track still holds content
    #[error("Track {0} is not empty")]
    TrackNotEmpty(usize),

    /// Content ID is not registered
    #[error("Unknown content: {0:?}")]
    UnknownContent(ContentId),

    /// Event ID is not registered
    #[error("Unknown event: {0:?}")]
    UnknownEvent(EventId),

    /// Duration must be positive and finite
    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),

    /// Action target could not be resolved
    #[error("Unresolved action target: {0}")]
    UnresolvedTarget(String),

    /// Action type is unknown or its parameters are incomplete
    #[error("Invalid action '{action_type}': {reason}")]
    InvalidAction {
        /// Declared action type
        action_type: String,
        /// What was wrong
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] ron::Error),

    /// File was written by a newer format version
    #[error("Format version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
