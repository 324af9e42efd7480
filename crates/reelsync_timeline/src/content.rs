// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline content items.

use crate::placement::Interval;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub Uuid);

impl ContentId {
    /// Create a new random content ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Video clip
    Video,
    /// Still image
    Image,
    /// Audio clip
    Audio,
    /// Animated 3D model
    Model,
}

impl ContentKind {
    /// All kinds, in target-naming order
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Video,
        ContentKind::Image,
        ContentKind::Audio,
        ContentKind::Model,
    ];

    /// Get the display name, also used as the target-name prefix
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Image => "Image",
            Self::Audio => "Audio",
            Self::Model => "Model",
        }
    }

    /// Parse a display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Whether this kind gets an on-screen preview window
    pub fn has_window(&self) -> bool {
        matches!(self, Self::Video | Self::Image)
    }

    /// Whether this kind has a playhead that plays, pauses and seeks
    pub fn is_timed(&self) -> bool {
        !matches!(self, Self::Image)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A time-bounded item on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Unique content ID
    pub id: ContentId,
    /// Content kind
    pub kind: ContentKind,
    /// Media path or asset reference, opaque to the engine
    pub source: String,
    /// Initial animation for models
    pub animation: Option<String>,
    /// Start time in seconds
    pub start: f64,
    /// Duration in seconds, always positive
    pub duration: f64,
    /// Index of the owning track
    pub track: usize,
}

impl Content {
    /// Create a new content item
    pub fn new(
        kind: ContentKind,
        source: impl Into<String>,
        start: f64,
        duration: f64,
        track: usize,
    ) -> Self {
        Self {
            id: ContentId::new(),
            kind,
            source: source.into(),
            animation: None,
            start,
            duration,
            track,
        }
    }

    /// Builder: set the initial animation
    pub fn with_animation(mut self, animation: impl Into<String>) -> Self {
        self.animation = Some(animation.into());
        self
    }

    /// End time (exclusive)
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Occupied interval
    pub fn interval(&self) -> Interval {
        Interval::from_duration(self.start, self.duration)
    }

    /// Whether `time` lies in `[start - epsilon, end + epsilon]`
    pub fn is_within(&self, time: f64, epsilon: f64) -> bool {
        time >= self.start - epsilon && time <= self.end() + epsilon
    }

    /// Convert a timeline time to a position inside the media
    pub fn local_time(&self, time: f64) -> f64 {
        (time - self.start).clamp(0.0, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_includes_tolerance() {
        let content = Content::new(ContentKind::Video, "a.mp4", 2.0, 3.0, 0);
        assert!(content.is_within(1.96, 0.05));
        assert!(content.is_within(5.04, 0.05));
        assert!(!content.is_within(1.9, 0.05));
        assert!(!content.is_within(5.1, 0.05));
    }

    #[test]
    fn test_local_time_clamps() {
        let content = Content::new(ContentKind::Audio, "a.ogg", 2.0, 3.0, 0);
        assert_eq!(content.local_time(1.0), 0.0);
        assert_eq!(content.local_time(3.5), 1.5);
        assert_eq!(content.local_time(9.0), 3.0);
    }

    #[test]
    fn test_kind_names() {
        for kind in ContentKind::ALL {
            assert_eq!(ContentKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ContentKind::from_name("Sprite"), None);
        assert!(ContentKind::Image.has_window());
        assert!(!ContentKind::Image.is_timed());
        assert!(!ContentKind::Audio.has_window());
    }
}
