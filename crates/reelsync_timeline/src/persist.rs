// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project records.
//!
//! Records are the on-disk shape of a project, stored as RON. Reading a
//! record never fails on bad numbers: they are clamped into range and the
//! fix is logged.

use crate::config::TimelineConfig;
use crate::content::{Content, ContentKind};
use crate::error::{Result, TimelineError};
use crate::event::TimelineEvent;
use crate::track::Track;
use crate::window::WindowRect;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current project format version
pub const PROJECT_FORMAT_VERSION: u32 = 1;

/// Largest start or duration accepted from a file, in seconds
pub const MAX_RECORD_SECONDS: f64 = 24.0 * 60.0 * 60.0;
/// Number of tracks a clip may address; higher track ids land on the last one
pub const MAX_RECORD_TRACKS: usize = 256;
/// Largest absolute window coordinate
pub const MAX_WINDOW_POSITION: f32 = 2000.0;
/// Smallest window edge
pub const MIN_WINDOW_SIZE: f32 = 100.0;
/// Largest window edge
pub const MAX_WINDOW_SIZE: f32 = 2000.0;

/// Conversion into a record
pub trait ToRecord {
    /// Record type
    type Record;

    /// Capture the current state
    fn to_record(&self) -> Self::Record;
}

/// Conversion back from a record, clamping anything out of range
pub trait FromRecord: Sized {
    /// Record type
    type Record;

    /// Rebuild from a record
    fn from_record(record: Self::Record, config: &TimelineConfig) -> Self;
}

/// Stored track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Locked flag
    #[serde(default)]
    pub locked: bool,
    /// Hidden flag
    #[serde(default)]
    pub hidden: bool,
}

impl ToRecord for Track {
    type Record = TrackRecord;

    fn to_record(&self) -> TrackRecord {
        TrackRecord {
            name: self.name.clone(),
            locked: self.locked,
            hidden: self.hidden,
        }
    }
}

impl FromRecord for Track {
    type Record = TrackRecord;

    fn from_record(record: TrackRecord, _config: &TimelineConfig) -> Self {
        Track::new(record.name)
            .with_locked(record.locked)
            .with_hidden(record.hidden)
    }
}

/// Stored window geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Position
    pub position: [f32; 2],
    /// Size
    pub size: [f32; 2],
    /// Lower anchor
    #[serde(default = "centered")]
    pub anchor_min: [f32; 2],
    /// Upper anchor
    #[serde(default = "centered")]
    pub anchor_max: [f32; 2],
    /// Pivot
    #[serde(default = "centered")]
    pub pivot: [f32; 2],
}

fn centered() -> [f32; 2] {
    [0.5, 0.5]
}

impl ToRecord for WindowRect {
    type Record = WindowRecord;

    fn to_record(&self) -> WindowRecord {
        WindowRecord {
            position: self.position,
            size: self.size,
            anchor_min: self.anchor_min,
            anchor_max: self.anchor_max,
            pivot: self.pivot,
        }
    }
}

impl FromRecord for WindowRect {
    type Record = WindowRecord;

    fn from_record(record: WindowRecord, _config: &TimelineConfig) -> Self {
        let position = record
            .position
            .map(|v| clamp_f32(v, -MAX_WINDOW_POSITION, MAX_WINDOW_POSITION, 0.0));
        let size = record
            .size
            .map(|v| clamp_f32(v, MIN_WINDOW_SIZE, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE));
        let unit = |v: [f32; 2]| v.map(|c| clamp_f32(c, 0.0, 1.0, 0.5));
        WindowRect {
            position,
            size,
            anchor_min: unit(record.anchor_min),
            anchor_max: unit(record.anchor_max),
            pivot: unit(record.pivot),
        }
    }
}

fn record_track(track_id: i64) -> usize {
    usize::try_from(track_id.max(0))
        .unwrap_or(usize::MAX)
        .min(MAX_RECORD_TRACKS - 1)
}

fn clamp_f32(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Stored content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRecord {
    /// Track index; negative values land on track 0, values past
    /// [`MAX_RECORD_TRACKS`] on the last track
    pub track_id: i64,
    /// Content kind
    pub kind: ContentKind,
    /// Media path or asset reference
    pub path_or_ref: String,
    /// Start in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Initial animation for models
    #[serde(default)]
    pub animation_ref: Option<String>,
    /// Preview window geometry
    #[serde(default)]
    pub window_rect: Option<WindowRecord>,
}

impl ToRecord for Content {
    type Record = ClipRecord;

    fn to_record(&self) -> ClipRecord {
        ClipRecord {
            track_id: i64::try_from(self.track).unwrap_or(i64::MAX),
            kind: self.kind,
            path_or_ref: self.source.clone(),
            start: self.start,
            duration: self.duration,
            animation_ref: self.animation.clone(),
            window_rect: None,
        }
    }
}

impl FromRecord for Content {
    type Record = ClipRecord;

    /// Window geometry is not part of [`Content`]; read it from the record
    /// before converting.
    fn from_record(record: ClipRecord, config: &TimelineConfig) -> Self {
        let track = record_track(record.track_id);
        if i64::try_from(track).ok() != Some(record.track_id) {
            tracing::warn!(
                "Clamped track of {} '{}': {} -> {}",
                record.kind,
                record.path_or_ref,
                record.track_id,
                track
            );
        }

        let start = if record.start.is_finite() {
            record.start.clamp(0.0, MAX_RECORD_SECONDS)
        } else {
            0.0
        };
        let kind_default = match record.kind {
            ContentKind::Image => config.default_image_duration,
            _ => config.default_media_duration,
        };
        let duration = if record.duration.is_finite() && record.duration > 0.0 {
            record.duration.min(MAX_RECORD_SECONDS)
        } else {
            kind_default
        };

        if start != record.start || duration != record.duration {
            tracing::warn!(
                "Clamped {} '{}': start {} -> {}, duration {} -> {}",
                record.kind,
                record.path_or_ref,
                record.start,
                start,
                record.duration,
                duration
            );
        }

        let mut content = Content::new(record.kind, record.path_or_ref, start, duration, track);
        content.animation = record.animation_ref;
        content
    }
}

impl ToRecord for TimelineEvent {
    type Record = TimelineEvent;

    fn to_record(&self) -> TimelineEvent {
        self.clone()
    }
}

impl FromRecord for TimelineEvent {
    type Record = TimelineEvent;

    fn from_record(mut record: TimelineEvent, _config: &TimelineConfig) -> Self {
        let non_negative = |v: f64| {
            if v.is_finite() {
                v.clamp(0.0, MAX_RECORD_SECONDS)
            } else {
                0.0
            }
        };
        record.time = non_negative(record.time);
        for action in &mut record.actions {
            action.delay = non_negative(action.delay);
            action.duration = non_negative(action.duration);
        }
        record
    }
}

/// A whole project on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Format version
    pub version: u32,
    /// Tracks in order
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
    /// Content items
    #[serde(default)]
    pub clips: Vec<ClipRecord>,
    /// Events
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    /// Settings saved with the project
    #[serde(default)]
    pub settings: Option<TimelineConfig>,
}

impl Default for ProjectRecord {
    fn default() -> Self {
        Self {
            version: PROJECT_FORMAT_VERSION,
            tracks: Vec::new(),
            clips: Vec::new(),
            events: Vec::new(),
            settings: None,
        }
    }
}

impl ProjectRecord {
    /// Load a project from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let record = Self::from_ron(&content)?;
        tracing::info!(
            "Loaded project {} ({} tracks, {} clips, {} events)",
            path.display(),
            record.tracks.len(),
            record.clips.len(),
            record.events.len()
        );
        Ok(record)
    }

    /// Parse a project from a RON string
    pub fn from_ron(s: &str) -> Result<Self> {
        let record: ProjectRecord = ron::from_str(s)?;

        if record.version > PROJECT_FORMAT_VERSION {
            return Err(TimelineError::UnsupportedVersion {
                found: record.version,
                supported: PROJECT_FORMAT_VERSION,
            });
        }

        Ok(record)
    }

    /// Save the project to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved project to {}", path.display());
        Ok(())
    }

    /// Serialize to a pretty RON string
    pub fn to_ron(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Number of tracks needed to hold every clip
    pub fn required_tracks(&self) -> usize {
        let by_clips = self
            .clips
            .iter()
            .map(|c| record_track(c.track_id) + 1)
            .max()
            .unwrap_or(0);
        by_clips.max(self.tracks.len())
    }
}
