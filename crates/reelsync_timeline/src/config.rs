// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine configuration.
//!
//! Stored as RON next to the project. Missing fields fall back to the
//! defaults below so older config files keep loading.

use crate::error::{Result, TimelineError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Tunables for placement, synchronization and event triggering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Format version
    pub version: u32,
    /// Seconds covered by one grid cell
    pub base_unit_seconds: f64,
    /// Pixels per grid cell (zoom)
    pub pixels_per_base_unit: f64,
    /// Pixel offset of time zero (track header width, scroll)
    pub origin_px: f64,
    /// Snap distance in pixels
    pub snap_pixel_threshold: f64,
    /// Extra pixels kept visible after the last content
    pub content_right_margin_px: f64,
    /// Addressable width before any content is placed, in seconds
    pub initial_extent_seconds: f64,
    /// Edge tolerance for content intervals
    pub content_epsilon: f64,
    /// Edge tolerance for event trigger points
    pub event_epsilon: f64,
    /// How long after an event instant a landing still fires it
    pub event_trigger_slack: f64,
    /// Shortest duration a still image may be resized to
    pub min_image_duration: f64,
    /// Duration given to still images when none is known
    pub default_image_duration: f64,
    /// Duration given to timed media when none is known
    pub default_media_duration: f64,
    /// Tweens at or below this duration apply instantly
    pub instant_tween_threshold: f64,
    /// Size of a freshly created preview window
    pub default_window_size: [f32; 2],
    /// Number of frame handles kept by the frame cache
    pub frame_cache_capacity: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            base_unit_seconds: 4.0,
            pixels_per_base_unit: 20.0,
            origin_px: 0.0,
            snap_pixel_threshold: 10.0,
            content_right_margin_px: 200.0,
            initial_extent_seconds: 60.0,
            content_epsilon: 0.05,
            event_epsilon: 0.05,
            event_trigger_slack: 1.0,
            min_image_duration: 0.5,
            default_image_duration: 5.0,
            default_media_duration: 10.0,
            instant_tween_threshold: 0.01,
            default_window_size: [400.0, 300.0],
            frame_cache_capacity: 64,
        }
    }
}

impl TimelineConfig {
    /// Load a config from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::debug!("Loaded timeline config from {}", path.display());
        Ok(config)
    }

    /// Parse a config from a RON string
    pub fn from_ron(s: &str) -> Result<Self> {
        let config: TimelineConfig = ron::from_str(s)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(TimelineError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config.sanitized())
    }

    /// Save the config to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Serialize to a pretty RON string
    pub fn to_ron(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Replace values that would break the engine with defaults.
    pub(crate) fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        fn positive_or(value: f64, fallback: f64) -> f64 {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        }

        fn non_negative_or(value: f64, fallback: f64) -> f64 {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback
            }
        }

        self.base_unit_seconds = positive_or(self.base_unit_seconds, defaults.base_unit_seconds);
        self.pixels_per_base_unit =
            positive_or(self.pixels_per_base_unit, defaults.pixels_per_base_unit);
        if !self.origin_px.is_finite() {
            self.origin_px = defaults.origin_px;
        }
        self.snap_pixel_threshold =
            non_negative_or(self.snap_pixel_threshold, defaults.snap_pixel_threshold);
        self.content_right_margin_px =
            non_negative_or(self.content_right_margin_px, defaults.content_right_margin_px);
        self.initial_extent_seconds =
            non_negative_or(self.initial_extent_seconds, defaults.initial_extent_seconds);
        self.content_epsilon = non_negative_or(self.content_epsilon, defaults.content_epsilon);
        self.event_epsilon = non_negative_or(self.event_epsilon, defaults.event_epsilon);
        self.event_trigger_slack =
            non_negative_or(self.event_trigger_slack, defaults.event_trigger_slack);
        self.min_image_duration = positive_or(self.min_image_duration, defaults.min_image_duration);
        self.default_image_duration =
            positive_or(self.default_image_duration, defaults.default_image_duration);
        self.default_media_duration =
            positive_or(self.default_media_duration, defaults.default_media_duration);
        self.instant_tween_threshold =
            non_negative_or(self.instant_tween_threshold, defaults.instant_tween_threshold);
        if self.frame_cache_capacity == 0 {
            self.frame_cache_capacity = defaults.frame_cache_capacity;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let config = TimelineConfig {
            snap_pixel_threshold: 6.0,
            ..TimelineConfig::default()
        };
        let ron_str = config.to_ron().unwrap();
        let loaded = TimelineConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = TimelineConfig::from_ron("(snap_pixel_threshold: 3.0)").unwrap();
        assert_eq!(loaded.snap_pixel_threshold, 3.0);
        assert_eq!(loaded.base_unit_seconds, 4.0);
        assert_eq!(loaded.event_trigger_slack, 1.0);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = TimelineConfig::from_ron("(version: 99)").unwrap_err();
        assert!(matches!(err, TimelineError::UnsupportedVersion { found: 99, .. }));
    }

    #[test]
    fn test_broken_values_replaced() {
        let loaded =
            TimelineConfig::from_ron("(pixels_per_base_unit: -5.0, frame_cache_capacity: 0)")
                .unwrap();
        assert_eq!(loaded.pixels_per_base_unit, 20.0);
        assert_eq!(loaded.frame_cache_capacity, 64);
    }
}
