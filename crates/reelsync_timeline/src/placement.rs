// SPDX-License-Identifier: MIT OR Apache-2.0
//! Placement engine: time/pixel mapping, snapping and overlap resolution.
//!
//! Time is the stored truth. Pixel positions are always derived from it, so a
//! zoom change only re-derives positions and never rescales stored values.
//!
//! The engine has no knowledge of content or tracks. Callers hand it plain
//! intervals, snap edges and track occupancy.

use crate::config::TimelineConfig;

/// Minimum zoom (pixels per grid cell)
pub const MIN_ZOOM: f64 = 2.0;
/// Maximum zoom (pixels per grid cell)
pub const MAX_ZOOM: f64 = 500.0;

/// A half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Inclusive start in seconds
    pub start: f64,
    /// Exclusive end in seconds
    pub end: f64,
}

impl Interval {
    /// Create an interval from a start and a duration
    pub fn from_duration(start: f64, duration: f64) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    /// Whether two half-open intervals share any instant
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Occupancy summary of one track, as seen by [`PlacementEngine::available_track`]
#[derive(Debug, Clone, Copy)]
pub struct TrackOccupancy {
    /// Number of content items on the track
    pub content_count: usize,
    /// Track refuses new content
    pub locked: bool,
}

/// Result of a track search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSlot {
    /// Reuse the empty track at this index
    Existing(usize),
    /// Append a new track
    Append,
}

/// Maps time to pixels and decides where content may sit.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    base_unit: f64,
    pixels_per_base_unit: f64,
    origin_px: f64,
    snap_pixel_threshold: f64,
    right_margin_px: f64,
    extent_end: f64,
}

impl PlacementEngine {
    /// Create an engine from config
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            base_unit: config.base_unit_seconds,
            pixels_per_base_unit: config
                .pixels_per_base_unit
                .clamp(MIN_ZOOM, MAX_ZOOM),
            origin_px: config.origin_px,
            snap_pixel_threshold: config.snap_pixel_threshold,
            right_margin_px: config.content_right_margin_px,
            extent_end: config.initial_extent_seconds,
        }
    }

    /// Convert time to x position
    pub fn time_to_x(&self, time: f64) -> f64 {
        self.origin_px + self.seconds_to_px(time)
    }

    /// Convert x position to time
    pub fn x_to_time(&self, x: f64) -> f64 {
        self.px_to_seconds(x - self.origin_px)
    }

    /// Convert a duration to a pixel width
    pub fn seconds_to_px(&self, seconds: f64) -> f64 {
        seconds / self.base_unit * self.pixels_per_base_unit
    }

    /// Convert a pixel width to a duration
    pub fn px_to_seconds(&self, px: f64) -> f64 {
        px / self.pixels_per_base_unit * self.base_unit
    }

    /// Current zoom (pixels per grid cell)
    pub fn zoom(&self) -> f64 {
        self.pixels_per_base_unit
    }

    /// Set the zoom, clamped to the supported range. Returns the applied value.
    pub fn set_zoom(&mut self, pixels_per_base_unit: f64) -> f64 {
        if pixels_per_base_unit.is_finite() {
            self.pixels_per_base_unit = pixels_per_base_unit.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        self.pixels_per_base_unit
    }

    /// Set the pixel offset of time zero (scrolling)
    pub fn set_origin(&mut self, origin_px: f64) {
        if origin_px.is_finite() {
            self.origin_px = origin_px;
        }
    }

    /// Seconds covered by one grid cell
    pub fn base_unit(&self) -> f64 {
        self.base_unit
    }

    /// Snap distance converted to seconds at the current zoom
    pub fn snap_threshold_seconds(&self) -> f64 {
        self.px_to_seconds(self.snap_pixel_threshold)
    }

    /// Quantize a time to the grid
    pub fn grid_time(&self, time: f64) -> f64 {
        (time / self.base_unit).round() * self.base_unit
    }

    /// Snap a desired time to the nearest edge, the grid, or leave it alone.
    ///
    /// `edges` are the start and end times of every other content item; time
    /// zero is always a candidate. The nearest candidate wins when it lies
    /// within the snap threshold. Past the threshold the grid value is used if
    /// nothing is nearer than it, otherwise `desired` comes back unchanged.
    /// The result is never negative.
    pub fn snap(&self, desired: f64, edges: impl IntoIterator<Item = f64>) -> f64 {
        let desired = if desired.is_finite() { desired } else { 0.0 };
        let grid = self.grid_time(desired);

        let mut nearest = grid;
        let mut best = (grid - desired).abs();
        let mut grid_is_nearest = true;

        for candidate in std::iter::once(0.0).chain(edges) {
            if !candidate.is_finite() {
                continue;
            }
            let dist = (candidate - desired).abs();
            if dist < best {
                best = dist;
                nearest = candidate;
                grid_is_nearest = false;
            }
        }

        let snapped = if best <= self.snap_threshold_seconds() || grid_is_nearest {
            nearest
        } else {
            desired
        };
        snapped.max(0.0)
    }

    /// Earliest start at or after `desired_start` where `duration` fits
    /// between the `occupied` intervals of one track.
    ///
    /// `occupied` must already exclude the item being placed.
    pub fn resolve_no_overlap_start(
        &self,
        occupied: impl IntoIterator<Item = Interval>,
        desired_start: f64,
        duration: f64,
    ) -> f64 {
        let desired_start = if desired_start.is_finite() {
            desired_start.max(0.0)
        } else {
            0.0
        };

        let mut intervals: Vec<Interval> = occupied.into_iter().collect();
        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

        if fits(&intervals, desired_start, desired_start + duration) {
            return desired_start;
        }

        for i in 0..=intervals.len() {
            let gap_start = if i == 0 { 0.0 } else { intervals[i - 1].end };
            let gap_end = intervals.get(i).map_or(f64::INFINITY, |iv| iv.start);

            let candidate = desired_start.max(gap_start);
            if candidate + duration <= gap_end {
                return candidate;
            }
        }

        // The trailing gap is unbounded, so this only runs on NaN durations.
        intervals.last().map_or(desired_start, |iv| iv.end)
    }

    /// Pick a track for new content: the first empty unlocked track, or a new one.
    pub fn available_track(
        &self,
        tracks: impl IntoIterator<Item = TrackOccupancy>,
    ) -> TrackSlot {
        tracks
            .into_iter()
            .position(|t| t.content_count == 0 && !t.locked)
            .map_or(TrackSlot::Append, TrackSlot::Existing)
    }

    /// Grow the addressable extent so `end_time` plus the margin is visible.
    ///
    /// Returns true if the extent grew. The extent never shrinks here.
    pub fn ensure_extent(&mut self, end_time: f64) -> bool {
        if end_time.is_finite() && end_time > self.extent_end {
            self.extent_end = end_time;
            true
        } else {
            false
        }
    }

    /// Last time guaranteed to be addressable
    pub fn extent_end(&self) -> f64 {
        self.extent_end
    }

    /// Addressable width in pixels, margin included
    pub fn extent_px(&self) -> f64 {
        self.time_to_x(self.extent_end) + self.right_margin_px
    }
}

/// Whether `[start, end)` avoids every interval of a sorted list.
fn fits(sorted: &[Interval], start: f64, end: f64) -> bool {
    let probe = Interval { start, end };
    for iv in sorted {
        if end <= iv.start {
            return true;
        }
        if probe.overlaps(iv) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PlacementEngine {
        PlacementEngine::new(&TimelineConfig::default())
    }

    /// 5 px per second, threshold 1.5 px = 0.3 s
    fn snap_engine() -> PlacementEngine {
        PlacementEngine::new(&TimelineConfig {
            base_unit_seconds: 4.0,
            pixels_per_base_unit: 20.0,
            snap_pixel_threshold: 1.5,
            ..TimelineConfig::default()
        })
    }

    #[test]
    fn test_mapping_is_invertible() {
        let mut engine = engine();
        engine.set_origin(200.0);
        for t in [0.0, 0.25, 3.7, 12.0, 999.5] {
            assert!((engine.x_to_time(engine.time_to_x(t)) - t).abs() < 1e-9);
        }
        for x in [200.0, 215.5, 1000.0, 4321.0] {
            assert!((engine.time_to_x(engine.x_to_time(x)) - x).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_rederives_pixels_only() {
        let mut engine = engine();
        let before = engine.time_to_x(8.0);
        engine.set_zoom(40.0);
        assert_eq!(engine.time_to_x(8.0), before * 2.0);
        assert_eq!(engine.set_zoom(10_000.0), MAX_ZOOM);
        assert_eq!(engine.set_zoom(0.0), MIN_ZOOM);
    }

    #[test]
    fn test_snap_to_nearby_edge() {
        let engine = snap_engine();
        assert_eq!(engine.snap(8.2, [8.0, 12.0]), 8.0);
    }

    #[test]
    fn test_snap_outside_threshold_falls_back_to_grid() {
        let engine = snap_engine();
        assert_eq!(engine.snap(9.0, [8.0]), 8.0);
        assert_eq!(engine.snap(9.0, std::iter::empty()), 8.0);
    }

    #[test]
    fn test_snap_keeps_desired_when_edge_beats_grid() {
        let engine = snap_engine();
        // Grid is 12.0 (distance 1.4), edge 9.5 is nearer but beyond 0.3 s.
        assert_eq!(engine.snap(10.6, [9.5]), 10.6);
    }

    #[test]
    fn test_snap_never_negative() {
        let engine = snap_engine();
        assert_eq!(engine.snap(-3.0, std::iter::empty()), 0.0);
        assert_eq!(engine.snap(f64::NAN, std::iter::empty()), 0.0);
    }

    #[test]
    fn test_resolve_gap_example() {
        let engine = engine();
        let occupied = [Interval::from_duration(0.0, 5.0), Interval::from_duration(10.0, 5.0)];
        assert_eq!(engine.resolve_no_overlap_start(occupied, 3.0, 4.0), 5.0);
    }

    #[test]
    fn test_resolve_keeps_fitting_start() {
        let engine = engine();
        let occupied = [Interval::from_duration(10.0, 5.0), Interval::from_duration(0.0, 5.0)];
        assert_eq!(engine.resolve_no_overlap_start(occupied, 5.0, 5.0), 5.0);
        assert_eq!(engine.resolve_no_overlap_start(occupied, 20.0, 3.0), 20.0);
    }

    #[test]
    fn test_resolve_moves_past_last_occupant() {
        let engine = engine();
        let occupied = [Interval::from_duration(0.0, 5.0), Interval::from_duration(6.0, 5.0)];
        assert_eq!(engine.resolve_no_overlap_start(occupied, 1.0, 4.0), 11.0);
    }

    #[test]
    fn test_available_track_skips_locked_and_occupied() {
        let engine = engine();
        let tracks = [
            TrackOccupancy { content_count: 2, locked: false },
            TrackOccupancy { content_count: 0, locked: true },
            TrackOccupancy { content_count: 0, locked: false },
        ];
        assert_eq!(engine.available_track(tracks), TrackSlot::Existing(2));
        assert_eq!(engine.available_track(tracks[..2].iter().copied()), TrackSlot::Append);
    }

    #[test]
    fn test_extent_only_grows() {
        let mut engine = engine();
        let start = engine.extent_end();
        assert!(engine.ensure_extent(start + 30.0));
        assert!(!engine.ensure_extent(1.0));
        assert_eq!(engine.extent_end(), start + 30.0);
        assert!(engine.extent_px() > engine.time_to_x(start + 30.0));
    }
}
