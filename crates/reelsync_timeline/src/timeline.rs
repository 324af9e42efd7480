// SPDX-License-Identifier: MIT OR Apache-2.0
//! Content registry and track layout.
//!
//! Every mutation of a start time or track goes through the placement engine,
//! so content on the same track never overlaps.

use crate::config::TimelineConfig;
use crate::content::{Content, ContentId, ContentKind};
use crate::error::{Result, TimelineError};
use crate::placement::{Interval, PlacementEngine, TrackOccupancy, TrackSlot};
use crate::track::Track;
use indexmap::IndexMap;

/// Where new content should go
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlacementHint {
    /// First empty track, after everything already placed
    #[default]
    Auto,
    /// Given track, after its last item
    Track(usize),
    /// Given track near the given start (snapped and resolved)
    At {
        /// Track index
        track: usize,
        /// Desired start time
        start: f64,
    },
}

/// Tracks plus the content placed on them
#[derive(Debug, Clone)]
pub struct Timeline {
    tracks: Vec<Track>,
    contents: IndexMap<ContentId, Content>,
    placement: PlacementEngine,
    min_duration: f64,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            tracks: Vec::new(),
            contents: IndexMap::new(),
            placement: PlacementEngine::new(config),
            min_duration: config.min_image_duration,
        }
    }

    /// Placement engine
    pub fn placement(&self) -> &PlacementEngine {
        &self.placement
    }

    /// Mutable placement engine (zoom, scroll)
    pub fn placement_mut(&mut self) -> &mut PlacementEngine {
        &mut self.placement
    }

    // ---------------------------------------------------------------------
    // Tracks
    // ---------------------------------------------------------------------

    /// Append a track and return its index
    pub fn add_track(&mut self) -> usize {
        let index = self.tracks.len();
        self.tracks.push(Track::new(Track::default_name(index)));
        index
    }

    /// Append an existing track and return its index
    pub fn push_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Append tracks until there are at least `count`
    pub fn ensure_tracks(&mut self, count: usize) {
        while self.tracks.len() < count {
            self.add_track();
        }
    }

    /// Remove an empty track. Later tracks shift down by one.
    pub fn remove_track(&mut self, index: usize) -> Result<Track> {
        if index >= self.tracks.len() {
            return Err(TimelineError::UnknownTrack(index));
        }
        if self.contents.values().any(|c| c.track == index) {
            return Err(TimelineError::TrackNotEmpty(index));
        }

        let track = self.tracks.remove(index);
        for content in self.contents.values_mut() {
            if content.track > index {
                content.track -= 1;
            }
        }
        Ok(track)
    }

    /// Lock or unlock a track
    pub fn set_track_locked(&mut self, index: usize, locked: bool) -> Result<()> {
        self.track_mut(index)?.locked = locked;
        Ok(())
    }

    /// Hide or show a track
    pub fn set_track_hidden(&mut self, index: usize, hidden: bool) -> Result<()> {
        self.track_mut(index)?.hidden = hidden;
        Ok(())
    }

    /// Rename a track
    pub fn rename_track(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.track_mut(index)?.name = name.into();
        Ok(())
    }

    /// Get a track
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    fn track_mut(&mut self, index: usize) -> Result<&mut Track> {
        self.tracks
            .get_mut(index)
            .ok_or(TimelineError::UnknownTrack(index))
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn editable_track(&self, index: usize) -> Result<&Track> {
        let track = self
            .tracks
            .get(index)
            .ok_or(TimelineError::UnknownTrack(index))?;
        if track.locked {
            return Err(TimelineError::TrackLocked(index));
        }
        Ok(track)
    }

    // ---------------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------------

    /// Place new content and return its ID.
    ///
    /// A failure leaves tracks and content untouched.
    pub fn add_content(
        &mut self,
        kind: ContentKind,
        source: impl Into<String>,
        duration: f64,
        hint: PlacementHint,
    ) -> Result<ContentId> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(TimelineError::InvalidDuration(duration));
        }

        let (track, desired) = match hint {
            PlacementHint::Auto => {
                let occupancy: Vec<TrackOccupancy> = (0..self.tracks.len())
                    .map(|i| TrackOccupancy {
                        content_count: self.contents_on_track(i).count(),
                        locked: self.tracks[i].locked,
                    })
                    .collect();
                let track = match self.placement.available_track(occupancy) {
                    TrackSlot::Existing(i) => i,
                    TrackSlot::Append => self.add_track(),
                };
                (track, self.content_end())
            }
            PlacementHint::Track(track) => {
                self.editable_track(track)?;
                let after = self
                    .contents_on_track(track)
                    .map(Content::end)
                    .fold(0.0, f64::max);
                (track, after)
            }
            PlacementHint::At { track, start } => {
                self.editable_track(track)?;
                (track, self.snap(start, None))
            }
        };

        let start = self.resolve_no_overlap_start(track, None, desired, duration);
        let content = Content::new(kind, source, start, duration, track);
        let id = content.id;
        self.placement.ensure_extent(content.end());
        tracing::debug!("Placed {} {:?} on track {} at {:.3}s", kind, id, track, start);
        self.contents.insert(id, content);
        Ok(id)
    }

    /// Insert a fully built item (project load). Its start is re-resolved
    /// against the target track so a corrupt file cannot create overlaps.
    pub fn insert_content(&mut self, mut content: Content) -> Result<ContentId> {
        if !(content.duration.is_finite() && content.duration > 0.0) {
            return Err(TimelineError::InvalidDuration(content.duration));
        }
        if content.track >= self.tracks.len() {
            return Err(TimelineError::UnknownTrack(content.track));
        }

        content.start =
            self.resolve_no_overlap_start(content.track, None, content.start, content.duration);
        self.placement.ensure_extent(content.end());
        let id = content.id;
        self.contents.insert(id, content);
        Ok(id)
    }

    /// Move content to a new start and optionally a new track.
    ///
    /// The start is snapped, then pushed to the first free slot. Returns the
    /// resolved start.
    pub fn move_content(
        &mut self,
        id: ContentId,
        desired_start: f64,
        track: Option<usize>,
    ) -> Result<f64> {
        let (current_track, duration) = {
            let content = self.content(id).ok_or(TimelineError::UnknownContent(id))?;
            (content.track, content.duration)
        };
        self.editable_track(current_track)?;
        let target = track.unwrap_or(current_track);
        self.editable_track(target)?;

        let snapped = self.snap(desired_start, Some(id));
        let resolved = self.resolve_no_overlap_start(target, Some(id), snapped, duration);

        if let Some(content) = self.contents.get_mut(&id) {
            content.start = resolved;
            content.track = target;
        }
        self.placement.ensure_extent(resolved + duration);
        Ok(resolved)
    }

    /// Change a content's duration.
    ///
    /// The result is at least the minimum duration and never runs into the
    /// next item on the same track. Returns the applied duration.
    pub fn resize_content(&mut self, id: ContentId, duration: f64) -> Result<f64> {
        if !duration.is_finite() {
            return Err(TimelineError::InvalidDuration(duration));
        }
        let (track, start) = {
            let content = self.content(id).ok_or(TimelineError::UnknownContent(id))?;
            (content.track, content.start)
        };
        self.editable_track(track)?;

        let room = self
            .occupied(track, Some(id))
            .filter(|iv| iv.start >= start)
            .map(|iv| iv.start - start)
            .fold(f64::INFINITY, f64::min);
        let applied = duration.max(self.min_duration.min(room)).min(room);

        if let Some(content) = self.contents.get_mut(&id) {
            content.duration = applied;
        }
        self.placement.ensure_extent(start + applied);
        Ok(applied)
    }

    /// Remove content
    pub fn remove_content(&mut self, id: ContentId) -> Result<Content> {
        self.contents
            .shift_remove(&id)
            .ok_or(TimelineError::UnknownContent(id))
    }

    /// Get content by ID
    pub fn content(&self, id: ContentId) -> Option<&Content> {
        self.contents.get(&id)
    }

    /// Set a model's initial animation
    pub fn set_animation(&mut self, id: ContentId, animation: Option<String>) -> Result<()> {
        let content = self
            .contents
            .get_mut(&id)
            .ok_or(TimelineError::UnknownContent(id))?;
        content.animation = animation;
        Ok(())
    }

    /// All content in insertion order
    pub fn contents(&self) -> impl Iterator<Item = &Content> {
        self.contents.values()
    }

    /// Number of content items
    pub fn content_count(&self) -> usize {
        self.contents.len()
    }

    /// Content on one track
    pub fn contents_on_track(&self, track: usize) -> impl Iterator<Item = &Content> {
        self.contents.values().filter(move |c| c.track == track)
    }

    /// Latest end time of any content
    pub fn content_end(&self) -> f64 {
        self.contents.values().map(Content::end).fold(0.0, f64::max)
    }

    /// Occupied intervals of a track, optionally skipping one item
    pub fn occupied(
        &self,
        track: usize,
        exclude: Option<ContentId>,
    ) -> impl Iterator<Item = Interval> + '_ {
        self.contents_on_track(track)
            .filter(move |c| Some(c.id) != exclude)
            .map(Content::interval)
    }

    /// Start and end times of every item on every track, optionally skipping one
    pub fn snap_edges(&self, exclude: Option<ContentId>) -> impl Iterator<Item = f64> + '_ {
        self.contents
            .values()
            .filter(move |c| Some(c.id) != exclude)
            .flat_map(|c| [c.start, c.end()])
    }

    /// Snap a time against all content edges (across tracks)
    pub fn snap(&self, desired: f64, exclude: Option<ContentId>) -> f64 {
        self.placement.snap(desired, self.snap_edges(exclude))
    }

    /// Earliest overlap-free start on `track`
    pub fn resolve_no_overlap_start(
        &self,
        track: usize,
        moving: Option<ContentId>,
        desired_start: f64,
        duration: f64,
    ) -> f64 {
        self.placement
            .resolve_no_overlap_start(self.occupied(track, moving), desired_start, duration)
    }

    // ---------------------------------------------------------------------
    // Target naming
    // ---------------------------------------------------------------------

    /// Stable target name, e.g. `Video_0`: kind plus index among that kind
    pub fn target_name(&self, id: ContentId) -> Option<String> {
        let kind = self.content(id)?.kind;
        let index = self
            .contents
            .values()
            .filter(|c| c.kind == kind)
            .position(|c| c.id == id)?;
        Some(format!("{}_{}", kind.name(), index))
    }

    /// Resolve a target name back to content
    pub fn resolve_target(&self, name: &str) -> Option<ContentId> {
        let (prefix, index) = name.rsplit_once('_')?;
        let kind = ContentKind::from_name(prefix)?;
        let index: usize = index.parse().ok()?;
        self.contents
            .values()
            .filter(|c| c.kind == kind)
            .nth(index)
            .map(|c| c.id)
    }
}
