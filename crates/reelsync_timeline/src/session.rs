// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session root.
//!
//! [`TimelineSession`] owns the timeline, the windows, the frame cache and
//! the playback manager, and wires them together. Hosts talk to the engine
//! through it; nothing in the crate reaches for global state.

use crate::action::ActionRegistry;
use crate::config::TimelineConfig;
use crate::content::{Content, ContentId, ContentKind};
use crate::controller::{ContentController, ContentState};
use crate::error::{Result, TimelineError};
use crate::event::{EventId, TimelineEvent};
use crate::event_controller::{EventController, EventState};
use crate::frame_cache::FrameCache;
use crate::media::{NullSurfaceFactory, SurfaceFactory};
use crate::objects::{ObjectStore, SceneObjects};
use crate::persist::{FromRecord, ProjectRecord, ToRecord};
use crate::playback::{Clock, PlaybackManager, PlaybackReport, Scene};
use crate::timeline::{PlacementHint, Timeline};
use crate::track::Track;
use crate::window::{WindowManager, WindowRect};
use std::path::Path;

/// Owns one timeline and everything that plays it
pub struct TimelineSession {
    config: TimelineConfig,
    timeline: Timeline,
    windows: WindowManager,
    frames: FrameCache,
    playback: PlaybackManager,
    registry: ActionRegistry,
    surfaces: Box<dyn SurfaceFactory>,
    objects: Box<dyn ObjectStore>,
}

impl TimelineSession {
    /// Create an empty session
    pub fn new(
        config: TimelineConfig,
        surfaces: Box<dyn SurfaceFactory>,
        objects: Box<dyn ObjectStore>,
    ) -> Self {
        Self {
            timeline: Timeline::new(&config),
            windows: WindowManager::new(config.default_window_size),
            frames: FrameCache::new(config.frame_cache_capacity),
            playback: PlaybackManager::new(),
            registry: ActionRegistry::with_builtin(),
            surfaces,
            objects,
            config,
        }
    }

    /// Session with default config, null surfaces and an in-memory object store
    pub fn with_defaults() -> Self {
        Self::new(
            TimelineConfig::default(),
            Box::new(NullSurfaceFactory),
            Box::new(SceneObjects::new()),
        )
    }

    /// Replace the action registry. Affects events added afterwards.
    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn parts(&mut self) -> (&mut PlaybackManager, Scene<'_>) {
        (
            &mut self.playback,
            Scene {
                timeline: &self.timeline,
                windows: &mut self.windows,
                frames: &mut self.frames,
                objects: self.objects.as_mut(),
                instant_threshold: self.config.instant_tween_threshold,
            },
        )
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Active configuration
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Content model
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Preview windows
    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    /// Frame cache
    pub fn frames(&self) -> &FrameCache {
        &self.frames
    }

    /// Playback manager
    pub fn playback(&self) -> &PlaybackManager {
        &self.playback
    }

    /// Action registry
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Host object store
    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    /// Mutable host object store
    pub fn objects_mut(&mut self) -> &mut dyn ObjectStore {
        self.objects.as_mut()
    }

    /// Clock snapshot
    pub fn clock(&self) -> Clock {
        self.playback.clock()
    }

    /// Current time
    pub fn now(&self) -> f64 {
        self.playback.now()
    }

    /// Content controller state
    pub fn content_state(&self, id: ContentId) -> Option<ContentState> {
        self.playback.content_state(id)
    }

    /// Event trigger state
    pub fn event_state(&self, id: EventId) -> Option<EventState> {
        self.playback.event_state(id)
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    /// Start playing
    pub fn play(&mut self) -> PlaybackReport {
        let (playback, mut scene) = self.parts();
        playback.play(&mut scene)
    }

    /// Stop playing, keeping the time
    pub fn stop(&mut self) -> PlaybackReport {
        let (playback, mut scene) = self.parts();
        playback.stop(&mut scene)
    }

    /// Toggle play state
    pub fn toggle(&mut self) -> PlaybackReport {
        let (playback, mut scene) = self.parts();
        playback.toggle(&mut scene)
    }

    /// Jump to a time
    pub fn set_time(&mut self, time: f64) -> PlaybackReport {
        let (playback, mut scene) = self.parts();
        playback.set_time(time, &mut scene)
    }

    /// Jump relative to the current time
    pub fn seek_relative(&mut self, delta: f64) -> PlaybackReport {
        let (playback, mut scene) = self.parts();
        playback.seek_relative(delta, &mut scene)
    }

    /// Set the speed multiplier, returning the applied value
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.playback.set_speed(speed)
    }

    /// Advance by wall time `dt`; call once per host frame
    pub fn tick(&mut self, dt: f64) -> PlaybackReport {
        let (playback, mut scene) = self.parts();
        playback.tick(dt, &mut scene)
    }

    // ---------------------------------------------------------------------
    // Tracks
    // ---------------------------------------------------------------------

    /// Append a track
    pub fn add_track(&mut self) -> usize {
        self.timeline.add_track()
    }

    /// Remove an empty track; later windows restack
    pub fn remove_track(&mut self, index: usize) -> Result<Track> {
        let track = self.timeline.remove_track(index)?;
        self.windows.on_tracks_changed(&self.timeline);
        Ok(track)
    }

    /// Lock or unlock a track
    pub fn set_track_locked(&mut self, index: usize, locked: bool) -> Result<()> {
        self.timeline.set_track_locked(index, locked)
    }

    /// Hide or show a track
    pub fn set_track_hidden(&mut self, index: usize, hidden: bool) -> Result<()> {
        self.timeline.set_track_hidden(index, hidden)
    }

    // ---------------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------------

    /// Add content, build its surface and sync it to the clock.
    ///
    /// Without a duration, images get the configured image default and
    /// everything else the media default.
    pub fn add_content(
        &mut self,
        kind: ContentKind,
        source: impl Into<String>,
        duration: Option<f64>,
        hint: PlacementHint,
    ) -> Result<ContentId> {
        let duration = duration.unwrap_or(match kind {
            ContentKind::Image => self.config.default_image_duration,
            _ => self.config.default_media_duration,
        });
        let id = self.timeline.add_content(kind, source, duration, hint)?;
        self.attach(id);
        Ok(id)
    }

    fn attach(&mut self, id: ContentId) {
        let Some(content) = self.timeline.content(id) else {
            return;
        };
        let surface = self.surfaces.create_surface(content);
        let controller = ContentController::new(id, surface, self.config.content_epsilon);
        let (playback, mut scene) = self.parts();
        playback.add_content(controller, &mut scene);
    }

    /// Move content and resync it. Returns the resolved start.
    pub fn move_content(
        &mut self,
        id: ContentId,
        desired_start: f64,
        track: Option<usize>,
    ) -> Result<f64> {
        let before = self
            .timeline
            .content(id)
            .map(|c| c.track)
            .ok_or(TimelineError::UnknownContent(id))?;
        let start = self.timeline.move_content(id, desired_start, track)?;
        if track.is_some_and(|t| t != before) {
            self.windows.on_tracks_changed(&self.timeline);
        }
        let (playback, mut scene) = self.parts();
        playback.resync_content(id, &mut scene);
        Ok(start)
    }

    /// Resize content and resync it. Returns the applied duration.
    pub fn resize_content(&mut self, id: ContentId, duration: f64) -> Result<f64> {
        let applied = self.timeline.resize_content(id, duration)?;
        let (playback, mut scene) = self.parts();
        playback.resync_content(id, &mut scene);
        Ok(applied)
    }

    /// Set a model's initial animation
    pub fn set_content_animation(&mut self, id: ContentId, animation: Option<String>) -> Result<()> {
        self.timeline.set_animation(id, animation)
    }

    /// Stop the content's surface, destroy its window and drop it
    pub fn remove_content(&mut self, id: ContentId) -> Result<Content> {
        if self.timeline.content(id).is_none() {
            return Err(TimelineError::UnknownContent(id));
        }
        let (playback, mut scene) = self.parts();
        playback.remove_content(id, &mut scene);
        self.windows.remove(id);
        self.timeline.remove_content(id)
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Arm an event. Actions that fail validation are logged and skipped.
    pub fn add_event(&mut self, event: TimelineEvent) -> EventId {
        let controller = EventController::new(
            event,
            &self.registry,
            self.config.event_epsilon,
            self.config.event_trigger_slack,
        );
        self.playback.add_event(controller)
    }

    /// Remove an event, undoing it if it had fired
    pub fn remove_event(&mut self, id: EventId) -> Result<TimelineEvent> {
        let (playback, mut scene) = self.parts();
        playback
            .remove_event(id, &mut scene)
            .map(|controller| controller.event().clone())
            .ok_or(TimelineError::UnknownEvent(id))
    }

    /// Replace an event with an edited version, undoing the old one first
    pub fn update_event(&mut self, event: TimelineEvent) -> Result<EventId> {
        self.remove_event(event.id)?;
        Ok(self.add_event(event))
    }

    /// Events in registration order
    pub fn events(&self) -> impl Iterator<Item = &TimelineEvent> {
        self.playback.event_controllers().map(EventController::event)
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Undo fired events, stop every surface and drop all content and events.
    /// The clock returns to a stopped zero.
    pub fn clear(&mut self) {
        let events: Vec<EventId> = self.events().map(|e| e.id).collect();
        for id in events {
            let (playback, mut scene) = self.parts();
            playback.remove_event(id, &mut scene);
        }
        let contents: Vec<ContentId> = self.timeline.contents().map(|c| c.id).collect();
        for id in contents {
            let (playback, mut scene) = self.parts();
            playback.remove_content(id, &mut scene);
        }
        self.timeline = Timeline::new(&self.config);
        self.windows = WindowManager::new(self.config.default_window_size);
        self.frames = FrameCache::new(self.config.frame_cache_capacity);
        self.playback = PlaybackManager::new();
    }

    /// Capture the project
    pub fn to_record(&self) -> ProjectRecord {
        let clips = self
            .timeline
            .contents()
            .map(|content| {
                let mut clip = content.to_record();
                if content.kind.has_window() {
                    clip.window_rect = self.windows.rect(content.id).map(|r| r.to_record());
                }
                clip
            })
            .collect();

        ProjectRecord {
            tracks: self.timeline.tracks().iter().map(ToRecord::to_record).collect(),
            clips,
            events: self.events().map(ToRecord::to_record).collect(),
            settings: Some(self.config.clone()),
            ..ProjectRecord::default()
        }
    }

    /// Replace everything with a project record.
    ///
    /// Saved settings replace the session config. Clips are placed in start
    /// order; one that cannot be placed is logged and skipped.
    pub fn load_record(&mut self, record: ProjectRecord) {
        if let Some(settings) = record.settings.clone() {
            self.config = settings.sanitized();
        }
        self.clear();

        let required = record.required_tracks();
        for track in record.tracks {
            self.timeline.push_track(Track::from_record(track, &self.config));
        }
        self.timeline.ensure_tracks(required);

        let mut clips: Vec<(Content, Option<WindowRect>)> = record
            .clips
            .into_iter()
            .map(|mut clip| {
                let window = clip
                    .window_rect
                    .take()
                    .map(|w| WindowRect::from_record(w, &self.config));
                (Content::from_record(clip, &self.config), window)
            })
            .collect();
        clips.sort_by(|a, b| a.0.start.total_cmp(&b.0.start));

        for (content, window) in clips {
            let source = content.source.clone();
            let id = match self.timeline.insert_content(content) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Skipping clip '{}': {}", source, e);
                    continue;
                }
            };
            if let (Some(rect), Some(content)) = (window, self.timeline.content(id)) {
                if content.kind.has_window() {
                    self.windows.set_rect(content, rect);
                }
            }
            self.attach(id);
        }

        for event in record.events {
            let event = TimelineEvent::from_record(event, &self.config);
            self.add_event(event);
        }

        tracing::info!(
            "Project ready: {} tracks, {} contents, {} events",
            self.timeline.track_count(),
            self.timeline.content_count(),
            self.events().count()
        );
    }

    /// Load a project file
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let record = ProjectRecord::load(path)?;
        self.load_record(record);
        Ok(())
    }

    /// Save the project to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        self.to_record().save(path)
    }
}

impl std::fmt::Debug for TimelineSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineSession")
            .field("clock", &self.playback.clock())
            .field("tracks", &self.timeline.track_count())
            .field("contents", &self.timeline.content_count())
            .field("windows", &self.windows.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventAction;

    #[test]
    fn test_add_content_defaults_duration_by_kind() {
        let mut session = TimelineSession::with_defaults();
        let image = session
            .add_content(ContentKind::Image, "a.png", None, PlacementHint::Auto)
            .unwrap();
        let video = session
            .add_content(ContentKind::Video, "b.mp4", None, PlacementHint::Auto)
            .unwrap();

        let config = session.config().clone();
        assert_eq!(
            session.timeline().content(image).unwrap().duration,
            config.default_image_duration
        );
        assert_eq!(
            session.timeline().content(video).unwrap().duration,
            config.default_media_duration
        );
        assert_eq!(session.content_state(image), Some(ContentState::Active));
    }

    #[test]
    fn test_remove_content_drops_window() {
        let mut session = TimelineSession::with_defaults();
        let id = session
            .add_content(ContentKind::Video, "a.mp4", Some(5.0), PlacementHint::Auto)
            .unwrap();
        assert!(session.windows().is_visible(id));

        session.remove_content(id).unwrap();
        assert!(session.windows().window(id).is_none());
        assert!(session.content_state(id).is_none());
        assert!(matches!(
            session.remove_content(id),
            Err(TimelineError::UnknownContent(_))
        ));
    }

    #[test]
    fn test_update_event_rearms() {
        let mut session = TimelineSession::with_defaults();
        let event = TimelineEvent::new("note", 1.0).with_action(EventAction::new("Debug", ""));
        let id = session.add_event(event.clone());

        session.set_time(1.0);
        assert_eq!(session.event_state(id), Some(EventState::Triggered));

        let mut moved = event;
        moved.time = 3.0;
        session.update_event(moved).unwrap();
        assert_eq!(session.event_state(id), Some(EventState::Armed));
        assert_eq!(session.events().next().unwrap().time, 3.0);
    }

    #[test]
    fn test_record_round_trip_keeps_layout() {
        let mut session = TimelineSession::with_defaults();
        for _ in 0..3 {
            session.add_track();
        }
        session.set_track_locked(1, true).unwrap();
        let hint = PlacementHint::At {
            track: 0,
            start: 2.0,
        };
        let a = session
            .add_content(ContentKind::Video, "a.mp4", Some(4.0), hint)
            .unwrap();
        session
            .add_content(ContentKind::Audio, "b.ogg", Some(3.0), PlacementHint::Track(2))
            .unwrap();
        session.add_event(TimelineEvent::new("cue", 1.5));
        session.set_time(3.0);

        let record = session.to_record();
        assert!(record.clips.iter().any(|c| c.window_rect.is_some()));

        let mut restored = TimelineSession::with_defaults();
        restored.load_record(record);

        assert_eq!(restored.timeline().track_count(), 3);
        assert!(restored.timeline().track(1).unwrap().locked);
        assert_eq!(restored.timeline().content_count(), 2);
        assert_eq!(restored.events().count(), 1);

        let video = restored
            .timeline()
            .contents()
            .find(|c| c.kind == ContentKind::Video)
            .unwrap();
        let original = session.timeline().content(a).unwrap();
        assert_eq!(video.start, original.start);
        assert_eq!(video.track, 0);
    }
}
