// SPDX-License-Identifier: MIT OR Apache-2.0
//! Master clock and playback manager.
//!
//! The clock only moves when the host calls [`PlaybackManager::tick`] or
//! jumps it explicitly. Every jump resyncs all content and event controllers
//! against the new time.

use crate::action::ActionContext;
use crate::content::ContentId;
use crate::controller::{ContentController, ContentState, ContentTransition, Stage};
use crate::event::EventId;
use crate::event_controller::{EventController, EventFiring, EventState};
use crate::frame_cache::FrameCache;
use crate::objects::ObjectStore;
use crate::timeline::Timeline;
use crate::window::WindowManager;
use indexmap::IndexMap;

/// Slowest playback speed
pub const MIN_SPEED: f64 = 0.1;
/// Fastest playback speed
pub const MAX_SPEED: f64 = 10.0;

/// Master clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    /// Current time in seconds, never negative
    pub now: f64,
    /// Whether ticks advance the clock
    pub is_playing: bool,
    /// Playback speed multiplier
    pub speed: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            now: 0.0,
            is_playing: false,
            speed: 1.0,
        }
    }
}

/// What changed during one clock operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackReport {
    /// Clock time afterwards
    pub time: f64,
    /// Play state afterwards
    pub is_playing: bool,
    /// Content state changes, in registration order
    pub content: Vec<ContentTransition>,
    /// Events fired or undone, in registration order
    pub events: Vec<EventFiring>,
}

impl PlaybackReport {
    /// Whether nothing changed besides the time
    pub fn is_quiet(&self) -> bool {
        self.content.is_empty() && self.events.is_empty()
    }
}

/// Everything controllers act upon, borrowed from the session for one call
pub struct Scene<'a> {
    /// Content registry
    pub timeline: &'a Timeline,
    /// Preview windows
    pub windows: &'a mut WindowManager,
    /// Frame cache
    pub frames: &'a mut FrameCache,
    /// Host scene objects
    pub objects: &'a mut dyn ObjectStore,
    /// Tweens at or below this length apply at once
    pub instant_threshold: f64,
}

impl Scene<'_> {
    fn stage(&mut self) -> Stage<'_> {
        Stage {
            windows: &mut *self.windows,
            frames: &mut *self.frames,
        }
    }

    fn actions(&mut self) -> ActionContext<'_> {
        ActionContext {
            timeline: self.timeline,
            windows: &mut *self.windows,
            objects: &mut *self.objects,
            instant_threshold: self.instant_threshold,
        }
    }
}

/// Owns the clock and every controller
#[derive(Debug, Default)]
pub struct PlaybackManager {
    clock: Clock,
    contents: IndexMap<ContentId, ContentController>,
    events: IndexMap<EventId, EventController>,
}

impl PlaybackManager {
    /// Create a stopped manager at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock snapshot
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Current time
    pub fn now(&self) -> f64 {
        self.clock.now
    }

    /// Whether the clock is running
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing
    }

    /// Set the speed multiplier, clamped to the supported range. Returns the
    /// applied value.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        if speed.is_finite() {
            self.clock.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        }
        self.clock.speed
    }

    // ---------------------------------------------------------------------
    // Controllers
    // ---------------------------------------------------------------------

    /// Register a content controller and sync it to the clock
    pub fn add_content(
        &mut self,
        mut controller: ContentController,
        scene: &mut Scene<'_>,
    ) -> Option<ContentTransition> {
        let id = controller.content_id();
        let timeline = scene.timeline;
        let transition = timeline.content(id).and_then(|content| {
            controller.scrub_to(content, self.clock.now, self.clock.is_playing, &mut scene.stage())
        });
        self.contents.insert(id, controller);
        transition
    }

    /// Resync one content after it was moved or resized
    pub fn resync_content(
        &mut self,
        id: ContentId,
        scene: &mut Scene<'_>,
    ) -> Option<ContentTransition> {
        let timeline = scene.timeline;
        let content = timeline.content(id)?;
        let controller = self.contents.get_mut(&id)?;
        controller.scrub_to(content, self.clock.now, self.clock.is_playing, &mut scene.stage())
    }

    /// Stop and drop a content controller. Call before the content leaves
    /// the timeline.
    pub fn remove_content(&mut self, id: ContentId, scene: &mut Scene<'_>) {
        let timeline = scene.timeline;
        if let Some(mut controller) = self.contents.shift_remove(&id) {
            if let Some(content) = timeline.content(id) {
                controller.shutdown(content, &mut scene.stage());
            }
        }
    }

    /// Register an event controller. It does not fire for anything at or
    /// before the current time until the clock comes back around.
    pub fn add_event(&mut self, controller: EventController) -> EventId {
        let id = controller.id();
        self.events
            .insert(id, controller.with_baseline(self.clock.now));
        id
    }

    /// Drop an event controller, undoing it first if it had fired
    pub fn remove_event(&mut self, id: EventId, scene: &mut Scene<'_>) -> Option<EventController> {
        let mut controller = self.events.shift_remove(&id)?;
        if controller.state() == EventState::Triggered {
            controller.undo(&mut scene.actions());
        }
        Some(controller)
    }

    /// Drop every controller without touching the scene
    pub fn clear(&mut self) {
        self.contents.clear();
        self.events.clear();
    }

    /// Content controller state
    pub fn content_state(&self, id: ContentId) -> Option<ContentState> {
        self.contents.get(&id).map(ContentController::state)
    }

    /// Content controller
    pub fn content_controller(&self, id: ContentId) -> Option<&ContentController> {
        self.contents.get(&id)
    }

    /// Event trigger state
    pub fn event_state(&self, id: EventId) -> Option<EventState> {
        self.events.get(&id).map(EventController::state)
    }

    /// Event controllers in registration order
    pub fn event_controllers(&self) -> impl Iterator<Item = &EventController> {
        self.events.values()
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    /// Start playing from the current time. Does nothing while already playing.
    pub fn play(&mut self, scene: &mut Scene<'_>) -> PlaybackReport {
        if self.clock.is_playing {
            return PlaybackReport {
                time: self.clock.now,
                is_playing: true,
                ..PlaybackReport::default()
            };
        }
        self.clock.is_playing = true;
        self.resync(self.clock.now, scene)
    }

    /// Stop playing. The time is kept.
    pub fn stop(&mut self, scene: &mut Scene<'_>) -> PlaybackReport {
        self.clock.is_playing = false;
        self.resync(self.clock.now, scene)
    }

    /// Play if stopped, stop if playing
    pub fn toggle(&mut self, scene: &mut Scene<'_>) -> PlaybackReport {
        if self.clock.is_playing {
            self.stop(scene)
        } else {
            self.play(scene)
        }
    }

    /// Jump to `time` (clamped at zero) and resync everything
    pub fn set_time(&mut self, time: f64, scene: &mut Scene<'_>) -> PlaybackReport {
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        self.resync(time, scene)
    }

    /// Jump by `delta` seconds from the current time
    pub fn seek_relative(&mut self, delta: f64, scene: &mut Scene<'_>) -> PlaybackReport {
        self.set_time(self.clock.now + delta, scene)
    }

    /// Advance by wall time `dt`.
    ///
    /// Delayed actions and tweens always step. The clock, content and
    /// events only move while playing.
    pub fn tick(&mut self, dt: f64, scene: &mut Scene<'_>) -> PlaybackReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut report = PlaybackReport::default();
        let timeline = scene.timeline;

        for controller in self.events.values_mut() {
            controller.step_tasks(dt, &mut scene.actions());
        }

        if self.clock.is_playing {
            self.clock.now += dt * self.clock.speed;
            let now = self.clock.now;

            for (id, controller) in &mut self.contents {
                let Some(content) = timeline.content(*id) else {
                    continue;
                };
                if let Some(t) = controller.update(content, now, &mut scene.stage()) {
                    report.content.push(t);
                }
            }
            for controller in self.events.values_mut() {
                if let Some(firing) = controller.update(now, &mut scene.actions()) {
                    report.events.push(firing);
                }
            }
        } else {
            for (id, controller) in &mut self.contents {
                if !controller.has_pending() {
                    continue;
                }
                let Some(content) = timeline.content(*id) else {
                    continue;
                };
                if let Some(t) = controller.retry_pending(content, &mut scene.stage()) {
                    report.content.push(t);
                }
            }
        }

        report.time = self.clock.now;
        report.is_playing = self.clock.is_playing;
        report
    }

    fn resync(&mut self, time: f64, scene: &mut Scene<'_>) -> PlaybackReport {
        self.clock.now = time;
        let should_play = self.clock.is_playing;
        let timeline = scene.timeline;
        let mut report = PlaybackReport {
            time,
            is_playing: should_play,
            ..PlaybackReport::default()
        };

        for (id, controller) in &mut self.contents {
            let Some(content) = timeline.content(*id) else {
                continue;
            };
            if let Some(t) = controller.scrub_to(content, time, should_play, &mut scene.stage()) {
                report.content.push(t);
            }
        }
        for controller in self.events.values_mut() {
            if let Some(firing) = controller.scrub_to(time, &mut scene.actions()) {
                report.events.push(firing);
            }
        }

        tracing::debug!(
            "Resynced at {:.3}s (playing: {}): {} content, {} events changed",
            time,
            should_play,
            report.content.len(),
            report.events.len()
        );
        report
    }
}
