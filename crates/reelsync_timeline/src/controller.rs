// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-content synchronization against the master clock.
//!
//! A controller walks `Idle -> Active -> Finished` while the clock plays and
//! is forced to the state matching any target time on a scrub. Surface and
//! window side effects are edge-triggered: each one only fires when the
//! observed flag actually changes, so repeating a resync is silent.

use crate::content::{Content, ContentId, ContentKind};
use crate::frame_cache::FrameCache;
use crate::media::MediaSurface;
use crate::window::WindowManager;

/// Playback state of one content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentState {
    /// Clock is outside the content's interval
    #[default]
    Idle,
    /// Content is presenting
    Active,
    /// Content ran to its end during playback
    Finished,
}

/// A state change reported back to the playback manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTransition {
    /// Content that changed
    pub content: ContentId,
    /// Previous state
    pub from: ContentState,
    /// New state
    pub to: ContentState,
}

/// Window and frame services a controller presents through
pub struct Stage<'a> {
    /// Preview windows
    pub windows: &'a mut WindowManager,
    /// Shared frame cache
    pub frames: &'a mut FrameCache,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Resync {
    time: f64,
    should_play: bool,
}

/// Drives one content's surface and window
pub struct ContentController {
    content: ContentId,
    surface: Box<dyn MediaSurface>,
    state: ContentState,
    epsilon: f64,
    ready: bool,
    shown: bool,
    playing: bool,
    last_seek: Option<f64>,
    animation_applied: bool,
    pending: Option<Resync>,
}

impl ContentController {
    /// Create a controller for `content` using tolerance `epsilon`
    pub fn new(content: ContentId, surface: Box<dyn MediaSurface>, epsilon: f64) -> Self {
        Self {
            content,
            surface,
            state: ContentState::Idle,
            epsilon,
            ready: false,
            shown: false,
            playing: false,
            last_seek: None,
            animation_applied: false,
            pending: None,
        }
    }

    /// Content this controller drives
    pub fn content_id(&self) -> ContentId {
        self.content
    }

    /// Current state
    pub fn state(&self) -> ContentState {
        self.state
    }

    /// Whether the surface was last told to play
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the content is currently presented
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Whether a resync is waiting for the surface to become ready
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn poll_ready(&mut self) -> bool {
        if !self.ready {
            self.ready = self.surface.prepare();
            if self.ready {
                tracing::debug!("Surface for {:?} ready", self.content);
            }
        }
        self.ready
    }

    /// Force the state matching `target` and present accordingly.
    ///
    /// If the surface is not ready the request is kept and applied by
    /// [`ContentController::retry_pending`] once it is.
    pub fn scrub_to(
        &mut self,
        content: &Content,
        target: f64,
        should_play: bool,
        stage: &mut Stage<'_>,
    ) -> Option<ContentTransition> {
        if !self.poll_ready() {
            self.pending = Some(Resync {
                time: target,
                should_play,
            });
            return None;
        }
        self.pending = None;

        let from = self.state;
        if content.is_within(target, self.epsilon) {
            self.state = ContentState::Active;
            self.present(content, stage);
            self.seek(content.local_time(target));
            if should_play && content.kind.is_timed() {
                self.set_playing(true);
            } else {
                self.set_playing(false);
            }
        } else {
            self.state = ContentState::Idle;
            self.halt(content, stage);
        }

        self.transition(from)
    }

    /// Apply a deferred resync if the surface has become ready
    pub fn retry_pending(
        &mut self,
        content: &Content,
        stage: &mut Stage<'_>,
    ) -> Option<ContentTransition> {
        let pending = self.pending?;
        self.scrub_to(content, pending.time, pending.should_play, stage)
    }

    /// Advance the state machine for a playing clock at `now`
    pub fn update(
        &mut self,
        content: &Content,
        now: f64,
        stage: &mut Stage<'_>,
    ) -> Option<ContentTransition> {
        if self.pending.is_some() {
            return self.retry_pending(content, stage);
        }
        if !self.poll_ready() {
            return None;
        }

        let from = self.state;
        match self.state {
            ContentState::Idle => {
                if content.is_within(now, self.epsilon) && now < content.end() - self.epsilon {
                    self.state = ContentState::Active;
                    self.present(content, stage);
                    self.seek(content.local_time(now));
                    if content.kind.is_timed() {
                        self.set_playing(true);
                    }
                }
            }
            ContentState::Active => {
                if now >= content.end() - self.epsilon {
                    self.state = ContentState::Finished;
                    self.halt(content, stage);
                }
            }
            ContentState::Finished => {}
        }

        self.transition(from)
    }

    /// Stop everything, e.g. before the content is removed
    pub fn shutdown(&mut self, content: &Content, stage: &mut Stage<'_>) {
        self.pending = None;
        self.state = ContentState::Idle;
        self.halt(content, stage);
    }

    fn transition(&self, from: ContentState) -> Option<ContentTransition> {
        (from != self.state).then(|| {
            tracing::debug!("{:?}: {:?} -> {:?}", self.content, from, self.state);
            ContentTransition {
                content: self.content,
                from,
                to: self.state,
            }
        })
    }

    fn present(&mut self, content: &Content, stage: &mut Stage<'_>) {
        if self.shown {
            return;
        }
        self.shown = true;

        if content.kind == ContentKind::Model && !self.animation_applied {
            if let Some(animation) = &content.animation {
                self.surface.set_animation(animation);
            }
            self.animation_applied = true;
        }

        if content.kind.has_window() {
            let surface = &self.surface;
            let frame = stage
                .frames
                .get_or_load(&content.source, || surface.frame_handle());
            stage.windows.show(content, frame);
        }
    }

    fn halt(&mut self, content: &Content, stage: &mut Stage<'_>) {
        if self.playing || self.last_seek.is_some_and(|t| t != 0.0) {
            self.surface.stop();
            self.playing = false;
            self.last_seek = Some(0.0);
        }
        if self.shown {
            self.shown = false;
            if content.kind.has_window() {
                stage.windows.hide(content.id);
            }
        }
    }

    fn seek(&mut self, local_time: f64) {
        // A paused surface already sitting on the frame needs no seek.
        if !self.playing && self.last_seek == Some(local_time) {
            return;
        }
        self.surface.seek(local_time);
        self.last_seek = Some(local_time);
    }

    fn set_playing(&mut self, playing: bool) {
        if playing == self.playing {
            return;
        }
        if playing {
            self.surface.play();
        } else {
            self.surface.pause();
        }
        self.playing = playing;
    }
}

impl std::fmt::Debug for ContentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentController")
            .field("content", &self.content)
            .field("state", &self.state)
            .field("ready", &self.ready)
            .field("shown", &self.shown)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}
