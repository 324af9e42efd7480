// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use reelsync_timeline::{
    Content, FrameHandle, MediaSurface, SceneObjects, SurfaceFactory, TimelineConfig,
    TimelineSession,
};
use std::cell::RefCell;
use std::rc::Rc;

/// One surface call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Play,
    Pause,
    Seek(f64),
    Stop,
    Animation(String),
}

/// Calls recorded across every surface, tagged with the content source
pub type CallLog = Rc<RefCell<Vec<(String, Call)>>>;

pub struct RecordingSurface {
    source: String,
    frame: FrameHandle,
    calls: CallLog,
}

impl RecordingSurface {
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push((self.source.clone(), call));
    }
}

impl MediaSurface for RecordingSurface {
    fn prepare(&mut self) -> bool {
        true
    }

    fn play(&mut self) {
        self.record(Call::Play);
    }

    fn pause(&mut self) {
        self.record(Call::Pause);
    }

    fn seek(&mut self, local_time: f64) {
        self.record(Call::Seek(local_time));
    }

    fn stop(&mut self) {
        self.record(Call::Stop);
    }

    fn frame_handle(&self) -> Option<FrameHandle> {
        Some(self.frame)
    }

    fn set_animation(&mut self, animation: &str) {
        self.record(Call::Animation(animation.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingFactory {
    pub calls: CallLog,
    next_frame: u64,
}

impl SurfaceFactory for RecordingFactory {
    fn create_surface(&mut self, content: &Content) -> Box<dyn MediaSurface> {
        self.next_frame += 1;
        Box::new(RecordingSurface {
            source: content.source.clone(),
            frame: FrameHandle(self.next_frame),
            calls: Rc::clone(&self.calls),
        })
    }
}

/// Session with recording surfaces and the given objects
pub fn recording_session_with(objects: SceneObjects) -> (TimelineSession, CallLog) {
    let factory = RecordingFactory::default();
    let calls = Rc::clone(&factory.calls);
    let session = TimelineSession::new(
        TimelineConfig::default(),
        Box::new(factory),
        Box::new(objects),
    );
    (session, calls)
}

/// Session with recording surfaces and no scene objects
pub fn recording_session() -> (TimelineSession, CallLog) {
    recording_session_with(SceneObjects::new())
}

/// Calls recorded for one source
pub fn calls_for(log: &CallLog, source: &str) -> Vec<Call> {
    log.borrow()
        .iter()
        .filter(|(s, _)| s == source)
        .map(|(_, c)| c.clone())
        .collect()
}

/// Tiny deterministic generator for randomized layouts
pub struct XorShift(pub u64);

impl XorShift {
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[lo, hi)`
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }

    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}
