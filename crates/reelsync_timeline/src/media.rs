// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host media seam.
//!
//! The engine never decodes anything. Each content item drives a
//! [`MediaSurface`] supplied by the host through a [`SurfaceFactory`].

use crate::content::Content;

/// Opaque handle to a decoded frame owned by the host renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Playback surface for one content item.
///
/// Calls are fire-and-forget. A surface that is not ready yet reports so
/// from [`MediaSurface::prepare`] and the controller retries next tick.
pub trait MediaSurface {
    /// Poll readiness, starting preparation if needed
    fn prepare(&mut self) -> bool;

    /// Start or resume playback
    fn play(&mut self);

    /// Pause at the current position
    fn pause(&mut self);

    /// Seek to a media-local time in seconds
    fn seek(&mut self, local_time: f64);

    /// Stop playback and rewind
    fn stop(&mut self) {
        self.pause();
        self.seek(0.0);
    }

    /// Frame to display in the preview window, if any
    fn frame_handle(&self) -> Option<FrameHandle> {
        None
    }

    /// Select the animation a model plays
    fn set_animation(&mut self, _animation: &str) {}
}

/// Builds surfaces for content as it is added or loaded
pub trait SurfaceFactory {
    /// Create the surface for `content`
    fn create_surface(&mut self, content: &Content) -> Box<dyn MediaSurface>;
}

/// Surface that is always ready and does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl MediaSurface for NullSurface {
    fn prepare(&mut self) -> bool {
        true
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn seek(&mut self, _local_time: f64) {}
}

/// Factory producing [`NullSurface`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurfaceFactory;

impl SurfaceFactory for NullSurfaceFactory {
    fn create_surface(&mut self, _content: &Content) -> Box<dyn MediaSurface> {
        Box::new(NullSurface)
    }
}
