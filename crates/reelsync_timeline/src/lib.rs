// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline synchronization and event scheduling for Reelsync.
//!
//! This crate keeps media content and scripted events in step with a
//! host-driven master clock:
//! - Tracks of non-overlapping video, image, audio and model content
//! - Snapping and overlap-free placement in time and pixels
//! - Per-content controllers driving host media surfaces
//! - Preview windows stacked by track order
//! - Timed events whose actions tween, delay and undo on backward seeks
//!
//! ## Architecture
//!
//! The engine is single-threaded and tick-driven:
//! - [`TimelineSession`] owns every component and is the host entry point
//! - [`PlaybackManager`] advances the clock and resyncs controllers
//! - [`Timeline`] holds content, with [`PlacementEngine`] guarding layout
//! - [`ActionRegistry`] maps action type names to behaviors
//!
//! Media decoding, rendering and scene objects stay on the host side behind
//! [`MediaSurface`], [`SurfaceFactory`] and [`ObjectStore`].

pub mod action;
pub mod config;
pub mod content;
pub mod controller;
pub mod easing;
pub mod error;
pub mod event;
pub mod event_controller;
pub mod frame_cache;
pub mod media;
pub mod objects;
pub mod persist;
pub mod placement;
pub mod playback;
pub mod session;
pub mod timeline;
pub mod track;
pub mod window;

pub use action::{
    ActionBehavior, ActionContext, ActionRegistry, BehaviorFactory, ContentVisibilityAction,
    DebugAction, Execution, ModelTransformAction, ObjectPositionAction, ObjectScaleAction,
    ObjectVisibilityAction, TransformMask, WindowPositionAction,
};
pub use config::TimelineConfig;
pub use content::{Content, ContentId, ContentKind};
pub use controller::{ContentController, ContentState, ContentTransition, Stage};
pub use easing::{Easing, Interpolation};
pub use error::{Result, TimelineError};
pub use event::{ActionId, EventAction, EventId, TimelineEvent};
pub use event_controller::{DelayedAction, EventController, EventFiring, EventState, Tween};
pub use frame_cache::FrameCache;
pub use media::{FrameHandle, MediaSurface, NullSurface, NullSurfaceFactory, SurfaceFactory};
pub use objects::{ObjectStore, SceneObject, SceneObjects, Space, Transform};
pub use persist::{ClipRecord, FromRecord, ProjectRecord, ToRecord, TrackRecord, WindowRecord};
pub use placement::{Interval, PlacementEngine, TrackOccupancy, TrackSlot};
pub use playback::{Clock, PlaybackManager, PlaybackReport, Scene};
pub use session::TimelineSession;
pub use timeline::{PlacementHint, Timeline};
pub use track::Track;
pub use window::{Window, WindowManager, WindowRect};
