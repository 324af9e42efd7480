// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview windows and their stacking order.
//!
//! A window is created the first time its content is shown and lives until
//! the content is removed. Hiding keeps its geometry. Stacking follows the
//! track list: lower track indices are drawn on top.

use crate::content::{Content, ContentId};
use crate::media::FrameHandle;
use crate::timeline::Timeline;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Window geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowRect {
    /// Anchored position
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
    /// Lower anchor, normalized
    pub anchor_min: [f32; 2],
    /// Upper anchor, normalized
    pub anchor_max: [f32; 2],
    /// Pivot, normalized
    pub pivot: [f32; 2],
}

impl Default for WindowRect {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            size: [100.0, 100.0],
            anchor_min: [0.5, 0.5],
            anchor_max: [0.5, 0.5],
            pivot: [0.5, 0.5],
        }
    }
}

/// A content's preview window
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Geometry
    pub rect: WindowRect,
    /// Currently shown
    pub visible: bool,
    /// Last frame presented
    pub frame: Option<FrameHandle>,
    track: usize,
}

impl Window {
    /// Track the window's content sits on, as of the last z-order refresh
    pub fn track(&self) -> usize {
        self.track
    }
}

/// Owns every preview window and the draw order
#[derive(Debug, Clone)]
pub struct WindowManager {
    windows: IndexMap<ContentId, Window>,
    draw_order: Vec<ContentId>,
    default_size: [f32; 2],
}

impl WindowManager {
    /// Create a manager giving new windows `default_size`
    pub fn new(default_size: [f32; 2]) -> Self {
        Self {
            windows: IndexMap::new(),
            draw_order: Vec::new(),
            default_size,
        }
    }

    fn ensure(&mut self, content: &Content) -> &mut Window {
        if !self.windows.contains_key(&content.id) {
            tracing::debug!("Creating window for {:?}", content.id);
            self.windows.insert(
                content.id,
                Window {
                    rect: WindowRect {
                        size: self.default_size,
                        ..WindowRect::default()
                    },
                    visible: false,
                    frame: None,
                    track: content.track,
                },
            );
            self.recompute_z_order();
        }
        &mut self.windows[&content.id]
    }

    /// Show a content's window, creating it if needed.
    ///
    /// `frame` replaces the displayed frame when given.
    pub fn show(&mut self, content: &Content, frame: Option<FrameHandle>) {
        let window = self.ensure(content);
        window.visible = true;
        if frame.is_some() {
            window.frame = frame;
        }
    }

    /// Hide a window, keeping its geometry
    pub fn hide(&mut self, id: ContentId) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.visible = false;
        }
    }

    /// Set position and size, creating the window hidden if needed
    pub fn set_properties(&mut self, content: &Content, position: [f32; 2], size: [f32; 2]) {
        let window = self.ensure(content);
        window.rect.position = position;
        window.rect.size = size;
    }

    /// Set anchors and pivot, creating the window hidden if needed
    pub fn set_anchors(
        &mut self,
        content: &Content,
        anchor_min: [f32; 2],
        anchor_max: [f32; 2],
        pivot: [f32; 2],
    ) {
        let window = self.ensure(content);
        window.rect.anchor_min = anchor_min;
        window.rect.anchor_max = anchor_max;
        window.rect.pivot = pivot;
    }

    /// Replace the whole geometry, creating the window hidden if needed
    pub fn set_rect(&mut self, content: &Content, rect: WindowRect) {
        self.ensure(content).rect = rect;
    }

    /// Window position
    pub fn position(&self, id: ContentId) -> Option<[f32; 2]> {
        self.windows.get(&id).map(|w| w.rect.position)
    }

    /// Window size
    pub fn size(&self, id: ContentId) -> Option<[f32; 2]> {
        self.windows.get(&id).map(|w| w.rect.size)
    }

    /// Whole geometry
    pub fn rect(&self, id: ContentId) -> Option<WindowRect> {
        self.windows.get(&id).map(|w| w.rect)
    }

    /// Geometry, or what a fresh window would get
    pub fn rect_or_default(&self, id: ContentId) -> WindowRect {
        self.rect(id).unwrap_or(WindowRect {
            size: self.default_size,
            ..WindowRect::default()
        })
    }

    /// Get a window
    pub fn window(&self, id: ContentId) -> Option<&Window> {
        self.windows.get(&id)
    }

    /// Whether the content's window exists and is shown
    pub fn is_visible(&self, id: ContentId) -> bool {
        self.windows.get(&id).is_some_and(|w| w.visible)
    }

    /// Destroy a window
    pub fn remove(&mut self, id: ContentId) -> Option<Window> {
        let window = self.windows.shift_remove(&id)?;
        self.draw_order.retain(|other| *other != id);
        Some(window)
    }

    /// Destroy every window
    pub fn clear(&mut self) {
        self.windows.clear();
        self.draw_order.clear();
    }

    /// Number of windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no window exists
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Refresh cached track indices after content moved between tracks or a
    /// track was removed, then restack.
    pub fn on_tracks_changed(&mut self, timeline: &Timeline) {
        for (id, window) in &mut self.windows {
            if let Some(content) = timeline.content(*id) {
                window.track = content.track;
            }
        }
        self.recompute_z_order();
    }

    fn recompute_z_order(&mut self) {
        let mut order: Vec<(ContentId, usize)> =
            self.windows.iter().map(|(id, w)| (*id, w.track)).collect();
        // Stable sort keeps creation order among windows on the same track.
        order.sort_by(|a, b| b.1.cmp(&a.1));
        self.draw_order = order.into_iter().map(|(id, _)| id).collect();
    }

    /// All windows back to front
    pub fn draw_order(&self) -> &[ContentId] {
        &self.draw_order
    }

    /// Visible windows back to front
    pub fn visible_draw_order(&self) -> impl Iterator<Item = ContentId> + '_ {
        self.draw_order
            .iter()
            .copied()
            .filter(|id| self.is_visible(*id))
    }
}
