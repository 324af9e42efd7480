// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions.

use serde::{Deserialize, Serialize};

/// A lane on the timeline.
///
/// A track's identity is its index in the timeline's track list. Content on
/// one track never overlaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display name
    pub name: String,
    /// Whether the track refuses edits
    pub locked: bool,
    /// Whether the track is hidden in the editor
    pub hidden: bool,
}

impl Track {
    /// Create a new unlocked, visible track
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locked: false,
            hidden: false,
        }
    }

    /// Builder: set the locked flag
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Builder: set the hidden flag
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Default name for the track at `index`
    pub fn default_name(index: usize) -> String {
        format!("Track {}", index + 1)
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new("Track")
    }
}
