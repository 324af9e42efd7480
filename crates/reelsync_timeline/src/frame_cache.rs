// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame handle cache keyed by media source.

use crate::media::FrameHandle;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Least-recently-used cache of preview frames
#[derive(Debug)]
pub struct FrameCache {
    frames: LruCache<String, FrameHandle>,
}

impl FrameCache {
    /// Create a cache holding at most `capacity` frames (minimum one)
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Look up a frame, marking it recently used
    pub fn get(&mut self, source: &str) -> Option<FrameHandle> {
        self.frames.get(source).copied()
    }

    /// Store a frame, evicting the oldest entry when full
    pub fn insert(&mut self, source: impl Into<String>, frame: FrameHandle) {
        self.frames.put(source.into(), frame);
    }

    /// Cached frame for `source`, or whatever `load` produces (cached on success)
    pub fn get_or_load(
        &mut self,
        source: &str,
        load: impl FnOnce() -> Option<FrameHandle>,
    ) -> Option<FrameHandle> {
        if let Some(frame) = self.get(source) {
            return Some(frame);
        }
        let frame = load()?;
        self.insert(source, frame);
        Some(frame)
    }

    /// Drop the entry for `source`
    pub fn invalidate(&mut self, source: &str) {
        self.frames.pop(source);
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of cached frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
