// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene objects that event actions can target.

use indexmap::IndexMap;

/// Coordinate space for transform reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Space {
    /// Relative to the parent
    #[default]
    Local,
    /// World coordinates
    World,
}

/// Position, Euler rotation in degrees, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position
    pub position: [f32; 3],
    /// Euler angles in degrees
    pub rotation: [f32; 3],
    /// Scale
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

/// Host scene lookup by stable object name.
///
/// Setters return false when the name does not resolve.
pub trait ObjectStore {
    /// Current transform
    fn transform(&self, name: &str, space: Space) -> Option<Transform>;

    /// Replace the transform
    fn set_transform(&mut self, name: &str, space: Space, transform: Transform) -> bool;

    /// Current visibility
    fn visible(&self, name: &str) -> Option<bool>;

    /// Show or hide
    fn set_visible(&mut self, name: &str, visible: bool) -> bool;
}

/// One object in [`SceneObjects`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    /// Transform (no hierarchy, so local and world agree)
    pub transform: Transform,
    /// Visibility
    pub visible: bool,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            visible: true,
        }
    }
}

/// Flat in-memory object store
#[derive(Debug, Clone, Default)]
pub struct SceneObjects {
    objects: IndexMap<String, SceneObject>,
}

impl SceneObjects {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an object
    pub fn insert(&mut self, name: impl Into<String>, object: SceneObject) {
        self.objects.insert(name.into(), object);
    }

    /// Get an object
    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    /// Remove an object
    pub fn remove(&mut self, name: &str) -> Option<SceneObject> {
        self.objects.shift_remove(name)
    }

    /// Object names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }
}

impl ObjectStore for SceneObjects {
    fn transform(&self, name: &str, _space: Space) -> Option<Transform> {
        self.objects.get(name).map(|o| o.transform)
    }

    fn set_transform(&mut self, name: &str, _space: Space, transform: Transform) -> bool {
        match self.objects.get_mut(name) {
            Some(object) => {
                object.transform = transform;
                true
            }
            None => false,
        }
    }

    fn visible(&self, name: &str) -> Option<bool> {
        self.objects.get(name).map(|o| o.visible)
    }

    fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.objects.get_mut(name) {
            Some(object) => {
                object.visible = visible;
                true
            }
            None => false,
        }
    }
}
