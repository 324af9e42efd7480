// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline events and the actions they carry.
//!
//! Action parameters stay as strings, the way they are authored and stored.
//! Typed getters parse on demand.

use crate::easing::Easing;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random event ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for an action within its event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    /// Create a new random action ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

/// One side effect fired by an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAction {
    /// Unique action ID
    #[serde(default)]
    pub id: ActionId,
    /// Registered behavior name, e.g. `WindowPosition`
    pub action_type: String,
    /// Target name: a scene object or a content (`Video_0`)
    #[serde(default)]
    pub target: String,
    /// Raw parameters
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    /// Seconds to wait after the trigger
    #[serde(default)]
    pub delay: f64,
    /// Tween length in seconds
    #[serde(default = "default_action_duration")]
    pub duration: f64,
    /// Tween curve
    #[serde(default)]
    pub easing: Easing,
}

fn default_action_duration() -> f64 {
    1.0
}

impl EventAction {
    /// Create an action of the given type aimed at `target`
    pub fn new(action_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: ActionId::new(),
            action_type: action_type.into(),
            target: target.into(),
            parameters: IndexMap::new(),
            delay: 0.0,
            duration: default_action_duration(),
            easing: Easing::Linear,
        }
    }

    /// Builder: add a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Builder: set the delay
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Builder: set tween duration and curve
    pub fn with_tween(mut self, duration: f64, easing: Easing) -> Self {
        self.duration = duration;
        self.easing = easing;
        self
    }

    /// Whether a parameter is present
    pub fn has_param(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Raw parameter value
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Parameter as a float
    pub fn param_f32(&self, name: &str) -> Option<f32> {
        parse_scalar(self.param(name)?)
    }

    /// Parameter as a bool (`true`/`false`, any case)
    pub fn param_bool(&self, name: &str) -> Option<bool> {
        let raw = self.param(name)?.trim();
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// Parameter as `(x,y)`; a third component is ignored
    pub fn param_vec2(&self, name: &str) -> Option<[f32; 2]> {
        let v = parse_vector(self.param(name)?)?;
        match v.as_slice() {
            [x, y] | [x, y, _] => Some([*x, *y]),
            _ => None,
        }
    }

    /// Parameter as `(x,y,z)`; a missing z is zero
    pub fn param_vec3(&self, name: &str) -> Option<[f32; 3]> {
        let v = parse_vector(self.param(name)?)?;
        match v.as_slice() {
            [x, y] => Some([*x, *y, 0.0]),
            [x, y, z] => Some([*x, *y, *z]),
            _ => None,
        }
    }

    /// Tween duration; a `duration` parameter overrides the field
    pub fn effective_duration(&self) -> f64 {
        self.param_f32("duration")
            .map_or(self.duration, f64::from)
            .max(0.0)
    }

    /// Tween curve; an `easing` parameter overrides the field
    pub fn effective_easing(&self) -> Easing {
        self.param("easing")
            .map_or(self.easing, Easing::parse_lenient)
    }
}

fn parse_scalar(raw: &str) -> Option<f32> {
    let value: f32 = raw.trim().replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse `(x,y)` / `(x,y,z)`. With `;` as separator, commas are decimal marks.
fn parse_vector(raw: &str) -> Option<Vec<f32>> {
    let inner = raw.trim().trim_start_matches('(').trim_end_matches(')');
    let parts: Vec<&str> = if inner.contains(';') {
        inner.split(';').collect()
    } else {
        inner.split(',').collect()
    };
    parts.into_iter().map(parse_scalar).collect()
}

/// A point on the timeline that fires its actions once per crossing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Unique event ID
    #[serde(default)]
    pub id: EventId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Trigger time in seconds
    pub time: f64,
    /// Actions in execution order
    #[serde(default)]
    pub actions: Vec<EventAction>,
}

impl TimelineEvent {
    /// Create an event with no actions
    pub fn new(name: impl Into<String>, time: f64) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            time,
            actions: Vec::new(),
        }
    }

    /// Builder: append an action
    pub fn with_action(mut self, action: EventAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Append an action
    pub fn add_action(&mut self, action: EventAction) {
        self.actions.push(action);
    }

    /// Remove an action by ID
    pub fn remove_action(&mut self, id: ActionId) -> Option<EventAction> {
        let index = self.actions.iter().position(|a| a.id == id)?;
        Some(self.actions.remove(index))
    }

    /// Whether the event has anything to do
    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_params() {
        let action = EventAction::new("ObjectPosition", "Cube")
            .with_param("position", "(1.5, -2, 3)")
            .with_param("flat", "(4,5)")
            .with_param("european", "(1,5; 2,25)")
            .with_param("broken", "(1, x, 3)");

        assert_eq!(action.param_vec3("position"), Some([1.5, -2.0, 3.0]));
        assert_eq!(action.param_vec2("position"), Some([1.5, -2.0]));
        assert_eq!(action.param_vec3("flat"), Some([4.0, 5.0, 0.0]));
        assert_eq!(action.param_vec2("european"), Some([1.5, 2.25]));
        assert_eq!(action.param_vec3("broken"), None);
        assert_eq!(action.param_vec3("missing"), None);
    }

    #[test]
    fn test_scalar_params() {
        let action = EventAction::new("ObjectVisibility", "Cube")
            .with_param("visible", "False")
            .with_param("duration", "0,25")
            .with_param("easing", "bounce");

        assert_eq!(action.param_bool("visible"), Some(false));
        assert_eq!(action.effective_duration(), 0.25);
        assert_eq!(action.effective_easing(), Easing::Bounce);
    }

    #[test]
    fn test_fields_used_without_overrides() {
        let action = EventAction::new("ObjectScale", "Cube").with_tween(2.0, Easing::EaseOut);
        assert_eq!(action.effective_duration(), 2.0);
        assert_eq!(action.effective_easing(), Easing::EaseOut);
    }

    #[test]
    fn test_remove_action() {
        let action = EventAction::new("Debug", "");
        let id = action.id;
        let mut event = TimelineEvent::new("intro", 3.0).with_action(action);
        assert!(event.has_actions());
        assert!(event.remove_action(id).is_some());
        assert!(!event.has_actions());
    }
}
