// SPDX-License-Identifier: MIT OR Apache-2.0
//! Trigger engine for one timeline event.
//!
//! An event fires once when the clock lands in
//! `[time - epsilon, time + epsilon + slack]` or jumps across that window
//! going forward. Moving back before `time - epsilon` undoes every action in
//! reverse order and re-arms the event.

use crate::action::{ActionBehavior, ActionContext, ActionRegistry, Execution};
use crate::easing::Easing;
use crate::event::{EventId, TimelineEvent};

/// Trigger state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventState {
    /// Waiting for the clock to reach the event
    #[default]
    Armed,
    /// Actions have been started
    Triggered,
}

/// What happened to an event during a resync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFiring {
    /// Actions were executed (or scheduled)
    Fired(EventId),
    /// Actions were rolled back
    Undone(EventId),
}

/// Pending delayed execution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayedAction {
    /// Seconds left before the action executes
    pub remaining: f64,
}

/// Running tween
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    /// Seconds run so far
    pub elapsed: f64,
    /// Total length in seconds
    pub duration: f64,
    /// Progress curve
    pub easing: Easing,
}

impl Tween {
    /// Linear progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0) as f32
        }
    }

    /// Whether the tween has run its full length
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Task {
    Delayed(DelayedAction),
    Tween(Tween),
}

struct ArmedAction {
    index: usize,
    behavior: Box<dyn ActionBehavior>,
    task: Option<Task>,
    executed: bool,
}

/// Drives the actions of one [`TimelineEvent`]
pub struct EventController {
    event: TimelineEvent,
    actions: Vec<ArmedAction>,
    state: EventState,
    epsilon: f64,
    slack: f64,
    last_time: f64,
}

impl EventController {
    /// Build behaviors for every action. Unknown types and invalid parameter
    /// sets are logged and left out.
    pub fn new(event: TimelineEvent, registry: &ActionRegistry, epsilon: f64, slack: f64) -> Self {
        let mut actions = Vec::with_capacity(event.actions.len());
        for (index, action) in event.actions.iter().enumerate() {
            match registry.create(action) {
                Ok(behavior) => actions.push(ArmedAction {
                    index,
                    behavior,
                    task: None,
                    executed: false,
                }),
                Err(e) => {
                    tracing::warn!("Skipping action in event '{}': {}", event.name, e);
                }
            }
        }

        tracing::debug!(
            "Armed event '{}' at {:.2}s with {}/{} actions",
            event.name,
            event.time,
            actions.len(),
            event.actions.len()
        );

        Self {
            event,
            actions,
            state: EventState::Armed,
            epsilon,
            slack,
            last_time: 0.0,
        }
    }

    /// Treat `time` as already observed, so nothing before it counts as crossed
    pub fn with_baseline(mut self, time: f64) -> Self {
        self.last_time = time;
        self
    }

    /// Event ID
    pub fn id(&self) -> EventId {
        self.event.id
    }

    /// The event data
    pub fn event(&self) -> &TimelineEvent {
        &self.event
    }

    /// Trigger state
    pub fn state(&self) -> EventState {
        self.state
    }

    /// Number of actions that passed validation
    pub fn active_action_count(&self) -> usize {
        self.actions.len()
    }

    /// Whether any delayed action or tween is still running
    pub fn has_pending_tasks(&self) -> bool {
        self.actions.iter().any(|a| a.task.is_some())
    }

    /// Trigger window bounds
    pub fn trigger_window(&self) -> (f64, f64) {
        (
            self.event.time - self.epsilon,
            self.event.time + self.epsilon + self.slack,
        )
    }

    /// Resync for a playing clock at `now`
    pub fn update(&mut self, now: f64, ctx: &mut ActionContext<'_>) -> Option<EventFiring> {
        self.resync(now, ctx)
    }

    /// Resync after a jump to `target`
    pub fn scrub_to(&mut self, target: f64, ctx: &mut ActionContext<'_>) -> Option<EventFiring> {
        self.resync(target, ctx)
    }

    fn resync(&mut self, time: f64, ctx: &mut ActionContext<'_>) -> Option<EventFiring> {
        let (lo, hi) = self.trigger_window();
        let previous = std::mem::replace(&mut self.last_time, time);

        match self.state {
            EventState::Triggered if time < lo => {
                self.undo(ctx);
                Some(EventFiring::Undone(self.event.id))
            }
            EventState::Armed if time >= lo && (time <= hi || previous <= hi) => {
                self.fire(ctx);
                Some(EventFiring::Fired(self.event.id))
            }
            _ => None,
        }
    }

    fn fire(&mut self, ctx: &mut ActionContext<'_>) {
        tracing::info!("Triggering event '{}' ({:.2}s)", self.event.name, self.event.time);
        self.state = EventState::Triggered;

        for slot in 0..self.actions.len() {
            self.actions[slot].task = None;
            let delay = self.event.actions[self.actions[slot].index].delay;
            if delay > 0.0 {
                self.actions[slot].task = Some(Task::Delayed(DelayedAction { remaining: delay }));
            } else {
                self.execute(slot, 0.0, ctx);
            }
        }
    }

    /// Run one action. A tween starts `elapsed` seconds in.
    fn execute(&mut self, slot: usize, elapsed: f64, ctx: &mut ActionContext<'_>) {
        let armed = &mut self.actions[slot];
        let action = &self.event.actions[armed.index];

        match armed.behavior.execute(action, ctx) {
            Ok(Execution::Done) => {
                armed.executed = true;
                armed.task = None;
            }
            Ok(Execution::Tween { duration, easing }) => {
                armed.executed = true;
                armed.task = Some(Task::Tween(Tween {
                    elapsed,
                    duration,
                    easing,
                }));
            }
            Err(e) => {
                tracing::warn!(
                    "Action {} in event '{}' failed: {}",
                    action.action_type,
                    self.event.name,
                    e
                );
                armed.executed = false;
                armed.task = None;
            }
        }
    }

    /// Roll back every executed action, newest first, and re-arm
    pub fn undo(&mut self, ctx: &mut ActionContext<'_>) {
        tracing::info!("Undoing event '{}'", self.event.name);
        for armed in self.actions.iter_mut().rev() {
            armed.task = None;
            if armed.executed {
                armed.behavior.undo(ctx);
                armed.executed = false;
            }
        }
        self.state = EventState::Armed;
    }

    /// Step delayed actions and tweens by wall time `dt`
    pub fn step_tasks(&mut self, dt: f64, ctx: &mut ActionContext<'_>) {
        for slot in 0..self.actions.len() {
            let Some(task) = self.actions[slot].task else {
                continue;
            };
            match task {
                Task::Delayed(mut delayed) => {
                    delayed.remaining -= dt;
                    if delayed.remaining <= 0.0 {
                        let overshoot = -delayed.remaining;
                        self.execute(slot, overshoot, ctx);
                        if overshoot > 0.0 {
                            if let Some(Task::Tween(tween)) = self.actions[slot].task {
                                self.advance(slot, tween, ctx);
                            }
                        }
                    } else {
                        self.actions[slot].task = Some(Task::Delayed(delayed));
                    }
                }
                Task::Tween(mut tween) => {
                    tween.elapsed += dt;
                    self.advance(slot, tween, ctx);
                }
            }
        }
    }

    fn advance(&mut self, slot: usize, tween: Tween, ctx: &mut ActionContext<'_>) {
        let armed = &mut self.actions[slot];
        if tween.is_finished() {
            armed.behavior.apply(1.0, ctx);
            armed.task = None;
        } else {
            armed
                .behavior
                .apply(tween.easing.apply(tween.progress()), ctx);
            armed.task = Some(Task::Tween(tween));
        }
    }
}

impl std::fmt::Debug for EventController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventController")
            .field("event", &self.event.name)
            .field("time", &self.event.time)
            .field("state", &self.state)
            .field("actions", &self.actions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::event::EventAction;
    use crate::objects::{ObjectStore, SceneObject, SceneObjects, Space};
    use crate::timeline::Timeline;
    use crate::window::WindowManager;

    struct World {
        timeline: Timeline,
        windows: WindowManager,
        objects: SceneObjects,
    }

    impl World {
        fn new() -> Self {
            let mut objects = SceneObjects::new();
            objects.insert("Cube", SceneObject::default());
            Self {
                timeline: Timeline::new(&TimelineConfig::default()),
                windows: WindowManager::new([100.0, 100.0]),
                objects,
            }
        }

        fn ctx(&mut self) -> ActionContext<'_> {
            ActionContext {
                timeline: &self.timeline,
                windows: &mut self.windows,
                objects: &mut self.objects,
                instant_threshold: 0.01,
            }
        }

        fn visible(&self) -> bool {
            self.objects.visible("Cube").unwrap_or(false)
        }

        fn scale(&self) -> [f32; 3] {
            self.objects
                .transform("Cube", Space::Local)
                .map(|t| t.scale)
                .unwrap_or_default()
        }
    }

    fn hide_event(time: f64) -> TimelineEvent {
        TimelineEvent::new("hide", time).with_action(
            EventAction::new("ObjectVisibility", "Cube").with_param("visible", "false"),
        )
    }

    fn controller(event: TimelineEvent) -> EventController {
        EventController::new(event, &ActionRegistry::default(), 0.05, 1.0)
    }

    #[test]
    fn test_fires_inside_window_once() {
        let mut world = World::new();
        let mut ctrl = controller(hide_event(5.0));

        assert_eq!(ctrl.update(4.9, &mut world.ctx()), None);
        assert!(matches!(ctrl.update(4.96, &mut world.ctx()), Some(EventFiring::Fired(_))));
        assert!(!world.visible());
        assert_eq!(ctrl.update(5.5, &mut world.ctx()), None);
        assert_eq!(ctrl.state(), EventState::Triggered);
    }

    #[test]
    fn test_forward_jump_fires_once() {
        let mut world = World::new();
        let mut ctrl = controller(hide_event(5.0));

        assert!(matches!(ctrl.update(20.0, &mut world.ctx()), Some(EventFiring::Fired(_))));
        assert_eq!(ctrl.update(21.0, &mut world.ctx()), None);
        assert!(!world.visible());
    }

    #[test]
    fn test_baseline_past_window_does_not_fire() {
        let mut world = World::new();
        let mut ctrl = controller(hide_event(5.0)).with_baseline(30.0);
        assert_eq!(ctrl.scrub_to(31.0, &mut world.ctx()), None);
        assert_eq!(ctrl.state(), EventState::Armed);
    }

    #[test]
    fn test_backward_crossing_undoes_and_rearms() {
        let mut world = World::new();
        let mut ctrl = controller(hide_event(5.0));

        ctrl.scrub_to(5.0, &mut world.ctx());
        assert!(!world.visible());
        assert!(matches!(ctrl.scrub_to(2.0, &mut world.ctx()), Some(EventFiring::Undone(_))));
        assert!(world.visible());
        assert_eq!(ctrl.state(), EventState::Armed);

        ctrl.scrub_to(5.2, &mut world.ctx());
        assert!(!world.visible());
    }

    #[test]
    fn test_delayed_action_waits_for_ticks() {
        let mut world = World::new();
        let event = TimelineEvent::new("late", 1.0).with_action(
            EventAction::new("ObjectVisibility", "Cube")
                .with_param("visible", "false")
                .with_delay(0.5),
        );
        let mut ctrl = controller(event);

        ctrl.update(1.0, &mut world.ctx());
        assert!(world.visible());
        assert!(ctrl.has_pending_tasks());
        ctrl.step_tasks(0.3, &mut world.ctx());
        assert!(world.visible());
        ctrl.step_tasks(0.3, &mut world.ctx());
        assert!(!world.visible());
        assert!(!ctrl.has_pending_tasks());
    }

    #[test]
    fn test_undo_cancels_pending_delay() {
        let mut world = World::new();
        let event = TimelineEvent::new("late", 1.0).with_action(
            EventAction::new("ObjectVisibility", "Cube")
                .with_param("visible", "false")
                .with_delay(0.5),
        );
        let mut ctrl = controller(event);

        ctrl.update(1.0, &mut world.ctx());
        ctrl.scrub_to(0.0, &mut world.ctx());
        ctrl.step_tasks(1.0, &mut world.ctx());
        assert!(world.visible());
        assert!(!ctrl.has_pending_tasks());
    }

    #[test]
    fn test_tween_ends_on_exact_target() {
        let mut world = World::new();
        let event = TimelineEvent::new("grow", 0.0).with_action(
            EventAction::new("ObjectScale", "Cube")
                .with_param("scale", "(3,3,3)")
                .with_tween(1.0, Easing::Bounce),
        );
        let mut ctrl = controller(event);

        ctrl.update(0.0, &mut world.ctx());
        for _ in 0..7 {
            ctrl.step_tasks(0.125, &mut world.ctx());
        }
        assert!(ctrl.has_pending_tasks());
        ctrl.step_tasks(0.125, &mut world.ctx());
        assert!(!ctrl.has_pending_tasks());
        assert_eq!(world.scale(), [3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_delayed_tween_keeps_tick_overshoot() {
        let mut world = World::new();
        let event = TimelineEvent::new("grow", 1.0).with_action(
            EventAction::new("ObjectScale", "Cube")
                .with_param("scale", "(3,3,3)")
                .with_delay(0.5)
                .with_tween(1.0, Easing::Linear),
        );
        let mut ctrl = controller(event);

        ctrl.update(1.0, &mut world.ctx());
        ctrl.step_tasks(0.75, &mut world.ctx());
        assert_eq!(world.scale(), [1.5, 1.5, 1.5]);

        ctrl.step_tasks(0.75, &mut world.ctx());
        assert!(!ctrl.has_pending_tasks());
        assert_eq!(world.scale(), [3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_invalid_actions_are_skipped() {
        let event = TimelineEvent::new("mixed", 1.0)
            .with_action(EventAction::new("Teleport", "Cube"))
            .with_action(EventAction::new("ObjectScale", "Cube"))
            .with_action(EventAction::new("Debug", ""));
        let ctrl = controller(event);
        assert_eq!(ctrl.active_action_count(), 1);
    }
}
