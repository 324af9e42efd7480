// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reversible action behaviors and their registry.
//!
//! Every behavior instance belongs to exactly one [`EventAction`], so the
//! undo snapshot lives on the behavior itself. `execute` records the value
//! it is about to overwrite; `undo` writes that value back and forgets it.
//! Continuous behaviors keep a from/to pair and are driven by
//! [`ActionBehavior::apply`] while a tween runs.

use crate::content::{Content, ContentId, ContentKind};
use crate::easing::{Easing, Interpolation};
use crate::error::{Result, TimelineError};
use crate::event::EventAction;
use crate::objects::{ObjectStore, Space, Transform};
use crate::timeline::Timeline;
use crate::window::WindowManager;
use indexmap::IndexMap;

/// Size a window takes when `maintainSize` is off and no `size` is given
const FALLBACK_WINDOW_SIZE: [f32; 2] = [400.0, 300.0];

/// Everything an action may read or mutate
pub struct ActionContext<'a> {
    /// Content registry, for resolving `Kind_index` targets
    pub timeline: &'a Timeline,
    /// Preview windows
    pub windows: &'a mut WindowManager,
    /// Host scene objects
    pub objects: &'a mut dyn ObjectStore,
    /// Tweens at or below this length apply at once
    pub instant_threshold: f64,
}

impl<'a> ActionContext<'a> {
    fn content_target(&self, name: &str) -> Result<&'a Content> {
        let timeline: &'a Timeline = self.timeline;
        timeline
            .resolve_target(name)
            .and_then(|id| timeline.content(id))
            .ok_or_else(|| TimelineError::UnresolvedTarget(name.to_string()))
    }

    fn object_transform(&self, name: &str, space: Space) -> Result<Transform> {
        self.objects
            .transform(name, space)
            .ok_or_else(|| TimelineError::UnresolvedTarget(name.to_string()))
    }
}

/// What `execute` left running
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Execution {
    /// The action is fully applied
    Done,
    /// Drive [`ActionBehavior::apply`] over `duration` seconds
    Tween {
        /// Tween length in seconds
        duration: f64,
        /// Progress curve
        easing: Easing,
    },
}

/// A reversible side effect
pub trait ActionBehavior {
    /// Registered type name
    fn action_type(&self) -> &'static str;

    /// Whether execution may hand back a tween
    fn requires_continuous_update(&self) -> bool {
        false
    }

    /// Check targets and parameters before the action is armed
    fn validate(&self, action: &EventAction) -> Result<()> {
        require_target(self.action_type(), action)
    }

    /// Whether [`ActionBehavior::validate`] passes
    fn is_valid(&self, action: &EventAction) -> bool {
        self.validate(action).is_ok()
    }

    /// Snapshot the target and start changing it
    fn execute(&mut self, action: &EventAction, ctx: &mut ActionContext<'_>) -> Result<Execution>;

    /// Set tween progress; `1.0` writes the exact target value
    fn apply(&mut self, _progress: f32, _ctx: &mut ActionContext<'_>) {}

    /// Restore the snapshot taken by the last `execute`, if any
    fn undo(&mut self, ctx: &mut ActionContext<'_>);
}

fn invalid(action_type: &str, reason: impl Into<String>) -> TimelineError {
    TimelineError::InvalidAction {
        action_type: action_type.to_string(),
        reason: reason.into(),
    }
}

fn require_target(action_type: &str, action: &EventAction) -> Result<()> {
    if action.target.trim().is_empty() {
        return Err(invalid(action_type, "missing target"));
    }
    Ok(())
}

fn require_param(action_type: &str, action: &EventAction, name: &str) -> Result<()> {
    if !action.has_param(name) {
        return Err(invalid(action_type, format!("missing '{name}' parameter")));
    }
    Ok(())
}

/// Tween or apply at once, depending on the action's duration.
fn begin<B: ActionBehavior>(
    behavior: &mut B,
    action: &EventAction,
    ctx: &mut ActionContext<'_>,
) -> Execution {
    let duration = action.effective_duration();
    if duration > ctx.instant_threshold {
        Execution::Tween {
            duration,
            easing: action.effective_easing(),
        }
    } else {
        behavior.apply(1.0, ctx);
        Execution::Done
    }
}

fn mix2(from: [f32; 2], to: [f32; 2], progress: f32) -> [f32; 2] {
    if progress >= 1.0 {
        to
    } else {
        Interpolation::lerp_vec2(from, to, progress)
    }
}

fn mix3(from: [f32; 3], to: [f32; 3], progress: f32) -> [f32; 3] {
    if progress >= 1.0 {
        to
    } else {
        Interpolation::lerp_vec3(from, to, progress)
    }
}

fn space_param(action: &EventAction) -> Space {
    if action.param_bool("local").unwrap_or(true) {
        Space::Local
    } else {
        Space::World
    }
}

// ---------------------------------------------------------------------------
// Debug
// ---------------------------------------------------------------------------

/// Logs a message
#[derive(Debug, Default)]
pub struct DebugAction;

impl ActionBehavior for DebugAction {
    fn action_type(&self) -> &'static str {
        "Debug"
    }

    fn validate(&self, _action: &EventAction) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, action: &EventAction, _ctx: &mut ActionContext<'_>) -> Result<Execution> {
        let message = action.param("message").unwrap_or("event fired");
        tracing::info!(target: "reelsync_timeline::debug_action", "{} ({})", message, action.target);
        Ok(Execution::Done)
    }

    fn undo(&mut self, _ctx: &mut ActionContext<'_>) {}
}

// ---------------------------------------------------------------------------
// ObjectVisibility
// ---------------------------------------------------------------------------

/// Shows or hides a scene object
#[derive(Debug, Default)]
pub struct ObjectVisibilityAction {
    previous: Option<(String, bool)>,
}

impl ActionBehavior for ObjectVisibilityAction {
    fn action_type(&self) -> &'static str {
        "ObjectVisibility"
    }

    fn validate(&self, action: &EventAction) -> Result<()> {
        require_target(self.action_type(), action)?;
        if action.param_bool("visible").is_none() {
            return Err(invalid(self.action_type(), "'visible' must be true or false"));
        }
        Ok(())
    }

    fn execute(&mut self, action: &EventAction, ctx: &mut ActionContext<'_>) -> Result<Execution> {
        let visible = action
            .param_bool("visible")
            .ok_or_else(|| invalid(self.action_type(), "'visible' must be true or false"))?;
        let before = ctx
            .objects
            .visible(&action.target)
            .ok_or_else(|| TimelineError::UnresolvedTarget(action.target.clone()))?;

        self.previous = Some((action.target.clone(), before));
        ctx.objects.set_visible(&action.target, visible);
        Ok(Execution::Done)
    }

    fn undo(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some((target, visible)) = self.previous.take() {
            ctx.objects.set_visible(&target, visible);
        }
    }
}

// ---------------------------------------------------------------------------
// ObjectScale / ObjectPosition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct VectorTween {
    target: String,
    space: Space,
    from: [f32; 3],
    to: [f32; 3],
}

/// Scales a scene object
#[derive(Debug, Default)]
pub struct ObjectScaleAction {
    state: Option<VectorTween>,
}

impl ActionBehavior for ObjectScaleAction {
    fn action_type(&self) -> &'static str {
        "ObjectScale"
    }

    fn requires_continuous_update(&self) -> bool {
        true
    }

    fn validate(&self, action: &EventAction) -> Result<()> {
        require_target(self.action_type(), action)?;
        require_param(self.action_type(), action, "scale")?;
        if action.param_vec3("scale").is_none() {
            return Err(invalid(self.action_type(), "'scale' is not a vector"));
        }
        Ok(())
    }

    fn execute(&mut self, action: &EventAction, ctx: &mut ActionContext<'_>) -> Result<Execution> {
        let to = action
            .param_vec3("scale")
            .ok_or_else(|| invalid(self.action_type(), "'scale' is not a vector"))?;
        let current = ctx.object_transform(&action.target, Space::Local)?;

        self.state = Some(VectorTween {
            target: action.target.clone(),
            space: Space::Local,
            from: current.scale,
            to,
        });
        Ok(begin(self, action, ctx))
    }

    fn apply(&mut self, progress: f32, ctx: &mut ActionContext<'_>) {
        let Some(state) = &self.state else {
            return;
        };
        if let Some(mut transform) = ctx.objects.transform(&state.target, state.space) {
            transform.scale = mix3(state.from, state.to, progress);
            ctx.objects.set_transform(&state.target, state.space, transform);
        }
    }

    fn undo(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(state) = self.state.take() {
            if let Some(mut transform) = ctx.objects.transform(&state.target, state.space) {
                transform.scale = state.from;
                ctx.objects.set_transform(&state.target, state.space, transform);
            }
        }
    }
}

/// Moves a scene object, absolutely or by an offset
#[derive(Debug, Default)]
pub struct ObjectPositionAction {
    state: Option<VectorTween>,
}

impl ActionBehavior for ObjectPositionAction {
    fn action_type(&self) -> &'static str {
        "ObjectPosition"
    }

    fn requires_continuous_update(&self) -> bool {
        true
    }

    fn validate(&self, action: &EventAction) -> Result<()> {
        require_target(self.action_type(), action)?;
        require_param(self.action_type(), action, "position")?;
        if action.param_vec3("position").is_none() {
            return Err(invalid(self.action_type(), "'position' is not a vector"));
        }
        match action.param("movementType").unwrap_or("absolute") {
            "absolute" | "relative" | "offset" => Ok(()),
            other => Err(invalid(
                self.action_type(),
                format!("unknown movementType '{other}'"),
            )),
        }
    }

    fn execute(&mut self, action: &EventAction, ctx: &mut ActionContext<'_>) -> Result<Execution> {
        let offset = action
            .param_vec3("position")
            .ok_or_else(|| invalid(self.action_type(), "'position' is not a vector"))?;
        let space = space_param(action);
        let current = ctx.object_transform(&action.target, space)?;

        let to = match action.param("movementType") {
            Some("relative" | "offset") => [
                current.position[0] + offset[0],
                current.position[1] + offset[1],
                current.position[2] + offset[2],
            ],
            _ => offset,
        };

        self.state = Some(VectorTween {
            target: action.target.clone(),
            space,
            from: current.position,
            to,
        });
        Ok(begin(self, action, ctx))
    }

    fn apply(&mut self, progress: f32, ctx: &mut ActionContext<'_>) {
        let Some(state) = &self.state else {
            return;
        };
        if let Some(mut transform) = ctx.objects.transform(&state.target, state.space) {
            transform.position = mix3(state.from, state.to, progress);
            ctx.objects.set_transform(&state.target, state.space, transform);
        }
    }

    fn undo(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(state) = self.state.take() {
            if let Some(mut transform) = ctx.objects.transform(&state.target, state.space) {
                transform.position = state.from;
                ctx.objects.set_transform(&state.target, state.space, transform);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ModelTransform
// ---------------------------------------------------------------------------

/// Which transform components a [`ModelTransformAction`] drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMask {
    /// Position, rotation and scale
    All,
    /// Position only
    Position,
    /// Rotation only
    Rotation,
    /// Scale only
    Scale,
}

impl TransformMask {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "position" => Some(Self::Position),
            "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }

    fn position(self) -> bool {
        matches!(self, Self::All | Self::Position)
    }

    fn rotation(self) -> bool {
        matches!(self, Self::All | Self::Rotation)
    }

    fn scale(self) -> bool {
        matches!(self, Self::All | Self::Scale)
    }
}

#[derive(Debug, Clone)]
struct ModelTween {
    target: String,
    space: Space,
    mask: TransformMask,
    from: Transform,
    to: Transform,
}

/// Moves, rotates and scales a model content's instance
#[derive(Debug, Default)]
pub struct ModelTransformAction {
    state: Option<ModelTween>,
}

impl ActionBehavior for ModelTransformAction {
    fn action_type(&self) -> &'static str {
        "ModelTransform"
    }

    fn requires_continuous_update(&self) -> bool {
        true
    }

    fn validate(&self, action: &EventAction) -> Result<()> {
        require_target(self.action_type(), action)?;
        if !["position", "rotation", "scale"]
            .iter()
            .any(|p| action.has_param(p))
        {
            return Err(invalid(
                self.action_type(),
                "needs at least one of 'position', 'rotation', 'scale'",
            ));
        }
        let mask = action.param("transformType").unwrap_or("all");
        if TransformMask::parse(mask).is_none() {
            return Err(invalid(
                self.action_type(),
                format!("unknown transformType '{mask}'"),
            ));
        }
        Ok(())
    }

    fn execute(&mut self, action: &EventAction, ctx: &mut ActionContext<'_>) -> Result<Execution> {
        let content = ctx.content_target(&action.target)?;
        if content.kind != ContentKind::Model {
            return Err(TimelineError::UnresolvedTarget(action.target.clone()));
        }

        let space = space_param(action);
        let current = ctx.object_transform(&action.target, space)?;
        let mask = action
            .param("transformType")
            .and_then(TransformMask::parse)
            .unwrap_or(TransformMask::All);
        let to = Transform {
            position: action.param_vec3("position").unwrap_or(current.position),
            rotation: action.param_vec3("rotation").unwrap_or(current.rotation),
            scale: action.param_vec3("scale").unwrap_or(current.scale),
        };

        self.state = Some(ModelTween {
            target: action.target.clone(),
            space,
            mask,
            from: current,
            to,
        });
        Ok(begin(self, action, ctx))
    }

    fn apply(&mut self, progress: f32, ctx: &mut ActionContext<'_>) {
        let Some(state) = &self.state else {
            return;
        };
        let Some(mut transform) = ctx.objects.transform(&state.target, state.space) else {
            return;
        };
        if state.mask.position() {
            transform.position = mix3(state.from.position, state.to.position, progress);
        }
        if state.mask.rotation() {
            transform.rotation = mix3(state.from.rotation, state.to.rotation, progress);
        }
        if state.mask.scale() {
            transform.scale = mix3(state.from.scale, state.to.scale, progress);
        }
        ctx.objects.set_transform(&state.target, state.space, transform);
    }

    fn undo(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(state) = self.state.take() {
            ctx.objects.set_transform(&state.target, state.space, state.from);
        }
    }
}

// ---------------------------------------------------------------------------
// WindowPosition / ContentVisibility
// ---------------------------------------------------------------------------

fn window_target<'a>(ctx: &ActionContext<'a>, action: &EventAction) -> Result<&'a Content> {
    let content = ctx.content_target(&action.target)?;
    if !content.kind.has_window() {
        return Err(TimelineError::UnresolvedTarget(action.target.clone()));
    }
    Ok(content)
}

#[derive(Debug, Clone, Copy)]
struct WindowTween {
    content: ContentId,
    from_position: [f32; 2],
    from_size: [f32; 2],
    to_position: [f32; 2],
    to_size: [f32; 2],
}

/// Moves (and optionally resizes) a content's preview window
#[derive(Debug, Default)]
pub struct WindowPositionAction {
    state: Option<WindowTween>,
}

impl ActionBehavior for WindowPositionAction {
    fn action_type(&self) -> &'static str {
        "WindowPosition"
    }

    fn requires_continuous_update(&self) -> bool {
        true
    }

    fn validate(&self, action: &EventAction) -> Result<()> {
        require_target(self.action_type(), action)?;
        require_param(self.action_type(), action, "position")?;
        if action.param_vec2("position").is_none() {
            return Err(invalid(self.action_type(), "'position' is not a vector"));
        }
        Ok(())
    }

    fn execute(&mut self, action: &EventAction, ctx: &mut ActionContext<'_>) -> Result<Execution> {
        let to_position = action
            .param_vec2("position")
            .ok_or_else(|| invalid(self.action_type(), "'position' is not a vector"))?;
        let content = window_target(ctx, action)?;
        let current = ctx.windows.rect_or_default(content.id);

        let to_size = if action.param_bool("maintainSize").unwrap_or(true) {
            current.size
        } else {
            action.param_vec2("size").unwrap_or(FALLBACK_WINDOW_SIZE)
        };

        self.state = Some(WindowTween {
            content: content.id,
            from_position: current.position,
            from_size: current.size,
            to_position,
            to_size,
        });
        Ok(begin(self, action, ctx))
    }

    fn apply(&mut self, progress: f32, ctx: &mut ActionContext<'_>) {
        let Some(state) = self.state else {
            return;
        };
        if let Some(content) = ctx.timeline.content(state.content) {
            ctx.windows.set_properties(
                content,
                mix2(state.from_position, state.to_position, progress),
                mix2(state.from_size, state.to_size, progress),
            );
        }
    }

    fn undo(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(state) = self.state.take() {
            if let Some(content) = ctx.timeline.content(state.content) {
                ctx.windows
                    .set_properties(content, state.from_position, state.from_size);
            }
        }
    }
}

/// Shows or hides a content's preview window
#[derive(Debug, Default)]
pub struct ContentVisibilityAction {
    previous: Option<(ContentId, bool)>,
}

impl ActionBehavior for ContentVisibilityAction {
    fn action_type(&self) -> &'static str {
        "ContentVisibility"
    }

    fn validate(&self, action: &EventAction) -> Result<()> {
        require_target(self.action_type(), action)?;
        if action.param_bool("visible").is_none() {
            return Err(invalid(self.action_type(), "'visible' must be true or false"));
        }
        Ok(())
    }

    fn execute(&mut self, action: &EventAction, ctx: &mut ActionContext<'_>) -> Result<Execution> {
        let visible = action
            .param_bool("visible")
            .ok_or_else(|| invalid(self.action_type(), "'visible' must be true or false"))?;
        let content = window_target(ctx, action)?;

        self.previous = Some((content.id, ctx.windows.is_visible(content.id)));
        set_window_visible(ctx.windows, content, visible);
        Ok(Execution::Done)
    }

    fn undo(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some((id, visible)) = self.previous.take() {
            if let Some(content) = ctx.timeline.content(id) {
                set_window_visible(ctx.windows, content, visible);
            }
        }
    }
}

fn set_window_visible(windows: &mut WindowManager, content: &Content, visible: bool) {
    if visible {
        windows.show(content, None);
    } else {
        windows.hide(content.id);
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Constructor for a behavior
pub type BehaviorFactory = fn() -> Box<dyn ActionBehavior>;

/// Maps `action_type` strings to behavior constructors
#[derive(Clone)]
pub struct ActionRegistry {
    factories: IndexMap<String, BehaviorFactory>,
}

impl ActionRegistry {
    /// Registry with no behaviors
    pub fn empty() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Registry with every built-in behavior
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("Debug", || Box::new(DebugAction));
        registry.register("ObjectVisibility", || {
            Box::new(ObjectVisibilityAction::default())
        });
        registry.register("ObjectScale", || Box::new(ObjectScaleAction::default()));
        registry.register("ObjectPosition", || {
            Box::new(ObjectPositionAction::default())
        });
        registry.register("ModelTransform", || {
            Box::new(ModelTransformAction::default())
        });
        registry.register("WindowPosition", || {
            Box::new(WindowPositionAction::default())
        });
        registry.register("ContentVisibility", || {
            Box::new(ContentVisibilityAction::default())
        });
        registry
    }

    /// Add or replace a behavior
    pub fn register(&mut self, action_type: impl Into<String>, factory: BehaviorFactory) {
        self.factories.insert(action_type.into(), factory);
    }

    /// Whether a type is registered
    pub fn contains(&self, action_type: &str) -> bool {
        self.factories.contains_key(action_type)
    }

    /// Registered type names
    pub fn action_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build and validate the behavior for `action`
    pub fn create(&self, action: &EventAction) -> Result<Box<dyn ActionBehavior>> {
        let factory = self
            .factories
            .get(&action.action_type)
            .ok_or_else(|| invalid(&action.action_type, "unknown action type"))?;
        let behavior = factory();
        behavior.validate(action)?;
        Ok(behavior)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::objects::{SceneObject, SceneObjects};
    use crate::timeline::PlacementHint;

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
                windows: WindowManager::new([400.0, 300.0]),
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
    }

    #[test]
    fn test_registry_rejects_unknown_and_invalid() {
        let registry = ActionRegistry::default();
        assert_eq!(registry.action_types().count(), 7);

        let err = registry
            .create(&EventAction::new("Explode", "Cube"))
            .err().unwrap();
        assert!(matches!(err, TimelineError::InvalidAction { .. }));

        assert!(registry.create(&EventAction::new("ObjectScale", "Cube")).is_err());
        assert!(registry
            .create(&EventAction::new("ObjectScale", "Cube").with_param("scale", "(2,2,2)"))
            .is_ok());
        assert!(registry.create(&EventAction::new("Debug", "")).is_ok());
    }

    #[test]
    fn test_instant_visibility_and_undo() {
        let mut world = World::new();
        let action = EventAction::new("ObjectVisibility", "Cube").with_param("visible", "false");
        let mut behavior = ObjectVisibilityAction::default();

        let exec = behavior.execute(&action, &mut world.ctx()).unwrap();
        assert_eq!(exec, Execution::Done);
        assert!(!world.objects.get("Cube").unwrap().visible);

        behavior.undo(&mut world.ctx());
        assert!(world.objects.get("Cube").unwrap().visible);
        // A second undo has no snapshot to restore.
        world.objects.set_visible("Cube", false);
        behavior.undo(&mut world.ctx());
        assert!(!world.objects.get("Cube").unwrap().visible);
    }

    #[test]
    fn test_short_duration_applies_instantly() {
        let mut world = World::new();
        let action = EventAction::new("ObjectScale", "Cube")
            .with_param("scale", "(2,3,4)")
            .with_tween(0.005, Easing::Linear);
        let mut behavior = ObjectScaleAction::default();

        assert_eq!(behavior.execute(&action, &mut world.ctx()).unwrap(), Execution::Done);
        assert_eq!(world.objects.get("Cube").unwrap().transform.scale, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_relative_position_tween() {
        let mut world = World::new();
        world.objects.insert(
            "Cube",
            SceneObject {
                transform: Transform {
                    position: [1.0, 1.0, 1.0],
                    ..Transform::default()
                },
                visible: true,
            },
        );
        let action = EventAction::new("ObjectPosition", "Cube")
            .with_param("position", "(2,0,0)")
            .with_param("movementType", "relative");
        let mut behavior = ObjectPositionAction::default();

        let exec = behavior.execute(&action, &mut world.ctx()).unwrap();
        assert!(matches!(exec, Execution::Tween { duration, .. } if duration == 1.0));
        behavior.apply(0.5, &mut world.ctx());
        assert_eq!(world.objects.get("Cube").unwrap().transform.position, [2.0, 1.0, 1.0]);
        behavior.apply(1.0, &mut world.ctx());
        assert_eq!(world.objects.get("Cube").unwrap().transform.position, [3.0, 1.0, 1.0]);

        behavior.undo(&mut world.ctx());
        assert_eq!(world.objects.get("Cube").unwrap().transform.position, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_unresolved_target_is_an_error() {
        let mut world = World::new();
        let action = EventAction::new("ObjectScale", "Sphere").with_param("scale", "(2,2,2)");
        let err = ObjectScaleAction::default()
            .execute(&action, &mut world.ctx())
            .unwrap_err();
        assert!(matches!(err, TimelineError::UnresolvedTarget(name) if name == "Sphere"));
    }

    #[test]
    fn test_model_transform_masks_components() {
        let mut world = World::new();
        world
            .timeline
            .add_content(ContentKind::Model, "robot", 5.0, PlacementHint::Auto)
            .unwrap();
        world.objects.insert("Model_0", SceneObject::default());

        let action = EventAction::new("ModelTransform", "Model_0")
            .with_param("position", "(5,5,5)")
            .with_param("scale", "(3,3,3)")
            .with_param("transformType", "scale")
            .with_tween(0.0, Easing::Linear);
        let mut behavior = ModelTransformAction::default();
        behavior.execute(&action, &mut world.ctx()).unwrap();

        let transform = world.objects.get("Model_0").unwrap().transform;
        assert_eq!(transform.scale, [3.0, 3.0, 3.0]);
        assert_eq!(transform.position, [0.0, 0.0, 0.0]);

        behavior.undo(&mut world.ctx());
        assert_eq!(world.objects.get("Model_0").unwrap().transform, Transform::default());
    }

    #[test]
    fn test_model_transform_needs_model_content() {
        let mut world = World::new();
        let action = EventAction::new("ModelTransform", "Cube").with_param("scale", "(3,3,3)");
        assert!(ModelTransformAction::default()
            .execute(&action, &mut world.ctx())
            .is_err());
    }

    #[test]
    fn test_window_position_keeps_size_by_default() {
        let mut world = World::new();
        let id = world
            .timeline
            .add_content(ContentKind::Video, "a.mp4", 5.0, PlacementHint::Auto)
            .unwrap();
        let action = EventAction::new("WindowPosition", "Video_0")
            .with_param("position", "(100,50)")
            .with_param("size", "(10,10)")
            .with_tween(0.0, Easing::Linear);
        let mut behavior = WindowPositionAction::default();
        behavior.execute(&action, &mut world.ctx()).unwrap();

        assert_eq!(world.windows.position(id), Some([100.0, 50.0]));
        assert_eq!(world.windows.size(id), Some([400.0, 300.0]));

        behavior.undo(&mut world.ctx());
        assert_eq!(world.windows.position(id), Some([0.0, 0.0]));
    }

    #[test]
    fn test_content_visibility_round_trip() {
        let mut world = World::new();
        let id = world
            .timeline
            .add_content(ContentKind::Image, "a.png", 5.0, PlacementHint::Auto)
            .unwrap();
        let action = EventAction::new("ContentVisibility", "Image_0").with_param("visible", "true");
        let mut behavior = ContentVisibilityAction::default();

        behavior.execute(&action, &mut world.ctx()).unwrap();
        assert!(world.windows.is_visible(id));
        behavior.undo(&mut world.ctx());
        assert!(!world.windows.is_visible(id));
    }
}
