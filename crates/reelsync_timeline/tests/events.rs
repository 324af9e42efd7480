// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event triggering, tweens and undo through the session.

mod common;

use common::{recording_session, recording_session_with};
use reelsync_timeline::{
    ContentKind, Easing, EventAction, EventFiring, EventState, ObjectStore, PlacementHint,
    SceneObject, SceneObjects, Space, TimelineEvent,
};

fn prop_scale(objects: &dyn ObjectStore) -> [f32; 3] {
    objects
        .transform("prop", Space::Local)
        .map(|t| t.scale)
        .unwrap_or_default()
}

fn with_prop() -> SceneObjects {
    let mut objects = SceneObjects::new();
    objects.insert("prop", SceneObject::default());
    objects
}

#[test]
fn undo_mid_tween_restores_window_exactly() {
    let (mut session, _) = recording_session();
    let video = session
        .add_content(ContentKind::Video, "v.mp4", Some(10.0), PlacementHint::Auto)
        .unwrap();
    let target = session.timeline().target_name(video).unwrap();
    assert_eq!(target, "Video_0");

    let id = session.add_event(
        TimelineEvent::new("slide", 1.0).with_action(
            EventAction::new("WindowPosition", target)
                .with_param("position", "(100,100)")
                .with_tween(1.0, Easing::Linear),
        ),
    );

    session.play();
    assert_eq!(session.windows().position(video), Some([0.0, 0.0]));

    let mut fired = Vec::new();
    for _ in 0..4 {
        fired.extend(session.tick(0.25).events);
    }
    assert_eq!(fired, vec![EventFiring::Fired(id)]);

    session.tick(0.25);
    session.tick(0.25);
    assert_eq!(session.windows().position(video), Some([50.0, 50.0]));

    let report = session.set_time(0.5);
    assert_eq!(report.events, vec![EventFiring::Undone(id)]);
    assert_eq!(session.windows().position(video), Some([0.0, 0.0]));
    assert_eq!(session.windows().size(video), Some(session.config().default_window_size));

    // The cancelled tween must not keep writing.
    session.tick(0.25);
    assert_eq!(session.windows().position(video), Some([0.0, 0.0]));
}

#[test]
fn forward_jump_fires_once_per_crossing() {
    let (mut session, _) = recording_session();
    let id = session.add_event(
        TimelineEvent::new("cue", 2.0)
            .with_action(EventAction::new("Debug", "").with_param("message", "cue")),
    );

    assert_eq!(session.set_time(10.0).events, vec![EventFiring::Fired(id)]);
    assert!(session.set_time(12.0).events.is_empty());

    session.play();
    for _ in 0..8 {
        assert!(session.tick(0.5).events.is_empty());
    }

    assert_eq!(session.set_time(0.0).events, vec![EventFiring::Undone(id)]);
    assert_eq!(session.event_state(id), Some(EventState::Armed));
    assert_eq!(session.set_time(2.0).events, vec![EventFiring::Fired(id)]);
}

#[test]
fn delayed_action_runs_on_ticks_and_undoes() {
    let (mut session, _) = recording_session_with(with_prop());
    session.add_event(
        TimelineEvent::new("grow", 1.0).with_action(
            EventAction::new("ObjectScale", "prop")
                .with_param("scale", "(2,2,2)")
                .with_delay(0.5)
                .with_tween(0.0, Easing::Linear),
        ),
    );

    session.set_time(1.0);
    session.tick(0.25);
    assert_eq!(prop_scale(session.objects()), [1.0, 1.0, 1.0]);
    session.tick(0.25);
    assert_eq!(prop_scale(session.objects()), [2.0, 2.0, 2.0]);

    session.set_time(0.0);
    assert_eq!(prop_scale(session.objects()), [1.0, 1.0, 1.0]);
}

#[test]
fn undo_before_delay_elapses_cancels_action() {
    let (mut session, _) = recording_session_with(with_prop());
    session.add_event(
        TimelineEvent::new("grow", 1.0).with_action(
            EventAction::new("ObjectScale", "prop")
                .with_param("scale", "(3,3,3)")
                .with_delay(1.0)
                .with_tween(0.0, Easing::Linear),
        ),
    );

    session.set_time(1.0);
    session.tick(0.5);
    session.set_time(0.0);
    for _ in 0..4 {
        session.tick(0.5);
    }
    assert_eq!(prop_scale(session.objects()), [1.0, 1.0, 1.0]);
}

#[test]
fn invalid_actions_are_skipped() {
    let (mut session, _) = recording_session();
    session.add_event(
        TimelineEvent::new("mixed", 1.0)
            .with_action(EventAction::new("Teleport", "prop"))
            .with_action(EventAction::new("ObjectScale", "prop"))
            .with_action(EventAction::new("Debug", "")),
    );

    let controller = session.playback().event_controllers().next().unwrap();
    assert_eq!(controller.active_action_count(), 1);
    assert_eq!(controller.event().actions.len(), 3);
}

#[test]
fn unresolved_target_does_not_stop_the_clock() {
    let (mut session, _) = recording_session();
    let id = session.add_event(
        TimelineEvent::new("missing", 0.5)
            .with_action(EventAction::new("ObjectVisibility", "ghost").with_param("visible", "false")),
    );

    session.play();
    session.tick(0.5);
    session.tick(0.5);
    assert_eq!(session.now(), 1.0);
    assert_eq!(session.event_state(id), Some(EventState::Triggered));
}

#[test]
fn removing_a_fired_event_undoes_it() {
    let (mut session, _) = recording_session_with(with_prop());
    let id = session.add_event(
        TimelineEvent::new("hide", 1.0).with_action(
            EventAction::new("ObjectVisibility", "prop").with_param("visible", "false"),
        ),
    );

    session.set_time(1.0);
    assert_eq!(session.objects().visible("prop"), Some(false));

    session.remove_event(id).unwrap();
    assert_eq!(session.objects().visible("prop"), Some(true));
    assert!(session.remove_event(id).is_err());
}
