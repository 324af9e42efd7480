// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reelsync player - headless tick driver
//!
//! Loads a project (or builds a small demo timeline), plays it at a fixed
//! frame rate and logs every content transition and event firing.
//!
//! ## Usage
//!
//! ```bash
//! reelsync_player --project show.ron --duration 30 --fps 60
//! RUST_LOG=reelsync_timeline=debug reelsync_player --seek 4.5
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use reelsync_timeline::{
    Content, ContentKind, ContentState, EventAction, EventFiring, FrameHandle, MediaSurface,
    PlacementHint, SceneObject, SceneObjects, SurfaceFactory, TimelineConfig, TimelineEvent,
    TimelineSession,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Play a Reelsync timeline without a renderer.
#[derive(Parser, Debug)]
#[command(name = "reelsync_player")]
#[command(about = "Headless tick driver for Reelsync timelines")]
struct Args {
    /// Project file (RON); a demo timeline is used when omitted
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Engine config file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds of wall time to simulate
    #[arg(short, long, default_value_t = 10.0)]
    duration: f64,

    /// Ticks per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Start time in seconds
    #[arg(long)]
    seek: Option<f64>,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Write the project back out after playing
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Surface that logs calls and hands out one frame handle per source
struct LoggingSurface {
    source: String,
    frame: FrameHandle,
}

impl MediaSurface for LoggingSurface {
    fn prepare(&mut self) -> bool {
        true
    }

    fn play(&mut self) {
        tracing::debug!("play {}", self.source);
    }

    fn pause(&mut self) {
        tracing::debug!("pause {}", self.source);
    }

    fn seek(&mut self, local_time: f64) {
        tracing::trace!("seek {} to {:.3}s", self.source, local_time);
    }

    fn frame_handle(&self) -> Option<FrameHandle> {
        Some(self.frame)
    }

    fn set_animation(&mut self, animation: &str) {
        tracing::debug!("animation {} -> {}", self.source, animation);
    }
}

#[derive(Default)]
struct LoggingSurfaceFactory {
    next_frame: u64,
}

impl SurfaceFactory for LoggingSurfaceFactory {
    fn create_surface(&mut self, content: &Content) -> Box<dyn MediaSurface> {
        self.next_frame += 1;
        Box::new(LoggingSurface {
            source: content.source.clone(),
            frame: FrameHandle(self.next_frame),
        })
    }
}

fn build_demo(session: &mut TimelineSession) -> Result<()> {
    let intro =
        session.add_content(ContentKind::Video, "intro.mp4", Some(4.0), PlacementHint::Auto)?;
    session.add_content(ContentKind::Image, "title.png", Some(3.0), PlacementHint::Auto)?;
    session.add_content(ContentKind::Audio, "theme.ogg", Some(8.0), PlacementHint::Auto)?;

    let target = session
        .timeline()
        .target_name(intro)
        .context("demo video has no target name")?;

    session.add_event(
        TimelineEvent::new("slide in", 1.0)
            .with_action(EventAction::new("Debug", "").with_param("message", "intro cue"))
            .with_action(
                EventAction::new("WindowPosition", target)
                    .with_param("position", "(200,120)")
                    .with_param("duration", "1.5")
                    .with_param("easing", "ease-out"),
            ),
    );
    session.add_event(
        TimelineEvent::new("reveal prop", 5.0).with_action(
            EventAction::new("ObjectScale", "prop")
                .with_param("scale", "(2,2,2)")
                .with_delay(0.5),
        ),
    );
    Ok(())
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reelsync_timeline=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TimelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TimelineConfig::default(),
    };

    let mut objects = SceneObjects::new();
    objects.insert("prop", SceneObject::default());

    let mut session = TimelineSession::new(
        config,
        Box::new(LoggingSurfaceFactory::default()),
        Box::new(objects),
    );

    match &args.project {
        Some(path) => session
            .load(path)
            .with_context(|| format!("loading project {}", path.display()))?,
        None => build_demo(&mut session)?,
    }

    session.set_speed(args.speed);
    if let Some(seek) = args.seek {
        session.set_time(seek);
    }

    let fps = args.fps.max(1);
    let dt = 1.0 / f64::from(fps);
    let ticks = (args.duration.max(0.0) * f64::from(fps)).round() as u64;

    let mut fired = 0usize;
    let mut undone = 0usize;
    let mut transitions = 0usize;

    session.play();
    for _ in 0..ticks {
        let report = session.tick(dt);
        transitions += report.content.len();
        for transition in &report.content {
            if transition.to == ContentState::Finished {
                tracing::debug!("{:?} finished at {:.2}s", transition.content, report.time);
            }
        }
        for firing in &report.events {
            match firing {
                EventFiring::Fired(_) => fired += 1,
                EventFiring::Undone(_) => undone += 1,
            }
        }
    }
    session.stop();

    println!("Played to {:.2}s over {} ticks", session.now(), ticks);
    println!(
        "  {} tracks, {} contents, {} events",
        session.timeline().track_count(),
        session.timeline().content_count(),
        session.events().count()
    );
    println!(
        "  {} content transitions, {} events fired, {} undone",
        transitions, fired, undone
    );
    for content in session.timeline().contents() {
        let name = session
            .timeline()
            .target_name(content.id)
            .unwrap_or_else(|| content.source.clone());
        println!(
            "  {:<10} {:<16} {:>6.2}s..{:>6.2}s track {} -> {:?}",
            name,
            content.source,
            content.start,
            content.end(),
            content.track,
            session.content_state(content.id).unwrap_or_default()
        );
    }

    if let Some(path) = &args.save {
        session
            .save(path)
            .with_context(|| format!("saving project {}", path.display()))?;
    }

    Ok(())
}
