//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `shmup_encounter::game::configure_headless` to install gameplay plugins.
//!
//! Time is advanced by exactly one fixed step per `app.update()`, so tests count frames
//! instead of sleeping.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use shmup_encounter::common::config::LevelConfig;
use shmup_encounter::common::state::GameState;

/// Default fixed timestep (64 Hz).
pub const STEP: Duration = Duration::from_micros(15_625);

pub fn app_headless() -> App {
    app_with_level(None)
}

/// Headless app that plays `level` instead of the built-in one.
pub fn app_with_level(level: Option<LevelConfig>) -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));

    if let Some(level) = level {
        app.insert_resource(level);
    }

    shmup_encounter::game::configure_headless(&mut app);
    // `App::run` normally does this; tests drive `update()` directly, so finish plugin setup here.
    app.finish();
    app.cleanup();
    app
}

pub fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// Update until `done` holds or `max_frames` have run. Returns the frames used.
pub fn run_until(app: &mut App, max_frames: usize, mut done: impl FnMut(&mut App) -> bool) -> Option<usize> {
    for frame in 0..max_frames {
        app.update();
        if done(app) {
            return Some(frame + 1);
        }
    }
    None
}
