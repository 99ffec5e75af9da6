//! Core plugin: shared resources, global settings and the fixed-step ordering.
//!
//! Resources already present when the plugin is added (a level loaded from TOML, test
//! tunables) are kept. An invalid level is rejected here, before anything spawns from it.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::config::{LevelConfig, ScoreConfig};
use crate::common::rng::GameRng;
use crate::common::schedule::CoreSet;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    app.init_resource::<Tunables>()
        .init_resource::<ScoreConfig>()
        .init_resource::<GameRng>();
    app.insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.05)));

    let level = match app.world().get_resource::<LevelConfig>() {
        Some(level) => match level.validate() {
            Ok(()) => level.clone(),
            Err(err) => {
                error!("level `{}` rejected: {err}; using the built-in level", level.name);
                LevelConfig::default()
            }
        },
        None => LevelConfig::default(),
    };
    app.insert_resource(level);

    app.configure_sets(
        FixedPostUpdate,
        (
            CoreSet::Resolve,
            CoreSet::Lifecycle,
            CoreSet::Score,
            CoreSet::Boss,
            CoreSet::Encounter,
        )
            .chain()
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );
}

#[cfg(test)]
mod tests;
