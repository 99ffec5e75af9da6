use bevy::prelude::*;

use crate::common::config::{LevelConfig, ScoreConfig};
use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::core;
use crate::plugins::waves::WaveDefinition;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);

    let world = app.world();
    assert!(world.get_resource::<Tunables>().is_some());
    assert!(world.get_resource::<ScoreConfig>().is_some());
    assert!(world.get_resource::<GameRng>().is_some());
    assert!(world.get_resource::<ClearColor>().is_some());
    assert_eq!(world.resource::<LevelConfig>(), &LevelConfig::default());
}

#[test]
fn keeps_a_valid_level_that_was_already_loaded() {
    let level = LevelConfig {
        name: "short".to_owned(),
        waves: vec![WaveDefinition::new("scout", 0.5, 2)],
        ..default()
    };

    let mut app = App::new();
    app.insert_resource(level.clone());
    core::plugin(&mut app);

    assert_eq!(app.world().resource::<LevelConfig>(), &level);
}

#[test]
fn replaces_an_invalid_level_with_the_built_in_one() {
    let broken = LevelConfig {
        waves: vec![WaveDefinition::new("mothership", 1.0, 1)],
        ..default()
    };

    let mut app = App::new();
    app.insert_resource(broken);
    core::plugin(&mut app);

    assert_eq!(app.world().resource::<LevelConfig>(), &LevelConfig::default());
}
