use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::config::LevelConfig;
use crate::common::error::ConfigurationError;
use crate::common::rng::GameRng;
use crate::common::test_utils::{insert_time_with_delta, read_messages, run_system_once};
use crate::plugins::combat::components::{Bounty, BountyKind};
use crate::plugins::combat::health::HealthPool;
use crate::plugins::encounter::director::{
    EncounterDirector, EncounterDirectorState, EncounterHost, EncounterTimings,
};
use crate::plugins::encounter::Encounter;
use crate::plugins::waves::WaveDefinition;
use crate::plugins::world::Playfield;

use super::*;

struct NoSpawn;

impl EncounterHost<Entity> for NoSpawn {
    fn spawn_enemy(&mut self, template: &str) -> Result<Entity, ConfigurationError> {
        Err(ConfigurationError::UnknownTemplate(template.to_owned()))
    }

    fn spawn_boss(&mut self) -> Result<Entity, ConfigurationError> {
        Err(ConfigurationError::MissingBoss)
    }
}

/// An encounter parked in `RunningWave(0)` with a wave that never finishes spawning.
fn running_encounter() -> Encounter {
    let timings = EncounterTimings {
        initial_delay: 0.0,
        ..default()
    };
    let mut director =
        EncounterDirector::new(timings, vec![WaveDefinition::new("scout", 1000.0, 1)]);
    director.tick(0.0, &mut NoSpawn, &mut Vec::new());
    assert_eq!(director.state(), EncounterDirectorState::RunningWave(0));
    Encounter::new(director)
}

fn obstacle_world(dt: f32) -> World {
    let mut world = World::new();
    insert_time_with_delta(&mut world, dt);
    world.insert_resource(LevelConfig::default());
    world.insert_resource(GameRng::seeded(9));
    world.init_resource::<ObstacleSpawner>();
    world
}

fn obstacle_count(world: &mut World) -> usize {
    world.query::<&Obstacle>().iter(world).count()
}

#[test]
fn damageable_obstacle_carries_health_and_obstacle_bounty() {
    let mut world = World::new();
    let field = ObstacleField::default();

    let e = run_system_once(&mut world, move |mut commands: Commands| {
        spawn_obstacle(&mut commands, &field, Vec2::new(700.0, 0.0))
    });

    assert_eq!(world.get::<HealthPool>(e).map(|h| h.max()), Some(3));
    assert_eq!(
        world.get::<Bounty>(e).copied(),
        Some(Bounty {
            score: 35,
            kind: BountyKind::Obstacle
        })
    );
}

#[test]
fn indestructible_obstacle_has_no_health() {
    let mut world = World::new();
    let field = ObstacleField {
        health: None,
        ..default()
    };

    let e = run_system_once(&mut world, move |mut commands: Commands| {
        spawn_obstacle(&mut commands, &field, Vec2::ZERO)
    });

    assert!(world.get::<Obstacle>(e).is_some());
    assert!(world.get::<HealthPool>(e).is_none());
    assert!(world.get::<Bounty>(e).is_none());
}

#[test]
fn nothing_spawns_outside_of_waves() {
    let mut world = obstacle_world(10.0);
    run_system_once(&mut world, spawn_obstacles);
    assert_eq!(obstacle_count(&mut world), 0);
}

#[test]
fn spawns_on_interval_during_waves_up_to_max_active() {
    let mut world = obstacle_world(4.0);
    world.insert_resource(running_encounter());

    for _ in 0..10 {
        run_system_once(&mut world, spawn_obstacles);
    }

    let max_active = ObstacleField::default().max_active as usize;
    assert_eq!(obstacle_count(&mut world), max_active);

    let lane_x = LevelConfig::default().spawn_lane.x;
    for tf in world.query_filtered::<&Transform, With<Obstacle>>().iter(&world) {
        assert_eq!(tf.translation.x, lane_x);
    }
}

#[test]
fn obstacle_past_the_left_edge_counts_as_avoided_once() {
    let mut world = World::new();
    world.init_resource::<Playfield>();
    world.init_resource::<Messages<ObstacleAvoided>>();

    let passed = world
        .spawn((Obstacle, Transform::from_xyz(-700.0, 0.0, 0.0)))
        .id();
    world.spawn((Obstacle, Transform::from_xyz(0.0, 0.0, 0.0)));
    let mut wreck = HealthPool::new(1);
    wreck.deplete();
    world.spawn((Obstacle, wreck, Transform::from_xyz(-700.0, 0.0, 0.0)));

    run_system_once(&mut world, detect_avoided);
    run_system_once(&mut world, detect_avoided);

    assert_eq!(
        read_messages::<ObstacleAvoided>(&mut world),
        vec![ObstacleAvoided { entity: passed }]
    );
}

#[test]
fn field_validation() {
    assert!(ObstacleField::default().validate().is_ok());
    assert!(ObstacleField { interval: 0.0, ..default() }.validate().is_err());
    assert!(ObstacleField { health: Some(0), ..default() }.validate().is_err());
}
