use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::config::LevelConfig;
use crate::common::error::ConfigurationError;
use crate::common::test_utils::{insert_time_with_delta, read_messages, run_system_once};
use crate::plugins::combat::components::{BountyKind, Faction};
use crate::plugins::combat::shield::{Shield, ShieldState};
use crate::plugins::player::Player;
use crate::plugins::projectiles::messages::SpawnProjectile;

use super::*;

fn default_templates() -> EnemyTemplates {
    EnemyTemplates::from_templates(LevelConfig::default().templates)
}

fn spawn(world: &mut World, id: &str, position: Vec2) -> Result<Entity, ConfigurationError> {
    spawn_from(world, default_templates(), id, position)
}

fn spawn_from(
    world: &mut World,
    templates: EnemyTemplates,
    id: &str,
    position: Vec2,
) -> Result<Entity, ConfigurationError> {
    let id = id.to_owned();
    let out = run_system_once(world, move |mut commands: Commands| {
        spawn_enemy(&mut commands, &templates, &id, position)
    });
    world.flush();
    out
}

#[test]
fn template_validation_rejects_broken_values() {
    let good = LevelConfig::default().templates[0].clone();
    assert!(good.validate().is_ok());

    let no_health = EnemyTemplate {
        max_health: 0,
        ..good.clone()
    };
    assert!(matches!(
        no_health.validate(),
        Err(ConfigurationError::InvalidTemplate { .. })
    ));

    let bad_interval = EnemyTemplate {
        fire_interval: Some(0.0),
        ..good.clone()
    };
    assert!(bad_interval.validate().is_err());

    let bad_speed = EnemyTemplate {
        speed: f32::NAN,
        ..good.clone()
    };
    assert!(bad_speed.validate().is_err());

    let empty_burst = EnemyTemplate {
        fire: EnemyFire::Burst {
            count: 0,
            spacing: 0.2,
        },
        ..good.clone()
    };
    assert!(empty_burst.validate().is_err());

    let backwards_weave = EnemyTemplate {
        movement: EnemyMovement::Zigzag {
            amplitude: -10.0,
            frequency: 2.0,
        },
        ..good
    };
    assert!(backwards_weave.validate().is_err());
}

#[test]
fn registry_reports_unknown_templates() {
    let templates = default_templates();
    assert_eq!(templates.len(), 3);
    assert!(templates.get("scout").is_ok());
    assert!(matches!(
        templates.get("mothership"),
        Err(ConfigurationError::UnknownTemplate(id)) if id == "mothership"
    ));
}

#[test]
fn spawned_enemy_follows_its_template() {
    let mut world = World::new();
    let e = spawn(&mut world, "shielded", Vec2::new(700.0, 40.0)).expect("known template");

    let health = world.get::<HealthPool>(e).expect("health");
    assert_eq!(health.max(), 2);
    let shield = world.get::<Shield>(e).expect("shielded template");
    assert_eq!(shield.current(), 2);
    assert_eq!(shield.state(), ShieldState::Active);

    assert_eq!(world.get::<Faction>(e), Some(&Faction::Hostile));
    let bounty = world.get::<Bounty>(e).expect("bounty");
    assert_eq!(bounty.score, 200);
    assert_eq!(bounty.kind, BountyKind::Enemy);

    let vel = world.get::<LinearVelocity>(e).expect("velocity");
    assert_eq!(vel.0, Vec2::new(-90.0, 0.0));
    assert!(world.get::<Gun>(e).is_none());
}

#[test]
fn unknown_template_spawns_nothing() {
    let mut world = World::new();
    let out = spawn(&mut world, "mothership", Vec2::ZERO);

    assert!(out.is_err());
    assert_eq!(world.query::<&Enemy>().iter(&world).count(), 0);
}

#[test]
fn dying_enemies_stop_drifting() {
    let mut world = World::new();
    let alive = spawn(&mut world, "scout", Vec2::ZERO).expect("scout");
    let dying = spawn(&mut world, "scout", Vec2::Y * 50.0).expect("scout");

    world.entity_mut(dying).insert(LifeState::Dying {
        timer: Timer::from_seconds(0.3, TimerMode::Once),
    });
    world.entity_mut(alive).insert(LinearVelocity(Vec2::new(30.0, 80.0)));

    insert_time_with_delta(&mut world, 0.1);
    run_system_once(&mut world, steer_enemies);

    assert_eq!(world.get::<LinearVelocity>(alive).map(|v| v.0), Some(Vec2::new(-160.0, 0.0)));
    assert_eq!(world.get::<LinearVelocity>(dying).map(|v| v.0), Some(Vec2::ZERO));
}

#[test]
fn gunship_without_a_target_fires_left_on_its_interval() {
    let mut world = World::new();
    world.init_resource::<Messages<SpawnProjectile>>();
    insert_time_with_delta(&mut world, 0.5);

    spawn(&mut world, "gunship", Vec2::new(300.0, 0.0)).expect("gunship");

    for _ in 0..2 {
        run_system_once(&mut world, fire_enemy_guns);
    }
    assert!(read_messages::<SpawnProjectile>(&mut world).is_empty());

    run_system_once(&mut world, fire_enemy_guns);
    let shots = read_messages::<SpawnProjectile>(&mut world);
    assert_eq!(shots.len(), 1);
    assert!(shots[0].vel.x < 0.0);
    assert!(shots[0].pos.x < 300.0);
}

fn custom(movement: EnemyMovement, fire: EnemyFire, fire_interval: Option<f32>) -> EnemyTemplates {
    EnemyTemplates::from_templates([EnemyTemplate {
        id: "custom".to_owned(),
        max_health: 1,
        shield: None,
        speed: 100.0,
        fire_interval,
        bullet_speed: 400.0,
        bounty: 10,
        movement,
        fire,
    }])
}

#[test]
fn pursuer_leans_toward_the_player_while_drifting() {
    let mut world = World::new();
    insert_time_with_delta(&mut world, 0.1);
    world.spawn((Player, Transform::from_xyz(300.0, 100.0, 0.0)));
    let templates = custom(EnemyMovement::Pursue { tracking: 0.3 }, EnemyFire::Straight, None);
    let e = spawn_from(&mut world, templates, "custom", Vec2::new(300.0, 0.0)).expect("custom");

    run_system_once(&mut world, steer_enemies);

    let vel = world.get::<LinearVelocity>(e).map(|v| v.0).expect("velocity");
    assert_eq!(vel.x, -100.0);
    assert!((vel.y - 30.0).abs() < 1e-4, "vel {vel:?}");
}

#[test]
fn pursuer_without_a_player_just_drifts() {
    let mut world = World::new();
    insert_time_with_delta(&mut world, 0.1);
    let templates = custom(EnemyMovement::Pursue { tracking: 0.3 }, EnemyFire::Straight, None);
    let e = spawn_from(&mut world, templates, "custom", Vec2::ZERO).expect("custom");

    run_system_once(&mut world, steer_enemies);

    assert_eq!(world.get::<LinearVelocity>(e).map(|v| v.0), Some(Vec2::new(-100.0, 0.0)));
}

#[test]
fn zigzag_weaves_up_then_down_without_losing_drift() {
    let mut world = World::new();
    insert_time_with_delta(&mut world, 0.25);
    let templates = custom(
        EnemyMovement::Zigzag {
            amplitude: 40.0,
            frequency: 2.0,
        },
        EnemyFire::Straight,
        None,
    );
    let e = spawn_from(&mut world, templates, "custom", Vec2::ZERO).expect("custom");

    let mut vertical = Vec::new();
    for _ in 0..8 {
        run_system_once(&mut world, steer_enemies);
        let vel = world.get::<LinearVelocity>(e).map(|v| v.0).expect("velocity");
        assert_eq!(vel.x, -100.0);
        vertical.push(vel.y);
    }

    assert!(vertical[0] > 0.0);
    assert!(vertical.iter().any(|vy| *vy < 0.0));
    assert!(vertical.iter().all(|vy| vy.abs() <= 80.0 + 1e-3));
}

#[test]
fn aimed_gun_shoots_at_the_player() {
    let mut world = World::new();
    world.init_resource::<Messages<SpawnProjectile>>();
    insert_time_with_delta(&mut world, 0.5);
    // Straight below the muzzle.
    world.spawn((Player, Transform::from_xyz(278.0, -200.0, 0.0)));
    let templates = custom(EnemyMovement::Drift, EnemyFire::Aimed, Some(0.5));
    spawn_from(&mut world, templates, "custom", Vec2::new(300.0, 0.0)).expect("custom");

    run_system_once(&mut world, fire_enemy_guns);

    let shots = read_messages::<SpawnProjectile>(&mut world);
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].faction, Faction::Hostile);
    assert!(shots[0].vel.x.abs() < 1e-3, "vel {:?}", shots[0].vel);
    assert!((shots[0].vel.y + 400.0).abs() < 1e-3);
}

#[test]
fn burst_spaces_its_follow_up_shots() {
    let mut world = World::new();
    world.init_resource::<Messages<SpawnProjectile>>();
    insert_time_with_delta(&mut world, 0.25);
    world.spawn((Player, Transform::from_xyz(-400.0, 0.0, 0.0)));
    let templates = custom(
        EnemyMovement::Drift,
        EnemyFire::Burst {
            count: 3,
            spacing: 0.25,
        },
        Some(2.0),
    );
    spawn_from(&mut world, templates, "custom", Vec2::new(300.0, 0.0)).expect("custom");

    // Messages stay buffered, so the counts are running totals.
    let mut totals = Vec::new();
    for _ in 0..11 {
        run_system_once(&mut world, fire_enemy_guns);
        totals.push(read_messages::<SpawnProjectile>(&mut world).len());
    }

    assert_eq!(totals, vec![0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 3]);
}
