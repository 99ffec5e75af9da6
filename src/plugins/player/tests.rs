use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::test_utils::{insert_time_with_delta, read_messages, run_system_once};
use crate::common::tunables::Tunables;
use crate::plugins::combat::health::HealthPool;
use crate::plugins::projectiles::messages::SpawnProjectile;
use crate::plugins::world::Playfield;

use super::*;

#[test]
fn spawn_creates_player_with_full_health() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    run_system_once(&mut world, super::spawn);

    let hp = world
        .query_filtered::<&HealthPool, With<Player>>()
        .single(&world)
        .unwrap();
    assert_eq!(hp.current(), Tunables::default().player_max_health);
}

#[test]
fn apply_movement_sets_velocity() {
    let mut world = World::new();
    world.insert_resource(Tunables {
        player_speed: 100.0,
        ..default()
    });
    world.insert_resource(PlayerInput {
        move_axis: Vec2::new(1.0, 0.0),
        fire: false,
        boost: false,
    });
    world.spawn((Player, LinearVelocity::ZERO));

    run_system_once(&mut world, super::apply_movement);

    let v = world.query::<&LinearVelocity>().iter(&world).next().unwrap();
    assert_eq!(v.0, Vec2::new(100.0, 0.0));
}

#[test]
fn player_is_held_inside_the_playfield() {
    let mut world = World::new();
    world.init_resource::<Playfield>();
    let e = world
        .spawn((
            Player,
            Transform::from_xyz(900.0, 0.0, 1.0),
            LinearVelocity(Vec2::new(50.0, 20.0)),
        ))
        .id();

    run_system_once(&mut world, super::keep_on_playfield);

    assert_eq!(world.get::<Transform>(e).unwrap().translation.x, 640.0);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(0.0, 20.0));
}

#[test]
fn held_fire_respects_interval() {
    let mut world = World::new();
    world.insert_resource(Tunables {
        fire_interval: 0.2,
        ..default()
    });
    world.insert_resource(PlayerInput {
        move_axis: Vec2::ZERO,
        fire: true,
        boost: false,
    });
    world.init_resource::<Messages<SpawnProjectile>>();
    insert_time_with_delta(&mut world, 0.125);
    world.spawn((
        Player,
        HealthPool::new(3),
        Weapon::default(),
        Transform::default(),
    ));

    // t = 0.125 fires, 0.25 is still cooling down, 0.375 fires again.
    for _ in 0..3 {
        run_system_once(&mut world, super::fire_weapon);
    }

    let shots = read_messages::<SpawnProjectile>(&mut world);
    assert_eq!(shots.len(), 2);
    assert!(shots.iter().all(|s| s.faction == Faction::Player && s.vel.x > 0.0));
}

#[test]
fn boosted_weapon_fires_a_spread_until_it_runs_out() {
    let mut world = World::new();
    world.insert_resource(Tunables {
        fire_interval: 0.5,
        boosted_spread_degrees: 15.0,
        ..default()
    });
    world.insert_resource(PlayerInput {
        fire: true,
        ..default()
    });
    world.init_resource::<Messages<SpawnProjectile>>();
    insert_time_with_delta(&mut world, 0.5);
    let mut weapon = Weapon::default();
    weapon.boost(0.5);
    let e = world
        .spawn((Player, HealthPool::new(3), weapon, Transform::default()))
        .id();

    run_system_once(&mut world, super::fire_weapon);
    let volley = read_messages::<SpawnProjectile>(&mut world);
    assert_eq!(volley.len(), 3);
    assert!(volley.iter().all(|s| s.vel.x > 0.0));
    assert!(volley.iter().any(|s| s.vel.y > 0.0));
    assert!(volley.iter().any(|s| s.vel.y < 0.0));
    let up = volley.iter().map(|s| s.vel.to_angle()).fold(0.0_f32, f32::max);
    assert!((up.to_degrees() - 15.0).abs() < 1e-3);
    assert!(!world.get::<Weapon>(e).unwrap().is_boosted());

    // Boost is spent: the next volley is a single shot.
    world.resource_mut::<Messages<SpawnProjectile>>().clear();
    run_system_once(&mut world, super::fire_weapon);
    let single = read_messages::<SpawnProjectile>(&mut world);
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].vel.y, 0.0);
}

#[test]
fn new_boost_replaces_the_running_one() {
    let mut weapon = Weapon::default();
    weapon.boost(10.0);
    weapon.boost(2.0);
    assert!(weapon.is_boosted());
    assert_eq!(weapon.boost, 2.0);
}

#[test]
fn afterburner_burns_until_dry_then_waits_for_release() {
    let mut energy = Energy::new(10.0);

    energy.update(true, 0.25, 20.0, 10.0);
    assert!(energy.is_burning());
    assert_eq!(energy.current(), 5.0);

    energy.update(true, 0.25, 20.0, 10.0);
    assert!(!energy.is_burning());
    assert_eq!(energy.current(), 0.0);

    // Still held: locked out, recovering.
    energy.update(true, 0.5, 20.0, 10.0);
    assert!(!energy.is_burning());
    assert_eq!(energy.current(), 5.0);

    // Released, then pressed again.
    energy.update(false, 0.0, 20.0, 10.0);
    energy.update(true, 0.1, 20.0, 10.0);
    assert!(energy.is_burning());
    assert_eq!(energy.current(), 3.0);
}

#[test]
fn energy_restore_clamps_at_max() {
    let mut energy = Energy::new(100.0);
    energy.update(true, 1.0, 20.0, 10.0);
    energy.restore(50.0);
    assert_eq!(energy.current(), 100.0);
    energy.restore(-30.0);
    assert_eq!(energy.current(), 100.0);
}

#[test]
fn burning_energy_moves_at_boost_speed() {
    let mut world = World::new();
    world.insert_resource(Tunables {
        player_speed: 100.0,
        player_boost_speed: 250.0,
        ..default()
    });
    world.insert_resource(PlayerInput {
        move_axis: Vec2::new(0.0, 1.0),
        boost: true,
        ..default()
    });
    insert_time_with_delta(&mut world, 0.1);
    let e = world
        .spawn((Player, Energy::new(100.0), LinearVelocity::ZERO))
        .id();

    run_system_once(&mut world, super::burn_energy);
    run_system_once(&mut world, super::apply_movement);

    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(0.0, 250.0));
    assert!(world.get::<Energy>(e).unwrap().current() < 100.0);
}

#[test]
fn game_over_fires_exactly_once() {
    let mut world = World::new();
    world.init_resource::<GameOverLatch>();
    world.init_resource::<Messages<GameOver>>();
    world.init_resource::<NextState<GameState>>();

    let mut hp = HealthPool::new(2);
    hp.deplete();
    world.spawn((Player, hp));

    for _ in 0..4 {
        run_system_once(&mut world, super::detect_player_defeat);
    }

    assert_eq!(read_messages::<GameOver>(&mut world).len(), 1);
    assert!(world.resource::<GameOverLatch>().fired());
    assert!(matches!(
        *world.resource::<NextState<GameState>>(),
        NextState::Pending(GameState::GameOver)
    ));
}

#[test]
fn living_player_does_not_end_the_game() {
    let mut world = World::new();
    world.init_resource::<GameOverLatch>();
    world.init_resource::<Messages<GameOver>>();
    world.init_resource::<NextState<GameState>>();
    world.spawn((Player, HealthPool::new(2)));

    run_system_once(&mut world, super::detect_player_defeat);

    assert!(read_messages::<GameOver>(&mut world).is_empty());
}
