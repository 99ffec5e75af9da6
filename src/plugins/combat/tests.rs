//! Combat pipeline tests.
//!
//! Pure tests exercise HealthPool/Shield/apply_damage directly. System tests inject
//! `CollisionStart` messages instead of relying on the physics pipeline.

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::layers::{enemy_layers, Layer};
use crate::common::test_utils::{insert_time_with_delta, read_messages, run_system_once};
use crate::common::tunables::Tunables;
use crate::plugins::obstacles::Obstacle;
use crate::plugins::player::Player;
use crate::plugins::projectiles::components::{Projectile, ProjectileState};

use super::components::*;
use super::damage::{apply_damage, TargetState};
use super::health::HealthPool;
use super::messages::{EntityDespawned, Hit, Killed};
use super::shield::{Shield, ShieldState};
use super::systems;

// -----------------------------------------------------------------------------
// Pure: HealthPool
// -----------------------------------------------------------------------------

#[test]
fn health_clamps_at_zero_and_defeats_once() {
    let mut hp = HealthPool::new(3);

    let first = hp.damage(2);
    assert_eq!(first.applied, 2);
    assert!(!first.defeated_now);

    let second = hp.damage(10);
    assert_eq!(second.applied, 1);
    assert!(second.defeated_now);
    assert_eq!(hp.current(), 0);

    // Further strikes are no-ops and never re-fire the edge.
    let third = hp.damage(5);
    assert_eq!(third.applied, 0);
    assert!(!third.defeated_now);
    assert!(hp.is_defeated());
}

#[test]
fn heal_never_exceeds_max_or_revives() {
    let mut hp = HealthPool::new(5);
    hp.damage(3);
    hp.heal(10);
    assert_eq!(hp.current(), 5);

    hp.deplete();
    hp.heal(2);
    assert_eq!(hp.current(), 0);
    assert!(hp.is_defeated());
}

// -----------------------------------------------------------------------------
// Pure: Shield
// -----------------------------------------------------------------------------

#[test]
fn regenerating_shield_is_pass_through_until_recharged() {
    let mut shield = Shield::regenerating(5, 2.0);

    let r = shield.absorb(7);
    assert_eq!((r.absorbed, r.remainder), (5, 2));
    assert!(r.depleted);
    assert!(matches!(shield.state(), ShieldState::Regenerating { .. }));

    // Zero absorption regardless of magnitude while regenerating.
    for amount in [1, 5, 1000] {
        let r = shield.absorb(amount);
        assert_eq!(r.absorbed, 0);
        assert_eq!(r.remainder, amount);
        assert!(!r.depleted);
    }

    assert!(!shield.tick(1.5));
    assert_eq!(shield.current(), 0);

    assert!(shield.tick(0.5));
    assert_eq!(shield.current(), 5);
    assert_eq!(shield.state(), ShieldState::Active);
}

#[test]
fn breakable_shield_never_comes_back() {
    let mut shield = Shield::breakable(2);
    shield.absorb(2);
    assert_eq!(shield.state(), ShieldState::Broken);

    for _ in 0..100 {
        assert!(!shield.tick(1.0));
    }
    assert_eq!(shield.absorb(3).remainder, 3);
}

// -----------------------------------------------------------------------------
// Pure: apply_damage
// -----------------------------------------------------------------------------

#[test]
fn shield_five_hit_for_three_then_four() {
    let mut hp = HealthPool::new(10);
    let mut shield = Shield::regenerating(5, 5.0);

    let first = apply_damage(&mut hp, Some(&mut shield), 3);
    assert_eq!(first.absorbed_by_shield, 3);
    assert_eq!(first.applied_to_health, 0);
    assert_eq!(shield.current(), 2);
    assert_eq!(hp.current(), 10);
    assert!(first.is_hit());

    let second = apply_damage(&mut hp, Some(&mut shield), 4);
    assert_eq!(second.absorbed_by_shield, 2);
    assert_eq!(second.applied_to_health, 2);
    assert!(second.shield_depleted);
    assert_eq!(shield.current(), 0);
    assert!(matches!(shield.state(), ShieldState::Regenerating { .. }));
    assert_eq!(hp.current(), 8);
}

#[test]
fn damage_split_matches_shield_and_health_for_all_small_inputs() {
    for s in 0..6u32 {
        for h in 1..6u32 {
            for d in 0..14u32 {
                let mut hp = HealthPool::new(h);
                let mut shield = Shield::regenerating(s, 1.0);
                let out = apply_damage(&mut hp, Some(&mut shield), d);

                if d <= s {
                    assert_eq!(hp.current(), h, "s={s} h={h} d={d}");
                    assert_eq!(shield.current(), s - d);
                } else {
                    assert_eq!(shield.current(), 0);
                    assert_eq!(hp.current(), h.saturating_sub(d - s));
                }
                assert_eq!(out.killed, hp.current() == 0);
                assert_eq!(
                    out.resulting == TargetState::Defeated,
                    hp.current() == 0
                );
            }
        }
    }
}

#[test]
fn kill_fires_exactly_once_per_pool() {
    let mut hp = HealthPool::new(2);
    let kills = (0..10)
        .map(|_| apply_damage(&mut hp, None, 1))
        .filter(|o| o.killed)
        .count();
    assert_eq!(kills, 1);
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

fn combat_world() -> World {
    let mut world = World::new();
    world.init_resource::<Messages<CollisionStart>>();
    world.init_resource::<Messages<Hit>>();
    world.init_resource::<Messages<Killed>>();
    world.init_resource::<Messages<EntityDespawned>>();
    world.insert_resource(Tunables::default());
    world
}

fn write_collision(world: &mut World, a: Entity, b: Entity) {
    world.write_message(CollisionStart {
        collider1: a,
        collider2: b,
        body1: None,
        body2: None,
    });
}

fn player_bullet(world: &mut World, damage: u32) -> Entity {
    world
        .spawn((
            Projectile {
                damage,
                faction: Faction::Player,
            },
            ProjectileState::Active,
        ))
        .id()
}

const ENEMY_BOUNTY: Bounty = Bounty {
    score: 100,
    kind: BountyKind::Enemy,
};

#[test]
fn projectile_is_consumed_even_when_fully_absorbed() {
    let mut world = combat_world();
    let bullet = player_bullet(&mut world, 1);
    let enemy = world
        .spawn((
            HealthPool::new(3),
            Shield::breakable(2),
            Faction::Hostile,
            ENEMY_BOUNTY,
        ))
        .id();

    write_collision(&mut world, bullet, enemy);
    run_system_once(&mut world, systems::resolve_projectile_hits);

    assert_eq!(*world.get::<ProjectileState>(bullet).unwrap(), ProjectileState::Spent);
    assert_eq!(world.get::<Shield>(enemy).unwrap().current(), 1);
    assert_eq!(world.get::<HealthPool>(enemy).unwrap().current(), 3);

    let hits = read_messages::<Hit>(&mut world);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].absorbed, 1);
    assert!(read_messages::<Killed>(&mut world).is_empty());
}

#[test]
fn lethal_projectile_reports_kill_with_bounty() {
    let mut world = combat_world();
    let bullet = player_bullet(&mut world, 5);
    let enemy = world
        .spawn((HealthPool::new(2), Faction::Hostile, ENEMY_BOUNTY))
        .id();

    write_collision(&mut world, enemy, bullet);
    run_system_once(&mut world, systems::resolve_projectile_hits);

    let kills = read_messages::<Killed>(&mut world);
    assert_eq!(
        kills,
        vec![Killed {
            entity: enemy,
            bounty: Some(ENEMY_BOUNTY)
        }]
    );
}

#[test]
fn corpse_absorbs_nothing_and_second_bullet_flies_on() {
    let mut world = combat_world();
    let first = player_bullet(&mut world, 1);
    let second = player_bullet(&mut world, 1);
    let enemy = world
        .spawn((HealthPool::new(1), Faction::Hostile, ENEMY_BOUNTY))
        .id();

    write_collision(&mut world, first, enemy);
    write_collision(&mut world, second, enemy);
    run_system_once(&mut world, systems::resolve_projectile_hits);

    assert_eq!(read_messages::<Killed>(&mut world).len(), 1);
    assert_eq!(*world.get::<ProjectileState>(second).unwrap(), ProjectileState::Active);
}

#[test]
fn same_projectile_strikes_only_once_per_frame() {
    let mut world = combat_world();
    let bullet = player_bullet(&mut world, 1);
    let a = world.spawn((HealthPool::new(5), Faction::Hostile)).id();
    let b = world.spawn((HealthPool::new(5), Faction::Hostile)).id();

    write_collision(&mut world, bullet, a);
    write_collision(&mut world, bullet, b);
    run_system_once(&mut world, systems::resolve_projectile_hits);

    assert_eq!(world.get::<HealthPool>(a).unwrap().current(), 4);
    assert_eq!(world.get::<HealthPool>(b).unwrap().current(), 5);
}

#[test]
fn obstacle_without_health_swallows_projectile_silently() {
    let mut world = combat_world();
    let bullet = player_bullet(&mut world, 1);
    let rock = world.spawn(Obstacle).id();

    write_collision(&mut world, bullet, rock);
    run_system_once(&mut world, systems::resolve_projectile_hits);

    assert_eq!(*world.get::<ProjectileState>(bullet).unwrap(), ProjectileState::Spent);
    assert!(read_messages::<Hit>(&mut world).is_empty());
    assert!(read_messages::<Killed>(&mut world).is_empty());
}

#[test]
fn friendly_fire_is_ignored() {
    let mut world = combat_world();
    let bullet = player_bullet(&mut world, 1);
    let player = world.spawn((Player, HealthPool::new(5), Faction::Player)).id();

    write_collision(&mut world, bullet, player);
    run_system_once(&mut world, systems::resolve_projectile_hits);

    assert_eq!(world.get::<HealthPool>(player).unwrap().current(), 5);
    assert_eq!(*world.get::<ProjectileState>(bullet).unwrap(), ProjectileState::Active);
}

#[test]
fn lethal_contact_drains_player_and_respects_cooldown() {
    let mut world = combat_world();
    let player = world.spawn((Player, HealthPool::new(5), Faction::Player)).id();
    let boss = world
        .spawn((
            ContactDamage {
                kind: ContactKind::Lethal,
                destroys_self: false,
            },
            ContactCooldown::default(),
        ))
        .id();

    write_collision(&mut world, player, boss);
    run_system_once(&mut world, systems::resolve_contact_hits);

    assert!(world.get::<HealthPool>(player).unwrap().is_defeated());
    assert!(world.get::<ContactCooldown>(boss).unwrap().remaining > 0.0);
    let kills = read_messages::<Killed>(&mut world);
    assert_eq!(kills.len(), 1);
    assert_eq!(kills[0].bounty, None);
}

#[test]
fn ramming_obstacle_hurts_player_and_destroys_itself_without_score() {
    let mut world = combat_world();
    let player = world.spawn((Player, HealthPool::new(5), Faction::Player)).id();
    let rock = world
        .spawn((
            Obstacle,
            HealthPool::new(3),
            ContactDamage {
                kind: ContactKind::Amount(1),
                destroys_self: true,
            },
        ))
        .id();

    write_collision(&mut world, rock, player);
    run_system_once(&mut world, systems::resolve_contact_hits);

    assert_eq!(world.get::<HealthPool>(player).unwrap().current(), 4);
    assert!(world.get::<HealthPool>(rock).unwrap().is_defeated());
    let kills = read_messages::<Killed>(&mut world);
    assert_eq!(
        kills,
        vec![Killed {
            entity: rock,
            bounty: None
        }]
    );
}

#[test]
fn tick_shields_recharges_after_delay() {
    let mut world = World::new();
    insert_time_with_delta(&mut world, 1.0);
    let mut shield = Shield::regenerating(4, 1.0);
    shield.absorb(4);
    let e = world.spawn(shield).id();

    run_system_once(&mut world, systems::tick_shields);

    assert_eq!(world.get::<Shield>(e).unwrap().current(), 4);
}

#[test]
fn defeated_enemy_goes_dying_then_pending_despawn() {
    let mut world = combat_world();
    insert_time_with_delta(&mut world, 1.0);

    let mut hp = HealthPool::new(1);
    hp.deplete();
    let e = world.spawn((hp, LifeState::Alive, enemy_layers())).id();

    run_system_once(&mut world, systems::enter_dying);
    assert!(matches!(world.get::<LifeState>(e).unwrap(), LifeState::Dying { .. }));
    let layers = world.get::<CollisionLayers>(e).unwrap();
    assert!(layers.memberships.has_all(Layer::Enemy));
    assert!(!layers.filters.has_all(Layer::PlayerBullet));

    run_system_once(&mut world, systems::progress_dying);
    assert!(matches!(world.get::<LifeState>(e).unwrap(), LifeState::Dead));
    assert!(world.get::<PendingDespawn>(e).is_some());

    run_system_once(&mut world, systems::despawn_pending);
    assert!(world.get_entity(e).is_err());
    assert_eq!(
        read_messages::<EntityDespawned>(&mut world),
        vec![EntityDespawned { entity: e }]
    );
}
