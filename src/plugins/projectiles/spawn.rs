//! Spawn consumer, expiry and cleanup.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{enemy_bullet_layers, player_bullet_layers};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::components::{Faction, PendingDespawn};
use crate::plugins::world::Bounded;

use super::components::{Lifetime, Projectile, ProjectileState};
use super::messages::SpawnProjectile;

pub fn spawn_requested_projectiles(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut requests: MessageReader<SpawnProjectile>,
) {
    for req in requests.read() {
        let (layers, color) = match req.faction {
            Faction::Player => (player_bullet_layers(), Color::srgb(1.0, 0.85, 0.3)),
            Faction::Hostile => (enemy_bullet_layers(), Color::srgb(0.95, 0.3, 0.9)),
        };

        commands.spawn((
            Name::new("Projectile"),
            Projectile {
                damage: req.damage,
                faction: req.faction,
            },
            ProjectileState::Active,
            Lifetime(Timer::from_seconds(tunables.projectile_lifetime, TimerMode::Once)),
            Sprite {
                color,
                custom_size: Some(Vec2::splat(8.0)),
                ..default()
            },
            Transform::from_translation(req.pos.extend(2.0)),
            RigidBody::Dynamic,
            Collider::circle(4.0),
            Sensor,
            layers,
            LinearVelocity(req.vel),
            // Avian only emits CollisionStart if one collider opts in.
            CollisionEventsEnabled,
            Bounded,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

pub fn expire_projectiles(
    time: Res<Time>,
    mut q: Query<(&mut Lifetime, &mut ProjectileState)>,
) {
    for (mut lifetime, mut state) in &mut q {
        if *state != ProjectileState::Active {
            continue;
        }
        lifetime.tick(time.delta());
        if lifetime.is_finished() {
            *state = ProjectileState::Spent;
        }
    }
}

/// Hand consumed/expired projectiles to the shared despawn path, which reports them.
pub fn retire_spent_projectiles(
    mut commands: Commands,
    q: Query<(Entity, &ProjectileState), Without<PendingDespawn>>,
) {
    for (e, state) in &q {
        if *state == ProjectileState::Spent {
            commands.entity(e).insert(PendingDespawn);
        }
    }
}
