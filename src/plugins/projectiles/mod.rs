//! Projectiles plugin: message-based producer → consumer spawning.
//!
//! # Data flow
//! ```text
//!   FixedUpdate
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │ Producers: player weapon, armed enemies        -> SpawnProjectile │
//!   │ Consumer:  spawn_requested_projectiles         -> Projectile      │
//!   │ Expiry:    expire_projectiles                  -> Spent           │
//!   └──────────────────────────────────────────────────────────────────┘
//!   FixedPostUpdate
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │ Avian emits CollisionStart                                       │
//!   │ combat::resolve_projectile_hits  (CoreSet::Resolve)   -> Spent   │
//!   │ boss attack patterns            (CoreSet::Boss)  -> SpawnProjectile │
//!   └──────────────────────────────────────────────────────────────────┘
//!   PostUpdate
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │ retire_spent_projectiles -> PendingDespawn -> combat cleanup     │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Producers never spawn entities themselves. The consumer is the single place that
//! decides what a projectile entity looks like.

pub mod components;
pub mod messages;
pub mod spawn;

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::combat::systems::despawn_pending;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<messages::SpawnProjectile>();

        app.add_systems(
            FixedUpdate,
            (spawn::spawn_requested_projectiles, spawn::expire_projectiles)
                .chain()
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            PostUpdate,
            spawn::retire_spent_projectiles.before(despawn_pending),
        );
    }
}
