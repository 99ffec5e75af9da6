//! Combat plugin: the damage resolution pipeline.
//!
//! ---------------------------
//! FACTS AND RULES
//! ---------------------------
//! - FACTS: `HealthPool`, `Shield`, `LifeState` describe gameplay reality.
//! - RULES: the resolve systems are the only writers of `HealthPool`/`Shield`.
//!   Everything downstream (lifecycle, scoring, bosses, the encounter) reacts to
//!   the `Hit`/`Killed` messages they write, in the same fixed tick.
//!
//! ---------------------------
//! ORDER OF OPERATIONS
//! ---------------------------
//! 1. An active shield absorbs what it can; a depleted shield starts regenerating
//!    (or breaks for good) and absorbs nothing until it is back.
//! 2. The remainder goes to the health pool, clamped at zero.
//! 3. Any strike that carried damage is a `Hit`; the strike that empties the pool
//!    is the one and only `Killed`.
//! 4. The projectile is consumed on contact with a damageable target or obstacle,
//!    whether or not it got through.

pub mod components;
pub mod damage;
pub mod health;
pub mod messages;
pub mod shield;
pub mod systems;

use bevy::prelude::*;

use crate::common::schedule::CoreSet;
use crate::common::state::GameState;

pub fn plugin(app: &mut App) {
    app.add_message::<messages::Hit>()
        .add_message::<messages::Killed>()
        .add_message::<messages::EntityDespawned>();

    // Regen counts down before this tick's strikes resolve, so a shield depleted in
    // Resolve waits its full delay.
    app.add_systems(
        FixedUpdate,
        (systems::tick_contact_cooldowns, systems::tick_shields)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (systems::resolve_projectile_hits, systems::resolve_contact_hits)
            .chain()
            .in_set(CoreSet::Resolve),
    );

    app.add_systems(
        FixedPostUpdate,
        (systems::enter_dying, systems::progress_dying)
            .chain()
            .in_set(CoreSet::Lifecycle),
    );

    // Structural cleanup outside the fixed step.
    app.add_systems(PostUpdate, systems::despawn_pending);
}

#[cfg(test)]
mod tests;
