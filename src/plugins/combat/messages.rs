//! Combat results.
//!
//! Producers: the resolve systems (the only writers of HealthPool/Shield).
//! Consumers: lifecycle, scoring, bosses, encounter bookkeeping, and any presentation layer.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use super::components::Bounty;

/// A strike landed on a damageable target (shield and/or health).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: Entity,
    pub source: Entity,
    pub absorbed: u32,
    pub applied: u32,
}

/// Health of `entity` went from > 0 to 0. Written exactly once per entity.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Killed {
    pub entity: Entity,
    /// `None` when the kill should not score (self-destruct on impact, the player).
    pub bounty: Option<Bounty>,
}

/// An entity left the world (death, leaving the playfield, cleanup).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDespawned {
    pub entity: Entity,
}
