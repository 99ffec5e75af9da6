//! Buffered spawn requests.
//!
//! Producers (player weapon, armed enemies, boss attack patterns) create *intent*;
//! a single consumer turns intent into entities.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::plugins::combat::components::Faction;

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnProjectile {
    pub faction: Faction,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: u32,
}

impl SpawnProjectile {
    pub fn hostile(pos: Vec2, vel: Vec2) -> Self {
        Self {
            faction: Faction::Hostile,
            pos,
            vel,
            damage: 1,
        }
    }
}
