use bevy::prelude::*;

use crate::plugins::combat::components::Faction;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    pub damage: u32,
    pub faction: Faction,
}

/// Projectile lifecycle.
///
/// `Spent` is set by exactly one writer per cause (hit resolution or expiry) and
/// despawned later in PostUpdate. A spent projectile never strikes again.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectileState {
    #[default]
    Active,
    Spent,
}

#[derive(Component, Deref, DerefMut)]
pub struct Lifetime(pub Timer);
