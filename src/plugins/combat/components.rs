use bevy::prelude::*;

/// Which side an entity fights for. Projectiles never strike their own side.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Hostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BountyKind {
    Enemy,
    Boss,
    Obstacle,
}

/// Score awarded when this entity is killed by the player.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounty {
    pub score: u32,
    pub kind: BountyKind,
}

impl Bounty {
    /// Only kills of ships keep the combo alive.
    #[inline]
    pub fn feeds_combo(&self) -> bool {
        !matches!(self.kind, BountyKind::Obstacle)
    }
}

/// Lifecycle for regular enemies and obstacles.
///
/// - Alive: normal gameplay.
/// - Dying: short window before removal; no longer collides.
/// - Dead: terminal marker, despawn is pending.
#[derive(Component, Debug, Clone)]
pub enum LifeState {
    Alive,
    Dying { timer: Timer },
    Dead,
}

/// Marker: entity should be removed from the world.
///
/// We don't despawn in the fixed step; we mark and despawn later in PostUpdate.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Drains the victim's health regardless of shields.
    Lethal,
    Amount(u32),
}

/// Damage dealt to the player by touching this entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactDamage {
    pub kind: ContactKind,
    /// The attacker is destroyed by the impact (asteroids, kamikaze ships).
    pub destroys_self: bool,
}

/// Seconds until this attacker may hurt the player by contact again.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ContactCooldown {
    pub remaining: f32,
}
