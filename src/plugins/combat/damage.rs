//! Damage resolution: Shield first, then HealthPool.
//!
//! Any entity that has a `HealthPool` (and optionally a `Shield`) flows through here,
//! whether it is an enemy, a boss, an obstacle or the player.

use super::health::HealthPool;
use super::shield::Shield;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Alive,
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub absorbed_by_shield: u32,
    pub applied_to_health: u32,
    pub shield_depleted: bool,
    /// True only for the strike that took health from > 0 to 0.
    pub killed: bool,
    pub resulting: TargetState,
}

impl DamageOutcome {
    /// A strike produces a Hit when it carried any damage at all,
    /// including strikes fully eaten by the shield.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.absorbed_by_shield > 0 || self.applied_to_health > 0 || self.shield_depleted
    }
}

pub fn apply_damage(health: &mut HealthPool, shield: Option<&mut Shield>, amount: u32) -> DamageOutcome {
    let (absorbed, remainder, depleted) = match shield {
        Some(shield) => {
            let r = shield.absorb(amount);
            (r.absorbed, r.remainder, r.depleted)
        }
        None => (0, amount, false),
    };
    debug_assert_eq!(absorbed + remainder, amount);

    let change = health.damage(remainder);

    DamageOutcome {
        absorbed_by_shield: absorbed,
        applied_to_health: change.applied,
        shield_depleted: depleted,
        killed: change.defeated_now,
        resulting: if health.is_defeated() {
            TargetState::Defeated
        } else {
            TargetState::Alive
        },
    }
}

/// Lethal strike that ignores shields (a boss ramming the player).
pub fn apply_lethal(health: &mut HealthPool) -> DamageOutcome {
    let change = health.deplete();
    DamageOutcome {
        absorbed_by_shield: 0,
        applied_to_health: change.applied,
        shield_depleted: false,
        killed: change.defeated_now,
        resulting: if health.is_defeated() {
            TargetState::Defeated
        } else {
            TargetState::Alive
        },
    }
}
