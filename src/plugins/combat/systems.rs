use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::non_interacting;
use crate::common::tunables::Tunables;
use crate::plugins::obstacles::Obstacle;
use crate::plugins::player::Player;
use crate::plugins::projectiles::components::{Projectile, ProjectileState};

use super::components::{
    Bounty, ContactCooldown, ContactDamage, ContactKind, Faction, LifeState, PendingDespawn,
};
use super::damage::{apply_damage, apply_lethal, DamageOutcome};
use super::health::HealthPool;
use super::messages::{EntityDespawned, Hit, Killed};
use super::shield::Shield;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

fn report(
    outcome: DamageOutcome,
    target: Entity,
    source: Entity,
    bounty: Option<Bounty>,
    hits: &mut MessageWriter<Hit>,
    kills: &mut MessageWriter<Killed>,
) {
    if outcome.is_hit() {
        hits.write(Hit {
            target,
            source,
            absorbed: outcome.absorbed_by_shield,
            applied: outcome.applied_to_health,
        });
    }
    if outcome.killed {
        kills.write(Killed {
            entity: target,
            bounty,
        });
    }
}

/// Route projectile strikes through Shield → HealthPool.
///
/// Contract:
/// - a projectile is consumed on contact with any damageable target or obstacle,
///   whether or not the strike penetrated a shield;
/// - a projectile strikes at most once (per-frame dedupe + `Spent` state);
/// - Kill is reported on the defeated edge only, so re-hits of a corpse are no-ops.
pub fn resolve_projectile_hits(
    mut started: MessageReader<CollisionStart>,
    mut hits: MessageWriter<Hit>,
    mut kills: MessageWriter<Killed>,
    q_is_projectile: Query<(), With<Projectile>>,
    mut q_projectiles: Query<(&Projectile, &mut ProjectileState)>,
    mut q_targets: Query<(
        &mut HealthPool,
        Option<&mut Shield>,
        Option<&Faction>,
        Option<&Bounty>,
    )>,
    q_obstacles: Query<(), With<Obstacle>>,
    // Per-frame dedupe
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let p1 = q_is_projectile.contains(t1.collider);
        let p2 = q_is_projectile.contains(t2.collider);
        if !(p1 ^ p2) {
            continue; // must be exactly one projectile
        }
        let (projectile_side, other_side) = if p1 { (t1, t2) } else { (t2, t1) };

        if !seen.insert(projectile_side.collider) {
            continue;
        }

        let Ok((projectile, mut state)) = q_projectiles.get_mut(projectile_side.collider) else {
            continue;
        };
        if *state != ProjectileState::Active {
            continue;
        }

        let target = other_side.gameplay_owner();

        if let Ok((mut health, shield, faction, bounty)) = q_targets.get_mut(target) {
            if faction.is_some_and(|f| *f == projectile.faction) || health.is_defeated() {
                continue;
            }

            let outcome = apply_damage(
                &mut health,
                shield.map(|s| s.into_inner()),
                projectile.damage,
            );
            *state = ProjectileState::Spent;

            // Only the player's fire earns score.
            let bounty = match projectile.faction {
                Faction::Player => bounty.copied(),
                Faction::Hostile => None,
            };
            report(outcome, target, projectile_side.collider, bounty, &mut hits, &mut kills);
            continue;
        }

        // Non-damageable obstacle: swallow the projectile, no Hit/Kill.
        if q_obstacles.contains(target) {
            *state = ProjectileState::Spent;
        }
    }
}

/// Bodies touching the player hurt the player (and may destroy themselves).
pub fn resolve_contact_hits(
    mut commands: Commands,
    mut started: MessageReader<CollisionStart>,
    mut hits: MessageWriter<Hit>,
    mut kills: MessageWriter<Killed>,
    tunables: Res<Tunables>,
    mut q_player: Query<(&mut HealthPool, Option<&mut Shield>), With<Player>>,
    mut q_attackers: Query<
        (&ContactDamage, Option<&mut ContactCooldown>, Option<&mut HealthPool>),
        Without<Player>,
    >,
) {
    for ev in started.read() {
        let (t1, t2) = targets(ev);
        let (a, b) = (t1.gameplay_owner(), t2.gameplay_owner());

        let (player, attacker) = if q_player.contains(a) {
            (a, b)
        } else if q_player.contains(b) {
            (b, a)
        } else {
            continue;
        };

        let Ok((contact, cooldown, attacker_health)) = q_attackers.get_mut(attacker) else {
            continue;
        };
        if attacker_health.as_ref().is_some_and(|h| h.is_defeated()) {
            continue;
        }
        if let Some(mut cooldown) = cooldown {
            if cooldown.remaining > 0.0 {
                continue;
            }
            cooldown.remaining = tunables.contact_cooldown;
        }

        let Ok((mut health, shield)) = q_player.get_mut(player) else {
            continue;
        };
        let outcome = match contact.kind {
            ContactKind::Lethal => apply_lethal(&mut health),
            ContactKind::Amount(n) => apply_damage(&mut health, shield.map(|s| s.into_inner()), n),
        };
        report(outcome, player, attacker, None, &mut hits, &mut kills);

        if contact.destroys_self {
            match attacker_health {
                Some(mut own) => {
                    if own.deplete().defeated_now {
                        kills.write(Killed {
                            entity: attacker,
                            bounty: None,
                        });
                    }
                }
                // Indestructible rocks still break on the player.
                None => {
                    commands.entity(attacker).insert(PendingDespawn);
                }
            }
        }
    }
}

pub fn tick_contact_cooldowns(time: Res<Time>, mut q: Query<&mut ContactCooldown>) {
    let dt = time.delta_secs();
    for mut cooldown in &mut q {
        cooldown.remaining = (cooldown.remaining - dt).max(0.0);
    }
}

pub fn tick_shields(time: Res<Time>, mut q: Query<(Entity, &mut Shield)>) {
    let dt = time.delta_secs();
    for (e, mut shield) in &mut q {
        if shield.tick(dt) {
            debug!("shield of {e:?} recharged to {}", shield.max());
        }
    }
}

/// Transition Alive -> Dying once the pool is defeated.
///
/// Dying entities stop interacting immediately so no projectile is wasted on a corpse.
pub fn enter_dying(
    tunables: Res<Tunables>,
    mut q: Query<(&HealthPool, &mut LifeState, &mut CollisionLayers), Without<PendingDespawn>>,
) {
    for (health, mut life, mut layers) in &mut q {
        if !matches!(*life, LifeState::Alive) || !health.is_defeated() {
            continue;
        }

        *life = LifeState::Dying {
            timer: Timer::from_seconds(tunables.death_duration, TimerMode::Once),
        };
        *layers = non_interacting(layers.memberships);
    }
}

/// Count down Dying and mark PendingDespawn once finished.
pub fn progress_dying(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut LifeState), Without<PendingDespawn>>,
) {
    for (e, mut life) in &mut q {
        let LifeState::Dying { timer } = &mut *life else {
            continue;
        };

        timer.tick(time.delta());
        if timer.is_finished() {
            *life = LifeState::Dead;
            commands.entity(e).insert(PendingDespawn);
        }
    }
}

/// Despawn entities marked for removal and report them.
///
/// Centralizing despawn in one system keeps structural changes predictable.
pub fn despawn_pending(
    mut commands: Commands,
    mut despawned: MessageWriter<EntityDespawned>,
    q: Query<Entity, With<PendingDespawn>>,
) {
    for e in &q {
        commands.entity(e).try_despawn();
        despawned.write(EntityDespawned { entity: e });
    }
}
