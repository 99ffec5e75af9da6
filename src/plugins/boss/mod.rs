//! Boss plugin: one parameterized phase machine per boss entity.
//!
//! ```text
//! encounter::run_encounter --spawn_boss--> Boss { brain } + HealthPool (+ Shield)
//!
//! FixedPostUpdate, CoreSet::Boss
//!   drive_bosses
//!     pool defeated  -> brain.begin_dying, BossUi::Hide, EffectRequested, layers cleared
//!     brain.tick     -> velocity, SpawnProjectile, BossUi::Bind, stealth layers, teleports
//!     defeat delay   -> BossDefeated + PendingDespawn
//! ```
//!
//! Damage reaches the boss through the regular combat pipeline, so a shielded boss has its
//! shield consulted before its own pool.

pub mod archetype;
pub mod brain;

use avian2d::prelude::*;
use bevy::ecs::message::{Message, MessageWriter};
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{boss_layers, non_interacting, Layer};
use crate::common::rng::GameRng;
use crate::common::schedule::CoreSet;
use crate::common::state::GameState;
use crate::plugins::combat::components::{
    Bounty, BountyKind, ContactCooldown, ContactDamage, Faction, PendingDespawn,
};
use crate::plugins::combat::health::HealthPool;
use crate::plugins::combat::shield::Shield;
use crate::plugins::player::Player;
use crate::plugins::projectiles::messages::SpawnProjectile;

use archetype::BossArchetypeId;
use brain::{BossAction, BossBrain, BossPhase, BossSense};

const BOSS_RADIUS: f32 = 40.0;

#[derive(Component, Debug)]
pub struct Boss {
    pub brain: BossBrain,
}

/// Opaque UI tokens supplied by the host. The core forwards them and never renders.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossUiHandles {
    pub health_bar: u64,
    pub shield_bar: Option<u64>,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossUi {
    Bind {
        boss: Entity,
        handles: BossUiHandles,
        max_health: u32,
        max_shield: Option<u32>,
    },
    Hide {
        boss: Entity,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Destruction,
}

/// Request for a presentation effect at a position.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct EffectRequested {
    pub kind: EffectKind,
    pub position: Vec2,
}

/// The boss finished its defeat sequence and is being removed.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossDefeated {
    pub boss: Entity,
}

pub fn plugin(app: &mut App) {
    app.add_message::<BossUi>()
        .add_message::<EffectRequested>()
        .add_message::<BossDefeated>();

    app.add_systems(FixedPostUpdate, drive_bosses.in_set(CoreSet::Boss));
}

/// Spawn a boss of the given archetype at `position`. It enters toward `entry_point`.
pub fn spawn_boss(
    commands: &mut Commands,
    id: BossArchetypeId,
    position: Vec2,
    entry_point: Vec2,
    area: Rect,
) -> Entity {
    let archetype = id.archetype();
    let name = archetype.name;
    let health = HealthPool::new(archetype.max_health);
    let bounty = Bounty {
        score: archetype.bounty,
        kind: BountyKind::Boss,
    };
    let contact = ContactDamage {
        kind: archetype.contact,
        destroys_self: false,
    };
    let shield = archetype.shield.map(|spec| spec.build());

    let mut entity = commands.spawn((
        Name::new(format!("Boss{name}")),
        Boss {
            brain: BossBrain::new(archetype, entry_point, area),
        },
        health,
        Faction::Hostile,
        bounty,
        contact,
        ContactCooldown::default(),
        Sprite {
            color: Color::srgb(0.85, 0.2, 0.35),
            custom_size: Some(Vec2::splat(BOSS_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_translation(position.extend(1.0)),
        (
            RigidBody::Dynamic,
            Collider::circle(BOSS_RADIUS),
            LockedAxes::ROTATION_LOCKED,
            boss_layers(),
            LinearVelocity::ZERO,
            CollisionEventsEnabled,
        ),
        DespawnOnExit(GameState::InGame),
    ));
    if let Some(shield) = shield {
        entity.insert(shield);
    }
    entity.id()
}

pub fn drive_bosses(
    time: Res<Time>,
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    ui_handles: Option<Res<BossUiHandles>>,
    mut ui: MessageWriter<BossUi>,
    mut effects: MessageWriter<EffectRequested>,
    mut defeated: MessageWriter<BossDefeated>,
    mut shots: MessageWriter<SpawnProjectile>,
    q_player: Query<&Transform, (With<Player>, Without<Boss>)>,
    mut q_boss: Query<(
        Entity,
        &mut Boss,
        &HealthPool,
        Option<&Shield>,
        &mut Transform,
        &mut LinearVelocity,
        &mut CollisionLayers,
        Option<&mut Sprite>,
    )>,
    mut actions: Local<Vec<BossAction>>,
) {
    let dt = time.delta_secs();
    let player = q_player.single().ok().map(|t| t.translation.truncate());

    for (e, mut boss, health, shield, mut transform, mut velocity, mut layers, mut sprite) in &mut q_boss
    {
        let position = transform.translation.truncate();

        if health.is_defeated() && boss.brain.begin_dying() {
            info!("{} defeated", boss.brain.archetype().name);
            ui.write(BossUi::Hide { boss: e });
            effects.write(EffectRequested {
                kind: EffectKind::Destruction,
                position,
            });
            *layers = non_interacting(Layer::Boss);
        }

        actions.clear();
        velocity.0 = boss.brain.tick(dt, BossSense { position, player }, &mut rng, &mut actions);

        for action in actions.drain(..) {
            match action {
                BossAction::BecameActive => match ui_handles.as_deref() {
                    Some(handles) => {
                        ui.write(BossUi::Bind {
                            boss: e,
                            handles: *handles,
                            max_health: health.max(),
                            max_shield: shield.map(|s| s.max()),
                        });
                    }
                    None => debug!("boss {e:?} active without UI handles"),
                },
                BossAction::Fire {
                    origin,
                    velocity: shot,
                } => {
                    shots.write(SpawnProjectile::hostile(origin, shot));
                }
                BossAction::SetTargetable(targetable) => {
                    *layers = if targetable {
                        boss_layers()
                    } else {
                        non_interacting(Layer::Boss)
                    };
                    if let Some(sprite) = sprite.as_mut() {
                        sprite.color.set_alpha(if targetable { 1.0 } else { 0.2 });
                    }
                }
                BossAction::Teleport(to) => {
                    transform.translation = to.extend(transform.translation.z);
                }
                BossAction::Gone => {
                    defeated.write(BossDefeated { boss: e });
                    commands.entity(e).insert(PendingDespawn);
                }
            }
        }

        if matches!(boss.brain.phase(), BossPhase::Gone) {
            velocity.0 = Vec2::ZERO;
        }
    }
}
