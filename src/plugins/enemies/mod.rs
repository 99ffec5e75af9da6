//! Enemies plugin: template-driven wave ships.
//!
//! ---------------------------
//! HOW THIS IS DESIGNED (ECS)
//! ---------------------------
//! 1) FACTS live in components/resources:
//!    - `EnemyTemplates` is the registry the encounter spawns from (`spawn_enemy`).
//!    - `HealthPool`, optional `Shield`, `LifeState` describe gameplay reality.
//!
//! 2) RULES mutate facts in predictable places:
//!    - combat resolution (elsewhere) is the only writer of HealthPool/Shield.
//!    - this module only steers ships and pulls triggers.
//!
//! 3) PRESENTATION is derived from facts:
//!    - hit flash is driven by `Hit` messages.
//!    - the dying shrink/fade is derived from the `LifeState::Dying` timer.
//!
//! Ships always make leftward progress at template speed. `EnemyMovement` layers a lean
//! toward the player or a vertical weave on top of that. Armed ships shoot on their interval
//! straight ahead, at the player, or in short aimed bursts (`EnemyFire`). Everything leaves
//! through the left edge unless shot down first.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use serde::Deserialize;

use crate::common::config::LevelConfig;
use crate::common::error::ConfigurationError;
use crate::common::layers::enemy_layers;
use crate::common::state::GameState;
use crate::plugins::combat::components::{
    Bounty, BountyKind, ContactDamage, ContactKind, Faction, LifeState,
};
use crate::plugins::combat::health::HealthPool;
use crate::plugins::combat::messages::Hit;
use crate::plugins::combat::shield::{Shield, ShieldSpec};
use crate::plugins::player::Player;
use crate::plugins::projectiles::messages::SpawnProjectile;
use crate::plugins::world::Bounded;

const ENEMY_RADIUS: f32 = 16.0;

// -----------------------------------------------------------------------------
// Templates
// -----------------------------------------------------------------------------

fn default_bullet_speed() -> f32 {
    420.0
}

fn default_tracking() -> f32 {
    0.3
}

/// How a ship moves on top of its leftward drift.
///
/// ```toml
/// movement = { kind = "zigzag", amplitude = 40.0, frequency = 2.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnemyMovement {
    #[default]
    Drift,
    /// Lean toward the player by `tracking` times the drift speed.
    Pursue {
        #[serde(default = "default_tracking")]
        tracking: f32,
    },
    /// Vertical weave: `amplitude` pixels at `frequency` radians per second.
    Zigzag { amplitude: f32, frequency: f32 },
}

/// What an armed ship does when its interval elapses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnemyFire {
    #[default]
    Straight,
    Aimed,
    /// `count` aimed shots, `spacing` seconds apart.
    Burst { count: u32, spacing: f32 },
}

/// Everything needed to spawn one kind of enemy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    pub max_health: u32,
    #[serde(default)]
    pub shield: Option<ShieldSpec>,
    /// Leftward drift in pixels per second.
    pub speed: f32,
    /// Seconds between shots. Unarmed when `None`.
    #[serde(default)]
    pub fire_interval: Option<f32>,
    #[serde(default = "default_bullet_speed")]
    pub bullet_speed: f32,
    pub bounty: u32,
    #[serde(default)]
    pub movement: EnemyMovement,
    #[serde(default)]
    pub fire: EnemyFire,
}

impl EnemyTemplate {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_owned(),
        };

        if self.id.is_empty() {
            return Err(invalid("id is empty"));
        }
        if self.max_health == 0 {
            return Err(invalid("max_health must be >= 1"));
        }
        if !self.speed.is_finite() || !self.bullet_speed.is_finite() {
            return Err(invalid("speeds must be finite"));
        }
        if self
            .fire_interval
            .is_some_and(|i| !i.is_finite() || i <= 0.0)
        {
            return Err(invalid("fire_interval must be a finite number > 0"));
        }
        if self
            .shield
            .and_then(|s| s.regen_delay)
            .is_some_and(|d| !d.is_finite() || d < 0.0)
        {
            return Err(invalid("shield regen_delay must be a finite number >= 0"));
        }

        let weave_ok = |v: f32| v.is_finite() && v >= 0.0;
        match self.movement {
            EnemyMovement::Drift => {}
            EnemyMovement::Pursue { tracking } if weave_ok(tracking) => {}
            EnemyMovement::Zigzag {
                amplitude,
                frequency,
            } if weave_ok(amplitude) && weave_ok(frequency) => {}
            _ => return Err(invalid("movement parameters must be finite numbers >= 0")),
        }
        if let EnemyFire::Burst { count, spacing } = self.fire {
            if count == 0 || !spacing.is_finite() || spacing <= 0.0 {
                return Err(invalid("burst needs count >= 1 and spacing > 0"));
            }
        }
        Ok(())
    }
}

/// Template registry, rebuilt from `LevelConfig` whenever a level starts.
#[derive(Resource, Debug, Default, Clone)]
pub struct EnemyTemplates {
    by_id: HashMap<String, EnemyTemplate>,
}

impl EnemyTemplates {
    pub fn from_templates(templates: impl IntoIterator<Item = EnemyTemplate>) -> Self {
        Self {
            by_id: templates.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Result<&EnemyTemplate, ConfigurationError> {
        self.by_id
            .get(id)
            .ok_or_else(|| ConfigurationError::UnknownTemplate(id.to_owned()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub template: String,
    /// Leftward drift in pixels per second.
    pub speed: f32,
    pub movement: EnemyMovement,
    /// Seconds alive; drives the zigzag phase.
    age: f32,
}

#[derive(Component, Debug, Clone)]
pub struct Gun {
    timer: Timer,
    bullet_speed: f32,
    pattern: EnemyFire,
    burst: Option<Burst>,
}

/// Follow-up shots still owed by a burst.
#[derive(Debug, Clone)]
struct Burst {
    remaining: u32,
    timer: Timer,
}

/// Presentation-only hit flash in `[0, 1]`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HitFlash(f32);

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

/// Register enemy systems.
///
/// Schedules:
/// - OnEnter(InGame): rebuild the template registry from the level.
/// - FixedUpdate: steering and guns.
/// - Update: presentation derived from combat facts.
pub fn plugin(app: &mut App) {
    app.init_resource::<EnemyTemplates>();
    app.add_systems(OnEnter(GameState::InGame), load_templates);

    app.add_systems(
        FixedUpdate,
        (steer_enemies, fire_enemy_guns).run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        Update,
        (flash_on_hit, animate_dying).run_if(in_state(GameState::InGame)),
    );
}

fn load_templates(mut commands: Commands, config: Res<LevelConfig>) {
    let templates = EnemyTemplates::from_templates(config.templates.iter().cloned());
    debug!("{} enemy template(s) loaded", templates.len());
    commands.insert_resource(templates);
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

/// Spawn one enemy from a template.
pub fn spawn_enemy(
    commands: &mut Commands,
    templates: &EnemyTemplates,
    id: &str,
    position: Vec2,
) -> Result<Entity, ConfigurationError> {
    let template = templates.get(id)?;

    let mut entity = commands.spawn((
        Name::new(format!("Enemy[{id}]")),
        Enemy {
            template: template.id.clone(),
            speed: template.speed,
            movement: template.movement,
            age: 0.0,
        },
        HealthPool::new(template.max_health),
        Faction::Hostile,
        Bounty {
            score: template.bounty,
            kind: BountyKind::Enemy,
        },
        LifeState::Alive,
        ContactDamage {
            kind: ContactKind::Amount(1),
            destroys_self: true,
        },
        HitFlash::default(),
        Sprite {
            color: Color::srgb(0.9, 0.25, 0.25),
            custom_size: Some(Vec2::splat(ENEMY_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_translation(position.extend(1.0)),
        (
            RigidBody::Dynamic,
            Collider::circle(ENEMY_RADIUS),
            LockedAxes::ROTATION_LOCKED,
            enemy_layers(),
            LinearVelocity(Vec2::new(-template.speed, 0.0)),
            CollisionEventsEnabled,
        ),
        Bounded,
        DespawnOnExit(GameState::InGame),
    ));

    if let Some(spec) = template.shield {
        entity.insert(spec.build());
    }
    if let Some(interval) = template.fire_interval {
        entity.insert(Gun {
            timer: Timer::from_seconds(interval, TimerMode::Repeating),
            bullet_speed: template.bullet_speed,
            pattern: template.fire,
            burst: None,
        });
    }

    Ok(entity.id())
}

// -----------------------------------------------------------------------------
// Rules
// -----------------------------------------------------------------------------

/// Re-assert velocity every step so physical contacts cannot knock ships off course.
fn steer_enemies(
    time: Res<Time>,
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut q: Query<(&mut Enemy, &Transform, &LifeState, &mut LinearVelocity)>,
) {
    let dt = time.delta_secs();
    let target = q_player.single().ok().map(|tf| tf.translation.truncate());

    for (mut enemy, tf, life, mut vel) in &mut q {
        if !matches!(life, LifeState::Alive) {
            vel.0 = Vec2::ZERO;
            continue;
        }

        enemy.age += dt;
        let drift = Vec2::new(-enemy.speed, 0.0);
        vel.0 = match enemy.movement {
            EnemyMovement::Drift => drift,
            EnemyMovement::Pursue { tracking } => {
                let lean = target
                    .map(|t| (t - tf.translation.truncate()).normalize_or_zero())
                    .unwrap_or(Vec2::ZERO);
                drift + lean * enemy.speed * tracking
            }
            // Derivative of `amplitude * sin(frequency * age)`.
            EnemyMovement::Zigzag {
                amplitude,
                frequency,
            } => drift + Vec2::Y * amplitude * frequency * (frequency * enemy.age).cos(),
        };
    }
}

fn fire_enemy_guns(
    time: Res<Time>,
    mut shots: MessageWriter<SpawnProjectile>,
    q_player: Query<&Transform, (With<Player>, Without<Gun>)>,
    mut q: Query<(&Transform, &LifeState, &mut Gun)>,
) {
    let target = q_player.single().ok().map(|tf| tf.translation.truncate());

    for (tf, life, mut gun) in &mut q {
        if !matches!(life, LifeState::Alive) {
            continue;
        }

        let gun = &mut *gun;
        let muzzle = tf.translation.truncate() - Vec2::X * (ENEMY_RADIUS + 6.0);
        let straight = Vec2::NEG_X * gun.bullet_speed;
        let aimed = target
            .map(|t| (t - muzzle).normalize_or(Vec2::NEG_X) * gun.bullet_speed)
            .unwrap_or(straight);

        // Shots still owed by an earlier burst go first, on their own spacing.
        if let Some(burst) = gun.burst.as_mut() {
            burst.timer.tick(time.delta());
            let due = burst.timer.times_finished_this_tick().min(burst.remaining);
            for _ in 0..due {
                shots.write(SpawnProjectile::hostile(muzzle, aimed));
            }
            burst.remaining -= due;
            if burst.remaining == 0 {
                gun.burst = None;
            }
        }

        gun.timer.tick(time.delta());
        for _ in 0..gun.timer.times_finished_this_tick() {
            match gun.pattern {
                EnemyFire::Straight => {
                    shots.write(SpawnProjectile::hostile(muzzle, straight));
                }
                EnemyFire::Aimed => {
                    shots.write(SpawnProjectile::hostile(muzzle, aimed));
                }
                EnemyFire::Burst { count, spacing } => {
                    shots.write(SpawnProjectile::hostile(muzzle, aimed));
                    if count > 1 && gun.burst.is_none() {
                        gun.burst = Some(Burst {
                            remaining: count - 1,
                            timer: Timer::from_seconds(spacing, TimerMode::Repeating),
                        });
                    }
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Presentation
// -----------------------------------------------------------------------------

fn flash_on_hit(
    time: Res<Time>,
    mut hits: MessageReader<Hit>,
    mut q: Query<(&mut HitFlash, &mut Sprite, Option<&Shield>, &LifeState)>,
) {
    for hit in hits.read() {
        if let Ok((mut flash, ..)) = q.get_mut(hit.target) {
            flash.0 = 1.0;
        }
    }

    let dt = time.delta_secs();
    for (mut flash, mut sprite, shield, life) in &mut q {
        if !matches!(life, LifeState::Alive) {
            continue;
        }

        flash.0 = (flash.0 - 8.0 * dt).max(0.0);

        // Base colour communicates shield state.
        let base = if shield.is_some_and(Shield::is_active) {
            Color::srgb(0.35, 0.65, 1.0)
        } else {
            Color::srgb(0.9, 0.25, 0.25)
        };

        let mut out = base.to_srgba();
        out.red = (out.red + flash.0 * 0.55).min(1.0);
        out.green = (out.green + flash.0 * 0.55).min(1.0);
        out.blue = (out.blue + flash.0 * 0.55).min(1.0);
        sprite.color = out.into();
    }
}

/// Asset-free death animation: shrink and fade over the dying window.
fn animate_dying(mut q: Query<(&LifeState, &mut Sprite, &mut Transform), With<Enemy>>) {
    for (life, mut sprite, mut tf) in &mut q {
        let LifeState::Dying { timer } = life else {
            continue;
        };

        let t = timer.fraction();
        tf.scale = Vec3::splat(1.0 - t);
        sprite.color.set_alpha(1.0 - t);
    }
}

#[cfg(test)]
mod tests;
