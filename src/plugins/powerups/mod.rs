//! Power-ups plugin: seeded item drops the player flies into.
//!
//! ```text
//! FixedUpdate (InGame)          spawn_power_ups    interval -> PowerUp in the spawn lane
//! FixedPostUpdate CoreSet::Resolve
//!                   collect_power_ups (after contact hits)  CollisionStart -> effect, PowerUpCollected
//! FixedPostUpdate CoreSet::Score  scoring reads PowerUpCollected
//! ```
//!
//! Items drift left like obstacles and never hurt anyone. Touching one grants its effect
//! (weapon boost, heal, energy) and consumes it. A defeated player collects nothing.

use avian2d::prelude::*;
use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use serde::Deserialize;

use crate::common::config::LevelConfig;
use crate::common::error::ConfigurationError;
use crate::common::layers::power_up_layers;
use crate::common::rng::GameRng;
use crate::common::schedule::CoreSet;
use crate::common::state::GameState;
use crate::plugins::combat::components::PendingDespawn;
use crate::plugins::combat::health::HealthPool;
use crate::plugins::combat::systems::resolve_contact_hits;
use crate::plugins::encounter::director::EncounterDirectorState;
use crate::plugins::encounter::Encounter;
use crate::plugins::player::{Energy, Player, Weapon};
use crate::plugins::world::Bounded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    WeaponBoost,
    Health,
    Energy,
}

/// Level data for item drops.
///
/// ```toml
/// power_ups = { interval = 10.0, kinds = ["health", "energy"] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PowerUpField {
    /// Seconds between drops.
    pub interval: f32,
    pub speed: f32,
    /// Each drop picks one of these uniformly.
    pub kinds: Vec<PowerUpKind>,
    pub heal: u32,
    /// Seconds of spread fire per weapon boost.
    pub boost_duration: f32,
    pub energy: f32,
}

impl Default for PowerUpField {
    fn default() -> Self {
        Self {
            interval: 15.0,
            speed: 90.0,
            kinds: vec![
                PowerUpKind::WeaponBoost,
                PowerUpKind::Health,
                PowerUpKind::Energy,
            ],
            heal: 1,
            boost_duration: 10.0,
            energy: 50.0,
        }
    }
}

impl PowerUpField {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidTemplate {
            id: "power_ups".to_owned(),
            reason: reason.to_owned(),
        };
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(invalid("interval must be a finite number > 0"));
        }
        if !self.speed.is_finite() {
            return Err(invalid("speed must be finite"));
        }
        if self.kinds.is_empty() {
            return Err(invalid("kinds must not be empty"));
        }
        if !(self.boost_duration.is_finite() && self.boost_duration >= 0.0)
            || !(self.energy.is_finite() && self.energy >= 0.0)
        {
            return Err(invalid("boost_duration and energy must be finite numbers >= 0"));
        }
        Ok(())
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pub kind: PowerUpKind,
}

/// The player picked up an item.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpCollected {
    pub kind: PowerUpKind,
}

#[derive(Resource, Debug, Default)]
pub struct PowerUpSpawner {
    timer: f32,
}

const POWER_UP_RADIUS: f32 = 10.0;

pub fn plugin(app: &mut App) {
    app.init_resource::<PowerUpSpawner>()
        .add_message::<PowerUpCollected>()
        .add_systems(OnEnter(GameState::InGame), reset_spawner)
        .add_systems(
            FixedUpdate,
            spawn_power_ups.run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            collect_power_ups
                .in_set(CoreSet::Resolve)
                .after(resolve_contact_hits),
        );
}

fn reset_spawner(mut spawner: ResMut<PowerUpSpawner>) {
    spawner.timer = 0.0;
}

fn color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::WeaponBoost => Color::srgb(1.0, 0.6, 0.1),
        PowerUpKind::Health => Color::srgb(0.3, 0.95, 0.4),
        PowerUpKind::Energy => Color::srgb(0.3, 0.8, 1.0),
    }
}

pub fn spawn_power_up(
    commands: &mut Commands,
    kind: PowerUpKind,
    speed: f32,
    position: Vec2,
) -> Entity {
    commands
        .spawn((
            Name::new(format!("PowerUp[{kind:?}]")),
            PowerUp { kind },
            Sprite {
                color: color(kind),
                custom_size: Some(Vec2::splat(POWER_UP_RADIUS * 2.0)),
                ..default()
            },
            Transform::from_translation(position.extend(1.5)),
            RigidBody::Dynamic,
            Collider::circle(POWER_UP_RADIUS),
            Sensor,
            power_up_layers(),
            LinearVelocity(Vec2::new(-speed, 0.0)),
            CollisionEventsEnabled,
            Bounded,
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

/// Drop an item every `interval` seconds while the encounter is under way.
pub fn spawn_power_ups(
    time: Res<Time>,
    mut commands: Commands,
    config: Res<LevelConfig>,
    encounter: Option<Res<Encounter>>,
    mut spawner: ResMut<PowerUpSpawner>,
    mut rng: ResMut<GameRng>,
) {
    let Some(field) = &config.power_ups else {
        return;
    };
    let under_way = encounter.is_some_and(|e| {
        !matches!(
            e.state(),
            EncounterDirectorState::AwaitingStart | EncounterDirectorState::LevelComplete
        )
    });
    if !under_way {
        return;
    }

    spawner.timer += time.delta_secs();
    if spawner.timer < field.interval {
        return;
    }
    spawner.timer -= field.interval;

    let Some(&kind) = rng.pick(&field.kinds) else {
        return;
    };
    let position = config.spawn_lane.sample(&mut rng);
    let e = spawn_power_up(&mut commands, kind, field.speed, position);
    debug!("{kind:?} power-up {e:?} dropped at {position}");
}

pub fn collect_power_ups(
    mut commands: Commands,
    config: Res<LevelConfig>,
    mut started: MessageReader<CollisionStart>,
    mut collected: MessageWriter<PowerUpCollected>,
    q_items: Query<&PowerUp, Without<PendingDespawn>>,
    mut q_player: Query<(&mut HealthPool, &mut Weapon, Option<&mut Energy>), With<Player>>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();
    let field = config.power_ups.clone().unwrap_or_default();

    for ev in started.read() {
        let (a, b) = (
            ev.body1.unwrap_or(ev.collider1),
            ev.body2.unwrap_or(ev.collider2),
        );
        let (player, item) = if q_player.contains(a) {
            (a, b)
        } else if q_player.contains(b) {
            (b, a)
        } else {
            continue;
        };

        let Ok(power_up) = q_items.get(item) else {
            continue;
        };
        let Ok((mut health, mut weapon, energy)) = q_player.get_mut(player) else {
            continue;
        };
        if health.is_defeated() || !seen.insert(item) {
            continue;
        }

        match power_up.kind {
            PowerUpKind::WeaponBoost => weapon.boost(field.boost_duration),
            PowerUpKind::Health => health.heal(field.heal),
            PowerUpKind::Energy => {
                if let Some(mut energy) = energy {
                    energy.restore(field.energy);
                }
            }
        }

        info!("picked up {:?}", power_up.kind);
        commands.entity(item).insert(PendingDespawn);
        collected.write(PowerUpCollected {
            kind: power_up.kind,
        });
    }
}
