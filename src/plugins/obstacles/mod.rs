//! Obstacles plugin: an asteroid field that drifts through while waves are running.
//!
//! Obstacles are neutral: bullets of either side hit them, and ramming one hurts the player and
//! destroys the rock. Destroying one scores through the multiplier but does not feed the combo.
//! Letting one drift past the player's side scores `ScoreConfig::obstacle_avoid_score`.

use avian2d::prelude::*;
use bevy::ecs::message::{Message, MessageWriter};
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use serde::Deserialize;

use crate::common::config::LevelConfig;
use crate::common::error::ConfigurationError;
use crate::common::layers::obstacle_layers;
use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::plugins::combat::components::{
    Bounty, BountyKind, ContactDamage, ContactKind, LifeState, PendingDespawn,
};
use crate::plugins::combat::health::HealthPool;
use crate::plugins::encounter::director::EncounterDirectorState;
use crate::plugins::encounter::Encounter;
use crate::plugins::world::{Bounded, Playfield};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ObstacleField {
    /// Seconds between obstacles.
    pub interval: f32,
    pub max_active: u32,
    /// `None` makes obstacles indestructible; they still swallow bullets.
    #[serde(default)]
    pub health: Option<u32>,
    pub speed: f32,
    pub bounty: u32,
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self {
            interval: 4.0,
            max_active: 3,
            health: Some(3),
            speed: 120.0,
            bounty: 35,
        }
    }
}

impl ObstacleField {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidTemplate {
            id: "obstacles".to_owned(),
            reason: reason.to_owned(),
        };
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(invalid("interval must be a finite number > 0"));
        }
        if !self.speed.is_finite() {
            return Err(invalid("speed must be finite"));
        }
        if self.health == Some(0) {
            return Err(invalid("health must be >= 1 when set"));
        }
        Ok(())
    }
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Obstacle;

/// Marker: already counted as avoided.
#[derive(Component, Debug, Clone, Copy)]
struct Passed;

/// An obstacle drifted past the player's side of the screen.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleAvoided {
    pub entity: Entity,
}

#[derive(Resource, Debug, Default)]
pub struct ObstacleSpawner {
    timer: f32,
}

const OBSTACLE_RADIUS: f32 = 18.0;

pub fn plugin(app: &mut App) {
    app.init_resource::<ObstacleSpawner>()
        .add_message::<ObstacleAvoided>()
        .add_systems(OnEnter(GameState::InGame), reset_spawner)
        .add_systems(
            FixedUpdate,
            (spawn_obstacles, detect_avoided).run_if(in_state(GameState::InGame)),
        );
}

fn reset_spawner(mut spawner: ResMut<ObstacleSpawner>) {
    spawner.timer = 0.0;
}

pub fn spawn_obstacle(commands: &mut Commands, field: &ObstacleField, position: Vec2) -> Entity {
    let mut entity = commands.spawn((
        Name::new("Obstacle"),
        Obstacle,
        ContactDamage {
            kind: ContactKind::Amount(1),
            destroys_self: true,
        },
        Sprite {
            color: Color::srgb(0.45, 0.4, 0.35),
            custom_size: Some(Vec2::splat(OBSTACLE_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_translation(position.extend(1.0)),
        RigidBody::Dynamic,
        Collider::circle(OBSTACLE_RADIUS),
        LockedAxes::ROTATION_LOCKED,
        obstacle_layers(),
        LinearVelocity(Vec2::new(-field.speed, 0.0)),
        CollisionEventsEnabled,
        Bounded,
        DespawnOnExit(GameState::InGame),
    ));

    if let Some(health) = field.health {
        entity.insert((
            HealthPool::new(health),
            LifeState::Alive,
            Bounty {
                score: field.bounty,
                kind: BountyKind::Obstacle,
            },
        ));
    }
    entity.id()
}

/// Keep up to `max_active` obstacles drifting through while a wave is running.
pub fn spawn_obstacles(
    time: Res<Time>,
    mut commands: Commands,
    config: Res<LevelConfig>,
    encounter: Option<Res<Encounter>>,
    mut spawner: ResMut<ObstacleSpawner>,
    mut rng: ResMut<GameRng>,
    q_active: Query<(), (With<Obstacle>, Without<PendingDespawn>)>,
) {
    let Some(field) = config.obstacles else {
        return;
    };
    let running_wave = encounter
        .is_some_and(|e| matches!(e.state(), EncounterDirectorState::RunningWave(_)));
    if !running_wave || q_active.iter().count() as u32 >= field.max_active {
        return;
    }

    spawner.timer += time.delta_secs();
    if spawner.timer < field.interval {
        return;
    }
    spawner.timer -= field.interval;

    let position = config.spawn_lane.sample(&mut rng);
    let e = spawn_obstacle(&mut commands, &field, position);
    debug!("obstacle {e:?} spawned at {position}");
}

fn detect_avoided(
    mut commands: Commands,
    playfield: Res<Playfield>,
    mut avoided: MessageWriter<ObstacleAvoided>,
    q: Query<(Entity, &Transform, Option<&HealthPool>), (With<Obstacle>, Without<Passed>)>,
) {
    for (e, tf, health) in &q {
        if health.is_some_and(HealthPool::is_defeated) {
            continue;
        }
        if tf.translation.x < playfield.bounds.min.x {
            commands.entity(e).insert(Passed);
            avoided.write(ObstacleAvoided { entity: e });
        }
    }
}

#[cfg(test)]
mod tests;
