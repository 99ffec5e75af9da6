//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, write PlayerInput resource
//! - FixedUpdate: burn or recover energy, apply velocity to the kinematic body, keep it on
//!   the playfield, autofire (a three-way spread while the weapon is boosted)
//! - FixedPostUpdate (CoreSet::Lifecycle): defeated health pool -> GameOver, exactly once
//!
//! Input is optional so headless apps without `InputPlugin` simply idle.

use avian2d::prelude::*;
use bevy::ecs::message::{Message, MessageWriter};
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::player_layers;
use crate::common::schedule::CoreSet;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::components::Faction;
use crate::plugins::combat::health::HealthPool;
use crate::plugins::projectiles::messages::SpawnProjectile;
use crate::plugins::world::Playfield;

#[derive(Component)]
pub struct Player;

#[derive(Component, Debug, Default)]
pub struct Weapon {
    /// Seconds until the gun may fire again.
    cooldown: f32,
    /// Seconds of spread fire left.
    boost: f32,
}

impl Weapon {
    /// Switch to spread fire for `seconds`. A new boost replaces the one running.
    pub fn boost(&mut self, seconds: f32) {
        self.boost = seconds.max(0.0);
    }

    #[inline]
    pub fn is_boosted(&self) -> bool {
        self.boost > 0.0
    }
}

/// Afterburner fuel.
///
/// Holding boost burns energy for speed. Running dry locks the afterburner until the
/// button is released; energy recovers whenever it is not burning.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Energy {
    current: f32,
    max: f32,
    burning: bool,
    exhausted: bool,
}

impl Energy {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            burning: false,
            exhausted: false,
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn is_burning(&self) -> bool {
        self.burning
    }

    pub fn restore(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn update(&mut self, held: bool, dt: f32, drain: f32, regen: f32) {
        if self.exhausted && !held {
            self.exhausted = false;
        }

        if held && !self.exhausted && self.current > 0.0 {
            self.burning = true;
            self.current = (self.current - drain * dt).max(0.0);
            if self.current == 0.0 {
                self.burning = false;
                self.exhausted = true;
            }
        } else {
            self.burning = false;
            self.current = (self.current + regen * dt).min(self.max);
        }
    }
}

#[derive(Resource, Default, Debug)]
struct PlayerInput {
    move_axis: Vec2,
    fire: bool,
    boost: bool,
}

/// The player was defeated. Written once per level.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver;

/// Guards `GameOver` against being written twice.
#[derive(Resource, Debug, Default)]
pub struct GameOverLatch {
    fired: bool,
}

impl GameOverLatch {
    #[inline]
    pub fn fired(&self) -> bool {
        self.fired
    }
}

const PLAYER_START: Vec2 = Vec2::new(-480.0, 0.0);
const PLAYER_RADIUS: f32 = 13.0;

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .init_resource::<GameOverLatch>()
        .add_message::<GameOver>()
        .add_systems(OnEnter(GameState::InGame), (spawn, reset_latch))
        .add_systems(Update, gather_input)
        .add_systems(
            FixedUpdate,
            (burn_energy, apply_movement, keep_on_playfield, fire_weapon)
                .chain()
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            detect_player_defeat.in_set(CoreSet::Lifecycle),
        );
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    commands.spawn((
        Name::new("Player"),
        Player,
        HealthPool::new(tunables.player_max_health),
        Faction::Player,
        Weapon::default(),
        Energy::new(tunables.player_max_energy),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(PLAYER_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_translation(PLAYER_START.extend(1.0)),
        RigidBody::Kinematic,
        Collider::circle(PLAYER_RADIUS),
        player_layers(),
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));
}

fn reset_latch(mut latch: ResMut<GameOverLatch>) {
    latch.fired = false;
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else {
        return;
    };

    let mut axis = Vec2::ZERO;

    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        axis.y += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        axis.y -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axis.x -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
    input.fire = keys.pressed(KeyCode::Space);
    input.boost = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
}

fn burn_energy(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<&mut Energy, With<Player>>,
) {
    let Ok(mut energy) = q_player.single_mut() else {
        return;
    };
    energy.update(
        input.boost,
        time.delta_secs(),
        tunables.boost_energy_drain,
        tunables.energy_regen,
    );
}

fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&mut LinearVelocity, Option<&Energy>), With<Player>>,
) {
    let Ok((mut vel, energy)) = q_player.single_mut() else {
        return;
    };
    let speed = if energy.is_some_and(Energy::is_burning) {
        tunables.player_boost_speed
    } else {
        tunables.player_speed
    };
    vel.0 = input.move_axis * speed;
}

fn keep_on_playfield(
    playfield: Res<Playfield>,
    mut q_player: Query<(&mut Transform, &mut LinearVelocity), With<Player>>,
) {
    let Ok((mut tf, mut vel)) = q_player.single_mut() else {
        return;
    };
    let pos = tf.translation.truncate();
    let clamped = playfield.clamp(pos);
    if clamped != pos {
        tf.translation = clamped.extend(tf.translation.z);
        // Stop pushing into the edge.
        if clamped.x != pos.x {
            vel.x = 0.0;
        }
        if clamped.y != pos.y {
            vel.y = 0.0;
        }
    }
}

fn fire_weapon(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut q_player: Query<(&Transform, &HealthPool, &mut Weapon), With<Player>>,
) {
    let Ok((tf, health, mut weapon)) = q_player.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    weapon.cooldown = (weapon.cooldown - dt).max(0.0);
    let boosted = weapon.is_boosted();
    weapon.boost = (weapon.boost - dt).max(0.0);
    if !input.fire || health.is_defeated() || weapon.cooldown > 0.0 {
        return;
    }

    weapon.cooldown = tunables.fire_interval;
    let muzzle = tf.translation.truncate() + Vec2::X * (PLAYER_RADIUS + 6.0);
    let spread = tunables.boosted_spread_degrees.to_radians();
    let fan = [0.0, spread, -spread];
    let angles = if boosted { &fan[..] } else { &fan[..1] };
    for angle in angles {
        shots.write(SpawnProjectile {
            faction: Faction::Player,
            pos: muzzle,
            vel: Vec2::from_angle(*angle) * tunables.bullet_speed,
            damage: tunables.player_bullet_damage,
        });
    }
}

/// Hand control back to the host once the player's pool is empty.
pub fn detect_player_defeat(
    mut latch: ResMut<GameOverLatch>,
    mut game_over: MessageWriter<GameOver>,
    mut next_state: ResMut<NextState<GameState>>,
    q_player: Query<&HealthPool, With<Player>>,
) {
    if latch.fired || !q_player.iter().any(HealthPool::is_defeated) {
        return;
    }

    latch.fired = true;
    info!("player defeated: game over");
    game_over.write(GameOver);
    next_state.set(GameState::GameOver);
}

#[cfg(test)]
mod tests;
