//! World plugin: playfield bounds and backdrop.
//!
//! Anything tagged `Bounded` that drifts further than `Tunables::playfield_margin` outside the
//! playfield is marked `PendingDespawn`; the combat cleanup then despawns it and reports
//! `EntityDespawned`, so wave bookkeeping sees off-screen exits like any other removal.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::components::PendingDespawn;

/// Visible play area in world pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub bounds: Rect,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            bounds: Rect::new(-640.0, -360.0, 640.0, 360.0),
        }
    }
}

impl Playfield {
    /// True while `p` is within the playfield grown by `margin` on every side.
    #[inline]
    pub fn holds(&self, p: Vec2, margin: f32) -> bool {
        self.bounds.inflate(margin).contains(p)
    }

    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.bounds.min, self.bounds.max)
    }
}

/// Marker: removed once it leaves the playfield.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Bounded;

const STAR_COUNT: usize = 48;

pub fn plugin(app: &mut App) {
    app.init_resource::<Playfield>();
    app.add_systems(OnEnter(GameState::InGame), spawn_backdrop);
    app.add_systems(
        FixedUpdate,
        despawn_out_of_bounds.run_if(in_state(GameState::InGame)),
    );
}

/// Spawn a static star backdrop from plain sprites.
fn spawn_backdrop(mut commands: Commands, playfield: Res<Playfield>) {
    let size = playfield.bounds.size();

    // Golden-ratio spacing gives an even scatter without an RNG draw.
    (0..STAR_COUNT)
        .map(|i| {
            let t = i as f32;
            let x = (t * 0.618_034).fract();
            let y = (t * 0.754_878).fract();
            (i, playfield.bounds.min + Vec2::new(x, y) * size)
        })
        .for_each(|(i, pos)| {
            let shade = if i % 3 == 0 { 0.55 } else { 0.3 };
            commands.spawn((
                Name::new("Star"),
                Sprite::from_color(Color::srgb(shade, shade, shade + 0.1), Vec2::splat(2.0)),
                Transform::from_translation(pos.extend(-1.0)),
                DespawnOnExit(GameState::InGame),
            ));
        });
}

pub fn despawn_out_of_bounds(
    mut commands: Commands,
    tunables: Res<Tunables>,
    playfield: Res<Playfield>,
    q: Query<(Entity, &Transform), (With<Bounded>, Without<PendingDespawn>)>,
) {
    for (e, tf) in &q {
        if !playfield.holds(tf.translation.truncate(), tunables.playfield_margin) {
            commands.entity(e).insert(PendingDespawn);
        }
    }
}
