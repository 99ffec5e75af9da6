//! Camera plugin.
//!
//! The playfield scrolls by moving the world past a fixed camera, so the camera only
//! needs to frame `Playfield` once per level.
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera framing the playfield
//! ```

use bevy::camera::ScalingMode;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::world::Playfield;

#[derive(Component)]
pub struct MainCamera;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_camera);
}

fn spawn_camera(mut commands: Commands, playfield: Res<Playfield>) {
    let size = playfield.bounds.size();
    let center = playfield.bounds.center();

    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::AutoMin {
                min_width: size.x,
                min_height: size.y,
            },
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(center.x, center.y, 999.0),
        DespawnOnExit(GameState::InGame),
    ));
}
