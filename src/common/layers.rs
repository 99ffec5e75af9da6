//! Collision layers.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    Player,
    Enemy,
    Boss,
    Obstacle,
    PlayerBullet,
    EnemyBullet,
    PowerUp,
}

/// Layers for an entity that should no longer interact with anything.
///
/// Membership is kept, filters are cleared. Used for corpses and stealthed bosses
/// so that no new contacts are generated without structural changes.
#[inline]
pub fn non_interacting(membership: impl Into<LayerMask>) -> CollisionLayers {
    CollisionLayers::new(membership, [] as [Layer; 0])
}

#[inline]
pub fn player_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Player,
        [
            Layer::Enemy,
            Layer::Boss,
            Layer::Obstacle,
            Layer::EnemyBullet,
            Layer::PowerUp,
        ],
    )
}

#[inline]
pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::Player, Layer::PlayerBullet])
}

#[inline]
pub fn boss_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Boss, [Layer::Player, Layer::PlayerBullet])
}

#[inline]
pub fn obstacle_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Obstacle,
        [Layer::Player, Layer::PlayerBullet, Layer::EnemyBullet],
    )
}

#[inline]
pub fn player_bullet_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::PlayerBullet,
        [Layer::Enemy, Layer::Boss, Layer::Obstacle],
    )
}

#[inline]
pub fn enemy_bullet_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::EnemyBullet,
        [Layer::Player, Layer::Obstacle],
    )
}

/// Pickups only ever touch the player.
#[inline]
pub fn power_up_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PowerUp, [Layer::Player])
}
