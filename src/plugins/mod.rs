//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod boss;
pub mod combat;
pub mod core;
pub mod encounter;
pub mod enemies;
pub mod obstacles;
pub mod physics;
pub mod player;
pub mod powerups;
pub mod projectiles;
pub mod scoring;
pub mod waves;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    combat::plugin(app);
    app.add_plugins(ProjectilesPlugin);
    player::plugin(app);
    enemies::plugin(app);
    obstacles::plugin(app);
    powerups::plugin(app);
    boss::plugin(app);
    scoring::plugin(app);
    encounter::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
