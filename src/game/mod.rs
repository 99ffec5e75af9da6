//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `configure_full`: includes DefaultPlugins (window/render) + game plugins.
//! - `configure_headless`: minimal configuration for integration tests.

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::config::LevelConfig;
use crate::common::state::GameState;
use crate::plugins;

#[cfg(target_os = "windows")]
use bevy::render::{
    settings::{Backends, PowerPreference, WgpuSettings},
    RenderPlugin,
};

const LEVEL_ENV: &str = "SHMUP_LEVEL";

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) {
    let default_plugins = DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Shmup Encounter".into(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    });

    // Windows: force DX12 on a high-performance adapter.
    #[cfg(target_os = "windows")]
    let default_plugins = default_plugins.set(RenderPlugin {
        render_creation: WgpuSettings {
            backends: Some(Backends::DX12),
            power_preference: PowerPreference::HighPerformance,
            ..default()
        }
        .into(),
        ..default()
    });

    app.add_plugins(default_plugins);

    load_level_from_env(app);
    configure_game(app);
    plugins::register_render(app);
}

/// Insert the level named by `SHMUP_LEVEL` (a TOML file), if any.
///
/// A missing or broken file is logged and the built-in level is used instead.
fn load_level_from_env(app: &mut App) {
    let Ok(path) = std::env::var(LEVEL_ENV) else {
        return;
    };

    let loaded = std::fs::read_to_string(&path)
        .map_err(|err| err.to_string())
        .and_then(|source| LevelConfig::from_toml_str(&source).map_err(|err| err.to_string()));

    match loaded {
        Ok(level) => {
            info!("loaded level `{}` from {path}", level.name);
            app.insert_resource(level);
        }
        Err(err) => error!("could not load level from {path}: {err}"),
    }
}

/// Headless configuration for integration tests.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - Do NOT add render-only plugins (camera).
pub fn configure_headless(app: &mut App) {
    configure_game(app);
}

/// Configuration shared by both full and headless apps.
fn configure_game(app: &mut App) {
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}