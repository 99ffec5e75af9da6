//! Global state machine.

use bevy::prelude::*;

/// Level session state.
///
/// `InGame` is the only state in which the encounter runs. Entities scoped with
/// `DespawnOnExit(GameState::InGame)` are cleaned up when the session ends either way.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
    LevelComplete,
    GameOver,
}
