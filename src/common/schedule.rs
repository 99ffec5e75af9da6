//! Fixed-step ordering of the combat/encounter core.
//!
//! ```text
//! FixedPostUpdate (after avian CollisionEventSystems)
//!   Resolve    projectile + contact hits -> Shield -> HealthPool -> Hit/Killed
//!   Lifecycle  Killed -> Dying, despawn bookkeeping
//!   Score      Killed -> ScoreBoard / combo
//!   Boss       boss phase machines (sees defeats resolved this tick)
//!   Encounter  director + wave sequencer (sees kills resolved this tick)
//! ```
//!
//! A kill that empties a wave is therefore recognized in the same tick it happens.

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreSet {
    Resolve,
    Lifecycle,
    Score,
    Boss,
    Encounter,
}
