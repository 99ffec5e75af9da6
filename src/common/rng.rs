//! Seeded randomness.
//!
//! Spawn positions, power-up drops and boss patrol targets draw from one seeded stream so a level
//! replays identically under the same seed.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Resource, Debug, Clone)]
pub struct GameRng(ChaCha8Rng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform sample in `[lo, hi]`. Degenerate ranges return `lo`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.0.gen_range(lo..=hi)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.0)
    }

    pub fn point_in(&mut self, area: Rect) -> Vec2 {
        Vec2::new(
            self.range(area.min.x, area.max.x),
            self.range(area.min.y, area.max.y),
        )
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::seeded(0x5EED_CAFE)
    }
}
