//! Bounded integer health with a one-way "defeated" edge.

use bevy::prelude::*;

/// Result of a single health write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthChange {
    pub applied: u32,
    /// True only on the write that moved `current` from > 0 to 0.
    pub defeated_now: bool,
}

/// Invariant: `0 <= current <= max`. The defeated edge fires at most once.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct HealthPool {
    current: u32,
    max: u32,
    defeated: bool,
}

impl HealthPool {
    pub fn new(max: u32) -> Self {
        debug_assert!(max > 0, "a health pool needs at least one point");
        let max = max.max(1);
        Self {
            current: max,
            max,
            defeated: false,
        }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn damage(&mut self, amount: u32) -> HealthChange {
        if self.defeated || amount == 0 {
            return HealthChange::default();
        }

        let applied = amount.min(self.current);
        self.current -= applied;

        let defeated_now = self.current == 0;
        if defeated_now {
            self.defeated = true;
        }

        HealthChange {
            applied,
            defeated_now,
        }
    }

    /// Drain the pool completely (lethal contact). Same one-shot semantics as `damage`.
    pub fn deplete(&mut self) -> HealthChange {
        self.damage(self.current)
    }

    /// Restore up to `max`. A defeated pool stays defeated.
    pub fn heal(&mut self, amount: u32) {
        if self.defeated {
            return;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}
