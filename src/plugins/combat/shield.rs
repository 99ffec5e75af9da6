//! Damage buffer layered in front of a `HealthPool`.
//!
//! Absorption only happens while `Active`. A depleted shield is pass-through
//! (absorbs 0), it does not block or deflect anything.

use bevy::prelude::*;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShieldState {
    Active,
    /// Counting down to a full recharge.
    Regenerating { remaining: f32 },
    /// Non-regenerating shield that has been used up.
    Broken,
}

/// Shield parameters as they appear in level/archetype data.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ShieldSpec {
    pub max: u32,
    /// `None` means the shield breaks for good when depleted.
    #[serde(default)]
    pub regen_delay: Option<f32>,
}

impl ShieldSpec {
    pub fn build(&self) -> Shield {
        match self.regen_delay {
            Some(delay) => Shield::regenerating(self.max, delay),
            None => Shield::breakable(self.max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShieldAbsorb {
    pub absorbed: u32,
    pub remainder: u32,
    /// True when this strike took the shield from > 0 to 0.
    pub depleted: bool,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Shield {
    current: u32,
    max: u32,
    regen_delay: Option<f32>,
    state: ShieldState,
}

impl Shield {
    pub fn regenerating(max: u32, regen_delay: f32) -> Self {
        Self {
            current: max,
            max,
            regen_delay: Some(regen_delay.max(0.0)),
            state: ShieldState::Active,
        }
    }

    pub fn breakable(max: u32) -> Self {
        Self {
            current: max,
            max,
            regen_delay: None,
            state: ShieldState::Active,
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
    pub fn state(&self) -> ShieldState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, ShieldState::Active) && self.current > 0
    }

    pub fn absorb(&mut self, amount: u32) -> ShieldAbsorb {
        if !self.is_active() {
            return ShieldAbsorb {
                absorbed: 0,
                remainder: amount,
                depleted: false,
            };
        }

        let absorbed = amount.min(self.current);
        self.current -= absorbed;

        let depleted = self.current == 0;
        if depleted {
            self.state = match self.regen_delay {
                Some(delay) => ShieldState::Regenerating { remaining: delay },
                None => ShieldState::Broken,
            };
        }

        ShieldAbsorb {
            absorbed,
            remainder: amount - absorbed,
            depleted,
        }
    }

    /// Advance the regen countdown. Returns true on the tick the shield comes back.
    pub fn tick(&mut self, dt: f32) -> bool {
        let ShieldState::Regenerating { remaining } = &mut self.state else {
            return false;
        };

        *remaining -= dt.max(0.0);
        if *remaining > 0.0 {
            return false;
        }

        self.current = self.max;
        self.state = ShieldState::Active;
        true
    }
}
