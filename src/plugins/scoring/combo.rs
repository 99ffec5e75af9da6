//! Kill combo with a decay window.

/// Kills needed per multiplier step.
pub const KILLS_PER_STEP: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ComboState {
    multiplier: u32,
    kills: u32,
    last_kill_at: Option<f32>,
    /// Seconds left before the combo decays. `None` while no combo is running.
    watchdog: Option<f32>,
    window: f32,
    max_multiplier: u32,
}

impl ComboState {
    pub fn new(window: f32, max_multiplier: u32) -> Self {
        Self {
            multiplier: 1,
            kills: 0,
            last_kill_at: None,
            watchdog: None,
            window: window.max(0.0),
            max_multiplier: max_multiplier.max(1),
        }
    }

    #[inline]
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    #[inline]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    #[inline]
    pub fn last_kill_at(&self) -> Option<f32> {
        self.last_kill_at
    }

    /// Count a kill at time `now` and restart the decay window.
    /// Returns true if the multiplier changed.
    pub fn register_kill(&mut self, now: f32) -> bool {
        let before = self.multiplier;
        self.kills = self.kills.saturating_add(1);
        self.multiplier = (1 + self.kills / KILLS_PER_STEP).clamp(1, self.max_multiplier);
        self.last_kill_at = Some(now);
        self.watchdog = Some(self.window);
        self.multiplier != before
    }

    /// Advance the decay window. Returns true if the multiplier changed because the combo decayed.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.watchdog.as_mut() else {
            return false;
        };
        *remaining -= dt.max(0.0);
        if *remaining > 0.0 {
            return false;
        }

        let before = self.multiplier;
        self.reset();
        before != 1
    }

    pub fn reset(&mut self) {
        self.kills = 0;
        self.multiplier = 1;
        self.watchdog = None;
    }
}
