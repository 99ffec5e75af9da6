//! Wave sequencer.
//!
//! A wave spawns `count` entities from one template, one every `interval` seconds after an
//! optional `initial_delay`, and remembers every handle it spawned. It is cleared only once
//! the quota is exhausted **and** every spawned entity is gone:
//!
//! ```text
//!   spawned == count  &&  live.is_empty()
//! ```
//!
//! The sequencer is engine-free and generic over the handle type so it can be driven by the
//! encounter glue (`Entity`) or by plain integers in tests. It never despawns anything itself;
//! the owner reports despawns with [`WaveRunState::notify_despawned`].

use bevy::log::warn;
use serde::Deserialize;

use crate::common::error::ConfigurationError;

/// One timed batch of spawns. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaveDefinition {
    /// Enemy template id.
    pub template: String,
    /// Seconds between spawns.
    pub interval: f32,
    pub count: u32,
    /// Seconds to wait after the wave begins before the spawn clock starts.
    #[serde(default)]
    pub initial_delay: f32,
}

impl WaveDefinition {
    pub fn new(template: impl Into<String>, interval: f32, count: u32) -> Self {
        Self {
            template: template.into(),
            interval,
            count,
            initial_delay: 0.0,
        }
    }

    pub fn with_initial_delay(mut self, delay: f32) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn validate(&self, index: usize) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidWave {
            index,
            reason: reason.to_owned(),
        };

        if self.template.is_empty() {
            return Err(invalid("template id is empty"));
        }
        if !self.interval.is_finite() || self.interval < 0.0 {
            return Err(invalid("spawn interval must be a finite number >= 0"));
        }
        if !self.initial_delay.is_finite() || self.initial_delay < 0.0 {
            return Err(invalid("initial delay must be a finite number >= 0"));
        }
        Ok(())
    }
}

/// What a single [`WaveRunState::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaveTick {
    pub spawned: u32,
    pub failed: u32,
}

/// Mutable progress of the wave currently running.
#[derive(Debug, Clone)]
pub struct WaveRunState<H> {
    index: usize,
    template: String,
    interval: f32,
    count: u32,
    delay_remaining: f32,
    spawned: u32,
    /// Accumulated seconds since the last spawn slot.
    timer: f32,
    live: Vec<H>,
}

impl<H: Copy + PartialEq> WaveRunState<H> {
    pub fn begin(index: usize, def: &WaveDefinition) -> Self {
        debug_assert!(def.interval.is_finite() && def.interval >= 0.0);

        Self {
            index,
            template: def.template.clone(),
            interval: def.interval.max(0.0),
            count: def.count,
            delay_remaining: def.initial_delay.max(0.0),
            spawned: 0,
            timer: 0.0,
            live: Vec::new(),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[inline]
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn live(&self) -> &[H] {
        &self.live
    }

    /// Advance the spawn clock and spawn every slot that came due.
    ///
    /// The timer is decremented by `interval` per spawn rather than reset, so long frames
    /// do not drift the cadence. A failed spawn still consumes its slot.
    pub fn tick<F>(&mut self, dt: f32, mut spawn: F) -> WaveTick
    where
        F: FnMut(&str) -> Result<H, ConfigurationError>,
    {
        let mut report = WaveTick::default();
        let mut dt = dt.max(0.0);

        if self.delay_remaining > 0.0 {
            if dt < self.delay_remaining {
                self.delay_remaining -= dt;
                return report;
            }
            dt -= self.delay_remaining;
            self.delay_remaining = 0.0;
        }

        if self.spawned >= self.count {
            return report;
        }

        self.timer += dt;
        while self.spawned < self.count && self.timer >= self.interval {
            self.timer -= self.interval;
            self.spawned += 1;

            match spawn(&self.template) {
                Ok(handle) => {
                    self.live.push(handle);
                    report.spawned += 1;
                }
                Err(err) => {
                    warn!(
                        "wave {}: spawn slot {}/{} skipped: {err}",
                        self.index, self.spawned, self.count
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Forget a handle that left the world. Returns true if this wave owned it.
    pub fn notify_despawned(&mut self, handle: H) -> bool {
        let before = self.live.len();
        self.live.retain(|h| *h != handle);
        self.live.len() != before
    }

    /// Drop every live handle for which `alive` returns false.
    pub fn retain_live(&mut self, mut alive: impl FnMut(H) -> bool) -> usize {
        let before = self.live.len();
        self.live.retain(|h| alive(*h));
        before - self.live.len()
    }

    /// Quota exhausted and board clear.
    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.spawned >= self.count && self.live.is_empty()
    }
}
