//! Encounter director state machine.
//!
//! ```text
//! AwaitingStart --initial_delay--> RunningWave(0)
//! RunningWave(i) --wave cleared--> WaveIntermission
//! WaveIntermission --inter_wave_delay--> RunningWave(i+1)      (i+1 < waves)
//! WaveIntermission ------------------> AllWavesCleared         (i+1 == waves)
//! AllWavesCleared --all_clear_grace--> BossWarning
//! BossWarning --boss_warning--> BossActive                     (one-time boss spawn)
//! BossActive --boss defeated--> BossDefeated
//! BossDefeated --level_complete_delay--> LevelComplete         (fires once)
//! ```
//!
//! Every wait is a countdown advanced by `tick`. The director owns the running wave and the
//! boss slot; both are written only from here.

use bevy::log::{info, warn};
use serde::Deserialize;

use crate::common::error::ConfigurationError;
use crate::plugins::waves::{WaveDefinition, WaveRunState};

/// Seconds spent in each timed director state.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EncounterTimings {
    pub initial_delay: f32,
    pub inter_wave_delay: f32,
    /// Lets stragglers finish dying before the boss warning.
    pub all_clear_grace: f32,
    pub boss_warning: f32,
    pub level_complete_delay: f32,
}

impl Default for EncounterTimings {
    fn default() -> Self {
        Self {
            initial_delay: 3.0,
            inter_wave_delay: 2.0,
            all_clear_grace: 3.0,
            boss_warning: 2.0,
            level_complete_delay: 3.0,
        }
    }
}

impl EncounterTimings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let all = [
            self.initial_delay,
            self.inter_wave_delay,
            self.all_clear_grace,
            self.boss_warning,
            self.level_complete_delay,
        ];
        if all.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(ConfigurationError::InvalidTimings(
                "every delay must be a finite number >= 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterDirectorState {
    AwaitingStart,
    RunningWave(usize),
    WaveIntermission,
    AllWavesCleared,
    BossWarning,
    BossActive,
    BossDefeated,
    LevelComplete,
}

/// Milestones reported by [`EncounterDirector::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncounterEvent {
    WaveStarted(usize),
    WaveCleared(usize),
    AllWavesCleared,
    BossWarning { duration: f32 },
    BossSpawned,
    /// No boss could be spawned; the fight is skipped.
    BossSkipped,
    BossDefeated,
    LevelComplete,
}

/// Side effects the director needs from its host.
pub trait EncounterHost<H> {
    fn spawn_enemy(&mut self, template: &str) -> Result<H, ConfigurationError>;
    fn spawn_boss(&mut self) -> Result<H, ConfigurationError>;
}

#[derive(Debug, Clone)]
pub struct EncounterDirector<H> {
    state: EncounterDirectorState,
    /// Remaining seconds of the current timed state.
    countdown: f32,
    timings: EncounterTimings,
    waves: Vec<WaveDefinition>,
    wave: Option<WaveRunState<H>>,
    /// Index of the last wave that ran.
    last_wave: usize,
    boss: Option<H>,
    boss_spawned: bool,
    boss_down: bool,
    level_complete_fired: bool,
}

impl<H: Copy + PartialEq + std::fmt::Debug> EncounterDirector<H> {
    pub fn new(timings: EncounterTimings, waves: Vec<WaveDefinition>) -> Self {
        Self {
            state: EncounterDirectorState::AwaitingStart,
            countdown: timings.initial_delay.max(0.0),
            timings,
            waves,
            wave: None,
            last_wave: 0,
            boss: None,
            boss_spawned: false,
            boss_down: false,
            level_complete_fired: false,
        }
    }

    #[inline]
    pub fn state(&self) -> EncounterDirectorState {
        self.state
    }

    #[inline]
    pub fn wave(&self) -> Option<&WaveRunState<H>> {
        self.wave.as_ref()
    }

    #[inline]
    pub fn boss(&self) -> Option<H> {
        self.boss
    }

    #[inline]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// An entity left the world. Forwarded to the running wave.
    pub fn notify_despawned(&mut self, handle: H) {
        if let Some(wave) = self.wave.as_mut() {
            wave.notify_despawned(handle);
        }
    }

    /// Drop live handles (wave entities and the boss) that no longer exist.
    ///
    /// A boss that vanished without a defeat report counts as defeated so the level can end.
    pub fn retain_live(&mut self, mut alive: impl FnMut(H) -> bool) {
        if let Some(wave) = self.wave.as_mut() {
            let pruned = wave.retain_live(&mut alive);
            if pruned > 0 {
                warn!("wave {}: pruned {pruned} stale handle(s)", wave.index());
            }
        }

        if let Some(boss) = self.boss {
            if !self.boss_down && !alive(boss) {
                warn!("boss {boss:?} vanished without a defeat report");
                self.boss_down = true;
            }
        }
    }

    /// The bound boss finished its defeat sequence.
    pub fn notify_boss_defeated(&mut self, handle: H) {
        if self.boss == Some(handle) {
            self.boss_down = true;
        }
    }

    pub fn tick(&mut self, dt: f32, host: &mut impl EncounterHost<H>, out: &mut Vec<EncounterEvent>) {
        let dt = dt.max(0.0);

        match self.state {
            EncounterDirectorState::AwaitingStart => {
                if self.count_down(dt) {
                    self.start_wave_or_finish(0, out);
                }
            }
            EncounterDirectorState::RunningWave(index) => {
                let Some(wave) = self.wave.as_mut() else {
                    debug_assert!(false, "RunningWave without a wave");
                    self.state = EncounterDirectorState::WaveIntermission;
                    return;
                };

                wave.tick(dt, |template| host.spawn_enemy(template));

                if wave.is_cleared() {
                    info!("wave {index} cleared");
                    self.wave = None;
                    self.state = EncounterDirectorState::WaveIntermission;
                    self.countdown = self.timings.inter_wave_delay;
                    out.push(EncounterEvent::WaveCleared(index));

                    // No intermission after the final wave.
                    if index + 1 >= self.waves.len() {
                        self.enter_all_cleared(out);
                    }
                }
            }
            EncounterDirectorState::WaveIntermission => {
                if self.count_down(dt) {
                    self.start_wave_or_finish(self.last_wave + 1, out);
                }
            }
            EncounterDirectorState::AllWavesCleared => {
                if self.count_down(dt) {
                    info!("boss warning");
                    self.state = EncounterDirectorState::BossWarning;
                    self.countdown = self.timings.boss_warning;
                    out.push(EncounterEvent::BossWarning {
                        duration: self.timings.boss_warning,
                    });
                }
            }
            EncounterDirectorState::BossWarning => {
                if self.count_down(dt) {
                    self.engage_boss(host, out);
                }
            }
            EncounterDirectorState::BossActive => {
                if self.boss_down {
                    self.enter_boss_defeated(out);
                }
            }
            EncounterDirectorState::BossDefeated => {
                if self.count_down(dt) {
                    self.finish_level(out);
                }
            }
            EncounterDirectorState::LevelComplete => {}
        }
    }

    /// Decrement the current countdown. True once it has elapsed.
    fn count_down(&mut self, dt: f32) -> bool {
        self.countdown -= dt;
        self.countdown <= 0.0
    }

    fn start_wave_or_finish(&mut self, index: usize, out: &mut Vec<EncounterEvent>) {
        let Some(def) = self.waves.get(index) else {
            self.enter_all_cleared(out);
            return;
        };

        info!(
            "wave {index} started: {} x `{}` every {}s",
            def.count, def.template, def.interval
        );
        self.wave = Some(WaveRunState::begin(index, def));
        self.last_wave = index;
        self.state = EncounterDirectorState::RunningWave(index);
        out.push(EncounterEvent::WaveStarted(index));
    }

    fn enter_all_cleared(&mut self, out: &mut Vec<EncounterEvent>) {
        info!("all waves cleared");
        self.state = EncounterDirectorState::AllWavesCleared;
        self.countdown = self.timings.all_clear_grace;
        out.push(EncounterEvent::AllWavesCleared);
    }

    fn engage_boss(&mut self, host: &mut impl EncounterHost<H>, out: &mut Vec<EncounterEvent>) {
        self.state = EncounterDirectorState::BossActive;

        if self.boss_spawned {
            debug_assert!(false, "boss spawn requested twice");
            return;
        }
        self.boss_spawned = true;

        match host.spawn_boss() {
            Ok(boss) => {
                info!("boss spawned: {boss:?}");
                self.boss = Some(boss);
                out.push(EncounterEvent::BossSpawned);
            }
            Err(err) => {
                warn!("boss fight skipped: {err}");
                out.push(EncounterEvent::BossSkipped);
                self.enter_boss_defeated(out);
            }
        }
    }

    fn enter_boss_defeated(&mut self, out: &mut Vec<EncounterEvent>) {
        info!("boss defeated");
        self.state = EncounterDirectorState::BossDefeated;
        self.countdown = self.timings.level_complete_delay;
        out.push(EncounterEvent::BossDefeated);
    }

    fn finish_level(&mut self, out: &mut Vec<EncounterEvent>) {
        self.state = EncounterDirectorState::LevelComplete;
        if self.level_complete_fired {
            return;
        }
        self.level_complete_fired = true;
        info!("level complete");
        out.push(EncounterEvent::LevelComplete);
    }
}
