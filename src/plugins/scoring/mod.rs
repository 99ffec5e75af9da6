//! Scoring plugin: score board, combo multiplier and high score.
//!
//! ```text
//! FixedUpdate (InGame)             tick_score          survival score, combo decay
//! FixedPostUpdate CoreSet::Score   score_kills         Killed / ObstacleAvoided / PowerUpCollected
//!                                                      -> score, combo
//! FixedPostUpdate CoreSet::Encounter
//!                   award_level_bonus (after run_encounter)  LevelCompleted -> bonus
//! ```
//!
//! Every score addition is multiplied by the current combo multiplier. Only ship kills feed
//! the combo itself. High score lives in memory for the session.

pub mod combo;

use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::config::ScoreConfig;
use crate::common::schedule::CoreSet;
use crate::common::state::GameState;
use crate::plugins::combat::messages::Killed;
use crate::plugins::encounter::{run_encounter, LevelCompleted};
use crate::plugins::obstacles::ObstacleAvoided;
use crate::plugins::powerups::PowerUpCollected;

use combo::ComboState;

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged(pub u64);

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboChanged(pub u32);

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighScoreBeaten(pub u64);

#[derive(Resource, Debug, Clone)]
pub struct ScoreBoard {
    score: u64,
    high_score: u64,
    combo: ComboState,
    /// Seconds of InGame time this level.
    elapsed: f32,
    survival_accumulator: f32,
}

/// Result of one score addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAdded {
    pub gained: u64,
    pub total: u64,
    pub new_high: bool,
}

impl ScoreBoard {
    pub fn new(config: &ScoreConfig) -> Self {
        Self {
            score: 0,
            high_score: 0,
            combo: ComboState::new(config.combo_window, config.max_multiplier),
            elapsed: 0.0,
            survival_accumulator: 0.0,
        }
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    #[inline]
    pub fn combo(&self) -> &ComboState {
        &self.combo
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Add `base * multiplier` to the score.
    pub fn add(&mut self, base: u32) -> ScoreAdded {
        let gained = u64::from(base) * u64::from(self.combo.multiplier());
        self.score = self.score.saturating_add(gained);

        let new_high = self.score > self.high_score;
        if new_high {
            self.high_score = self.score;
        }

        ScoreAdded {
            gained,
            total: self.score,
            new_high,
        }
    }

    /// Score a kill, then count it toward the combo. Returns the addition and whether the
    /// multiplier changed.
    pub fn add_kill(&mut self, base: u32, feeds_combo: bool) -> (ScoreAdded, bool) {
        let added = self.add(base);
        let combo_changed = feeds_combo && self.combo.register_kill(self.elapsed);
        (added, combo_changed)
    }

    /// Advance level time. Returns how many whole survival seconds elapsed and whether the
    /// combo decayed.
    pub fn advance(&mut self, dt: f32) -> (u32, bool) {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        self.survival_accumulator += dt;

        let mut whole = 0;
        while self.survival_accumulator >= 1.0 {
            self.survival_accumulator -= 1.0;
            whole += 1;
        }

        (whole, self.combo.tick(dt))
    }

    pub fn level_bonus(&self, config: &ScoreConfig) -> u32 {
        let time_bonus = (config.time_bonus_max as f32 - config.time_bonus_decay * self.elapsed)
            .max(0.0) as u32;
        let combo_bonus = self.combo.kills().saturating_mul(config.combo_bonus_per_kill);
        config
            .level_complete_bonus
            .saturating_add(time_bonus)
            .saturating_add(combo_bonus)
    }

    /// Start a new level with the current combo settings. The high score survives.
    pub fn reset_level(&mut self, config: &ScoreConfig) {
        self.score = 0;
        self.combo = ComboState::new(config.combo_window, config.max_multiplier);
        self.elapsed = 0.0;
        self.survival_accumulator = 0.0;
    }
}

pub fn plugin(app: &mut App) {
    let config = app
        .world()
        .get_resource::<ScoreConfig>()
        .cloned()
        .unwrap_or_default();

    app.insert_resource(ScoreBoard::new(&config))
        .add_message::<ScoreChanged>()
        .add_message::<ComboChanged>()
        .add_message::<HighScoreBeaten>();

    app.add_systems(OnEnter(GameState::InGame), reset_score);
    app.add_systems(FixedUpdate, tick_score.run_if(in_state(GameState::InGame)));
    app.add_systems(FixedPostUpdate, score_kills.in_set(CoreSet::Score));
    app.add_systems(
        FixedPostUpdate,
        award_level_bonus
            .in_set(CoreSet::Encounter)
            .after(run_encounter),
    );
}

fn publish(
    added: ScoreAdded,
    changed: &mut MessageWriter<ScoreChanged>,
    beaten: &mut MessageWriter<HighScoreBeaten>,
) {
    if added.gained > 0 {
        changed.write(ScoreChanged(added.total));
    }
    if added.new_high {
        beaten.write(HighScoreBeaten(added.total));
    }
}

pub fn reset_score(
    config: Res<ScoreConfig>,
    mut board: ResMut<ScoreBoard>,
    mut changed: MessageWriter<ScoreChanged>,
) {
    board.reset_level(&config);
    changed.write(ScoreChanged(0));
}

pub fn score_kills(
    config: Res<ScoreConfig>,
    mut board: ResMut<ScoreBoard>,
    mut kills: MessageReader<Killed>,
    mut avoided: MessageReader<ObstacleAvoided>,
    mut pickups: MessageReader<PowerUpCollected>,
    mut changed: MessageWriter<ScoreChanged>,
    mut combo: MessageWriter<ComboChanged>,
    mut beaten: MessageWriter<HighScoreBeaten>,
) {
    for kill in kills.read() {
        let Some(bounty) = kill.bounty else {
            continue;
        };

        let (added, combo_changed) = board.add_kill(bounty.score, bounty.feeds_combo());
        debug!(
            "+{} for {:?} {:?} (x{})",
            added.gained,
            bounty.kind,
            kill.entity,
            board.combo().multiplier()
        );
        publish(added, &mut changed, &mut beaten);
        if combo_changed {
            combo.write(ComboChanged(board.combo().multiplier()));
        }
    }

    for _ in avoided.read() {
        let added = board.add(config.obstacle_avoid_score);
        publish(added, &mut changed, &mut beaten);
    }

    for _ in pickups.read() {
        let added = board.add(config.power_up_score);
        publish(added, &mut changed, &mut beaten);
    }
}

pub fn tick_score(
    time: Res<Time>,
    config: Res<ScoreConfig>,
    mut board: ResMut<ScoreBoard>,
    mut changed: MessageWriter<ScoreChanged>,
    mut combo: MessageWriter<ComboChanged>,
    mut beaten: MessageWriter<HighScoreBeaten>,
) {
    let (seconds, decayed) = board.advance(time.delta_secs());

    if decayed {
        debug!("combo decayed");
        combo.write(ComboChanged(board.combo().multiplier()));
    }
    for _ in 0..seconds {
        let added = board.add(config.survival_score_per_second);
        publish(added, &mut changed, &mut beaten);
    }
}

pub fn award_level_bonus(
    config: Res<ScoreConfig>,
    mut board: ResMut<ScoreBoard>,
    mut completed: MessageReader<LevelCompleted>,
    mut changed: MessageWriter<ScoreChanged>,
    mut beaten: MessageWriter<HighScoreBeaten>,
) {
    for _ in completed.read() {
        let bonus = board.level_bonus(&config);
        let added = board.add(bonus);
        info!(
            "level bonus {bonus} (x{}), final score {}",
            board.combo().multiplier(),
            added.total
        );
        publish(added, &mut changed, &mut beaten);
    }
}
