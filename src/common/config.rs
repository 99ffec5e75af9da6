//! Level and score configuration.
//!
//! Both resources deserialize from TOML with every field optional; anything missing falls
//! back to the built-in level. Loading validates numbers and cross references up front so a
//! broken level is rejected before the encounter starts.
//!
//! ```toml
//! name = "asteroid belt"
//! boss = "warden"
//!
//! [timings]
//! initial_delay = 1.0
//!
//! [[templates]]
//! id = "scout"
//! max_health = 1
//! speed = 160.0
//! bounty = 100
//!
//! [[waves]]
//! template = "scout"
//! interval = 1.0
//! count = 5
//! ```

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::error::ConfigurationError;
use crate::common::rng::GameRng;
use crate::plugins::boss::archetype::BossArchetypeId;
use crate::plugins::combat::shield::ShieldSpec;
use crate::plugins::encounter::director::EncounterTimings;
use crate::plugins::enemies::{EnemyFire, EnemyMovement, EnemyTemplate};
use crate::plugins::obstacles::ObstacleField;
use crate::plugins::powerups::PowerUpField;
use crate::plugins::waves::WaveDefinition;

/// Vertical strip on the right edge where enemies and obstacles appear.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpawnLane {
    pub x: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl SpawnLane {
    pub fn sample(&self, rng: &mut GameRng) -> Vec2 {
        Vec2::new(self.x, rng.range(self.y_min, self.y_max))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AreaConfig {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl AreaConfig {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_corners(Vec2::from(self.min), Vec2::from(self.max))
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub rng_seed: u64,
    pub timings: EncounterTimings,
    pub waves: Vec<WaveDefinition>,
    pub templates: Vec<EnemyTemplate>,
    pub obstacles: Option<ObstacleField>,
    /// Item drops; `None` turns them off.
    pub power_ups: Option<PowerUpField>,
    pub boss: Option<BossArchetypeId>,
    pub spawn_lane: SpawnLane,
    pub boss_spawn: [f32; 2],
    /// Where the boss moves and fights.
    pub battle_area: AreaConfig,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            name: "training run".to_owned(),
            rng_seed: 0x5EED_CAFE,
            timings: EncounterTimings::default(),
            waves: vec![
                WaveDefinition::new("scout", 1.0, 5),
                WaveDefinition::new("gunship", 1.5, 4).with_initial_delay(1.0),
                WaveDefinition::new("shielded", 2.0, 3).with_initial_delay(1.0),
            ],
            templates: vec![
                EnemyTemplate {
                    id: "scout".to_owned(),
                    max_health: 1,
                    shield: None,
                    speed: 160.0,
                    fire_interval: None,
                    bullet_speed: 420.0,
                    bounty: 100,
                    movement: EnemyMovement::Drift,
                    fire: EnemyFire::Straight,
                },
                EnemyTemplate {
                    id: "gunship".to_owned(),
                    max_health: 3,
                    shield: None,
                    speed: 110.0,
                    fire_interval: Some(1.5),
                    bullet_speed: 420.0,
                    bounty: 150,
                    movement: EnemyMovement::Drift,
                    fire: EnemyFire::Aimed,
                },
                EnemyTemplate {
                    id: "shielded".to_owned(),
                    max_health: 2,
                    shield: Some(ShieldSpec {
                        max: 2,
                        regen_delay: None,
                    }),
                    speed: 90.0,
                    fire_interval: None,
                    bullet_speed: 420.0,
                    bounty: 200,
                    movement: EnemyMovement::Zigzag {
                        amplitude: 40.0,
                        frequency: 2.0,
                    },
                    fire: EnemyFire::Straight,
                },
            ],
            obstacles: Some(ObstacleField::default()),
            power_ups: Some(PowerUpField::default()),
            boss: Some(BossArchetypeId::Warden),
            spawn_lane: SpawnLane {
                x: 700.0,
                y_min: -300.0,
                y_max: 300.0,
            },
            boss_spawn: [760.0, 0.0],
            battle_area: AreaConfig {
                min: [200.0, -280.0],
                max: [560.0, 280.0],
            },
        }
    }
}

impl LevelConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.timings.validate()?;

        for (i, template) in self.templates.iter().enumerate() {
            template.validate()?;
            if self.templates[..i].iter().any(|t| t.id == template.id) {
                return Err(ConfigurationError::InvalidTemplate {
                    id: template.id.clone(),
                    reason: "duplicate template id".to_owned(),
                });
            }
        }

        for (index, wave) in self.waves.iter().enumerate() {
            wave.validate(index)?;
            if self.template(&wave.template).is_none() {
                return Err(ConfigurationError::UnknownTemplate(wave.template.clone()));
            }
        }

        if let Some(field) = &self.obstacles {
            field.validate()?;
        }
        if let Some(field) = &self.power_ups {
            field.validate()?;
        }

        let lane = &self.spawn_lane;
        if !(lane.x.is_finite() && lane.y_min.is_finite() && lane.y_max.is_finite())
            || lane.y_min > lane.y_max
        {
            return Err(ConfigurationError::InvalidGeometry(
                "spawn lane must be finite with y_min <= y_max".to_owned(),
            ));
        }

        let area = &self.battle_area;
        if !area.min.iter().chain(&area.max).all(|v| v.is_finite())
            || area.min[0] > area.max[0]
            || area.min[1] > area.max[1]
        {
            return Err(ConfigurationError::InvalidGeometry(
                "battle area corners must be finite with min <= max".to_owned(),
            ));
        }
        if !self.boss_spawn.iter().all(|v| v.is_finite()) {
            return Err(ConfigurationError::InvalidGeometry(
                "boss spawn must be finite".to_owned(),
            ));
        }

        Ok(())
    }

    pub fn template(&self, id: &str) -> Option<&EnemyTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    #[inline]
    pub fn boss_spawn(&self) -> Vec2 {
        Vec2::from(self.boss_spawn)
    }

    /// Where an entering boss stops: just inside the right edge of the battle area.
    pub fn boss_entry_point(&self) -> Vec2 {
        let area = self.battle_area.rect();
        Vec2::new(
            area.max.x - 20.0,
            self.boss_spawn[1].clamp(area.min.y, area.max.y),
        )
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub survival_score_per_second: u32,
    pub obstacle_avoid_score: u32,
    pub power_up_score: u32,
    pub level_complete_bonus: u32,
    /// Time bonus at zero seconds; shrinks by `time_bonus_decay` per second.
    pub time_bonus_max: u32,
    pub time_bonus_decay: f32,
    pub combo_bonus_per_kill: u32,
    /// Seconds without a kill before the combo resets.
    pub combo_window: f32,
    pub max_multiplier: u32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            survival_score_per_second: 10,
            obstacle_avoid_score: 5,
            power_up_score: 50,
            level_complete_bonus: 1000,
            time_bonus_max: 1000,
            time_bonus_decay: 10.0,
            combo_bonus_per_kill: 50,
            combo_window: 3.0,
            max_multiplier: 5,
        }
    }
}

impl ScoreConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        Ok(toml::from_str(source)?)
    }
}
