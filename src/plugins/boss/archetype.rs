//! Boss archetype descriptors.
//!
//! Every boss runs the same phase machine ([`super::brain::BossBrain`]); archetypes only differ
//! in the data below. Distances are world pixels, durations seconds.

use serde::Deserialize;

use crate::plugins::combat::components::ContactKind;
use crate::plugins::combat::shield::ShieldSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossArchetypeId {
    Dasher,
    Stalker,
    Warden,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementPattern {
    /// Stay at the entry point.
    Hold,
    /// Follow the player's height, clamped to the battle area.
    TrackPlayerY { speed: f32 },
    /// Drift between random waypoints inside the battle area.
    Wander {
        speed: f32,
        stealth_speed: f32,
        arrive_radius: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackPattern {
    /// `count` shots at the player, `spacing` apart, after a `windup`.
    AimedVolley {
        count: u32,
        spacing: f32,
        windup: f32,
        speed: f32,
    },
    /// One fan of `count` shots centered on the -X axis.
    Spread {
        count: u32,
        arc_degrees: f32,
        speed: f32,
    },
    /// One shot every `rate` seconds for `duration`, rotating by `step_degrees`.
    Spiral {
        rate: f32,
        step_degrees: f32,
        duration: f32,
        speed: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialRoutine {
    /// Wind up, then charge left through the battle area and reappear on the right.
    Dash {
        windup: f32,
        speed: f32,
        cooldown: f32,
        /// How far past the area edge the charge goes before wrapping around.
        margin: f32,
    },
    /// Fade out, move unseen and untargetable, then lunge at the player.
    Stealth {
        fade: f32,
        duration: f32,
        surprise_dash: f32,
        cooldown: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossArchetype {
    pub id: BossArchetypeId,
    pub name: &'static str,
    pub max_health: u32,
    pub shield: Option<ShieldSpec>,
    pub entry_speed: f32,
    pub movement: MovementPattern,
    /// Patterns fired in rotation, one per `attack_cooldown`.
    pub attacks: Vec<AttackPattern>,
    pub attack_cooldown: f32,
    pub routine: Option<SpecialRoutine>,
    /// Seconds between defeat and removal.
    pub defeat_delay: f32,
    pub bounty: u32,
    pub contact: ContactKind,
}

impl BossArchetypeId {
    pub fn archetype(self) -> BossArchetype {
        match self {
            Self::Dasher => BossArchetype {
                id: self,
                name: "Dasher",
                max_health: 50,
                shield: None,
                entry_speed: 180.0,
                movement: MovementPattern::TrackPlayerY { speed: 180.0 },
                attacks: Vec::new(),
                attack_cooldown: 0.0,
                routine: Some(SpecialRoutine::Dash {
                    windup: 1.0,
                    speed: 600.0,
                    cooldown: 5.0,
                    margin: 40.0,
                }),
                defeat_delay: 0.5,
                bounty: 500,
                contact: ContactKind::Lethal,
            },
            Self::Stalker => BossArchetype {
                id: self,
                name: "Stalker",
                max_health: 75,
                shield: None,
                entry_speed: 180.0,
                movement: MovementPattern::Wander {
                    speed: 120.0,
                    stealth_speed: 240.0,
                    arrive_radius: 30.0,
                },
                attacks: vec![AttackPattern::AimedVolley {
                    count: 5,
                    spacing: 0.15,
                    windup: 0.3,
                    speed: 480.0,
                }],
                attack_cooldown: 6.0,
                routine: Some(SpecialRoutine::Stealth {
                    fade: 0.5,
                    duration: 3.0,
                    surprise_dash: 0.8,
                    cooldown: 8.0,
                }),
                defeat_delay: 1.0,
                bounty: 500,
                contact: ContactKind::Amount(1),
            },
            Self::Warden => BossArchetype {
                id: self,
                name: "Warden",
                max_health: 20,
                shield: Some(ShieldSpec {
                    max: 5,
                    regen_delay: Some(5.0),
                }),
                entry_speed: 180.0,
                movement: MovementPattern::Hold,
                attacks: vec![
                    AttackPattern::Spread {
                        count: 5,
                        arc_degrees: 40.0,
                        speed: 600.0,
                    },
                    AttackPattern::Spiral {
                        rate: 0.1,
                        step_degrees: 10.0,
                        duration: 4.0,
                        speed: 360.0,
                    },
                ],
                attack_cooldown: 3.0,
                routine: None,
                defeat_delay: 0.0,
                bounty: 500,
                contact: ContactKind::Amount(1),
            },
        }
    }
}
