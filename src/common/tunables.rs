//! Tunable gameplay constants.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub player_speed: f32,
    /// Speed while the afterburner is lit.
    pub player_boost_speed: f32,
    pub player_max_energy: f32,
    /// Energy per second burned by the afterburner.
    pub boost_energy_drain: f32,
    /// Energy per second recovered while coasting.
    pub energy_regen: f32,
    pub bullet_speed: f32,
    /// Seconds between player shots while fire is held.
    pub fire_interval: f32,
    pub player_bullet_damage: u32,
    /// Angle of the two side shots of a boosted weapon, in degrees.
    pub boosted_spread_degrees: f32,
    pub player_max_health: u32,
    /// Seconds a killed enemy lingers in `Dying` before it is despawned.
    pub death_duration: f32,
    /// Seconds before the same boss may hurt the player again by contact.
    pub contact_cooldown: f32,
    /// Seconds an unconsumed projectile lives before it expires.
    pub projectile_lifetime: f32,
    /// How far outside the playfield a `Bounded` entity may go before it is removed.
    pub playfield_margin: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            player_speed: 420.0,
            player_boost_speed: 720.0,
            player_max_energy: 100.0,
            boost_energy_drain: 20.0,
            energy_regen: 10.0,
            bullet_speed: 900.0,
            fire_interval: 0.2,
            player_bullet_damage: 1,
            boosted_spread_degrees: 15.0,
            player_max_health: 5,
            death_duration: 0.35,
            contact_cooldown: 1.0,
            projectile_lifetime: 8.0,
            playfield_margin: 160.0,
        }
    }
}
