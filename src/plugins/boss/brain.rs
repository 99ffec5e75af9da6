//! Boss phase machine.
//!
//! ```text
//! Entering --reached entry point--> Active --pool defeated--> Dying --defeat_delay--> Gone
//! ```
//!
//! While Active, movement, the attack rotation and the special routine are independent
//! countdowns advanced on every tick; nothing blocks. `begin_dying` drops all of them at once,
//! so no attack can fire after the defeat tick.

use bevy::math::{Rect, Vec2};

use crate::common::rng::GameRng;

use super::archetype::{AttackPattern, BossArchetype, MovementPattern, SpecialRoutine};

/// Distance at which the entry point counts as reached.
pub const ENTRY_EPSILON: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossPhase {
    Entering,
    Active,
    Dying { remaining: f32 },
    Gone,
}

/// What the boss wants its host to do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossAction {
    /// Entry finished; bind UI now.
    BecameActive,
    Fire { origin: Vec2, velocity: Vec2 },
    SetTargetable(bool),
    Teleport(Vec2),
    /// Defeat delay elapsed; report and remove the boss.
    Gone,
}

/// What the brain can see of the world.
#[derive(Debug, Clone, Copy)]
pub struct BossSense {
    pub position: Vec2,
    pub player: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttackRun {
    Idle,
    Volley {
        windup: f32,
        shots_left: u32,
        next_in: f32,
        spacing: f32,
        speed: f32,
    },
    Spiral {
        remaining: f32,
        next_in: f32,
        angle: f32,
        rate: f32,
        step: f32,
        speed: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoutineState {
    Idle { cooldown: f32 },
    DashWindup { remaining: f32 },
    Dashing,
    Fading { remaining: f32 },
    Stealthed { remaining: f32 },
    Lunging { remaining: f32, direction: Vec2 },
}

impl RoutineState {
    #[inline]
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle { .. })
    }
}

#[derive(Debug, Clone)]
pub struct BossBrain {
    archetype: BossArchetype,
    phase: BossPhase,
    entry_point: Vec2,
    area: Rect,
    attack_cooldown: f32,
    next_attack: usize,
    attack: AttackRun,
    routine: RoutineState,
    waypoint: Option<Vec2>,
}

impl BossBrain {
    pub fn new(archetype: BossArchetype, entry_point: Vec2, area: Rect) -> Self {
        Self {
            attack_cooldown: archetype.attack_cooldown,
            routine: idle_routine(archetype.routine),
            archetype,
            phase: BossPhase::Entering,
            entry_point,
            area,
            next_attack: 0,
            attack: AttackRun::Idle,
            waypoint: None,
        }
    }

    #[inline]
    pub fn archetype(&self) -> &BossArchetype {
        &self.archetype
    }

    #[inline]
    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    #[inline]
    pub fn routine(&self) -> RoutineState {
        self.routine
    }

    /// True while any attack or routine timer is pending.
    pub fn has_pending_timers(&self) -> bool {
        self.attack != AttackRun::Idle || self.routine.is_busy()
    }

    /// Enter Dying. Cancels every pending attack and routine. Returns false if already dying.
    pub fn begin_dying(&mut self) -> bool {
        if matches!(self.phase, BossPhase::Dying { .. } | BossPhase::Gone) {
            return false;
        }

        self.phase = BossPhase::Dying {
            remaining: self.archetype.defeat_delay.max(0.0),
        };
        self.attack = AttackRun::Idle;
        self.attack_cooldown = self.archetype.attack_cooldown;
        self.routine = idle_routine(self.archetype.routine);
        self.waypoint = None;
        true
    }

    /// Advance one tick and return the desired velocity.
    pub fn tick(
        &mut self,
        dt: f32,
        sense: BossSense,
        rng: &mut GameRng,
        out: &mut Vec<BossAction>,
    ) -> Vec2 {
        let dt = dt.max(0.0);

        match self.phase {
            BossPhase::Entering => {
                if sense.position.distance(self.entry_point) <= ENTRY_EPSILON {
                    self.phase = BossPhase::Active;
                    out.push(BossAction::BecameActive);
                    return Vec2::ZERO;
                }
                step_toward(sense.position, self.entry_point, self.archetype.entry_speed, dt)
            }
            BossPhase::Active => {
                let velocity = match self.tick_routine(dt, sense, rng, out) {
                    Some(v) => v,
                    None => self.patrol_velocity(dt, sense, rng),
                };
                if !self.routine.is_busy() {
                    self.tick_attacks(dt, sense, out);
                }
                velocity
            }
            BossPhase::Dying { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.phase = BossPhase::Gone;
                    out.push(BossAction::Gone);
                } else {
                    self.phase = BossPhase::Dying { remaining };
                }
                Vec2::ZERO
            }
            BossPhase::Gone => Vec2::ZERO,
        }
    }

    fn patrol_velocity(&mut self, dt: f32, sense: BossSense, rng: &mut GameRng) -> Vec2 {
        let pos = sense.position;
        match self.archetype.movement {
            MovementPattern::Hold => {
                step_toward(pos, self.entry_point, self.archetype.entry_speed, dt)
            }
            MovementPattern::TrackPlayerY { speed } => {
                let target_y = sense
                    .player
                    .map_or(pos.y, |p| p.y)
                    .clamp(self.area.min.y, self.area.max.y);
                Vec2::new(
                    approach(pos.x, self.entry_point.x, self.archetype.entry_speed, dt),
                    approach(pos.y, target_y, speed, dt),
                )
            }
            MovementPattern::Wander {
                speed,
                arrive_radius,
                ..
            } => self.wander_velocity(pos, speed, arrive_radius, dt, rng),
        }
    }

    fn wander_velocity(
        &mut self,
        pos: Vec2,
        speed: f32,
        arrive_radius: f32,
        dt: f32,
        rng: &mut GameRng,
    ) -> Vec2 {
        let area = self.area;
        let mut waypoint = *self.waypoint.get_or_insert_with(|| rng.point_in(area));
        if pos.distance(waypoint) <= arrive_radius {
            waypoint = rng.point_in(area);
            self.waypoint = Some(waypoint);
        }
        step_toward(pos, waypoint, speed, dt)
    }

    /// Returns the velocity override while a routine is steering.
    fn tick_routine(
        &mut self,
        dt: f32,
        sense: BossSense,
        rng: &mut GameRng,
        out: &mut Vec<BossAction>,
    ) -> Option<Vec2> {
        let routine = self.archetype.routine?;
        let pos = sense.position;

        match (routine, self.routine) {
            (_, RoutineState::Idle { cooldown }) => {
                let cooldown = cooldown - dt;
                self.routine = if cooldown > 0.0 {
                    RoutineState::Idle { cooldown }
                } else {
                    match routine {
                        SpecialRoutine::Dash { windup, .. } => {
                            RoutineState::DashWindup { remaining: windup }
                        }
                        SpecialRoutine::Stealth { fade, .. } => {
                            RoutineState::Fading { remaining: fade }
                        }
                    }
                };
                None
            }

            (SpecialRoutine::Dash { .. }, RoutineState::DashWindup { remaining }) => {
                let remaining = remaining - dt;
                self.routine = if remaining > 0.0 {
                    RoutineState::DashWindup { remaining }
                } else {
                    RoutineState::Dashing
                };
                Some(Vec2::ZERO)
            }
            (
                SpecialRoutine::Dash {
                    speed,
                    cooldown,
                    margin,
                    ..
                },
                RoutineState::Dashing,
            ) => {
                if pos.x < self.area.min.x - margin {
                    let y = rng.range(self.area.min.y, self.area.max.y);
                    out.push(BossAction::Teleport(Vec2::new(self.area.max.x + margin, y)));
                    self.routine = RoutineState::Idle { cooldown };
                    return Some(Vec2::ZERO);
                }
                Some(Vec2::new(-speed, 0.0))
            }

            (SpecialRoutine::Stealth { duration, .. }, RoutineState::Fading { remaining }) => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.routine = RoutineState::Fading { remaining };
                } else {
                    self.routine = RoutineState::Stealthed {
                        remaining: duration,
                    };
                    out.push(BossAction::SetTargetable(false));
                }
                None
            }
            (
                SpecialRoutine::Stealth { surprise_dash, .. },
                RoutineState::Stealthed { remaining },
            ) => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.routine = RoutineState::Stealthed { remaining };
                } else {
                    let direction = sense
                        .player
                        .and_then(|p| (p - pos).try_normalize())
                        .unwrap_or(Vec2::NEG_X);
                    self.routine = RoutineState::Lunging {
                        remaining: surprise_dash,
                        direction,
                    };
                    out.push(BossAction::SetTargetable(true));
                }

                let (speed, arrive_radius) = match self.archetype.movement {
                    MovementPattern::Wander {
                        stealth_speed,
                        arrive_radius,
                        ..
                    } => (stealth_speed, arrive_radius),
                    _ => (self.archetype.entry_speed, ENTRY_EPSILON),
                };
                Some(self.wander_velocity(pos, speed, arrive_radius, dt, rng))
            }
            (
                SpecialRoutine::Stealth { cooldown, .. },
                RoutineState::Lunging {
                    remaining,
                    direction,
                },
            ) => {
                let remaining = remaining - dt;
                self.routine = if remaining > 0.0 {
                    RoutineState::Lunging {
                        remaining,
                        direction,
                    }
                } else {
                    RoutineState::Idle { cooldown }
                };
                let lunge_speed = match self.archetype.movement {
                    MovementPattern::Wander { stealth_speed, .. } => stealth_speed * 2.0,
                    _ => self.archetype.entry_speed * 2.0,
                };
                Some(direction * lunge_speed)
            }

            // A routine state that does not belong to this archetype.
            (_, state) => {
                debug_assert!(false, "routine state {state:?} does not match {routine:?}");
                self.routine = idle_routine(Some(routine));
                None
            }
        }
    }

    fn tick_attacks(&mut self, dt: f32, sense: BossSense, out: &mut Vec<BossAction>) {
        let origin = sense.position;

        match self.attack {
            AttackRun::Idle => {
                if self.archetype.attacks.is_empty() {
                    return;
                }
                self.attack_cooldown -= dt;
                if self.attack_cooldown > 0.0 {
                    return;
                }
                self.attack_cooldown = self.archetype.attack_cooldown;

                let pattern = self.archetype.attacks[self.next_attack];
                self.next_attack = (self.next_attack + 1) % self.archetype.attacks.len();
                self.start_attack(pattern, origin, out);
            }
            AttackRun::Volley {
                windup,
                shots_left,
                next_in,
                spacing,
                speed,
            } => {
                let windup = windup - dt;
                if windup > 0.0 {
                    self.attack = AttackRun::Volley {
                        windup,
                        shots_left,
                        next_in,
                        spacing,
                        speed,
                    };
                    return;
                }

                let mut shots_left = shots_left;
                let mut next_in = next_in + windup.min(0.0);
                while shots_left > 0 && next_in <= 0.0 {
                    let aim = sense
                        .player
                        .and_then(|p| (p - origin).try_normalize())
                        .unwrap_or(Vec2::NEG_X);
                    out.push(BossAction::Fire {
                        origin,
                        velocity: aim * speed,
                    });
                    shots_left -= 1;
                    next_in += spacing;
                }

                self.attack = if shots_left == 0 {
                    AttackRun::Idle
                } else {
                    AttackRun::Volley {
                        windup: 0.0,
                        shots_left,
                        next_in,
                        spacing,
                        speed,
                    }
                };
            }
            AttackRun::Spiral {
                remaining,
                next_in,
                angle,
                rate,
                step,
                speed,
            } => {
                let remaining = remaining - dt;
                let mut next_in = next_in - dt;
                let mut angle = angle;
                while next_in <= 0.0 {
                    out.push(BossAction::Fire {
                        origin,
                        velocity: Vec2::from_angle(angle) * speed,
                    });
                    angle += step;
                    next_in += rate;
                }

                self.attack = if remaining > 0.0 {
                    AttackRun::Spiral {
                        remaining,
                        next_in,
                        angle,
                        rate,
                        step,
                        speed,
                    }
                } else {
                    AttackRun::Idle
                };
            }
        }
    }

    fn start_attack(&mut self, pattern: AttackPattern, origin: Vec2, out: &mut Vec<BossAction>) {
        match pattern {
            AttackPattern::Spread {
                count,
                arc_degrees,
                speed,
            } => {
                for angle in spread_angles(count, arc_degrees) {
                    out.push(BossAction::Fire {
                        origin,
                        velocity: Vec2::from_angle(angle) * speed,
                    });
                }
            }
            AttackPattern::AimedVolley {
                count,
                spacing,
                windup,
                speed,
            } => {
                self.attack = AttackRun::Volley {
                    windup,
                    shots_left: count,
                    next_in: 0.0,
                    spacing: spacing.max(f32::EPSILON),
                    speed,
                };
            }
            AttackPattern::Spiral {
                rate,
                step_degrees,
                duration,
                speed,
            } => {
                self.attack = AttackRun::Spiral {
                    remaining: duration,
                    next_in: 0.0,
                    angle: std::f32::consts::PI,
                    rate: rate.max(0.01),
                    step: step_degrees.to_radians(),
                    speed,
                };
            }
        }
    }
}

fn idle_routine(routine: Option<SpecialRoutine>) -> RoutineState {
    let cooldown = match routine {
        Some(SpecialRoutine::Dash { cooldown, .. }) | Some(SpecialRoutine::Stealth { cooldown, .. }) => {
            cooldown
        }
        None => 0.0,
    };
    RoutineState::Idle { cooldown }
}

/// Angles (radians) of a fan of `count` shots centered on -X.
pub fn spread_angles(count: u32, arc_degrees: f32) -> impl Iterator<Item = f32> {
    let arc = arc_degrees.to_radians();
    let step = if count > 1 { arc / (count - 1) as f32 } else { 0.0 };
    let first = std::f32::consts::PI - if count > 1 { arc * 0.5 } else { 0.0 };
    (0..count).map(move |i| first + step * i as f32)
}

/// Velocity that moves `from` toward `to` at `speed` without overshooting within `dt`.
pub fn step_toward(from: Vec2, to: Vec2, speed: f32, dt: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return Vec2::ZERO;
    }
    if dt > 0.0 && distance <= speed * dt {
        return delta / dt;
    }
    delta / distance * speed
}

fn approach(from: f32, to: f32, speed: f32, dt: f32) -> f32 {
    let delta = to - from;
    if delta == 0.0 {
        return 0.0;
    }
    if dt > 0.0 && delta.abs() <= speed * dt {
        return delta / dt;
    }
    delta.signum() * speed
}
