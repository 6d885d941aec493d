//! Trapezoidal motion profile with a non-zero terminal velocity.
//!
//! Maps `(start, end, elapsed, total)` to a commanded `(position, velocity)`.
//! The ramp time is `max_velocity / acceleration` on both ends; when the
//! segment is too short for two full ramps the profile degrades to a
//! triangle with `accel = decel = total / 2` and no cruise phase.
//!
//! Once `elapsed` reaches `total` the profile holds `end` and reports the
//! terminal velocity floor instead of zero, so the axis is never commanded
//! to a standstill between segments.
//!
//! Offsets are applied along the sign of `end - start`, so a downward
//! segment mirrors an upward one. The velocity sign follows the direction
//! in every phase; the terminal floor is unsigned unless configured
//! otherwise.

use pendulum_common::config::MotionParams;
use pendulum_common::consts::TERMINAL_VELOCITY;

/// One profile evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSample {
    /// Commanded position [deg].
    pub position: f64,
    /// Commanded velocity [deg/s], signed by direction.
    pub velocity: f64,
}

/// Phase durations of one segment [s].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePhases {
    /// Acceleration ramp.
    pub accel_time: f64,
    /// Constant velocity cruise (0 for a triangular profile).
    pub const_time: f64,
    /// Deceleration ramp.
    pub decel_time: f64,
}

impl ProfilePhases {
    /// `true` when the cruise phase was dropped.
    #[inline]
    pub fn is_triangular(&self) -> bool {
        self.const_time == 0.0
    }
}

/// Stateless trapezoidal profile generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidalProfile {
    max_velocity: f64,
    acceleration: f64,
    terminal_velocity: f64,
    signed_terminal_velocity: bool,
}

impl TrapezoidalProfile {
    /// Create a profile with the default unsigned terminal floor.
    pub fn new(max_velocity: f64, acceleration: f64) -> Self {
        Self {
            max_velocity,
            acceleration,
            terminal_velocity: TERMINAL_VELOCITY,
            signed_terminal_velocity: false,
        }
    }

    /// Build from the `[motion]` configuration section.
    pub fn from_params(params: &MotionParams) -> Self {
        Self::new(params.max_velocity, params.acceleration)
            .with_terminal_velocity(params.terminal_velocity, params.signed_terminal_velocity)
    }

    /// Override the terminal floor and whether it carries the direction sign.
    pub fn with_terminal_velocity(mut self, velocity: f64, signed: bool) -> Self {
        self.terminal_velocity = velocity;
        self.signed_terminal_velocity = signed;
        self
    }

    /// Cruise velocity [deg/s].
    #[inline]
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Ramp acceleration [deg/s²].
    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// Phase durations for a segment lasting `total` seconds.
    pub fn phases(&self, total: f64) -> ProfilePhases {
        let ramp = self.max_velocity / self.acceleration;
        let const_time = total - 2.0 * ramp;

        if const_time < 0.0 {
            let half = total / 2.0;
            ProfilePhases {
                accel_time: half,
                const_time: 0.0,
                decel_time: half,
            }
        } else {
            ProfilePhases {
                accel_time: ramp,
                const_time,
                decel_time: ramp,
            }
        }
    }

    /// Evaluate the profile `elapsed` seconds into a segment of `total` seconds.
    ///
    /// Pure: the caller applies the result.
    pub fn sample(&self, start: f64, end: f64, elapsed: f64, total: f64) -> ProfileSample {
        let phases = self.phases(total);
        let a = self.acceleration;
        let sign = if end < start { -1.0 } else { 1.0 };

        if elapsed <= phases.accel_time {
            let t = elapsed;
            ProfileSample {
                position: start + sign * 0.5 * a * t * t,
                velocity: sign * a * t,
            }
        } else if elapsed <= phases.accel_time + phases.const_time {
            let t = elapsed - phases.accel_time;
            let ramp_distance = 0.5 * a * phases.accel_time * phases.accel_time;
            ProfileSample {
                position: start + sign * (ramp_distance + self.max_velocity * t),
                velocity: sign * self.max_velocity,
            }
        } else if elapsed < total {
            let remaining = total - elapsed;
            ProfileSample {
                position: end - sign * 0.5 * a * remaining * remaining,
                velocity: sign * a * remaining,
            }
        } else {
            let velocity = if self.signed_terminal_velocity {
                sign * self.terminal_velocity
            } else {
                self.terminal_velocity
            };
            ProfileSample {
                position: end,
                velocity,
            }
        }
    }
}
