//! Simulated actuator: a rate-limited position follower.
//!
//! Stands in for the motor drive. Each command moves the simulated position
//! toward the commanded one by at most `max_velocity * dt`, where `dt` is the
//! time since the previous command as read from the loop's clock (actual
//! elapsed time, not the nominal period).

use std::time::Duration;
use tracing::trace;

/// Rate-limited first-order position follower.
#[derive(Debug, Clone)]
pub struct SimulatedActuator {
    /// Rate limit [deg/s].
    max_velocity: f64,
    /// Current simulated position [deg].
    position: f64,
    /// Last commanded position [deg].
    target_position: f64,
    /// Clock reading of the previous command.
    previous_timestamp: Duration,
}

impl SimulatedActuator {
    /// Create a follower resting at `position`.
    ///
    /// `started_at` is the clock reading at controller start; the first
    /// command's `dt` is measured from it.
    pub fn new(max_velocity: f64, position: f64, started_at: Duration) -> Self {
        Self {
            max_velocity,
            position,
            target_position: position,
            previous_timestamp: started_at,
        }
    }

    /// Command a new position at clock time `now` and return the updated
    /// simulated position.
    ///
    /// A `now` earlier than the previous command counts as `dt = 0`.
    pub fn command(&mut self, target: f64, now: Duration) -> f64 {
        let dt = now.saturating_sub(self.previous_timestamp).as_secs_f64();
        let error = target - self.position;
        let max_step = self.max_velocity * dt;

        if error.abs() > max_step {
            self.position += max_step.copysign(error);
        } else {
            self.position = target;
        }

        self.target_position = target;
        self.previous_timestamp = now;

        trace!(
            "actuator: pos={:.3}, target={:.3}, dt={:.4}s",
            self.position,
            target,
            dt
        );
        self.position
    }

    /// Current simulated position [deg].
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Last commanded position [deg].
    #[inline]
    pub fn target_position(&self) -> f64 {
        self.target_position
    }

    /// Clock reading of the previous command.
    #[inline]
    pub fn previous_timestamp(&self) -> Duration {
        self.previous_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let mut act = SimulatedActuator::new(30.0, 12.5, ms(100));
        let pos = act.command(90.0, ms(100));
        assert_eq!(pos, 12.5);
        assert_eq!(act.target_position(), 90.0);
    }

    #[test]
    fn test_first_command_measured_from_start() {
        // 100 ms since controller start at 30 deg/s allows 3 deg.
        let mut act = SimulatedActuator::new(30.0, 0.0, Duration::ZERO);
        let pos = act.command(90.0, ms(100));
        assert!((pos - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_reaches_target_within_step() {
        let mut act = SimulatedActuator::new(30.0, 10.0, Duration::ZERO);
        let pos = act.command(10.2, ms(10));
        assert_eq!(pos, 10.2);
    }

    #[test]
    fn test_rate_limit_in_both_directions() {
        let mut act = SimulatedActuator::new(30.0, 45.0, Duration::ZERO);
        let up = act.command(90.0, ms(10));
        assert!((up - 45.3).abs() < 1e-9);

        let down = act.command(0.0, ms(20));
        assert!((down - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_follows_actual_elapsed_time() {
        // A late tick (25 ms instead of 10 ms) allows a proportionally larger step.
        let mut act = SimulatedActuator::new(30.0, 0.0, Duration::ZERO);
        act.command(90.0, ms(10));
        let pos = act.command(90.0, ms(35));
        assert!((pos - 1.05).abs() < 1e-9);
        assert_eq!(act.previous_timestamp(), ms(35));
    }

    #[test]
    fn test_clock_going_backwards_is_zero_dt() {
        let mut act = SimulatedActuator::new(30.0, 5.0, ms(50));
        assert_eq!(act.command(90.0, ms(20)), 5.0);
    }
}
