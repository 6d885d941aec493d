//! Time source for the control loop.
//!
//! The loop and the actuator read time only through [`Clock`], so the same
//! code runs against the wall clock or against virtual time.

use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source with a blocking sleep.
pub trait Clock {
    /// Time since the clock's origin.
    fn now(&self) -> Duration;

    /// Block (or advance virtual time) for `period`.
    fn sleep(&mut self, period: Duration);
}

/// Wall clock. Sleeps are plain `thread::sleep`, not drift corrected.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, period: Duration) {
        thread::sleep(period);
    }
}

/// Virtual clock: `sleep` advances time by exactly `period` and returns
/// immediately.
#[derive(Debug, Clone, Default)]
pub struct SimulatedClock {
    now: Duration,
}

impl SimulatedClock {
    /// Start at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward without a loop tick.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, period: Duration) {
        self.now += period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_clock_advances_on_sleep() {
        let mut clock = SimulatedClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.sleep(Duration::from_millis(10));
        clock.sleep(Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::from_millis(20));

        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_millis(1020));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.now();
        clock.sleep(Duration::from_millis(2));
        let b = clock.now();
        assert!(b >= a + Duration::from_millis(2));
    }
}
