//! Control loop: segment state machine, tick pacing and safe shutdown.
//!
//! ## States
//! `MovingUp` and `MovingDown` (the current [`Direction`]), followed by the
//! post-loop shutdown.
//!
//! ## Tick
//! Each iteration reads the clock and computes `elapsed` since the segment
//! started. While `elapsed <= segment_duration` the profile is sampled, the
//! actuator is commanded and a record is logged, then the loop sleeps one
//! control period. Once `elapsed` exceeds the duration the direction flips,
//! the segment restarts at the current time and the loop continues on the
//! same tick with no sleep.
//!
//! A cycle is one up+down pair: the counter increments when a downward
//! segment completes.
//!
//! ## Exit
//! The running flag and the cycle budget are checked at the top of every
//! iteration; an in-flight tick always completes. On exit the actuator is
//! commanded to the minimum angle, one `Shutdown_Safe` record is logged and
//! the summary is reported.

use pendulum_common::config::{ConfigError, PendulumConfig};
use pendulum_common::motion::{Direction, LimitSwitches, MotionState, Status};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::actuator::SimulatedActuator;
use crate::clock::Clock;
use crate::error::ControlError;
use crate::physics::PendulumLoad;
use crate::profile::TrapezoidalProfile;
use crate::report::Console;
use crate::telemetry::{CycleRecord, RunSummary, TelemetryLog};

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A motion tick was executed and logged.
    Tick,
    /// The segment's time ran out; the direction flipped and nothing was logged.
    SegmentComplete {
        /// Direction of the segment that starts now.
        direction: Direction,
        /// Completed cycles after the flip.
        cycles: u32,
        /// The limit advisory fired.
        limit_warning: bool,
    },
}

/// Loop counters reported at exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoopStats {
    /// Motion ticks executed.
    pub ticks: u64,
    /// Direction reversals.
    pub segments: u64,
    /// Limit advisories raised.
    pub limit_warnings: u64,
    /// Longest interval between two consecutive motion ticks.
    pub max_tick_interval: Duration,
}

/// Owns the loop state and drives profile, actuator and telemetry.
pub struct CycleRunner<C: Clock, W: Write> {
    config: PendulumConfig,
    profile: TrapezoidalProfile,
    actuator: SimulatedActuator,
    load: PendulumLoad,
    clock: C,
    telemetry: TelemetryLog<W>,
    console: Console,
    state: MotionState,
    target_position: f64,
    started_at: Duration,
    segment_start: Duration,
    segment_duration: Duration,
    last_tick: Option<Duration>,
    cycles: u32,
    running: Arc<AtomicBool>,
    stats: LoopStats,
}

impl<C: Clock, W: Write> CycleRunner<C, W> {
    /// Validate `config` and set up a runner resting at the minimum angle,
    /// about to move up.
    ///
    /// The console defaults to stdout; see [`CycleRunner::with_console`].
    pub fn new(
        config: PendulumConfig,
        clock: C,
        telemetry: TelemetryLog<W>,
    ) -> Result<Self, ControlError> {
        config.validate()?;

        let now = clock.now();
        let min_angle = config.motion.min_angle;
        let segment_duration = Duration::try_from_secs_f64(config.motion.segment_duration)
            .map_err(|e| {
                ConfigError::ValidationError(format!(
                    "motion.segment_duration {} is not a valid duration: {e}",
                    config.motion.segment_duration
                ))
            })?;
        let profile = TrapezoidalProfile::from_params(&config.motion);
        let phases = profile.phases(config.motion.segment_duration);

        info!(
            "CycleRunner created: segment={:?}, period={}ms, max_cycles={}, {}",
            segment_duration,
            config.control.control_period_ms,
            config.control.max_cycles,
            if phases.is_triangular() {
                "triangular profile"
            } else {
                "trapezoidal profile"
            }
        );

        Ok(Self {
            actuator: SimulatedActuator::new(config.motion.max_velocity, min_angle, now),
            load: PendulumLoad::from_params(&config.pendulum),
            console: Console::stdout(config.logging.progress),
            profile,
            clock,
            telemetry,
            state: MotionState {
                position: min_angle,
                velocity: 0.0,
                direction: Direction::Up,
            },
            target_position: min_angle,
            started_at: now,
            segment_start: now,
            segment_duration,
            last_tick: None,
            cycles: 0,
            running: Arc::new(AtomicBool::new(true)),
            stats: LoopStats::default(),
            config,
        })
    }

    /// Replace the console.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Shared flag; storing `false` requests a graceful stop.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run until stopped or the cycle budget is used, then shut down safely.
    pub fn run(&mut self) -> Result<RunSummary, ControlError> {
        let config = self.config.clone();
        self.report(|console| console.banner(&config));
        info!("Entering control loop");

        let period = self.config.control.control_period();
        while self.running.load(Ordering::SeqCst) && self.cycles < self.config.control.max_cycles
        {
            match self.step()? {
                StepOutcome::Tick => self.clock.sleep(period),
                StepOutcome::SegmentComplete { .. } => {}
            }
        }

        if !self.running.load(Ordering::SeqCst) {
            info!("Stop requested after {} cycles", self.cycles);
        } else {
            info!("Cycle budget of {} reached", self.cycles);
        }
        self.shutdown()
    }

    /// Execute one loop iteration without sleeping.
    pub fn step(&mut self) -> Result<StepOutcome, ControlError> {
        let now = self.clock.now();
        let elapsed = now.saturating_sub(self.segment_start);

        if elapsed > self.segment_duration {
            return self.complete_segment(now);
        }

        let (start, end) = self
            .state
            .direction
            .endpoints(self.config.motion.min_angle, self.config.motion.max_angle);
        let sample = self.profile.sample(
            start,
            end,
            elapsed.as_secs_f64(),
            self.segment_duration.as_secs_f64(),
        );

        self.target_position = sample.position;
        self.state.velocity = sample.velocity;
        self.state.position = self.actuator.command(sample.position, now);

        let record = self.log(self.state.direction.status(), now)?;
        let (cycles, position, direction) =
            (self.cycles, self.state.position, self.state.direction);
        self.report(|console| {
            console.progress(
                record.timestamp,
                cycles,
                position,
                direction,
                record.load_torque,
            )
        });

        if let Some(prev) = self.last_tick {
            let interval = now.saturating_sub(prev);
            if interval > self.stats.max_tick_interval {
                self.stats.max_tick_interval = interval;
            }
        }
        self.last_tick = Some(now);
        self.stats.ticks += 1;

        trace!(
            "tick: elapsed={:.3}s target={:.3} pos={:.3} vel={:.3}",
            elapsed.as_secs_f64(),
            self.target_position,
            self.state.position,
            self.state.velocity
        );
        Ok(StepOutcome::Tick)
    }

    /// Flip direction, restart the segment clock and run the limit check.
    fn complete_segment(&mut self, now: Duration) -> Result<StepOutcome, ControlError> {
        let finished = self.state.direction;
        let direction = finished.flipped();
        self.state.direction = direction;
        self.segment_start = now;
        self.stats.segments += 1;

        if finished == Direction::Down {
            self.cycles += 1;
            self.report(Console::end_line);
            debug!("Cycle {} complete", self.cycles);
        }

        let switches = LimitSwitches::read(
            self.state.position,
            self.config.motion.min_angle,
            self.config.motion.max_angle,
            self.config.control.position_tolerance,
        );
        let limit_warning = switches.blocks(direction);
        if limit_warning {
            self.stats.limit_warnings += 1;
            warn!(
                "Position limit reached: pos={:.3} before moving {:?}",
                self.state.position, direction
            );
            let position = self.state.position;
            self.report(|console| console.limit_warning(position));
        }

        debug!(
            "Segment complete at pos={:.3}; now {}",
            self.state.position,
            direction.status()
        );
        Ok(StepOutcome::SegmentComplete {
            direction,
            cycles: self.cycles,
            limit_warning,
        })
    }

    /// Command the safe position, log the final record and report.
    fn shutdown(&mut self) -> Result<RunSummary, ControlError> {
        let safe = self.config.motion.min_angle;
        self.report(|console| console.shutting_down(safe));
        info!("Moving to safe position ({safe}°)");

        let now = self.clock.now();
        self.target_position = safe;
        self.state.velocity = 0.0;
        self.state.position = self.actuator.command(safe, now);
        self.log(Status::ShutdownSafe, now)?;

        let summary = self.telemetry.summary(self.cycles, self.state.position);
        self.report(|console| console.summary(&summary));

        info!(
            cycles = summary.cycles_completed,
            data_points = summary.data_points,
            final_position = summary.final_position,
            max_load_torque = summary.max_load_torque,
            avg_load_torque = summary.avg_load_torque,
            "Run summary"
        );
        info!(
            "Loop stats: ticks={}, segments={}, limit_warnings={}, max_tick_interval={:?}",
            self.stats.ticks,
            self.stats.segments,
            self.stats.limit_warnings,
            self.stats.max_tick_interval
        );
        Ok(summary)
    }

    /// Console output never interrupts motion: the first write failure is
    /// logged and the console is silenced for the rest of the run.
    fn report<F>(&mut self, write: F)
    where
        F: FnOnce(&mut Console) -> io::Result<()>,
    {
        if let Err(e) = write(&mut self.console) {
            warn!("Console output failed, disabling it: {e}");
            self.console = Console::silent();
        }
    }

    fn log(&mut self, status: Status, now: Duration) -> Result<CycleRecord, ControlError> {
        let switches = LimitSwitches::read(
            self.state.position,
            self.config.motion.min_angle,
            self.config.motion.max_angle,
            self.config.control.position_tolerance,
        );
        let record = CycleRecord {
            cycle: self.cycles,
            timestamp: now.saturating_sub(self.started_at).as_secs_f64(),
            position: self.state.position,
            target_position: self.target_position,
            velocity: self.state.velocity,
            load_torque: self.load.torque(self.state.position),
            limit_0: switches.at_min,
            limit_90: switches.at_max,
            status,
        };
        self.telemetry.append(record.clone())?;
        Ok(record)
    }

    /// Current motion state.
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Last commanded position [deg].
    pub fn target_position(&self) -> f64 {
        self.target_position
    }

    /// Completed up+down cycles.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Loop counters.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Telemetry log.
    pub fn telemetry(&self) -> &TelemetryLog<W> {
        &self.telemetry
    }

    /// Mutable access to the clock (virtual time in tests).
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Consume the runner, returning the telemetry log.
    pub fn into_telemetry(self) -> TelemetryLog<W> {
        self.telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimulatedClock;

    fn runner(config: PendulumConfig) -> CycleRunner<SimulatedClock, Vec<u8>> {
        let telemetry = TelemetryLog::from_writer(Vec::new()).unwrap();
        CycleRunner::new(config, SimulatedClock::new(), telemetry)
            .unwrap()
            .with_console(Console::silent())
    }

    /// Tick and sleep until the current segment completes.
    fn finish_segment(r: &mut CycleRunner<SimulatedClock, Vec<u8>>) -> StepOutcome {
        let period = r.config.control.control_period();
        loop {
            match r.step().unwrap() {
                StepOutcome::Tick => r.clock_mut().sleep(period),
                other => return other,
            }
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PendulumConfig::default();
        config.control.max_cycles = 0;
        let telemetry = TelemetryLog::from_writer(Vec::new()).unwrap();
        let result = CycleRunner::new(config, SimulatedClock::new(), telemetry);
        assert!(matches!(result, Err(ControlError::Config(_))));
    }

    #[test]
    fn test_unrepresentable_segment_duration_rejected() {
        let mut config = PendulumConfig::default();
        config.motion.segment_duration = 1e20;
        let telemetry = TelemetryLog::from_writer(Vec::new()).unwrap();
        let result = CycleRunner::new(config, SimulatedClock::new(), telemetry);
        assert!(matches!(result, Err(ControlError::Config(_))));
    }

    #[test]
    fn test_first_tick_logs_start_position() {
        let mut r = runner(PendulumConfig::default());
        assert_eq!(r.step().unwrap(), StepOutcome::Tick);

        let rec = r.telemetry().last().unwrap();
        assert_eq!(rec.status, Status::MovingUp);
        assert_eq!(rec.position, 0.0);
        assert_eq!(rec.target_position, 0.0);
        assert_eq!(rec.velocity, 0.0);
        assert!(rec.limit_0);
        assert!(!rec.limit_90);
    }

    #[test]
    fn test_flip_without_sleep_or_record() {
        let mut r = runner(PendulumConfig::default());

        let outcome = finish_segment(&mut r);
        assert_eq!(
            outcome,
            StepOutcome::SegmentComplete {
                direction: Direction::Down,
                cycles: 0,
                limit_warning: false,
            }
        );
        // Ticks at 0.00 ..= 3.00 s; the flip itself logs nothing.
        assert_eq!(r.telemetry().len(), 301);
        assert_eq!(r.telemetry().last().unwrap().target_position, 90.0);

        // Same clock reading: the new segment starts at elapsed = 0.
        assert_eq!(r.step().unwrap(), StepOutcome::Tick);
        let rec = r.telemetry().last().unwrap();
        assert_eq!(rec.status, Status::MovingDown);
        assert_eq!(rec.target_position, 90.0);
        assert!((rec.timestamp - 3.01).abs() < 1e-9);
    }

    #[test]
    fn test_cycle_counts_after_down_segment() {
        let mut r = runner(PendulumConfig::default());

        finish_segment(&mut r);
        assert_eq!(r.cycles(), 0);

        let outcome = finish_segment(&mut r);
        assert!(matches!(
            outcome,
            StepOutcome::SegmentComplete {
                direction: Direction::Up,
                cycles: 1,
                ..
            }
        ));
        assert_eq!(r.cycles(), 1);
        assert_eq!(r.stats().segments, 2);
        assert_eq!(r.stats().max_tick_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_limit_warning_when_still_at_bottom() {
        // A crawling actuator cannot leave the bottom switch window within
        // one segment, so reversing downward trips the advisory.
        let mut config = PendulumConfig::default();
        config.motion.max_velocity = 0.01;
        let mut r = runner(config);

        let outcome = finish_segment(&mut r);
        assert!(matches!(
            outcome,
            StepOutcome::SegmentComplete {
                direction: Direction::Down,
                limit_warning: true,
                ..
            }
        ));
        assert_eq!(r.stats().limit_warnings, 1);
    }

    #[test]
    fn test_stop_before_first_tick() {
        let mut r = runner(PendulumConfig::default());
        r.running_flag().store(false, Ordering::SeqCst);

        let summary = r.run().unwrap();
        assert_eq!(summary.data_points, 1);
        assert_eq!(summary.cycles_completed, 0);
        assert_eq!(r.telemetry().last().unwrap().status, Status::ShutdownSafe);
    }
}
