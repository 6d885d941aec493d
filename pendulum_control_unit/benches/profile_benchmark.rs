//! Profile and loop tick micro-benchmark.
//!
//! Measures:
//! - `TrapezoidalProfile::sample` across all phases of a segment
//! - One actuator command
//! - One full segment of loop ticks (profile + actuator + CSV record) on virtual time

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::io;
use std::time::Duration;

use pendulum_common::config::PendulumConfig;
use pendulum_control_unit::actuator::SimulatedActuator;
use pendulum_control_unit::clock::{Clock, SimulatedClock};
use pendulum_control_unit::profile::TrapezoidalProfile;
use pendulum_control_unit::report::Console;
use pendulum_control_unit::{CycleRunner, StepOutcome, TelemetryLog};

const PERIOD: Duration = Duration::from_millis(10);

fn bench_profile_sample(c: &mut Criterion) {
    let profile = TrapezoidalProfile::new(30.0, 60.0);
    let mut t = 0.0_f64;

    c.bench_function("profile_sample", |b| {
        b.iter(|| {
            t = if t >= 3.0 { 0.0 } else { t + 0.01 };
            black_box(profile.sample(black_box(0.0), black_box(90.0), t, 3.0))
        })
    });
}

fn bench_actuator_command(c: &mut Criterion) {
    let mut actuator = SimulatedActuator::new(30.0, 0.0, Duration::ZERO);
    let mut now = Duration::ZERO;

    c.bench_function("actuator_command", |b| {
        b.iter(|| {
            now += PERIOD;
            black_box(actuator.command(black_box(45.0), now))
        })
    });
}

fn make_runner() -> CycleRunner<SimulatedClock, io::Sink> {
    let mut config = PendulumConfig::default();
    config.logging.progress = false;
    let telemetry = TelemetryLog::from_writer(io::sink()).unwrap();
    CycleRunner::new(config, SimulatedClock::new(), telemetry)
        .unwrap()
        .with_console(Console::silent())
}

fn bench_segment(c: &mut Criterion) {
    // One 3 s segment at 100 Hz: 301 ticks, fresh runner per batch.
    c.bench_function("segment_301_ticks", |b| {
        b.iter_batched(
            make_runner,
            |mut runner| {
                while runner.step().unwrap() == StepOutcome::Tick {
                    runner.clock_mut().sleep(PERIOD);
                }
                runner
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_profile_sample,
    bench_actuator_command,
    bench_segment
);
criterion_main!(benches);
