//! System-wide constants for the pendulum workspace.
//!
//! Single source of truth for the default run parameters. Every field of
//! [`PendulumConfig`](crate::config::PendulumConfig) defaults to one of these.

use static_assertions::const_assert;

// ─── Pendulum ───────────────────────────────────────────────────────

/// Pendulum mass [kg].
pub const PENDULUM_MASS: f64 = 2.0;

/// Pendulum arm length [m].
pub const PENDULUM_LENGTH: f64 = 0.3;

/// Rated motor torque [N·m]. Informational only.
pub const MOTOR_TORQUE: f64 = 0.3924;

/// Gearbox reduction ratio. Informational only.
pub const GEARBOX_RATIO: f64 = 10.0;

/// Standard gravity [m/s²].
pub const GRAVITY: f64 = 9.81;

// ─── Motion ─────────────────────────────────────────────────────────

/// Horizontal endpoint [deg].
pub const MIN_ANGLE: f64 = 0.0;

/// Vertical endpoint [deg].
pub const MAX_ANGLE: f64 = 90.0;

/// Maximum profile velocity [deg/s].
pub const MAX_VELOCITY: f64 = 30.0;

/// Profile acceleration and deceleration [deg/s²].
pub const ACCELERATION: f64 = 60.0;

/// Planned duration of one segment (0° → 90° or back) [s].
pub const SEGMENT_DURATION: f64 = 3.0;

/// Longest accepted segment duration [s] (one day).
pub const MAX_SEGMENT_DURATION: f64 = 86_400.0;

/// Velocity reported at and after the end of a segment [deg/s].
///
/// Never zero: the pendulum does not stop at the endpoints.
pub const TERMINAL_VELOCITY: f64 = 5.0;

// ─── Control ────────────────────────────────────────────────────────

/// Limit switch window around each endpoint [deg].
pub const POSITION_TOLERANCE: f64 = 0.5;

/// Control loop period [ms] (100 Hz).
pub const CONTROL_PERIOD_MS: u64 = 10;

/// Cycle budget before the run ends on its own.
pub const MAX_CYCLES: u32 = 1000;

// ─── Logging ────────────────────────────────────────────────────────

/// Default telemetry CSV path.
pub const DEFAULT_LOG_PATH: &str = "pendulum_cycle_log.csv";

/// Telemetry CSV header, in column order.
pub const LOG_HEADER: [&str; 9] = [
    "Cycle",
    "Timestamp",
    "Current_Position",
    "Target_Position",
    "Velocity",
    "Load_Torque",
    "Limit_0",
    "Limit_90",
    "Status",
];

const_assert!(CONTROL_PERIOD_MS > 0);
const_assert!(MAX_CYCLES > 0);
