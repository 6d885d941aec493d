//! # Pendulum Control Unit Library
//!
//! Simulated closed-loop motion of a single-axis pendulum cycling between
//! two angular setpoints on a trapezoidal velocity profile, with per-tick
//! telemetry written to CSV.
//!
//! # Module Structure
//!
//! - [`profile`] - Trapezoidal profile generator (pure)
//! - [`actuator`] - Rate-limited simulated actuator
//! - [`clock`] - Wall-clock and virtual time sources
//! - [`cycle`] - Control loop state machine (`CycleRunner`)
//! - [`physics`] - Gravity load torque
//! - [`telemetry`] - CSV record log and run summary
//! - [`report`] - Console banner, progress and summary
//! - [`error`] - `ControlError`
//!
//! # Data Flow
//!
//! ```text
//!   Clock ──► CycleRunner ──► TrapezoidalProfile (target, velocity)
//!                 │
//!                 ├──► SimulatedActuator (position)
//!                 ├──► TelemetryLog (CSV, flushed per tick)
//!                 └──► Console (progress / summary)
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod actuator;
pub mod clock;
pub mod cycle;
pub mod error;
pub mod physics;
pub mod profile;
pub mod report;
pub mod telemetry;

pub use crate::cycle::{CycleRunner, StepOutcome};
pub use crate::error::ControlError;
pub use crate::telemetry::{CycleRecord, RunSummary, TelemetryLog};
