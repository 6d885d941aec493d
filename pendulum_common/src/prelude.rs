//! Prelude module for common re-exports.
//!
//! ```rust
//! use pendulum_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, ControlParams, LogLevel, LoggingParams, MotionParams,
    PendulumConfig, PendulumParams,
};

// ─── Motion ─────────────────────────────────────────────────────────
pub use crate::motion::{Direction, LimitSwitches, MotionState, Status};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{GRAVITY, LOG_HEADER, MAX_ANGLE, MIN_ANGLE};
