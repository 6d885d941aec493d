//! Run configuration types and TOML loading.
//!
//! Every field has a default taken from [`crate::consts`], so an empty file
//! (or no file at all) yields the stock 0° ↔ 90° test run. The configuration
//! is built once at startup and handed to the control loop read-only.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pendulum_common::config::{ConfigError, ConfigLoader, PendulumConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = PendulumConfig::load(Path::new("pendulum.toml"))?;
//!     config.validate()?;
//!     println!("segment: {} s", config.motion.segment_duration);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::consts::{
    ACCELERATION, CONTROL_PERIOD_MS, DEFAULT_LOG_PATH, GEARBOX_RATIO, MAX_ANGLE, MAX_CYCLES,
    MAX_SEGMENT_DURATION, MAX_VELOCITY, MIN_ANGLE, MOTOR_TORQUE, PENDULUM_LENGTH, PENDULUM_MASS,
    POSITION_TOLERANCE, SEGMENT_DURATION, TERMINAL_VELOCITY,
};

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for diagnostic output.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, per-tick tracing.
    Trace,
    /// Segment transitions and timing.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Advisories such as the limit warning.
    Warn,
    /// Fatal errors only.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Physical pendulum parameters.
///
/// ```toml
/// [pendulum]
/// mass = 2.0
/// length = 0.3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PendulumParams {
    /// Pendulum mass [kg].
    pub mass: f64,
    /// Arm length [m].
    pub length: f64,
    /// Rated motor torque [N·m] (banner only).
    pub motor_torque: f64,
    /// Gearbox reduction ratio (banner only).
    pub gearbox_ratio: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            mass: PENDULUM_MASS,
            length: PENDULUM_LENGTH,
            motor_torque: MOTOR_TORQUE,
            gearbox_ratio: GEARBOX_RATIO,
        }
    }
}

/// Motion profile parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionParams {
    /// Lower endpoint [deg].
    pub min_angle: f64,
    /// Upper endpoint [deg].
    pub max_angle: f64,
    /// Cruise velocity [deg/s]. Also the actuator rate limit.
    pub max_velocity: f64,
    /// Ramp acceleration [deg/s²].
    pub acceleration: f64,
    /// Planned duration of one segment [s].
    pub segment_duration: f64,
    /// Velocity floor reported once a segment's time is used up [deg/s].
    pub terminal_velocity: f64,
    /// Apply the segment direction sign to the terminal floor.
    pub signed_terminal_velocity: bool,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            min_angle: MIN_ANGLE,
            max_angle: MAX_ANGLE,
            max_velocity: MAX_VELOCITY,
            acceleration: ACCELERATION,
            segment_duration: SEGMENT_DURATION,
            terminal_velocity: TERMINAL_VELOCITY,
            signed_terminal_velocity: false,
        }
    }
}

/// Control loop parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlParams {
    /// Limit switch window around each endpoint [deg].
    pub position_tolerance: f64,
    /// Sleep between ticks [ms].
    pub control_period_ms: u64,
    /// Completed cycles after which the run ends.
    pub max_cycles: u32,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            position_tolerance: POSITION_TOLERANCE,
            control_period_ms: CONTROL_PERIOD_MS,
            max_cycles: MAX_CYCLES,
        }
    }
}

impl ControlParams {
    /// Control period as a [`Duration`].
    pub fn control_period(&self) -> Duration {
        Duration::from_millis(self.control_period_ms)
    }
}

/// Telemetry and console output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingParams {
    /// Telemetry CSV destination.
    pub log_path: PathBuf,
    /// Show the in-place console progress line.
    pub progress: bool,
    /// Base diagnostic verbosity.
    pub log_level: LogLevel,
}

impl Default for LoggingParams {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            progress: true,
            log_level: LogLevel::default(),
        }
    }
}

/// Complete run configuration.
///
/// # TOML Example
///
/// ```toml
/// [motion]
/// segment_duration = 2.0
///
/// [control]
/// max_cycles = 10
///
/// [logging]
/// log_path = "out/run.csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PendulumConfig {
    /// Physical parameters.
    pub pendulum: PendulumParams,
    /// Profile parameters.
    pub motion: MotionParams,
    /// Loop parameters.
    pub control: ControlParams,
    /// Output settings.
    pub logging: LoggingParams,
}

impl PendulumConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pendulum;
        let m = &self.motion;
        let c = &self.control;

        positive("pendulum.mass", p.mass)?;
        positive("pendulum.length", p.length)?;
        positive("motion.max_velocity", m.max_velocity)?;
        positive("motion.acceleration", m.acceleration)?;
        positive("motion.segment_duration", m.segment_duration)?;
        if m.segment_duration > MAX_SEGMENT_DURATION {
            return Err(ConfigError::ValidationError(format!(
                "motion.segment_duration must be at most {MAX_SEGMENT_DURATION} s, got {}",
                m.segment_duration
            )));
        }

        if !(m.min_angle.is_finite() && m.max_angle.is_finite()) || m.min_angle >= m.max_angle {
            return Err(ConfigError::ValidationError(format!(
                "motion.min_angle ({}) must be below motion.max_angle ({})",
                m.min_angle, m.max_angle
            )));
        }
        if m.terminal_velocity.is_nan() || m.terminal_velocity < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "motion.terminal_velocity must be >= 0, got {}",
                m.terminal_velocity
            )));
        }
        if c.position_tolerance.is_nan() || c.position_tolerance < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "control.position_tolerance must be >= 0, got {}",
                c.position_tolerance
            )));
        }
        if c.control_period_ms == 0 {
            return Err(ConfigError::ValidationError(
                "control.control_period_ms must be > 0".to_string(),
            ));
        }
        if c.max_cycles == 0 {
            return Err(ConfigError::ValidationError(
                "control.max_cycles must be > 0".to_string(),
            ));
        }
        if self.logging.log_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.log_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
///
/// Semantic validation is left to the caller.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
