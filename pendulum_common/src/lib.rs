//! Pendulum Common Library
//!
//! Shared constants, configuration loading and motion types for the
//! pendulum control workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Default run parameters and telemetry header
//! - [`config`] - TOML configuration types, loader and validation
//! - [`motion`] - Direction, loop status, motion state and limit switches
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use pendulum_common::prelude::*;
//!
//! let config = PendulumConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(Direction::Up.status(), Status::MovingUp);
//! ```

pub mod config;
pub mod consts;
pub mod motion;
pub mod prelude;
