//! Motion vocabulary shared by the control loop and its telemetry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Travel direction of the current segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    /// Minimum angle → maximum angle.
    #[default]
    Up,
    /// Maximum angle → minimum angle.
    Down,
}

impl Direction {
    /// The opposite direction.
    #[inline]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// `(start, end)` endpoints of a segment in this direction.
    #[inline]
    pub fn endpoints(self, min_angle: f64, max_angle: f64) -> (f64, f64) {
        match self {
            Self::Up => (min_angle, max_angle),
            Self::Down => (max_angle, min_angle),
        }
    }

    /// Loop state while moving in this direction.
    #[inline]
    pub const fn status(self) -> Status {
        match self {
            Self::Up => Status::MovingUp,
            Self::Down => Status::MovingDown,
        }
    }
}

/// Control loop state, as written to the telemetry `Status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Segment from min to max angle in progress.
    #[serde(rename = "Moving_Up")]
    MovingUp,
    /// Segment from max to min angle in progress.
    #[serde(rename = "Moving_Down")]
    MovingDown,
    /// Final record after the loop has exited.
    #[serde(rename = "Shutdown_Safe")]
    ShutdownSafe,
}

impl Status {
    /// Telemetry label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MovingUp => "Moving_Up",
            Self::MovingDown => "Moving_Down",
            Self::ShutdownSafe => "Shutdown_Safe",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position, velocity and direction of the axis.
///
/// Mutated once per tick by the control loop; read by telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionState {
    /// Actual (simulated) position [deg].
    pub position: f64,
    /// Last commanded profile velocity [deg/s].
    pub velocity: f64,
    /// Direction of the current segment.
    pub direction: Direction,
}

/// Simulated endpoint switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitSwitches {
    /// Within tolerance of the minimum angle.
    pub at_min: bool,
    /// Within tolerance of the maximum angle.
    pub at_max: bool,
}

impl LimitSwitches {
    /// Sample both switches for `position`.
    pub fn read(position: f64, min_angle: f64, max_angle: f64, tolerance: f64) -> Self {
        Self {
            at_min: position <= min_angle + tolerance,
            at_max: position >= max_angle - tolerance,
        }
    }

    /// Whether starting a segment in `direction` would push into a switch
    /// that is already tripped.
    ///
    /// Moving down while at the minimum, or up while at the maximum.
    pub fn blocks(self, direction: Direction) -> bool {
        match direction {
            Direction::Down => self.at_min,
            Direction::Up => self.at_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_flip_round_trip() {
        assert_eq!(Direction::Up.flipped(), Direction::Down);
        assert_eq!(Direction::Up.flipped().flipped(), Direction::Up);
    }

    #[test]
    fn test_direction_endpoints() {
        assert_eq!(Direction::Up.endpoints(0.0, 90.0), (0.0, 90.0));
        assert_eq!(Direction::Down.endpoints(0.0, 90.0), (90.0, 0.0));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(Direction::Up.status().as_str(), "Moving_Up");
        assert_eq!(Direction::Down.status().to_string(), "Moving_Down");
        assert_eq!(Status::ShutdownSafe.as_str(), "Shutdown_Safe");
    }

    #[test]
    fn test_limit_switches_window() {
        let s = LimitSwitches::read(0.4, 0.0, 90.0, 0.5);
        assert!(s.at_min && !s.at_max);

        let s = LimitSwitches::read(89.5, 0.0, 90.0, 0.5);
        assert!(!s.at_min && s.at_max);

        let s = LimitSwitches::read(45.0, 0.0, 90.0, 0.5);
        assert_eq!(s, LimitSwitches::default());
    }

    #[test]
    fn test_limit_switches_block_wrong_side() {
        let at_bottom = LimitSwitches::read(0.0, 0.0, 90.0, 0.5);
        assert!(at_bottom.blocks(Direction::Down));
        assert!(!at_bottom.blocks(Direction::Up));

        let at_top = LimitSwitches::read(90.0, 0.0, 90.0, 0.5);
        assert!(at_top.blocks(Direction::Up));
        assert!(!at_top.blocks(Direction::Down));
    }
}
