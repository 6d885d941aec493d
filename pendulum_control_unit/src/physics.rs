//! Gravity load of the pendulum arm. Telemetry only; never fed back into control.

use pendulum_common::config::PendulumParams;
use pendulum_common::consts::GRAVITY;

/// Point mass on a rigid arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumLoad {
    /// Mass [kg].
    pub mass: f64,
    /// Arm length [m].
    pub length: f64,
}

impl PendulumLoad {
    /// Build from the `[pendulum]` configuration section.
    pub fn from_params(params: &PendulumParams) -> Self {
        Self {
            mass: params.mass,
            length: params.length,
        }
    }

    /// Gravity torque at `angle_deg` [N·m]: `m * g * L * sin(angle)`.
    #[inline]
    pub fn torque(&self, angle_deg: f64) -> f64 {
        self.mass * GRAVITY * self.length * angle_deg.to_radians().sin()
    }

    /// Largest torque over the whole swing [N·m].
    #[inline]
    pub fn peak_torque(&self) -> f64 {
        self.mass * GRAVITY * self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torque_at_endpoints() {
        let load = PendulumLoad::from_params(&PendulumParams::default());
        assert!(load.torque(0.0).abs() < 1e-12);
        assert!((load.torque(90.0) - 5.886).abs() < 1e-9);
        assert_eq!(load.peak_torque(), 2.0 * 9.81 * 0.3);
    }

    #[test]
    fn test_torque_at_30_degrees() {
        let load = PendulumLoad {
            mass: 1.0,
            length: 1.0,
        };
        assert!((load.torque(30.0) - 9.81 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_torque_sign_below_horizontal() {
        let load = PendulumLoad {
            mass: 2.0,
            length: 0.3,
        };
        assert!(load.torque(-10.0) < 0.0);
    }
}
