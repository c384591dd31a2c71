//! Arc-following steering law
//!
//! Fits the circular arc through the robot origin (tangent to its heading)
//! and a local target, then commands velocities proportional to the arc
//! length and the subtended angle. Targets behind the robot, or requiring
//! a turn sharper than 90 degrees, produce a rotation in place.

use crate::common::{Point3D, VelocityCommand};

#[derive(Debug, Clone)]
pub struct ArcSteering {
    pub linear_gain: f64,
    pub angular_gain: f64,
}

impl ArcSteering {
    pub fn new(linear_gain: f64, angular_gain: f64) -> Self {
        ArcSteering { linear_gain, angular_gain }
    }

    /// Velocity command towards `target`, given in the robot frame (x forward, y left)
    pub fn compute(&self, target: &Point3D) -> VelocityCommand {
        let (x, y) = (target.x, target.y);

        if x == 0.0 && y == 0.0 {
            return VelocityCommand::zero();
        }

        if x < 0.0 || y.abs() > x {
            // turn in place
            let sign = if y > 0.0 { 1.0 } else { -1.0 };
            return VelocityCommand::new(0.0, sign * self.angular_gain);
        }

        if y == 0.0 {
            // zero curvature
            return VelocityCommand::new(self.linear_gain * x, 0.0);
        }

        let radius = (x * x + y * y) / (2.0 * y);
        let theta = x.atan2(radius.abs() - y.abs()).abs();
        let arc_length = (radius * theta).abs();

        VelocityCommand::new(
            self.linear_gain * arc_length,
            self.angular_gain * y.signum() * theta,
        )
    }
}
