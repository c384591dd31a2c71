//! Goal-tracking motion controller
//!
//! A three-state machine driven by a periodic tick:
//!
//! - `RegulatingPosition`: follow local targets with the arc steering law
//!   until the position error drops to the goal-reached threshold.
//! - `RegulatingOrientation`: rotate in place until the yaw error is within
//!   tolerance. Position regulation resumes only if the position error
//!   exceeds twice the threshold (hysteresis band).
//! - `GoalReached`: emit zero velocity and stop ticking until a new goal
//!   restarts the machine.

use std::fmt;

use nalgebra::Vector3;

use crate::common::{Goal, NavResult, Point3D, Pose3D, VelocityCommand};
use crate::path_tracking::ArcSteering;

/// Yaw error below which the goal orientation counts as reached [rad]
pub const ORIENTATION_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    RegulatingPosition,
    RegulatingOrientation,
    GoalReached,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerState::RegulatingPosition => "REGULATING POSITION",
            ControllerState::RegulatingOrientation => "REGULATING ORIENTATION",
            ControllerState::GoalReached => "REACHED GOAL",
        };
        write!(f, "{}", name)
    }
}

/// Position and orientation error of the robot with respect to the goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingErrors {
    pub position: f64,
    pub orientation: f64,
}

impl TrackingErrors {
    pub fn compute(pose: &Pose3D, goal: &Goal) -> Self {
        TrackingErrors {
            position: position_error(pose, goal),
            orientation: orientation_error(pose, goal),
        }
    }
}

/// Euclidean distance between the robot and the goal
pub fn position_error(pose: &Pose3D, goal: &Goal) -> f64 {
    pose.position.distance(&goal.position)
}

/// Signed yaw component of the quaternion error between goal and robot
///
/// `eo = ne * ed - nd * ee - ed x ee` (Siciliano et al., eq. 3.88), where
/// `n` and `e` are the scalar and vector parts of the desired (d) and
/// current (e) orientations. Position-only goals yield zero.
pub fn orientation_error(pose: &Pose3D, goal: &Goal) -> f64 {
    if !goal.has_orientation() {
        return 0.0;
    }
    let nd = goal.orientation.scalar();
    let ne = pose.orientation.scalar();
    let ed: Vector3<f64> = goal.orientation.imag();
    let ee: Vector3<f64> = pose.orientation.imag();
    let eo = ed * ne - ee * nd - ed.cross(&ee);
    eo.z
}

#[derive(Debug, Clone)]
pub struct MotionController {
    goal_reached_threshold: f64,
    steering: ArcSteering,
    state: ControllerState,
    active: bool,
}

impl MotionController {
    pub fn new(goal_reached_threshold: f64, steering: ArcSteering) -> Self {
        MotionController {
            goal_reached_threshold,
            steering,
            state: ControllerState::RegulatingPosition,
            active: false,
        }
    }

    /// (Re)start the machine for a new goal
    pub fn start(&mut self) {
        self.state = ControllerState::RegulatingPosition;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// False once the goal is reached, or before the first goal
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// State the machine moves to for the given errors
    pub fn next_state(&self, errors: &TrackingErrors) -> ControllerState {
        let position_band = match self.state {
            ControllerState::RegulatingPosition => self.goal_reached_threshold,
            _ => 2.0 * self.goal_reached_threshold,
        };
        if errors.position > position_band {
            ControllerState::RegulatingPosition
        } else if errors.orientation.abs() > ORIENTATION_TOLERANCE {
            ControllerState::RegulatingOrientation
        } else {
            ControllerState::GoalReached
        }
    }

    /// One controller step.
    ///
    /// `local_target` is only invoked while regulating position and must
    /// return the target in the robot frame. If it fails the error is
    /// returned and the state is left untouched.
    pub fn tick<F>(&mut self, errors: &TrackingErrors, local_target: F) -> NavResult<VelocityCommand>
    where
        F: FnOnce() -> NavResult<Point3D>,
    {
        if !self.active {
            return Ok(VelocityCommand::zero());
        }

        let next = self.next_state(errors);
        let command = match next {
            ControllerState::RegulatingPosition => {
                let target = local_target()?;
                self.steering.compute(&target)
            }
            ControllerState::RegulatingOrientation => {
                VelocityCommand::new(0.0, self.steering.angular_gain * errors.orientation)
            }
            ControllerState::GoalReached => {
                self.active = false;
                VelocityCommand::zero()
            }
        };
        self.state = next;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NavigationError;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use std::f64::consts::FRAC_PI_2;

    const THRESHOLD: f64 = 0.2;

    fn controller() -> MotionController {
        let mut c = MotionController::new(THRESHOLD, ArcSteering::new(0.5, 1.0));
        c.start();
        c
    }

    fn errors(position: f64, orientation: f64) -> TrackingErrors {
        TrackingErrors { position, orientation }
    }

    fn ahead() -> NavResult<Point3D> {
        Ok(Point3D::new(0.4, 0.0, 0.0))
    }

    #[test]
    fn test_inactive_controller_emits_zero() {
        let mut c = MotionController::new(THRESHOLD, ArcSteering::new(0.5, 1.0));
        let cmd = c.tick(&errors(5.0, 0.0), ahead).unwrap();
        assert!(cmd.is_zero());
        assert!(!c.is_active());
    }

    #[test]
    fn test_stopped_controller_emits_zero() {
        let mut c = controller();
        c.stop();
        assert!(!c.is_active());
        let cmd = c.tick(&errors(5.0, 0.0), ahead).unwrap();
        assert!(cmd.is_zero());
        assert_eq!(c.state(), ControllerState::RegulatingPosition);
    }

    #[test]
    fn test_regulates_position_far_from_goal() {
        let mut c = controller();
        let cmd = c.tick(&errors(3.0, 0.0), ahead).unwrap();
        assert_eq!(c.state(), ControllerState::RegulatingPosition);
        assert_relative_eq!(cmd.linear, 0.2);
    }

    #[test]
    fn test_hysteresis_band() {
        let mut c = controller();
        c.tick(&errors(0.15, 0.5), ahead).unwrap();
        assert_eq!(c.state(), ControllerState::RegulatingOrientation);

        // drifting inside the band keeps orientation regulation
        let cmd = c.tick(&errors(0.35, 0.5), ahead).unwrap();
        assert_eq!(c.state(), ControllerState::RegulatingOrientation);
        assert_eq!(cmd, VelocityCommand::new(0.0, 0.5));

        c.tick(&errors(0.41, 0.5), ahead).unwrap();
        assert_eq!(c.state(), ControllerState::RegulatingPosition);

        // re-entry needs the tight threshold again
        c.tick(&errors(0.3, 0.5), ahead).unwrap();
        assert_eq!(c.state(), ControllerState::RegulatingPosition);
    }

    #[test]
    fn test_goal_reached_is_terminal() {
        let mut c = controller();
        let cmd = c.tick(&errors(0.1, 0.01), ahead).unwrap();
        assert!(cmd.is_zero());
        assert_eq!(c.state(), ControllerState::GoalReached);
        assert!(!c.is_active());

        let cmd = c.tick(&errors(4.0, 0.0), ahead).unwrap();
        assert!(cmd.is_zero());
        assert_eq!(c.state(), ControllerState::GoalReached);

        c.start();
        assert_eq!(c.state(), ControllerState::RegulatingPosition);
        assert!(c.is_active());
    }

    #[test]
    fn test_failed_local_target_keeps_state() {
        let mut c = controller();
        c.tick(&errors(0.15, 0.5), ahead).unwrap();
        let result = c.tick(&errors(1.0, 0.5), || Err(NavigationError::NoLocalTarget { radius: 0.4 }));
        assert!(matches!(result, Err(NavigationError::NoLocalTarget { .. })));
        assert_eq!(c.state(), ControllerState::RegulatingOrientation);
    }

    #[test]
    fn test_local_target_not_requested_outside_position_regime() {
        let mut c = controller();
        let cmd = c
            .tick(&errors(0.1, -0.3), || panic!("local target requested"))
            .unwrap();
        assert_eq!(cmd, VelocityCommand::new(0.0, -0.3));
    }

    #[test]
    fn test_orientation_error_position_only_goal() {
        let pose = Pose3D::from_yaw(Point3D::origin(), 1.0);
        let goal = Goal::position_only(Point3D::new(1.0, 0.0, 0.0));
        assert_eq!(orientation_error(&pose, &goal), 0.0);
        assert_relative_eq!(position_error(&pose, &goal), 1.0);
    }

    #[test]
    fn test_orientation_error_yaw_sign() {
        let pose = Pose3D::from_yaw(Point3D::origin(), 0.0);
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, FRAC_PI_2).into_inner();
        let goal = Goal::with_orientation(Point3D::origin(), q);
        // sin(half the yaw difference)
        assert_relative_eq!(orientation_error(&pose, &goal), (FRAC_PI_2 / 2.0).sin(), epsilon = 1e-12);

        let ahead_pose = Pose3D::from_yaw(Point3D::origin(), FRAC_PI_2 + 0.5);
        assert!(orientation_error(&ahead_pose, &goal) < 0.0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ControllerState::GoalReached.to_string(), "REACHED GOAL");
    }
}
