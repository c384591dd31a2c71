//! Common types used throughout surface_navigation

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Squared quaternion norm below which a goal is treated as position-only
pub const MIN_ORIENTATION_NORM_SQUARED: f64 = 1e-5;

/// 3D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn distance(&self, other: &Point3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(a: [f64; 3]) -> Self {
        Self { x: a[0], y: a[1], z: a[2] }
    }
}

impl From<Vector3<f64>> for Point3D {
    fn from(v: Vector3<f64>) -> Self {
        Self { x: v[0], y: v[1], z: v[2] }
    }
}

/// 3D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose3D {
    pub position: Point3D,
    pub orientation: Quaternion<f64>,
}

impl Pose3D {
    pub fn new(position: Point3D, orientation: Quaternion<f64>) -> Self {
        Self { position, orientation }
    }

    /// Pose on the ground plane with the given heading
    pub fn from_yaw(position: Point3D, yaw: f64) -> Self {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, yaw);
        Self { position, orientation: q.into_inner() }
    }

    /// Finite position and a finite, non-degenerate orientation
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.orientation.coords.iter().all(|c| c.is_finite())
            && self.orientation.norm_squared() >= MIN_ORIENTATION_NORM_SQUARED
    }

    pub fn yaw(&self) -> f64 {
        UnitQuaternion::from_quaternion(self.orientation).euler_angles().2
    }

    /// Express a world-frame point in this pose's frame (x forward, y left)
    pub fn to_local(&self, point: &Point3D) -> Point3D {
        let rotation = UnitQuaternion::from_quaternion(self.orientation);
        let offset = point.to_vector() - self.position.to_vector();
        Point3D::from(rotation.inverse_transform_vector(&offset))
    }
}

/// Navigation goal: a position with an optional orientation
///
/// A zero (or near-zero) quaternion marks a position-only goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub position: Point3D,
    pub orientation: Quaternion<f64>,
}

impl Goal {
    pub fn position_only(position: Point3D) -> Self {
        Self { position, orientation: Quaternion::new(0.0, 0.0, 0.0, 0.0) }
    }

    pub fn with_orientation(position: Point3D, orientation: Quaternion<f64>) -> Self {
        Self { position, orientation }
    }

    pub fn has_orientation(&self) -> bool {
        self.orientation.norm_squared() >= MIN_ORIENTATION_NORM_SQUARED
    }
}

/// Velocity command for a differential drive robot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCommand {
    pub linear: f64,  // forward velocity [m/s]
    pub angular: f64, // yaw rate [rad/s]
}

impl VelocityCommand {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    pub fn zero() -> Self {
        Self { linear: 0.0, angular: 0.0 }
    }

    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

/// Traversable surface location with its distance-to-goal value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPoint {
    pub position: Point3D,
    /// Normalized distance to goal, `+inf` until a field has been solved
    pub distance: f64,
}

impl GroundPoint {
    pub fn new(position: Point3D) -> Self {
        Self { position, distance: f64::INFINITY }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_point3d_distance() {
        let p1 = Point3D::new(0.0, 0.0, 0.0);
        let p2 = Point3D::new(1.0, 2.0, 2.0);
        assert!((p1.distance(&p2) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_pose_to_local() {
        // robot at (1, 1) facing +y: a point further along +y is straight ahead
        let pose = Pose3D::from_yaw(Point3D::new(1.0, 1.0, 0.0), FRAC_PI_2);
        let local = pose.to_local(&Point3D::new(1.0, 3.0, 0.0));
        assert_relative_eq!(local.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-9);

        let left = pose.to_local(&Point3D::new(0.0, 1.0, 0.0));
        assert_relative_eq!(left.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(left.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pose_yaw() {
        let pose = Pose3D::from_yaw(Point3D::origin(), 0.3);
        assert_relative_eq!(pose.yaw(), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_pose_validity() {
        let p = Point3D::new(1.0, 2.0, 0.0);
        assert!(Pose3D::from_yaw(p, 0.5).is_valid());
        assert!(!Pose3D::new(p, Quaternion::new(f64::NAN, 0.0, 0.0, 0.0)).is_valid());
        assert!(!Pose3D::new(p, Quaternion::new(0.0, 0.0, 0.0, 0.0)).is_valid());
        assert!(!Pose3D::from_yaw(Point3D::new(f64::INFINITY, 0.0, 0.0), 0.0).is_valid());
    }

    #[test]
    fn test_goal_orientation_flag() {
        assert!(!Goal::position_only(Point3D::origin()).has_orientation());
        let q = Quaternion::new(1.0, 0.0, 0.0, 0.0);
        assert!(Goal::with_orientation(Point3D::origin(), q).has_orientation());
        let tiny = Quaternion::new(1e-3, 0.0, 0.0, 0.0);
        assert!(!Goal::with_orientation(Point3D::origin(), tiny).has_orientation());
    }
}
