// End-to-end scenario: 5 x 5 m flat floor at 0.1 m resolution, no obstacles,
// goal in one corner, robot starting in the opposite corner.

use std::f64::consts::PI;

use surface_navigation::mapping::VoxelGrid;
use surface_navigation::path_tracking::ControllerState;
use surface_navigation::{
    NavigatorConfig, Occupancy, OccupancyMap, Point3D, Pose3D, SurfaceNavigator, VelocityCommand,
    VoxelKey,
};

const CELLS: i32 = 50;
const RES: f64 = 0.1;

fn flat_floor() -> VoxelGrid {
    let mut grid = VoxelGrid::new(RES).unwrap();
    grid.fill_box(VoxelKey::new(0, 0, 0), VoxelKey::new(CELLS - 1, CELLS - 1, 0), Occupancy::Occupied);
    grid.fill_box(VoxelKey::new(0, 0, 1), VoxelKey::new(CELLS - 1, CELLS - 1, 5), Occupancy::Free);
    grid
}

fn cell_of(p: &Point3D) -> (i64, i64) {
    ((p.x / RES).floor() as i64, (p.y / RES).floor() as i64)
}

/// Integrate a unicycle over one controller period
fn step(pose: &Pose3D, cmd: &VelocityCommand, dt: f64) -> Pose3D {
    let substeps = 20;
    let h = dt / substeps as f64;
    let mut yaw = pose.yaw();
    let mut p = pose.position;
    for _ in 0..substeps {
        yaw += cmd.angular * h;
        p.x += cmd.linear * yaw.cos() * h;
        p.y += cmd.linear * yaw.sin() * h;
    }
    Pose3D::from_yaw(p, yaw)
}

#[test]
fn field_radiates_from_goal_corner() {
    let grid = flat_floor();
    let mut nav = SurfaceNavigator::new(NavigatorConfig::default()).unwrap();
    nav.update_map(&grid).unwrap();
    assert_eq!(nav.ground_points().len(), (CELLS * CELLS) as usize);
    assert!(nav.obstacle_points().is_empty());

    let corner = grid.key_to_coord(VoxelKey::new(0, 0, 0));
    nav.set_goal_point(corner).unwrap();

    let wavefront = nav.wavefront().unwrap();
    assert_eq!(wavefront.unreachable(), 0);
    assert_eq!(wavefront.hops.iter().filter(|h| **h == Some(0)).count(), 1);

    // 8-connected propagation: hop count equals the Chebyshev cell distance
    for (point, hops) in nav.ground_points().iter().zip(&wavefront.hops) {
        let (ix, iy) = cell_of(&point.position);
        assert_eq!(*hops, Some(ix.max(iy) as u32));
    }

    let field = nav.distance_field();
    assert!(field.iter().all(|d| (0.0..1.0).contains(d)));
}

#[test]
fn robot_drives_to_goal_corner() {
    let grid = flat_floor();
    let mut nav = SurfaceNavigator::new(NavigatorConfig::default()).unwrap();
    nav.update_map(&grid).unwrap();

    let goal = grid.key_to_coord(VoxelKey::new(0, 0, 0));
    nav.set_goal_point(goal).unwrap();

    let start = grid.key_to_coord(VoxelKey::new(CELLS - 1, CELLS - 1, 0));
    // facing the goal
    let mut pose = Pose3D::from_yaw(start, -3.0 * PI / 4.0);
    let dt = nav.config().controller_period().as_secs_f64();

    let mut previous_error = f64::INFINITY;
    let mut ticks = 0;
    while nav.is_active() {
        assert!(ticks < 500, "goal not reached, error {}", previous_error);
        let cmd = nav.tick(&pose).unwrap();

        let error = nav.last_errors().unwrap().position;
        assert!(error <= previous_error + 1e-9, "error grew from {} to {}", previous_error, error);
        previous_error = error;

        pose = step(&pose, &cmd, dt);
        ticks += 1;
    }

    assert_eq!(nav.controller_state(), ControllerState::GoalReached);
    assert!(previous_error <= nav.config().goal_reached_threshold);
    assert!(nav.tick(&pose).unwrap().is_zero());
}

#[test]
fn new_goal_restarts_controller() {
    let grid = flat_floor();
    let mut nav = SurfaceNavigator::new(NavigatorConfig::default()).unwrap();
    nav.update_map(&grid).unwrap();

    let here = grid.key_to_coord(VoxelKey::new(10, 10, 0));
    nav.set_goal_point(here).unwrap();
    let pose = Pose3D::from_yaw(here, 0.0);
    assert!(nav.tick(&pose).unwrap().is_zero());
    assert_eq!(nav.controller_state(), ControllerState::GoalReached);

    let ahead = grid.key_to_coord(VoxelKey::new(30, 10, 0));
    nav.set_goal_point(ahead).unwrap();
    assert_eq!(nav.controller_state(), ControllerState::RegulatingPosition);
    let cmd = nav.tick(&pose).unwrap();
    assert!(cmd.linear > 0.0);

    // the chosen target is one of the lowest-field points ahead of the robot
    let target = nav.last_local_target().unwrap();
    assert!(target.x - here.x > 0.25);
    assert!((target.y - here.y).abs() <= target.x - here.x);
}
