// Surface navigation demo
//
// Builds a small synthetic terrain (floor, a wall, a climbable platform),
// drives a simulated differential-drive robot to a goal with the surface
// navigator, and plots the distance field and trajectory.
//
// usage: surface_navigation [config.toml]
// logging: RUST_LOG=surface_navigation=debug

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};

use surface_navigation::common::Visualizable;
use surface_navigation::mapping::VoxelGrid;
use surface_navigation::utils::Visualizer;
use surface_navigation::{
    NavResult, NavigationError, NavigatorConfig, Occupancy, Point3D, Pose3D, PoseSource,
    SurfaceNavigator, VelocityCommand, VoxelKey,
};

const RESOLUTION: f64 = 0.1; // [m]
const MAX_TICKS: usize = 600;
const SUBSTEPS: usize = 10;
const HEADROOM: i32 = 6; // free voxels written above every column

/// Unicycle robot with a little odometry noise
struct SimulatedRobot {
    pose: Pose3D,
    rng: StdRng,
    noise: f64,
}

impl SimulatedRobot {
    fn new(position: Point3D, yaw: f64) -> Self {
        SimulatedRobot {
            pose: Pose3D::from_yaw(position, yaw),
            rng: StdRng::seed_from_u64(42),
            noise: 0.002,
        }
    }

    fn apply(&mut self, cmd: &VelocityCommand, dt: f64) {
        let h = dt / SUBSTEPS as f64;
        let mut yaw = self.pose.yaw();
        let mut p = self.pose.position;
        for _ in 0..SUBSTEPS {
            yaw += cmd.angular * h;
            p.x += cmd.linear * yaw.cos() * h;
            p.y += cmd.linear * yaw.sin() * h;
        }
        if cmd.linear != 0.0 {
            p.x += self.rng.gen_range(-self.noise..self.noise);
            p.y += self.rng.gen_range(-self.noise..self.noise);
        }
        self.pose = Pose3D::from_yaw(p, yaw);
    }
}

impl PoseSource for SimulatedRobot {
    fn current_pose(&mut self) -> NavResult<Pose3D> {
        if self.pose.position.is_finite() {
            Ok(self.pose)
        } else {
            Err(NavigationError::PoseUnavailable("simulation diverged".to_string()))
        }
    }
}

fn column(grid: &mut VoxelGrid, x: i32, y: i32, top: i32) {
    grid.fill_box(VoxelKey::new(x, y, 0), VoxelKey::new(x, y, top), Occupancy::Occupied);
    grid.fill_box(VoxelKey::new(x, y, top + 1), VoxelKey::new(x, y, top + HEADROOM), Occupancy::Free);
}

fn build_terrain() -> NavResult<VoxelGrid> {
    let mut grid = VoxelGrid::new(RESOLUTION)?;
    for x in 0..60 {
        for y in 0..40 {
            let top = if x == 30 && y < 28 {
                5 // 0.6 m wall
            } else if (40..50).contains(&x) && (10..30).contains(&y) {
                1 // 0.1 m platform
            } else {
                0
            };
            column(&mut grid, x, y, top);
        }
    }
    Ok(grid)
}

fn run(config: NavigatorConfig) -> NavResult<()> {
    let grid = build_terrain()?;
    let mut navigator = SurfaceNavigator::new(config)?;
    navigator.update_map(&grid)?;

    let mut robot = SimulatedRobot::new(Point3D::new(0.55, 0.55, 0.05), 0.0);
    navigator.set_goal_point(Point3D::new(5.55, 0.55, 0.05))?;

    let dt = navigator.config().controller_period().as_secs_f64();
    let mut trail = vec![robot.pose.position];

    for tick in 0..MAX_TICKS {
        if !navigator.is_active() {
            info!("goal reached after {} ticks", tick);
            break;
        }
        match navigator.tick_with(&mut robot) {
            Ok(cmd) => robot.apply(&cmd, dt),
            // hold still for this tick
            Err(e) => warn!("tick {}: {}", tick, e),
        }
        trail.push(robot.pose.position);
    }

    if navigator.is_active() {
        warn!("goal not reached within {} ticks", MAX_TICKS);
    }
    if let Some(errors) = navigator.last_errors() {
        info!("final errors: ep={:.3}, eo={:.3}", errors.position, errors.orientation);
    }

    let mut vis = Visualizer::new();
    vis.set_title("Surface navigation").set_x_range(-0.5, 6.5).set_y_range(-0.5, 4.5);
    if let Some(surface) = navigator.surface() {
        surface.visualize(&mut vis);
    }
    if let Some(goal) = navigator.goal() {
        vis.plot_goal(goal.position);
    }
    vis.plot_trail(&trail).plot_robot(&robot.pose, 1.0);

    std::fs::create_dir_all("img/navigation")?;
    let output_path = "img/navigation/surface_navigation.png";
    match vis.save_png(output_path, 800, 600) {
        Ok(()) => info!("plot saved to: {}", output_path),
        Err(e) => warn!("could not save plot: {}", e),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match NavigatorConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                error!("failed to load {}: {}", path, e);
                return;
            }
        },
        None => NavigatorConfig::default(),
    };

    if let Err(e) = run(config) {
        error!("surface navigation failed: {}", e);
    }
}
