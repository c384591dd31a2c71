//! Surface navigator
//!
//! Ties the pipeline together: occupancy map -> ground surface -> distance
//! field -> local target -> steering command. All operations are expected
//! to be serialized by the caller (map updates, goal updates, and ticks
//! never run concurrently).
//!
//! Failed ticks return an error and leave the controller state unchanged;
//! the caller decides whether to hold the previous command or publish
//! `VelocityCommand::zero()`.

use tracing::{debug, info, warn};

use crate::common::{
    Goal, GroundPoint, NavResult, NavigationError, OccupancyMap, Point3D, Pose3D, PoseSource,
    SpatialIndex, VelocityCommand,
};
use crate::config::NavigatorConfig;
use crate::mapping::{GroundSurface, InflationFilter, RTreeIndex, SurfaceClassifier};
use crate::path_planning::{project_goal, LocalTargetSelector, Wavefront, WavefrontSolver};
use crate::path_tracking::{ArcSteering, ControllerState, MotionController, TrackingErrors};

pub struct SurfaceNavigator<I: SpatialIndex = RTreeIndex> {
    config: NavigatorConfig,
    classifier: SurfaceClassifier,
    inflation: InflationFilter,
    selector: LocalTargetSelector,
    controller: MotionController,
    surface: Option<GroundSurface<I>>,
    wavefront: Option<Wavefront>,
    /// Goal as requested, before projection
    requested_goal: Option<Goal>,
    /// Requested goal snapped onto the current ground surface
    goal: Option<Goal>,
    last_errors: Option<TrackingErrors>,
    last_target: Option<Point3D>,
}

impl SurfaceNavigator<RTreeIndex> {
    /// Navigator backed by the default R-tree index
    pub fn new(config: NavigatorConfig) -> NavResult<Self> {
        Self::with_index(config)
    }
}

impl<I: SpatialIndex> SurfaceNavigator<I> {
    pub fn with_index(config: NavigatorConfig) -> NavResult<Self> {
        config.validate()?;
        let steering = ArcSteering::new(config.twist_linear_gain, config.twist_angular_gain);
        Ok(SurfaceNavigator {
            classifier: SurfaceClassifier::new(
                config.robot_height,
                config.max_superable_height,
                config.treat_unknown_as_free,
            ),
            inflation: InflationFilter::new(config.robot_radius),
            selector: LocalTargetSelector::new(config.local_target_radius),
            controller: MotionController::new(config.goal_reached_threshold, steering),
            surface: None,
            wavefront: None,
            requested_goal: None,
            goal: None,
            last_errors: None,
            last_target: None,
            config,
        })
    }

    /// Replace the map. The ground surface is rebuilt from scratch; with a
    /// goal set, the requested goal position is projected onto the new
    /// surface and the field recomputed. A goal whose projection failed
    /// when it was set is activated once a map can hold it.
    ///
    /// Only an unusable map (bad resolution) is an error. Field failures are
    /// logged and leave the new surface without a solved field.
    pub fn update_map<M: OccupancyMap>(&mut self, map: &M) -> NavResult<()> {
        let surface = GroundSurface::build(map, &self.classifier, &self.inflation)?;
        info!(
            ground = surface.ground().len(),
            obstacles = surface.obstacles().len(),
            "map updated"
        );
        self.surface = Some(surface);
        self.wavefront = None;

        if let Some(requested) = self.requested_goal {
            let pending = self.goal.is_none();
            match self.project(requested).and_then(|_| self.recompute_field()) {
                Ok(()) if pending => {
                    info!("pending goal projected onto new map");
                    self.controller.start();
                }
                Ok(()) => {}
                Err(e) => warn!("keeping goal without a distance field: {}", e),
            }
        }
        Ok(())
    }

    /// Replace the goal, project it onto the ground, and restart the controller
    ///
    /// The previous goal is discarded even when projection fails; the
    /// controller then stops and the new goal waits for the next map update.
    pub fn set_goal(&mut self, goal: Goal) -> NavResult<()> {
        if !goal.position.is_finite() {
            return Err(NavigationError::InvalidGoal(format!("position {:?}", goal.position)));
        }
        if !goal.orientation.coords.iter().all(|c| c.is_finite()) {
            return Err(NavigationError::InvalidGoal(format!("orientation {:?}", goal.orientation)));
        }

        self.requested_goal = Some(goal);
        self.goal = None;
        self.wavefront = None;
        self.last_errors = None;
        self.last_target = None;
        if let Err(e) = self.project(goal) {
            self.controller.stop();
            return Err(e);
        }
        self.controller.start();

        if let Some(g) = &self.goal {
            if g.has_orientation() {
                info!(
                    "goal set to pose ({}, {}, {}), ({}, {}, {}, {})",
                    g.position.x, g.position.y, g.position.z,
                    g.orientation.i, g.orientation.j, g.orientation.k, g.orientation.w
                );
            } else {
                info!("goal set to point ({}, {}, {})", g.position.x, g.position.y, g.position.z);
            }
        }

        self.recompute_field()
    }

    /// Position-only goal
    pub fn set_goal_point(&mut self, position: Point3D) -> NavResult<()> {
        self.set_goal(Goal::position_only(position))
    }

    /// Goal with a required final orientation
    pub fn set_goal_pose(&mut self, pose: &Pose3D) -> NavResult<()> {
        self.set_goal(Goal::with_orientation(pose.position, pose.orientation))
    }

    fn project(&mut self, goal: Goal) -> NavResult<()> {
        let surface = self.surface.as_ref().ok_or(NavigationError::GoalProjection)?;
        let position = project_goal(surface.ground(), surface.ground_index(), &goal.position)
            .map_err(|e| {
                warn!("failed to project goal position to ground");
                e
            })?;
        self.goal = Some(Goal { position, ..goal });
        Ok(())
    }

    /// Re-run the wavefront for the current surface and goal
    pub fn recompute_field(&mut self) -> NavResult<()> {
        let goal = self.goal.ok_or(NavigationError::GoalUnreachable)?;
        let surface = self.surface.as_mut().ok_or(NavigationError::GoalUnreachable)?;
        let solver = WavefrontSolver::for_resolution(surface.resolution());
        let (ground, index) = surface.ground_and_index_mut();
        self.wavefront = None;
        self.wavefront = Some(solver.solve(ground, index, &goal.position)?);
        Ok(())
    }

    /// One controller step for the supplied robot pose
    pub fn tick(&mut self, pose: &Pose3D) -> NavResult<VelocityCommand> {
        if !self.controller.is_active() {
            return Ok(VelocityCommand::zero());
        }
        let goal = match self.goal {
            Some(goal) => goal,
            None => return Ok(VelocityCommand::zero()),
        };
        if !pose.is_valid() {
            return Err(NavigationError::PoseUnavailable(format!("invalid robot pose {:?}", pose)));
        }

        let errors = TrackingErrors::compute(pose, &goal);
        self.last_errors = Some(errors);

        let surface = self.surface.as_ref();
        let selector = &self.selector;
        let last_target = &mut self.last_target;
        let result = self.controller.tick(&errors, || {
            let surface = surface.ok_or(NavigationError::NoLocalTarget {
                radius: selector.lookahead_radius,
            })?;
            let i = selector.select(surface.ground(), surface.ground_index(), &pose.position)?;
            let target = surface.ground()[i].position;
            *last_target = Some(target);
            Ok(pose.to_local(&target))
        });

        match &result {
            Ok(command) => {
                debug!(
                    "controller: ep={:.3}, eo={:.3}, status={}, v={:.3}, w={:.3}",
                    errors.position,
                    errors.orientation,
                    self.controller.state(),
                    command.linear,
                    command.angular
                );
                if self.controller.state() == ControllerState::GoalReached {
                    info!("goal reached! stopping controller");
                }
            }
            Err(e) => warn!("controller: skipping tick: {}", e),
        }
        result
    }

    /// Look up the pose from `source`, then tick
    pub fn tick_with<P: PoseSource>(&mut self, source: &mut P) -> NavResult<VelocityCommand> {
        let pose = source.current_pose().map_err(|e| {
            warn!("controller: failed to get robot pose: {}", e);
            e
        })?;
        self.tick(&pose)
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Goal as projected onto the ground surface
    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    /// Goal as last requested, before projection
    pub fn requested_goal(&self) -> Option<&Goal> {
        self.requested_goal.as_ref()
    }

    pub fn surface(&self) -> Option<&GroundSurface<I>> {
        self.surface.as_ref()
    }

    pub fn ground_points(&self) -> &[GroundPoint] {
        self.surface.as_ref().map_or(&[], |s| s.ground())
    }

    pub fn obstacle_points(&self) -> &[Point3D] {
        self.surface.as_ref().map_or(&[], |s| s.obstacles())
    }

    /// Normalized distance value per ground point
    pub fn distance_field(&self) -> Vec<f64> {
        self.ground_points().iter().map(|g| g.distance).collect()
    }

    /// Raw hop counts of the last solved field
    pub fn wavefront(&self) -> Option<&Wavefront> {
        self.wavefront.as_ref()
    }

    pub fn last_errors(&self) -> Option<TrackingErrors> {
        self.last_errors
    }

    /// Last local target chosen, in the map frame
    pub fn last_local_target(&self) -> Option<Point3D> {
        self.last_target
    }

    pub fn controller_state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }
}
