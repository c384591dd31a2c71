//! Ground surface extraction from a 3D occupancy map
//!
//! Occupied voxels with enough free clearance above them become ground,
//! occupied voxels belonging to a vertical run taller than the robot can
//! climb become obstacles. Ground close to any obstacle is then removed so
//! that every remaining point is a safe position for the robot centre.

use tracing::debug;

use crate::common::{
    GroundPoint, NavResult, NavigationError, Occupancy, OccupancyMap, Point3D, SpatialIndex,
    VoxelKey,
};
use crate::mapping::RTreeIndex;

/// Slack applied to height comparisons so decimal resolutions (0.1 m, 0.05 m)
/// do not flip a rule through float rounding
const HEIGHT_TOLERANCE: f64 = 1e-9;

/// Ground and obstacle points produced by one classification pass
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub ground: Vec<Point3D>,
    pub obstacles: Vec<Point3D>,
}

/// Labels occupied voxels as ground, obstacle, or neither
#[derive(Debug, Clone)]
pub struct SurfaceClassifier {
    pub robot_height: f64,
    pub max_superable_height: f64,
    pub treat_unknown_as_free: bool,
}

impl SurfaceClassifier {
    pub fn new(robot_height: f64, max_superable_height: f64, treat_unknown_as_free: bool) -> Self {
        SurfaceClassifier { robot_height, max_superable_height, treat_unknown_as_free }
    }

    /// Number of voxels that must be clear above a ground voxel
    pub fn clearance_voxels(&self, resolution: f64) -> i32 {
        (self.robot_height / resolution - HEIGHT_TOLERANCE).ceil().max(0.0) as i32
    }

    /// True iff `key` is occupied and the column above it, up to the robot
    /// height, is clear
    pub fn is_ground<M: OccupancyMap>(&self, map: &M, key: VoxelKey) -> bool {
        if map.occupancy(key) != Occupancy::Occupied {
            return false;
        }
        let steps = self.clearance_voxels(map.resolution());
        (1..=steps).all(|dz| match map.occupancy(key.offset_z(dz)) {
            Occupancy::Free => true,
            Occupancy::Unknown => self.treat_unknown_as_free,
            Occupancy::Occupied => false,
        })
    }

    /// True iff the contiguous occupied run through `key` is taller than
    /// the robot can climb
    pub fn is_obstacle<M: OccupancyMap>(&self, map: &M, key: VoxelKey) -> bool {
        let run = 1 + Self::occupied_run(map, key, 1) + Self::occupied_run(map, key, -1);
        run as f64 * map.resolution() > self.max_superable_height + HEIGHT_TOLERANCE
    }

    /// Count contiguous occupied voxels from `key` in direction `step` (exclusive)
    fn occupied_run<M: OccupancyMap>(map: &M, key: VoxelKey, step: i32) -> u32 {
        let mut count = 0;
        let mut probe = key.offset_z(step);
        while map.occupancy(probe) == Occupancy::Occupied {
            count += 1;
            probe = probe.offset_z(step);
        }
        count
    }

    /// Classify every occupied voxel of `map`
    ///
    /// Ground takes precedence, so the two output sets are always disjoint.
    pub fn classify<M: OccupancyMap>(&self, map: &M) -> Classification {
        let mut result = Classification::default();
        for key in map.occupied_voxels() {
            if self.is_ground(map, key) {
                result.ground.push(map.key_to_coord(key));
            } else if self.is_obstacle(map, key) {
                result.obstacles.push(map.key_to_coord(key));
            }
        }
        debug!(
            ground = result.ground.len(),
            obstacles = result.obstacles.len(),
            "classified occupancy map"
        );
        result
    }
}

/// Removes ground points inside the robot footprint of any obstacle
#[derive(Debug, Clone)]
pub struct InflationFilter {
    pub robot_radius: f64,
}

impl InflationFilter {
    pub fn new(robot_radius: f64) -> Self {
        InflationFilter { robot_radius }
    }

    pub fn is_near_obstacle<I: SpatialIndex>(&self, point: &Point3D, obstacles: &I) -> bool {
        matches!(obstacles.nearest(point), Some((_, d)) if d < self.robot_radius)
    }

    /// Drop every ground point closer than the robot radius to an obstacle.
    /// Returns the number of removed points; survivor order is not preserved.
    pub fn apply<I: SpatialIndex>(&self, ground: &mut Vec<GroundPoint>, obstacles: &I) -> usize {
        let before = ground.len();
        let mut i = 0;
        while i < ground.len() {
            if self.is_near_obstacle(&ground[i].position, obstacles) {
                ground.swap_remove(i);
            } else {
                i += 1;
            }
        }
        before - ground.len()
    }
}

/// Immutable snapshot of the traversable surface for one map update
pub struct GroundSurface<I: SpatialIndex = RTreeIndex> {
    resolution: f64,
    ground: Vec<GroundPoint>,
    ground_index: I,
    obstacles: Vec<Point3D>,
}

impl<I: SpatialIndex> GroundSurface<I> {
    /// Classify `map`, inflate obstacles, and index the surviving ground
    pub fn build<M: OccupancyMap>(
        map: &M,
        classifier: &SurfaceClassifier,
        inflation: &InflationFilter,
    ) -> NavResult<Self> {
        let resolution = map.resolution();
        if !(resolution > 0.0) {
            return Err(NavigationError::InvalidParameter(format!(
                "map resolution must be positive, got {}",
                resolution
            )));
        }

        let Classification { ground, obstacles } = classifier.classify(map);
        let obstacle_index = I::build(&obstacles);

        let mut ground: Vec<GroundPoint> = ground.into_iter().map(GroundPoint::new).collect();
        let removed = inflation.apply(&mut ground, &obstacle_index);
        debug!(removed, remaining = ground.len(), "inflated obstacles");

        let positions: Vec<Point3D> = ground.iter().map(|g| g.position).collect();
        let ground_index = I::build(&positions);

        Ok(GroundSurface { resolution, ground, ground_index, obstacles })
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn ground(&self) -> &[GroundPoint] {
        &self.ground
    }

    pub fn ground_index(&self) -> &I {
        &self.ground_index
    }

    pub fn obstacles(&self) -> &[Point3D] {
        &self.obstacles
    }

    /// Split borrow used by the wavefront solver
    pub fn ground_and_index_mut(&mut self) -> (&mut [GroundPoint], &I) {
        (&mut self.ground, &self.ground_index)
    }
}
