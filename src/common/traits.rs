//! Common traits defining the capabilities the navigation core consumes

use crate::common::error::NavResult;
use crate::common::types::*;

/// Discrete voxel coordinate at the map's finest resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelKey {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Key `dz` voxels above (negative for below)
    pub fn offset_z(&self, dz: i32) -> Self {
        Self { x: self.x, y: self.y, z: self.z + dz }
    }
}

/// Tri-state occupancy of a voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupancy {
    Free,
    Occupied,
    Unknown,
}

/// Occupancy map queried by the surface classifier
///
/// Implementations must report every occupied region as full-resolution
/// leaves from `occupied_voxels`; coarse occupied blocks are expanded first.
pub trait OccupancyMap {
    /// Edge length of one voxel [m]
    fn resolution(&self) -> f64;

    /// Occupancy state of a single voxel
    fn occupancy(&self, key: VoxelKey) -> Occupancy;

    /// All occupied voxels at full resolution
    fn occupied_voxels(&self) -> Vec<VoxelKey>;

    /// World coordinate of a voxel centre
    fn key_to_coord(&self, key: VoxelKey) -> Point3D;
}

/// Nearest-neighbour and radius queries over a fixed point set
pub trait SpatialIndex {
    /// Build an index over `points`; query results refer to positions in this slice
    fn build(points: &[Point3D]) -> Self
    where
        Self: Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index and distance of the point nearest to `query`
    fn nearest(&self, query: &Point3D) -> Option<(usize, f64)>;

    /// Indices of all points within `radius` of `query` (unordered)
    fn within_radius(&self, query: &Point3D, radius: f64) -> Vec<usize>;
}

/// Source of the robot's current pose in the map frame
pub trait PoseSource {
    /// Look up the current pose; failures map to `NavigationError::PoseUnavailable`
    fn current_pose(&mut self) -> NavResult<Pose3D>;
}

/// Trait for visualizable state
pub trait Visualizable {
    /// Draw current state to visualizer
    fn visualize(&self, vis: &mut crate::utils::Visualizer);
}
