//! surface_navigation - local navigation for ground robots on 3D occupancy maps
//!
//! Extracts a traversable ground surface from a voxel occupancy map,
//! computes a wavefront distance field towards a goal, and turns the
//! lowest-cost nearby ground point into a velocity command.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Algorithm modules
pub mod mapping;
pub mod path_planning;
pub mod path_tracking;
pub mod navigation;

// Re-export common types for convenience
pub use common::{Goal, GroundPoint, Point3D, Pose3D, VelocityCommand};
pub use common::{Occupancy, OccupancyMap, PoseSource, SpatialIndex, VoxelKey};
pub use common::{NavResult, NavigationError};
pub use config::NavigatorConfig;
pub use navigation::SurfaceNavigator;
