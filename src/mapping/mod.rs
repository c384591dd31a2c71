// Mapping: occupancy storage, spatial indexing, and ground surface extraction

pub mod spatial_index;
pub mod surface;
pub mod voxel_grid;

pub use spatial_index::*;
pub use surface::*;
pub use voxel_grid::*;
