//! Sparse voxel occupancy grid
//!
//! Stores voxels at a single (finest) resolution. Keys that were never
//! written are unknown, matching the octree convention where a missing
//! node has not been observed.

use std::collections::HashMap;

use itertools::iproduct;

use crate::common::{NavResult, NavigationError, Occupancy, OccupancyMap, Point3D, VoxelKey};

/// Sparse occupancy grid keyed by voxel coordinates
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    resolution: f64,
    cells: HashMap<VoxelKey, bool>, // true = occupied
}

impl VoxelGrid {
    /// Create an empty grid; every voxel starts unknown
    pub fn new(resolution: f64) -> NavResult<Self> {
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(NavigationError::InvalidParameter(format!(
                "voxel resolution must be positive, got {}",
                resolution
            )));
        }
        Ok(VoxelGrid { resolution, cells: HashMap::new() })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Key of the voxel containing `point`
    pub fn coord_to_key(&self, point: &Point3D) -> VoxelKey {
        VoxelKey::new(
            (point.x / self.resolution).floor() as i32,
            (point.y / self.resolution).floor() as i32,
            (point.z / self.resolution).floor() as i32,
        )
    }

    /// Set the state of one voxel; `Unknown` forgets it
    pub fn set(&mut self, key: VoxelKey, state: Occupancy) {
        match state {
            Occupancy::Occupied => {
                self.cells.insert(key, true);
            }
            Occupancy::Free => {
                self.cells.insert(key, false);
            }
            Occupancy::Unknown => {
                self.cells.remove(&key);
            }
        }
    }

    pub fn mark_occupied(&mut self, key: VoxelKey) {
        self.set(key, Occupancy::Occupied);
    }

    pub fn mark_free(&mut self, key: VoxelKey) {
        self.set(key, Occupancy::Free);
    }

    /// Write a coarse cubic block of `size` voxels per edge starting at `min`
    ///
    /// The block is stored as individual full-resolution leaves, so a
    /// collapsed region never hides per-voxel structure from the classifier.
    pub fn fill_block(&mut self, min: VoxelKey, size: u32, state: Occupancy) {
        let n = size as i32;
        for (dx, dy, dz) in iproduct!(0..n, 0..n, 0..n) {
            self.set(VoxelKey::new(min.x + dx, min.y + dy, min.z + dz), state);
        }
    }

    /// Fill the axis-aligned box `[min, max]` (inclusive) with one state
    pub fn fill_box(&mut self, min: VoxelKey, max: VoxelKey, state: Occupancy) {
        for (x, y, z) in iproduct!(min.x..=max.x, min.y..=max.y, min.z..=max.z) {
            self.set(VoxelKey::new(x, y, z), state);
        }
    }
}

impl OccupancyMap for VoxelGrid {
    fn resolution(&self) -> f64 {
        self.resolution
    }

    fn occupancy(&self, key: VoxelKey) -> Occupancy {
        match self.cells.get(&key) {
            Some(true) => Occupancy::Occupied,
            Some(false) => Occupancy::Free,
            None => Occupancy::Unknown,
        }
    }

    fn occupied_voxels(&self) -> Vec<VoxelKey> {
        let mut keys: Vec<VoxelKey> = self
            .cells
            .iter()
            .filter(|(_, &occupied)| occupied)
            .map(|(&key, _)| key)
            .collect();
        // stable enumeration order keeps classification output reproducible
        keys.sort_unstable();
        keys
    }

    fn key_to_coord(&self, key: VoxelKey) -> Point3D {
        Point3D::new(
            (key.x as f64 + 0.5) * self.resolution,
            (key.y as f64 + 0.5) * self.resolution,
            (key.z as f64 + 0.5) * self.resolution,
        )
    }
}
