//! Wavefront distance field over the ground surface
//!
//! Breadth-first propagation from the ground point nearest the goal. Two
//! ground points are neighbours when they lie within `1.8 * resolution` of
//! each other, which reaches all 26-connected voxel neighbours in one hop
//! while tolerating jitter in voxel-centre coordinates. The resulting hop
//! counts are normalized to `[0, 1)`; unreachable points get `1.0`.

use std::collections::VecDeque;

use itertools::{Itertools, MinMaxResult};
use tracing::{debug, warn};

use crate::common::{GroundPoint, NavResult, NavigationError, Point3D, SpatialIndex};

/// Neighbour radius in units of the map resolution
pub const PROPAGATION_RADIUS_FACTOR: f64 = 1.8;

/// Keeps the normalization finite when every reached point has the same hop count
pub const NORMALIZATION_EPSILON: f64 = 0.01;

/// Raw result of one wavefront propagation
#[derive(Debug, Clone, PartialEq)]
pub struct Wavefront {
    /// Ground index the propagation was seeded from
    pub seed: usize,
    /// Hop count to the seed for each ground point, `None` if unreachable
    pub hops: Vec<Option<u32>>,
}

impl Wavefront {
    pub fn reached(&self) -> usize {
        self.hops.iter().filter(|h| h.is_some()).count()
    }

    pub fn unreachable(&self) -> usize {
        self.hops.len() - self.reached()
    }

    pub fn max_hops(&self) -> Option<u32> {
        self.hops.iter().flatten().copied().max()
    }

    /// Rescale hop counts to `(d - dmin) / (dmax - dmin + eps)`; unreachable -> 1.0
    pub fn normalized(&self) -> Vec<f64> {
        let (dmin, dmax) = match self.hops.iter().flatten().minmax() {
            MinMaxResult::NoElements => return vec![1.0; self.hops.len()],
            MinMaxResult::OneElement(&d) => (d as f64, d as f64),
            MinMaxResult::MinMax(&lo, &hi) => (lo as f64, hi as f64),
        };
        let span = dmax - dmin + NORMALIZATION_EPSILON;
        self.hops
            .iter()
            .map(|h| match h {
                Some(d) => (*d as f64 - dmin) / span,
                None => 1.0,
            })
            .collect()
    }
}

/// Breadth-first distance transform over a ground point set
#[derive(Debug, Clone)]
pub struct WavefrontSolver {
    pub propagation_radius: f64,
}

impl WavefrontSolver {
    pub fn new(propagation_radius: f64) -> Self {
        WavefrontSolver { propagation_radius }
    }

    /// Solver whose neighbour radius matches a map resolution
    pub fn for_resolution(resolution: f64) -> Self {
        Self::new(PROPAGATION_RADIUS_FACTOR * resolution)
    }

    /// Propagate hop counts outward from the ground point nearest `goal`
    pub fn propagate<I: SpatialIndex>(
        &self,
        ground: &[GroundPoint],
        index: &I,
        goal: &Point3D,
    ) -> NavResult<Wavefront> {
        if ground.is_empty() {
            return Err(NavigationError::GoalUnreachable);
        }
        let (seed, _) = index.nearest(goal).ok_or(NavigationError::GoalUnreachable)?;

        let mut hops: Vec<Option<u32>> = vec![None; ground.len()];
        hops[seed] = Some(0);

        let mut queue = VecDeque::new();
        queue.push_back(seed);
        while let Some(i) = queue.pop_front() {
            let next = hops[i].map_or(0, |h| h + 1);
            for j in index.within_radius(&ground[i].position, self.propagation_radius) {
                if hops[j].is_none() {
                    hops[j] = Some(next);
                    queue.push_back(j);
                }
            }
        }

        Ok(Wavefront { seed, hops })
    }

    /// Recompute the whole field, overwriting every ground point's distance
    pub fn solve<I: SpatialIndex>(
        &self,
        ground: &mut [GroundPoint],
        index: &I,
        goal: &Point3D,
    ) -> NavResult<Wavefront> {
        let wavefront = match self.propagate(ground, index, goal) {
            Ok(w) => w,
            Err(e) => {
                for point in ground.iter_mut() {
                    point.distance = f64::INFINITY;
                }
                return Err(e);
            }
        };

        for (point, value) in ground.iter_mut().zip(wavefront.normalized()) {
            point.distance = value;
        }

        let unreachable = wavefront.unreachable();
        if unreachable > 0 {
            warn!(unreachable, "ground points disconnected from goal");
        }
        debug!(
            reached = wavefront.reached(),
            max_hops = ?wavefront.max_hops(),
            "distance field computed"
        );
        Ok(wavefront)
    }
}
