//! R-tree backed point index
//!
//! Answers the nearest and radius queries used for goal projection,
//! obstacle inflation, wavefront propagation, and local-target lookup.

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::common::{Point3D, SpatialIndex};

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// Spatial index for 3D points using an R-tree
#[derive(Clone)]
pub struct RTreeIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex for RTreeIndex {
    fn build(points: &[Point3D]) -> Self {
        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new(p.to_array(), i))
            .collect();
        RTreeIndex { tree: RTree::bulk_load(entries) }
    }

    fn len(&self) -> usize {
        self.tree.size()
    }

    fn nearest(&self, query: &Point3D) -> Option<(usize, f64)> {
        self.tree.nearest_neighbor(&query.to_array()).map(|entry| {
            let distance = Point3D::from(*entry.geom()).distance(query);
            (entry.data, distance)
        })
    }

    fn within_radius(&self, query: &Point3D, radius: f64) -> Vec<usize> {
        self.tree
            .locate_within_distance(query.to_array(), radius * radius)
            .map(|entry| entry.data)
            .collect()
    }
}
