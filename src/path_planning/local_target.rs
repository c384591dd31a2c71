//! Local target selection and goal projection on the ground surface

use ordered_float::OrderedFloat;

use crate::common::{GroundPoint, NavResult, NavigationError, Point3D, SpatialIndex};

/// Picks the lowest-field ground point within a lookahead radius
#[derive(Debug, Clone)]
pub struct LocalTargetSelector {
    pub lookahead_radius: f64,
}

impl LocalTargetSelector {
    pub fn new(lookahead_radius: f64) -> Self {
        LocalTargetSelector { lookahead_radius }
    }

    /// Index of the ground point with minimum distance value near `position`.
    /// Ties resolve to whichever candidate the index reports first.
    pub fn select<I: SpatialIndex>(
        &self,
        ground: &[GroundPoint],
        index: &I,
        position: &Point3D,
    ) -> NavResult<usize> {
        index
            .within_radius(position, self.lookahead_radius)
            .into_iter()
            .min_by_key(|&i| OrderedFloat(ground[i].distance))
            .ok_or(NavigationError::NoLocalTarget { radius: self.lookahead_radius })
    }
}

/// Snap a goal position onto the nearest ground point
pub fn project_goal<I: SpatialIndex>(
    ground: &[GroundPoint],
    index: &I,
    goal: &Point3D,
) -> NavResult<Point3D> {
    index
        .nearest(goal)
        .map(|(i, _)| ground[i].position)
        .ok_or(NavigationError::GoalProjection)
}
