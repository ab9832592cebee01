//! Greedy single-pass obstacle router.
//!
//! Obstacles are visited in input order. Each one is inflated by [`MARGIN`]; when the bounding
//! box of the leg from the running point to the target touches the inflated box, one waypoint is
//! dropped beside it on the side facing the target and routing continues from there. This is a
//! local heuristic: chained or overlapping obstacles are handled best-effort only.

use crate::geom::{EntityRect, Point, point};
use crate::path::ControlAnchor;

pub const MARGIN: f64 = 25.0;
pub const CLEARANCE_X: f64 = 20.0;
pub const CLEARANCE_Y: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub waypoints: Vec<Point>,
    pub control: ControlAnchor,
}

pub fn route(start: Point, end: Point, obstacles: &[EntityRect]) -> Route {
    let mut waypoints = Vec::new();
    let mut cursor = start;

    for obstacle in obstacles {
        let expanded = obstacle.inflate(MARGIN);
        if !expanded.overlaps_segment_bounds(cursor, end) {
            continue;
        }
        let waypoint = detour(obstacle, &expanded, end);
        tracing::trace!(
            x = waypoint.x,
            y = waypoint.y,
            "obstacle intersects leg, inserting waypoint"
        );
        waypoints.push(waypoint);
        cursor = waypoint;
    }

    let control = match (waypoints.first(), waypoints.last()) {
        (Some(first), Some(last)) => ControlAnchor::pair(*first, *last),
        _ => ControlAnchor::single(start.lerp(end, 0.5)),
    };
    Route { waypoints, control }
}

fn detour(obstacle: &EntityRect, expanded: &EntityRect, end: Point) -> Point {
    let center = obstacle.center();
    let x = if end.x >= center.x {
        expanded.right() + CLEARANCE_X
    } else {
        expanded.left() - CLEARANCE_X
    };
    let y = if end.y >= center.y {
        expanded.bottom() + CLEARANCE_Y
    } else {
        expanded.top() - CLEARANCE_Y
    };
    point(x, y)
}
