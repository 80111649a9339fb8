//! Snapping: grid points, existing nodes, and the nearest wall.

use crate::geometry;
use crate::walls::{NodeId, SegmentId, WallGraph};
use kurbo::Point;

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 25.0;

/// Radius within which a drawing click reuses an existing node.
pub const NODE_SNAP_THRESHOLD: f64 = 10.0;

/// Radius within which a door or window attaches to a wall.
pub const WALL_SNAP_THRESHOLD: f64 = 20.0;

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    geometry::snap_point_to_grid(point, grid_size)
}

/// Result of resolving a drawing click to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSnap {
    /// An existing node was close enough to reuse.
    Existing(NodeId),
    /// A new node was created.
    Created(NodeId),
}

impl NodeSnap {
    pub fn id(self) -> NodeId {
        match self {
            NodeSnap::Existing(id) | NodeSnap::Created(id) => id,
        }
    }
}

/// Find an existing node near `point` without mutating the graph.
pub fn snap_to_node(walls: &WallGraph, point: Point, threshold: f64) -> Option<NodeId> {
    walls.find_node_near(point, threshold).map(|node| node.id)
}

/// Grid-snap `point`, then reuse a node within `threshold` of the snapped
/// position or create one there.
pub fn resolve_node(walls: &mut WallGraph, point: Point, grid_size: f64, threshold: f64) -> NodeSnap {
    let snapped = snap_to_grid(point, grid_size);
    match snap_to_node(walls, snapped, threshold) {
        Some(id) => NodeSnap::Existing(id),
        None => NodeSnap::Created(walls.add_node(snapped)),
    }
}

/// Where a point lands when attached to the nearest wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSnap {
    pub wall_segment_id: SegmentId,
    /// Parameter along the segment in `[0, 1]`.
    pub wall_parameter: f64,
    pub snapped_position: Point,
    /// Direction of the wall from start to end node, in degrees.
    pub rotation_degrees: f64,
    pub distance: f64,
}

/// Snap `point` to the closest wall segment within `threshold`.
///
/// Segments are visited in insertion order and the first minimal distance
/// wins ties. Segments with a missing endpoint are skipped.
pub fn snap_to_wall(point: Point, walls: &WallGraph, threshold: f64) -> Option<WallSnap> {
    let mut best: Option<WallSnap> = None;

    for segment in walls.segments() {
        let Some((start, end)) = walls.segment_endpoints(segment.id) else {
            continue;
        };
        let projection = geometry::project_point_on_segment(point, start, end);
        if projection.distance > threshold {
            continue;
        }
        if best.is_some_and(|b| projection.distance >= b.distance) {
            continue;
        }
        best = Some(WallSnap {
            wall_segment_id: segment.id,
            wall_parameter: projection.t,
            snapped_position: projection.projected,
            rotation_degrees: geometry::angle_degrees(start, end),
            distance: projection.distance,
        });
    }

    best
}
