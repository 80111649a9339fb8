//! Wall graph: nodes (points) joined by undirected wall segments.

use crate::geometry;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a wall node.
pub type NodeId = Uuid;

/// Unique identifier for a wall segment.
pub type SegmentId = Uuid;

/// Kind of wall, which drives thickness and color when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallType {
    Interior,
    #[default]
    Exterior,
}

impl WallType {
    /// The other wall type.
    pub fn toggled(self) -> Self {
        match self {
            WallType::Interior => WallType::Exterior,
            WallType::Exterior => WallType::Interior,
        }
    }

    /// Nominal wall thickness in pixels.
    pub fn thickness(self) -> f64 {
        match self {
            WallType::Interior => 6.0,
            WallType::Exterior => 12.0,
        }
    }
}

/// A point in the wall graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallNode {
    pub id: NodeId,
    pub position: Point,
}

/// An undirected edge between two distinct nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub id: SegmentId,
    pub start_node_id: NodeId,
    pub end_node_id: NodeId,
    pub wall_type: WallType,
}

impl WallSegment {
    /// Whether this segment joins `a` and `b`, in either direction.
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.start_node_id == a && self.end_node_id == b)
            || (self.start_node_id == b && self.end_node_id == a)
    }

    /// Whether `node` is one of this segment's endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        self.start_node_id == node || self.end_node_id == node
    }
}

/// Errors from checked wall graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("segment would start and end at node {0}")]
    DegenerateSegment(NodeId),
    #[error("unknown wall node: {0}")]
    UnknownNode(NodeId),
}

/// Plain serializable form of the wall graph, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallGraphState {
    pub nodes: Vec<WallNode>,
    pub segments: Vec<WallSegment>,
}

/// Owns all wall nodes and segments.
#[derive(Debug, Clone, Default)]
pub struct WallGraph {
    nodes: HashMap<NodeId, WallNode>,
    node_order: Vec<NodeId>,
    segments: HashMap<SegmentId, WallSegment>,
    segment_order: Vec<SegmentId>,
}

impl WallGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id.
    pub fn add_node(&mut self, position: Point) -> NodeId {
        let id = Uuid::new_v4();
        self.nodes.insert(id, WallNode { id, position });
        self.node_order.push(id);
        id
    }

    /// Move a node. Segments follow since they reference nodes by id.
    pub fn move_node(&mut self, id: NodeId, position: Point) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
    }

    /// Remove a node together with every segment touching it.
    ///
    /// Returns the ids of the removed segments so callers can cascade
    /// fixtures. Absent ids are a no-op.
    pub fn remove_node(&mut self, id: NodeId) -> Vec<SegmentId> {
        if self.nodes.remove(&id).is_none() {
            return Vec::new();
        }
        self.node_order.retain(|&n| n != id);

        let removed = self.segments_at_node(id);
        for seg_id in &removed {
            self.segments.remove(seg_id);
        }
        self.segment_order.retain(|s| !removed.contains(s));
        removed
    }

    /// Connect two nodes with a wall.
    ///
    /// If the unordered pair is already connected, the existing segment's
    /// id is returned and nothing changes.
    pub fn add_segment(
        &mut self,
        start: NodeId,
        end: NodeId,
        wall_type: WallType,
    ) -> Result<SegmentId, GraphError> {
        if start == end {
            return Err(GraphError::DegenerateSegment(start));
        }
        for node in [start, end] {
            if !self.nodes.contains_key(&node) {
                return Err(GraphError::UnknownNode(node));
            }
        }
        if let Some(existing) = self.find_segment(start, end) {
            return Ok(existing.id);
        }

        let id = Uuid::new_v4();
        self.segments.insert(
            id,
            WallSegment {
                id,
                start_node_id: start,
                end_node_id: end,
                wall_type,
            },
        );
        self.segment_order.push(id);
        Ok(id)
    }

    /// Remove a segment, leaving its nodes in place.
    pub fn remove_segment(&mut self, id: SegmentId) {
        if self.segments.remove(&id).is_some() {
            self.segment_order.retain(|&s| s != id);
        }
    }

    /// Change the type of an existing segment.
    pub fn set_wall_type(&mut self, id: SegmentId, wall_type: WallType) {
        if let Some(segment) = self.segments.get_mut(&id) {
            segment.wall_type = wall_type;
        }
    }

    /// First node (in insertion order) within `threshold` of `point`.
    pub fn find_node_near(&self, point: Point, threshold: f64) -> Option<&WallNode> {
        self.nodes()
            .find(|node| geometry::distance(node.position, point) <= threshold)
    }

    /// Closest node within `threshold` of `point`. Among equally close
    /// nodes the most recently added wins.
    pub fn nearest_node(&self, point: Point, threshold: f64) -> Option<&WallNode> {
        self.node_order
            .iter()
            .rev()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| (node, geometry::distance(node.position, point)))
            .filter(|(_, d)| *d <= threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }

    /// The segment joining `a` and `b` in either direction, if any.
    pub fn find_segment(&self, a: NodeId, b: NodeId) -> Option<&WallSegment> {
        self.segments().find(|s| s.connects(a, b))
    }

    /// Ids of the segments touching `node`, in insertion order.
    pub fn segments_at_node(&self, node: NodeId) -> Vec<SegmentId> {
        self.segments()
            .filter(|s| s.touches(node))
            .map(|s| s.id)
            .collect()
    }

    /// World positions of a segment's start and end nodes.
    pub fn segment_endpoints(&self, id: SegmentId) -> Option<(Point, Point)> {
        let segment = self.segments.get(&id)?;
        let start = self.nodes.get(&segment.start_node_id)?;
        let end = self.nodes.get(&segment.end_node_id)?;
        Some((start.position, end.position))
    }

    pub fn node(&self, id: NodeId) -> Option<&WallNode> {
        self.nodes.get(&id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&WallSegment> {
        self.segments.get(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &WallNode> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Segments in insertion order.
    pub fn segments(&self) -> impl Iterator<Item = &WallSegment> {
        self.segment_order.iter().filter_map(|id| self.segments.get(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.segments.is_empty()
    }

    /// Sum of all segment lengths in pixels.
    pub fn total_length(&self) -> f64 {
        self.segments()
            .filter_map(|s| self.segment_endpoints(s.id))
            .map(|(a, b)| geometry::distance(a, b))
            .sum()
    }

    /// Copy the graph out as plain data.
    pub fn to_state(&self) -> WallGraphState {
        WallGraphState {
            nodes: self.nodes().copied().collect(),
            segments: self.segments().copied().collect(),
        }
    }

    /// Build a graph from plain data, trusting it to be consistent.
    pub fn from_state(state: &WallGraphState) -> Self {
        let mut graph = Self::new();
        for node in &state.nodes {
            if graph.nodes.insert(node.id, *node).is_none() {
                graph.node_order.push(node.id);
            }
        }
        for segment in &state.segments {
            if graph.segments.insert(segment.id, *segment).is_none() {
                graph.segment_order.push(segment.id);
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_wall() -> (WallGraph, NodeId, NodeId, SegmentId) {
        let mut graph = WallGraph::new();
        let a = graph.add_node(Point::new(0.0, 0.0));
        let b = graph.add_node(Point::new(100.0, 0.0));
        let s = graph.add_segment(a, b, WallType::Exterior).unwrap();
        (graph, a, b, s)
    }

    #[test]
    fn test_add_node() {
        let mut graph = WallGraph::new();
        let id = graph.add_node(Point::new(10.0, 20.0));
        assert_eq!(graph.node(id).unwrap().position, Point::new(10.0, 20.0));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_move_node() {
        let (mut graph, a, _, s) = graph_with_wall();
        graph.move_node(a, Point::new(0.0, 50.0));
        let (start, _) = graph.segment_endpoints(s).unwrap();
        assert_eq!(start, Point::new(0.0, 50.0));
    }

    #[test]
    fn test_move_missing_node_is_noop() {
        let (mut graph, _, _, _) = graph_with_wall();
        let before = graph.to_state();
        graph.move_node(Uuid::new_v4(), Point::new(1.0, 1.0));
        assert_eq!(graph.to_state(), before);
    }

    #[test]
    fn test_segment_dedup_is_order_independent() {
        let (mut graph, a, b, s) = graph_with_wall();
        assert_eq!(graph.add_segment(a, b, WallType::Exterior), Ok(s));
        assert_eq!(graph.add_segment(b, a, WallType::Interior), Ok(s));
        assert_eq!(graph.segment_count(), 1);
        // The existing segment keeps its type.
        assert_eq!(graph.segment(s).unwrap().wall_type, WallType::Exterior);
    }

    #[test]
    fn test_add_segment_rejects_self_loop() {
        let mut graph = WallGraph::new();
        let a = graph.add_node(Point::ZERO);
        assert_eq!(
            graph.add_segment(a, a, WallType::Interior),
            Err(GraphError::DegenerateSegment(a))
        );
        assert_eq!(graph.segment_count(), 0);
    }

    #[test]
    fn test_add_segment_rejects_unknown_node() {
        let mut graph = WallGraph::new();
        let a = graph.add_node(Point::ZERO);
        let ghost = Uuid::new_v4();
        assert_eq!(
            graph.add_segment(a, ghost, WallType::Interior),
            Err(GraphError::UnknownNode(ghost))
        );
    }

    #[test]
    fn test_remove_node_cascades_segments() {
        let (mut graph, a, b, s) = graph_with_wall();
        let c = graph.add_node(Point::new(100.0, 100.0));
        let s2 = graph.add_segment(b, c, WallType::Interior).unwrap();

        let removed = graph.remove_node(b);
        assert_eq!(removed, vec![s, s2]);
        assert_eq!(graph.segment_count(), 0);
        assert!(graph.node(a).is_some());
        assert!(graph.node(c).is_some());
        assert!(graph.segments().all(|seg| !seg.touches(b)));
    }

    #[test]
    fn test_remove_missing_node_is_noop() {
        let (mut graph, _, _, _) = graph_with_wall();
        assert!(graph.remove_node(Uuid::new_v4()).is_empty());
        assert_eq!(graph.segment_count(), 1);
    }

    #[test]
    fn test_remove_segment_keeps_nodes() {
        let (mut graph, a, b, s) = graph_with_wall();
        graph.remove_segment(s);
        assert_eq!(graph.segment_count(), 0);
        assert!(graph.node(a).is_some());
        assert!(graph.node(b).is_some());
    }

    #[test]
    fn test_find_node_near() {
        let (graph, a, _, _) = graph_with_wall();
        assert_eq!(graph.find_node_near(Point::new(3.0, 4.0), 5.0).map(|n| n.id), Some(a));
        assert!(graph.find_node_near(Point::new(50.0, 50.0), 10.0).is_none());
    }

    #[test]
    fn test_find_node_near_prefers_insertion_order() {
        let mut graph = WallGraph::new();
        let first = graph.add_node(Point::new(0.0, 0.0));
        let _second = graph.add_node(Point::new(2.0, 0.0));
        let found = graph.find_node_near(Point::new(1.5, 0.0), 10.0).unwrap();
        assert_eq!(found.id, first);
    }

    #[test]
    fn test_nearest_node() {
        let mut graph = WallGraph::new();
        let first = graph.add_node(Point::new(0.0, 0.0));
        let second = graph.add_node(Point::new(4.0, 0.0));
        assert_eq!(graph.nearest_node(Point::new(3.0, 0.0), 10.0).map(|n| n.id), Some(second));
        assert_eq!(graph.nearest_node(Point::new(1.0, 0.0), 10.0).map(|n| n.id), Some(first));
        assert!(graph.nearest_node(Point::new(30.0, 0.0), 10.0).is_none());

        let stacked = graph.add_node(Point::new(4.0, 0.0));
        assert_eq!(graph.nearest_node(Point::new(4.0, 0.0), 10.0).map(|n| n.id), Some(stacked));
    }

    #[test]
    fn test_set_wall_type() {
        let (mut graph, _, _, s) = graph_with_wall();
        graph.set_wall_type(s, WallType::Interior);
        assert_eq!(graph.segment(s).unwrap().wall_type, WallType::Interior);
    }

    #[test]
    fn test_total_length() {
        let (graph, _, _, _) = graph_with_wall();
        assert_eq!(graph.total_length(), 100.0);
    }

    #[test]
    fn test_state_preserves_order() {
        let (graph, a, b, s) = graph_with_wall();
        let state = graph.to_state();
        assert_eq!(state.nodes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(state.segments[0].id, s);

        let rebuilt = WallGraph::from_state(&state);
        assert_eq!(rebuilt.to_state(), state);
    }

    #[test]
    fn test_wall_type_toggle() {
        assert_eq!(WallType::Interior.toggled(), WallType::Exterior);
        assert_eq!(WallType::Exterior.toggled(), WallType::Interior);
        assert!(WallType::Exterior.thickness() > WallType::Interior.thickness());
    }
}
