//! The floor plan aggregate, its snapshots and saved documents.
//!
//! [`FloorPlan`] owns the wall graph, fixture store and annotation store and
//! is the only place that coordinates them: cascade deletes and snapshot
//! restore go through here.

use crate::annotations::{AnnotationState, AnnotationStore};
use crate::fixtures::{FixtureId, FixtureKind, FixtureState, FixtureStore};
use crate::geometry;
use crate::selection::{SelectableKind, SelectionItem};
use crate::viewport::Viewport;
use crate::walls::{GraphError, NodeId, SegmentId, WallGraph, WallGraphState, WallType};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Hit radius around a node, added to the pointer tolerance.
const NODE_RADIUS: f64 = 5.0;

/// Point-in-time copy of everything editable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub walls: WallGraphState,
    #[serde(default)]
    pub fixtures: FixtureState,
    #[serde(default)]
    pub annotations: AnnotationState,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.walls.nodes.is_empty()
            && self.walls.segments.is_empty()
            && self.fixtures.fixtures.is_empty()
            && self.annotations.images.is_empty()
            && self.annotations.texts.is_empty()
    }

    /// Check internal consistency without building any stores.
    pub fn validate(&self) -> Result<(), RestoreError> {
        let mut ids = HashSet::new();
        let mut claim = |id: Uuid| {
            if ids.insert(id) {
                Ok(())
            } else {
                Err(RestoreError::DuplicateId(id))
            }
        };

        for node in &self.walls.nodes {
            claim(node.id)?;
            if !(node.position.x.is_finite() && node.position.y.is_finite()) {
                return Err(RestoreError::NonFinitePosition(node.id));
            }
        }
        let nodes: HashSet<NodeId> = self.walls.nodes.iter().map(|n| n.id).collect();

        let mut pairs: Vec<(SegmentId, NodeId, NodeId)> = Vec::new();
        for segment in &self.walls.segments {
            claim(segment.id)?;
            for node in [segment.start_node_id, segment.end_node_id] {
                if !nodes.contains(&node) {
                    return Err(RestoreError::UnknownNode {
                        segment: segment.id,
                        node,
                    });
                }
            }
            if segment.start_node_id == segment.end_node_id {
                return Err(RestoreError::DegenerateSegment(segment.id));
            }
            if let Some(&(existing, _, _)) = pairs
                .iter()
                .find(|(_, a, b)| segment.connects(*a, *b))
            {
                return Err(RestoreError::DuplicateSegment {
                    segment: segment.id,
                    existing,
                });
            }
            pairs.push((segment.id, segment.start_node_id, segment.end_node_id));
        }
        let segments: HashSet<SegmentId> = pairs.iter().map(|(id, _, _)| *id).collect();

        for fixture in &self.fixtures.fixtures {
            claim(fixture.id)?;
            if !segments.contains(&fixture.wall_segment_id) {
                return Err(RestoreError::OrphanFixture {
                    fixture: fixture.id,
                    segment: fixture.wall_segment_id,
                });
            }
            let t = fixture.wall_parameter;
            if !(t.is_finite() && (0.0..=1.0).contains(&t)) {
                return Err(RestoreError::InvalidWallParameter {
                    fixture: fixture.id,
                    value: t,
                });
            }
        }

        for image in &self.annotations.images {
            claim(image.id)?;
        }
        for text in &self.annotations.texts {
            claim(text.id)?;
        }
        Ok(())
    }
}

/// Why a snapshot was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestoreError {
    #[error("id {0} is used more than once")]
    DuplicateId(Uuid),
    #[error("node {0} has a non-finite position")]
    NonFinitePosition(NodeId),
    #[error("segment {segment} references unknown node {node}")]
    UnknownNode { segment: SegmentId, node: NodeId },
    #[error("segment {0} starts and ends at the same node")]
    DegenerateSegment(SegmentId),
    #[error("segment {segment} duplicates segment {existing}")]
    DuplicateSegment { segment: SegmentId, existing: SegmentId },
    #[error("fixture {fixture} references missing segment {segment}")]
    OrphanFixture { fixture: FixtureId, segment: SegmentId },
    #[error("fixture {fixture} has wall parameter {value} outside [0, 1]")]
    InvalidWallParameter { fixture: FixtureId, value: f64 },
}

/// Counts and totals for a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlanStats {
    pub nodes: usize,
    pub segments: usize,
    pub doors: usize,
    pub windows: usize,
    pub images: usize,
    pub texts: usize,
    /// Sum of wall lengths in pixels.
    pub wall_length: f64,
}

/// The three editable stores.
#[derive(Debug, Clone, Default)]
pub struct FloorPlan {
    walls: WallGraph,
    fixtures: FixtureStore,
    annotations: AnnotationStore,
}

impl FloorPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan from a snapshot, validating it first.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, RestoreError> {
        let mut plan = Self::new();
        plan.restore_state(snapshot)?;
        Ok(plan)
    }

    pub fn walls(&self) -> &WallGraph {
        &self.walls
    }

    /// Mutable wall graph for additive edits (drawing). Removals must go
    /// through [`FloorPlan::remove_node`] / [`FloorPlan::remove_segment`].
    pub(crate) fn walls_mut(&mut self) -> &mut WallGraph {
        &mut self.walls
    }

    pub fn fixtures(&self) -> &FixtureStore {
        &self.fixtures
    }

    pub fn fixtures_mut(&mut self) -> &mut FixtureStore {
        &mut self.fixtures
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut AnnotationStore {
        &mut self.annotations
    }

    pub fn add_node(&mut self, position: Point) -> NodeId {
        self.walls.add_node(position)
    }

    pub fn move_node(&mut self, id: NodeId, position: Point) {
        self.walls.move_node(id, position);
    }

    pub fn add_segment(&mut self, start: NodeId, end: NodeId, wall_type: WallType) -> Result<SegmentId, GraphError> {
        self.walls.add_segment(start, end, wall_type)
    }

    pub fn set_wall_type(&mut self, id: SegmentId, wall_type: WallType) {
        self.walls.set_wall_type(id, wall_type);
    }

    /// Remove a node, its segments, and the fixtures on those segments.
    pub fn remove_node(&mut self, id: NodeId) {
        for segment in self.walls.remove_node(id) {
            self.fixtures.remove_fixtures_for_segment(segment);
        }
    }

    /// Remove a segment and its fixtures. The nodes stay.
    pub fn remove_segment(&mut self, id: SegmentId) {
        self.fixtures.remove_fixtures_for_segment(id);
        self.walls.remove_segment(id);
    }

    /// Recompute fixture positions after nodes moved.
    pub fn resync_fixtures(&mut self) {
        self.fixtures.resync(&self.walls);
    }

    /// Delete whatever a selection item refers to, with cascades.
    ///
    /// A door id tagged as a window (or the reverse) is ignored.
    pub fn delete_item(&mut self, item: SelectionItem) {
        match item.kind {
            SelectableKind::Node => self.remove_node(item.id),
            SelectableKind::Segment => self.remove_segment(item.id),
            SelectableKind::Door | SelectableKind::Window => {
                let expected = if item.kind == SelectableKind::Door {
                    FixtureKind::Door
                } else {
                    FixtureKind::Window
                };
                if self.fixtures.get(item.id).is_some_and(|f| f.kind == expected) {
                    self.fixtures.remove_fixture(item.id);
                }
            }
            SelectableKind::Image => self.annotations.remove_image(item.id),
            SelectableKind::Text => self.annotations.remove_text(item.id),
        }
    }

    /// Whether the item still exists.
    pub fn contains(&self, item: SelectionItem) -> bool {
        match item.kind {
            SelectableKind::Node => self.walls.node(item.id).is_some(),
            SelectableKind::Segment => self.walls.segment(item.id).is_some(),
            SelectableKind::Door => self.fixtures.get(item.id).is_some_and(|f| f.kind == FixtureKind::Door),
            SelectableKind::Window => self.fixtures.get(item.id).is_some_and(|f| f.kind == FixtureKind::Window),
            SelectableKind::Image => self.annotations.image(item.id).is_some(),
            SelectableKind::Text => self.annotations.text(item.id).is_some(),
        }
    }

    /// Topmost item under `point`.
    ///
    /// Annotations sit above fixtures, fixtures above nodes, nodes above
    /// wall segments. Within a layer, later items win.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<SelectionItem> {
        let texts: Vec<_> = self.annotations.texts().collect();
        if let Some(text) = texts.iter().rev().find(|t| t.hit_test(point, tolerance)) {
            return Some(SelectionItem::new(text.id, SelectableKind::Text));
        }
        let images: Vec<_> = self.annotations.images().collect();
        if let Some(image) = images.iter().rev().find(|i| i.hit_test(point, tolerance)) {
            return Some(SelectionItem::new(image.id, SelectableKind::Image));
        }

        let fixtures: Vec<_> = self.fixtures.fixtures().collect();
        for fixture in fixtures.iter().rev() {
            let half = Vec2::from_angle(fixture.rotation.to_radians()) * (fixture.width / 2.0);
            let slop = tolerance + self.host_thickness(fixture.wall_segment_id) / 2.0;
            let projection =
                geometry::project_point_on_segment(point, fixture.position - half, fixture.position + half);
            if projection.distance <= slop {
                let kind = match fixture.kind {
                    FixtureKind::Door => SelectableKind::Door,
                    FixtureKind::Window => SelectableKind::Window,
                };
                return Some(SelectionItem::new(fixture.id, kind));
            }
        }

        if let Some(node) = self.walls.nearest_node(point, tolerance + NODE_RADIUS) {
            return Some(SelectionItem::new(node.id, SelectableKind::Node));
        }

        let segments: Vec<_> = self.walls.segments().collect();
        for segment in segments.iter().rev() {
            let Some((start, end)) = self.walls.segment_endpoints(segment.id) else {
                continue;
            };
            let projection = geometry::project_point_on_segment(point, start, end);
            if projection.distance <= tolerance + segment.wall_type.thickness() / 2.0 {
                return Some(SelectionItem::new(segment.id, SelectableKind::Segment));
            }
        }
        None
    }

    fn host_thickness(&self, segment: SegmentId) -> f64 {
        self.walls
            .segment(segment)
            .map(|s| s.wall_type.thickness())
            .unwrap_or_else(|| WallType::default().thickness())
    }

    /// Snapshot of all three stores.
    pub fn gather_state(&self) -> Snapshot {
        Snapshot {
            walls: self.walls.to_state(),
            fixtures: self.fixtures.to_state(),
            annotations: self.annotations.to_state(),
        }
    }

    /// Replace all three stores with the snapshot's contents.
    ///
    /// The snapshot is validated first; on error nothing changes.
    pub fn restore_state(&mut self, snapshot: &Snapshot) -> Result<(), RestoreError> {
        snapshot.validate()?;
        self.walls = WallGraph::from_state(&snapshot.walls);
        self.fixtures = FixtureStore::from_state(&snapshot.fixtures);
        self.annotations = AnnotationStore::from_state(&snapshot.annotations);
        Ok(())
    }

    pub fn stats(&self) -> PlanStats {
        PlanStats {
            nodes: self.walls.node_count(),
            segments: self.walls.segment_count(),
            doors: self.fixtures.of_kind(FixtureKind::Door).count(),
            windows: self.fixtures.of_kind(FixtureKind::Window).count(),
            images: self.annotations.image_count(),
            texts: self.annotations.text_count(),
            wall_length: self.walls.total_length(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.fixtures.is_empty() && self.annotations.is_empty()
    }
}

/// A saved project: a named snapshot plus the last view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: Snapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl ProjectDocument {
    /// New empty project with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            state: Snapshot::default(),
            viewport: None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build the live plan, validating the stored state.
    pub fn to_floor_plan(&self) -> Result<FloorPlan, RestoreError> {
        FloorPlan::from_snapshot(&self.state)
    }
}
