//! Tool modes and the wall drawing state machine.

use crate::snap::{self, NodeSnap};
use crate::walls::{NodeId, SegmentId, WallGraph, WallType};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    DrawWall,
    PlaceDoor,
    PlaceWindow,
    AddImage,
    AddText,
}

impl ToolKind {
    /// Every tool, in shortcut order.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Select,
        ToolKind::DrawWall,
        ToolKind::PlaceDoor,
        ToolKind::PlaceWindow,
        ToolKind::AddImage,
        ToolKind::AddText,
    ];

    /// Tool bound to a number key (`"1"` through `"6"`).
    pub fn from_shortcut(key: &str) -> Option<Self> {
        let index: usize = key.parse().ok()?;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Number key for this tool.
    pub fn shortcut(self) -> char {
        match self {
            ToolKind::Select => '1',
            ToolKind::DrawWall => '2',
            ToolKind::PlaceDoor => '3',
            ToolKind::PlaceWindow => '4',
            ToolKind::AddImage => '5',
            ToolKind::AddText => '6',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::DrawWall => "Draw Wall",
            ToolKind::PlaceDoor => "Place Door",
            ToolKind::PlaceWindow => "Place Window",
            ToolKind::AddImage => "Add Image",
            ToolKind::AddText => "Add Text",
        }
    }
}

/// State of the wall drawing machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    /// A chain is in progress; the next click extends it from `active_node`.
    Drawing { active_node: NodeId },
}

/// What one drawing click did to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawStep {
    pub node: NodeSnap,
    pub segment: Option<SegmentId>,
}

/// Chained polyline wall drawing.
///
/// The machine holds no graph state of its own; callers pass the graph in.
#[derive(Debug, Clone, Default)]
pub struct WallDrawing {
    state: DrawingState,
    preview_end: Option<Point>,
}

impl WallDrawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawingState::Drawing { .. })
    }

    pub fn active_node(&self) -> Option<NodeId> {
        match self.state {
            DrawingState::Idle => None,
            DrawingState::Drawing { active_node } => Some(active_node),
        }
    }

    /// Grid-snapped end of the rubber-band line, while drawing.
    pub fn preview_end(&self) -> Option<Point> {
        self.preview_end
    }

    /// Rubber-band line from the active node to the preview end.
    pub fn preview_line(&self, walls: &WallGraph) -> Option<(Point, Point)> {
        let start = walls.node(self.active_node()?)?.position;
        Some((start, self.preview_end?))
    }

    /// Place the next point of the chain.
    ///
    /// The point is grid-snapped and merged into a nearby node. From
    /// `Drawing`, a segment joins the previous node to the new one unless
    /// both resolve to the same node. An active node that no longer exists
    /// is treated as `Idle`.
    pub fn click(
        &mut self,
        walls: &mut WallGraph,
        point: Point,
        wall_type: WallType,
        grid_size: f64,
        node_threshold: f64,
    ) -> DrawStep {
        let previous = self.active_node().filter(|&id| walls.node(id).is_some());
        let node = snap::resolve_node(walls, point, grid_size, node_threshold);
        let current = node.id();

        let segment = match previous {
            Some(prev) if prev != current => match walls.add_segment(prev, current, wall_type) {
                Ok(id) => Some(id),
                Err(err) => {
                    log::warn!("Wall segment not created: {}", err);
                    None
                }
            },
            _ => None,
        };

        if previous.is_none() {
            log::debug!("Wall chain started at node {}", current);
        }
        self.state = DrawingState::Drawing { active_node: current };
        self.preview_end = walls.node(current).map(|n| n.position);
        DrawStep { node, segment }
    }

    /// Move the preview end; ignored while idle.
    pub fn pointer_move(&mut self, point: Point, grid_size: f64) {
        if self.is_drawing() {
            self.preview_end = Some(snap::snap_to_grid(point, grid_size));
        }
    }

    /// Finish the chain without adding a segment.
    pub fn double_click(&mut self) {
        if self.is_drawing() {
            log::debug!("Wall chain finished");
        }
        self.reset();
    }

    /// Drop the pending chain. Segments already placed stay.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = DrawingState::Idle;
        self.preview_end = None;
    }
}
