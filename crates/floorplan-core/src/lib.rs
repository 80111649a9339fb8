//! Floor Plan Core Library
//!
//! Platform-agnostic editing engine for 2D floor plans: a wall graph with
//! doors and windows attached to its segments, free-floating moodboard
//! annotations, snapping, selection, and snapshot undo/redo.

pub mod annotations;
pub mod config;
pub mod editor;
pub mod fixtures;
pub mod geometry;
pub mod history;
pub mod input;
pub mod project;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod tools;
pub mod viewport;
pub mod walls;

pub use annotations::{AnnotationImage, AnnotationStore, AnnotationText, ImageId, ImageSource, TextId};
pub use config::{ConfigError, EditorConfig};
pub use editor::Editor;
pub use fixtures::{Fixture, FixtureId, FixtureKind, FixtureStore};
pub use history::History;
pub use input::{InputState, Modifiers, MouseButton, PointerEvent};
pub use project::{FloorPlan, PlanStats, ProjectDocument, RestoreError, Snapshot};
pub use selection::{SelectableKind, Selection, SelectionItem};
pub use snap::{GRID_SIZE, NodeSnap, WallSnap, snap_to_grid, snap_to_node, snap_to_wall};
pub use tools::{DrawingState, ToolKind, WallDrawing};
pub use viewport::Viewport;
pub use walls::{GraphError, NodeId, SegmentId, WallGraph, WallNode, WallSegment, WallType};
