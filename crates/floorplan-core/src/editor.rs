//! The editor: owns every piece of editing state and routes user input to
//! the stores.

use crate::annotations::{ImageId, ImageSource, ImageUpdate, TextId, TextUpdate, is_image_url, is_url};
use crate::config::EditorConfig;
use crate::fixtures::{FixtureId, FixtureKind};
use crate::geometry;
use crate::history::History;
use crate::input::{Gesture, InputState, Modifiers, PointerEvent};
use crate::project::{FloorPlan, ProjectDocument, RestoreError};
use crate::selection::{SelectableKind, Selection, SelectionItem};
use crate::snap;
use crate::tools::{ToolKind, WallDrawing};
use crate::viewport::Viewport;
use crate::walls::{NodeId, SegmentId, WallType};
use kurbo::{Point, Rect, Size, Vec2};
use std::time::Instant;
use uuid::Uuid;

/// What a drag gesture is moving.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DragTarget {
    Node(NodeId),
    Image(ImageId),
    Text(TextId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    target: DragTarget,
    /// World position of the pointer at drag start.
    start: Point,
    /// Position of the dragged entity at drag start.
    origin: Point,
}

/// Interactive floor-plan editor.
///
/// All mutation happens synchronously inside the event methods. Each
/// discrete user action records one undo step before it mutates.
#[derive(Debug, Clone)]
pub struct Editor {
    plan: FloorPlan,
    selection: Selection,
    history: History,
    drawing: WallDrawing,
    tool: ToolKind,
    wall_type: WallType,
    /// Current pan/zoom.
    pub viewport: Viewport,
    config: EditorConfig,
    input: InputState,
    stage_size: Size,
    cursor: Point,
    drag: Option<DragState>,
    /// Screen position of the last pan step while panning the view.
    pan_anchor: Option<Point>,
    pending_image: Option<Point>,
    /// Pasted page URL waiting for the host to resolve it to an image.
    pending_link: Option<String>,
    changed: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            plan: FloorPlan::new(),
            selection: Selection::new(),
            history: History::new(config.effective_history_limit()),
            drawing: WallDrawing::new(),
            tool: ToolKind::default(),
            wall_type: WallType::default(),
            viewport: Viewport::default(),
            config,
            input: InputState::new(),
            stage_size: Size::new(800.0, 600.0),
            cursor: Point::ZERO,
            drag: None,
            pan_anchor: None,
            pending_image: None,
            pending_link: None,
            changed: false,
        }
    }

    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn drawing(&self) -> &WallDrawing {
        &self.drawing
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn wall_type(&self) -> WallType {
        self.wall_type
    }

    /// Last pointer position in world coordinates.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Size of the visible canvas in screen pixels, used to centre pastes.
    pub fn set_stage_size(&mut self, size: Size) {
        self.stage_size = size;
    }

    /// Switch tools. Leaving the wall tool drops any chain in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool == self.tool {
            return;
        }
        if self.tool == ToolKind::DrawWall {
            self.drawing.cancel();
        }
        log::debug!("Tool: {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
        self.pending_image = None;
    }

    pub fn set_wall_type(&mut self, wall_type: WallType) {
        self.wall_type = wall_type;
    }

    pub fn toggle_wall_type(&mut self) {
        self.wall_type = self.wall_type.toggled();
    }

    /// Whether anything changed since the last call. Clears the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Record an undo step for an edit that is about to happen.
    fn begin_edit(&mut self) {
        self.history.push(&self.plan);
        self.changed = true;
    }

    // --- pointer ---------------------------------------------------------

    /// Route a raw pointer event (screen coordinates) observed at `now`.
    pub fn handle_pointer_event(&mut self, event: PointerEvent, now: Instant) {
        for gesture in self.input.handle_pointer_event(event, now) {
            match gesture {
                Gesture::Click { position, modifiers } => {
                    let world = self.viewport.screen_to_world(position);
                    self.click(world, modifiers);
                }
                Gesture::DoubleClick { position } => {
                    let world = self.viewport.screen_to_world(position);
                    self.double_click(world);
                }
                Gesture::Hover { position } => {
                    let world = self.viewport.screen_to_world(position);
                    self.pointer_move(world);
                }
                Gesture::DragStart { position } => {
                    let world = self.viewport.screen_to_world(position);
                    if !self.begin_drag(world) && self.tool == ToolKind::Select {
                        self.pan_anchor = Some(position);
                    }
                }
                Gesture::DragMove { position } => {
                    if let Some(anchor) = self.pan_anchor {
                        self.viewport.pan(position - anchor);
                        self.pan_anchor = Some(position);
                    }
                    let world = self.viewport.screen_to_world(position);
                    self.pointer_move(world);
                    self.drag_to(world);
                }
                Gesture::DragEnd { position } => {
                    let dragged = self.drag.is_some() || self.pan_anchor.is_some();
                    self.end_drag();
                    self.pan_anchor = None;
                    // A shaky click with a placement tool still places.
                    if !dragged && self.tool != ToolKind::Select {
                        let world = self.viewport.screen_to_world(position);
                        self.click(world, self.input.modifiers);
                    }
                }
                Gesture::Wheel { position, delta_y } => self.viewport.wheel(position, delta_y),
            }
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    /// Handle a click at a world point with the current tool.
    pub fn click(&mut self, point: Point, modifiers: Modifiers) {
        self.cursor = point;
        match self.tool {
            ToolKind::Select => match self.plan.hit_test(point, self.config.hit_tolerance) {
                Some(item) if modifiers.shift => self.selection.add_to_selection(item),
                Some(item) => self.selection.select(item),
                None => self.selection.clear(),
            },
            ToolKind::DrawWall => {
                self.begin_edit();
                self.drawing.click(
                    self.plan.walls_mut(),
                    point,
                    self.wall_type,
                    self.config.grid_size,
                    self.config.node_snap_threshold,
                );
            }
            ToolKind::PlaceDoor => {
                self.place_fixture(FixtureKind::Door, point);
            }
            ToolKind::PlaceWindow => {
                self.place_fixture(FixtureKind::Window, point);
            }
            ToolKind::AddImage => self.pending_image = Some(point),
            ToolKind::AddText => {
                self.begin_edit();
                self.plan.annotations_mut().add_text(point);
            }
        }
    }

    /// Double-click ends a wall chain.
    pub fn double_click(&mut self, _point: Point) {
        if self.tool == ToolKind::DrawWall {
            self.drawing.double_click();
        }
    }

    /// Pointer moved to a world point.
    pub fn pointer_move(&mut self, point: Point) {
        self.cursor = point;
        if self.tool == ToolKind::DrawWall {
            self.drawing.pointer_move(point, self.config.grid_size);
        }
    }

    /// Snap to the nearest wall and attach a fixture there. Clicks away
    /// from every wall do nothing and record no undo step.
    pub fn place_fixture(&mut self, kind: FixtureKind, point: Point) -> Option<FixtureId> {
        let hit = snap::snap_to_wall(point, self.plan.walls(), self.config.wall_snap_threshold)?;
        self.begin_edit();
        let id = self.plan.fixtures_mut().add_fixture(
            kind,
            hit.wall_segment_id,
            hit.wall_parameter,
            hit.snapped_position,
            hit.rotation_degrees,
        );
        log::debug!("Placed {:?} on segment {} at t={:.3}", kind, hit.wall_segment_id, hit.wall_parameter);
        Some(id)
    }

    /// Start dragging whatever draggable item is under `point` (Select tool
    /// only). Returns false if nothing draggable was hit.
    pub fn begin_drag(&mut self, point: Point) -> bool {
        if self.tool != ToolKind::Select {
            return false;
        }
        let Some(item) = self.plan.hit_test(point, self.config.hit_tolerance) else {
            return false;
        };
        let (target, origin) = match item.kind {
            SelectableKind::Node => match self.plan.walls().node(item.id) {
                Some(node) => (DragTarget::Node(item.id), node.position),
                None => return false,
            },
            SelectableKind::Image => match self.plan.annotations().image(item.id) {
                Some(image) => (DragTarget::Image(item.id), image.position),
                None => return false,
            },
            SelectableKind::Text => match self.plan.annotations().text(item.id) {
                Some(text) => (DragTarget::Text(item.id), text.position),
                None => return false,
            },
            SelectableKind::Segment | SelectableKind::Door | SelectableKind::Window => return false,
        };
        self.begin_edit();
        self.drag = Some(DragState {
            target,
            start: point,
            origin,
        });
        true
    }

    /// Continue a drag. Nodes stay on the grid.
    pub fn drag_to(&mut self, point: Point) {
        let Some(drag) = self.drag else {
            return;
        };
        let moved = drag.origin + (point - drag.start);
        match drag.target {
            DragTarget::Node(id) => {
                let snapped = snap::snap_to_grid(moved, self.config.grid_size);
                self.plan.move_node(id, snapped);
            }
            DragTarget::Image(id) => self.plan.annotations_mut().update_image(
                id,
                ImageUpdate {
                    position: Some(moved),
                    ..Default::default()
                },
            ),
            DragTarget::Text(id) => self.plan.annotations_mut().update_text(
                id,
                TextUpdate {
                    position: Some(moved),
                    ..Default::default()
                },
            ),
        }
        self.changed = true;
    }

    /// Finish a drag. Fixtures follow walls moved by a node drag.
    pub fn end_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            if let DragTarget::Node(_) = drag.target {
                self.plan.resync_fixtures();
            }
        }
    }

    // --- keyboard --------------------------------------------------------

    /// Handle a key press. Returns true if the key did something.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        let lower = key.to_ascii_lowercase();
        if modifiers.command() {
            return match lower.as_str() {
                "z" if modifiers.shift => self.redo_logged(),
                "z" => self.undo_logged(),
                "y" => self.redo_logged(),
                _ => false,
            };
        }

        match lower.as_str() {
            "escape" => {
                if self.tool != ToolKind::Select {
                    self.drawing.cancel();
                    self.set_tool(ToolKind::Select);
                } else {
                    self.selection.clear();
                }
                true
            }
            "delete" | "backspace" => self.delete_selection(),
            "w" => {
                self.toggle_wall_type();
                true
            }
            "f" => self.flip_selected_doors(),
            _ => match ToolKind::from_shortcut(&lower) {
                Some(tool) => {
                    self.set_tool(tool);
                    true
                }
                None => false,
            },
        }
    }

    fn undo_logged(&mut self) -> bool {
        match self.undo() {
            Ok(done) => done,
            Err(err) => {
                log::warn!("Undo failed, state unchanged: {}", err);
                false
            }
        }
    }

    fn redo_logged(&mut self) -> bool {
        match self.redo() {
            Ok(done) => done,
            Err(err) => {
                log::warn!("Redo failed, state unchanged: {}", err);
                false
            }
        }
    }

    /// Step back one edit. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, RestoreError> {
        let done = self.history.undo(&mut self.plan)?;
        if done {
            self.after_restore();
        }
        Ok(done)
    }

    /// Step forward one undone edit.
    pub fn redo(&mut self) -> Result<bool, RestoreError> {
        let done = self.history.redo(&mut self.plan)?;
        if done {
            self.after_restore();
        }
        Ok(done)
    }

    fn after_restore(&mut self) {
        self.drag = None;
        let plan = &self.plan;
        self.selection.retain(|item| plan.contains(*item));
        self.changed = true;
    }

    /// Delete every selected item with cascades, as one undo step.
    pub fn delete_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.begin_edit();
        for item in self.selection.take() {
            self.plan.delete_item(item);
        }
        true
    }

    /// Mirror the swing of every selected door, as one undo step.
    pub fn flip_selected_doors(&mut self) -> bool {
        let doors: Vec<Uuid> = self
            .selection
            .selected_by_kind(SelectableKind::Door)
            .into_iter()
            .filter(|&id| self.plan.fixtures().get(id).is_some())
            .collect();
        if doors.is_empty() {
            return false;
        }
        self.begin_edit();
        for id in doors {
            self.plan.fixtures_mut().toggle_flip(id);
        }
        true
    }

    /// Change the type of a wall.
    pub fn set_segment_type(&mut self, id: SegmentId, wall_type: WallType) {
        if self.plan.walls().segment(id).is_some_and(|s| s.wall_type != wall_type) {
            self.begin_edit();
            self.plan.set_wall_type(id, wall_type);
        }
    }

    // --- annotations -----------------------------------------------------

    /// Where the AddImage tool was last clicked, if the host has not
    /// collected it yet.
    pub fn take_image_request(&mut self) -> Option<Point> {
        self.pending_image.take()
    }

    /// World point at the centre of the stage.
    pub fn visible_center(&self) -> Point {
        self.viewport.visible_center(self.stage_size)
    }

    /// Add an image from a URL at `at`, or at the view centre.
    pub fn add_image_from_url(&mut self, url: &str, source: Option<ImageSource>, at: Option<Point>) -> ImageId {
        let position = at.unwrap_or_else(|| self.visible_center());
        let size = self.config.pasted_image_size;
        self.begin_edit();
        let annotations = self.plan.annotations_mut();
        let id = annotations.add_image(url.trim(), position, size, size);
        if let Some(source) = source {
            annotations.update_image(
                id,
                ImageUpdate {
                    source: Some(source),
                    ..Default::default()
                },
            );
        }
        id
    }

    /// Paste text: image URLs become images at the view centre. Any other
    /// http(s) URL is kept for [`Editor::take_link_request`] so the host can
    /// resolve it and call [`Editor::add_image_from_url`] with a source.
    pub fn paste_text(&mut self, text: &str) -> Option<ImageId> {
        if is_image_url(text) {
            return Some(self.add_image_from_url(text, None, None));
        }
        if is_url(text) {
            self.pending_link = Some(text.trim().to_string());
        }
        None
    }

    /// Page URL pasted since the last call, if any.
    pub fn take_link_request(&mut self) -> Option<String> {
        self.pending_link.take()
    }

    /// Paste image data URLs as images at the view centre, one undo step.
    pub fn paste_images(&mut self, data_urls: &[String]) -> Vec<ImageId> {
        if data_urls.is_empty() {
            return Vec::new();
        }
        let center = self.visible_center();
        let size = self.config.pasted_image_size;
        self.begin_edit();
        data_urls
            .iter()
            .map(|url| self.plan.annotations_mut().add_image(url.as_str(), center, size, size))
            .collect()
    }

    /// Resize or rotate an image, as one undo step.
    pub fn transform_image(&mut self, id: ImageId, rect: Rect, rotation: f64) {
        if self.plan.annotations().image(id).is_some() {
            self.begin_edit();
            self.plan.annotations_mut().transform_image(id, rect, rotation);
        }
    }

    /// Resize or rotate a text box, as one undo step.
    pub fn transform_text(&mut self, id: TextId, position: Point, width: f64, rotation: f64) {
        if self.plan.annotations().text(id).is_some() {
            self.begin_edit();
            self.plan.annotations_mut().transform_text(id, position, width, rotation);
        }
    }

    /// Replace the content of a text note.
    pub fn edit_text(&mut self, id: TextId, content: &str) {
        if self.plan.annotations().text(id).is_some_and(|t| t.text != content) {
            self.begin_edit();
            self.plan.annotations_mut().update_text(
                id,
                TextUpdate {
                    text: Some(content.to_string()),
                    ..Default::default()
                },
            );
        }
    }

    // --- measurement & persistence ---------------------------------------

    /// Length label for a wall, e.g. `"3.50 m"`.
    pub fn segment_label(&self, id: SegmentId) -> Option<String> {
        let (start, end) = self.plan.walls().segment_endpoints(id)?;
        Some(geometry::format_length(start, end, self.config.pixels_per_meter))
    }

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
    }

    /// Replace the whole editing state with a saved project.
    ///
    /// History, selection and any gesture in progress are reset. On error
    /// nothing changes. A stored view that cannot be inverted is replaced by
    /// the default view.
    pub fn load_document(&mut self, document: &ProjectDocument) -> Result<(), RestoreError> {
        self.plan.restore_state(&document.state)?;
        self.viewport = match document.viewport {
            Some(viewport) if viewport.is_valid() => viewport,
            Some(viewport) => {
                log::warn!(
                    "Ignoring invalid view in '{}' (offset {:?}, scale {})",
                    document.name,
                    viewport.offset,
                    viewport.scale
                );
                Viewport::default()
            }
            None => Viewport::default(),
        };
        self.history.clear();
        self.selection.clear();
        self.drawing.cancel();
        self.drag = None;
        self.pan_anchor = None;
        self.pending_image = None;
        self.pending_link = None;
        self.changed = false;
        log::info!("Opened project '{}'", document.name);
        Ok(())
    }

    /// Write the current state and view into `document`.
    pub fn store_into(&self, document: &mut ProjectDocument) {
        document.state = self.plan.gather_state();
        document.viewport = Some(self.viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;

    fn draw_wall(editor: &mut Editor, from: Point, to: Point) {
        editor.set_tool(ToolKind::DrawWall);
        editor.click(from, Modifiers::NONE);
        editor.click(to, Modifiers::NONE);
        editor.double_click(to);
    }

    fn first_segment(editor: &Editor) -> SegmentId {
        editor.plan().walls().segments().next().unwrap().id
    }

    #[test]
    fn test_draw_chain_pushes_history_per_click() {
        let mut editor = Editor::new();
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(editor.plan().walls().segment_count(), 1);
        assert_eq!(editor.history().undo_len(), 2);
        assert!(!editor.drawing().is_drawing());

        editor.undo().unwrap();
        assert_eq!(editor.plan().walls().segment_count(), 0);
        assert_eq!(editor.plan().walls().node_count(), 1);
    }

    #[test]
    fn test_wall_type_toggle_applies_to_new_walls() {
        let mut editor = Editor::new();
        assert!(editor.handle_key("w", Modifiers::NONE));
        assert_eq!(editor.wall_type(), WallType::Interior);
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let seg = first_segment(&editor);
        assert_eq!(editor.plan().walls().segment(seg).unwrap().wall_type, WallType::Interior);
    }

    #[test]
    fn test_place_door_on_wall() {
        let mut editor = Editor::new();
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let undo_before = editor.history().undo_len();

        editor.set_tool(ToolKind::PlaceDoor);
        editor.click(Point::new(50.0, 3.0), Modifiers::NONE);
        let door = editor.plan().fixtures().of_kind(FixtureKind::Door).next().copied().unwrap();
        assert_eq!(door.position, Point::new(50.0, 0.0));
        assert_eq!(door.wall_segment_id, first_segment(&editor));
        assert_eq!(editor.history().undo_len(), undo_before + 1);

        // A miss records nothing.
        editor.click(Point::new(50.0, 80.0), Modifiers::NONE);
        assert_eq!(editor.plan().fixtures().len(), 1);
        assert_eq!(editor.history().undo_len(), undo_before + 1);
    }

    #[test]
    fn test_select_click_and_shift() {
        let mut editor = Editor::new();
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        editor.set_tool(ToolKind::Select);

        editor.click(Point::new(0.0, 0.0), Modifiers::NONE);
        assert_eq!(editor.selection().selected_by_kind(SelectableKind::Node).len(), 1);

        editor.click(Point::new(50.0, 2.0), Modifiers::NONE.with_shift());
        assert_eq!(editor.selection().len(), 2);

        editor.click(Point::new(50.0, 300.0), Modifiers::NONE);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_delete_selection_cascades_and_undoes() {
        let mut editor = Editor::new();
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        editor.set_tool(ToolKind::PlaceWindow);
        editor.click(Point::new(30.0, 2.0), Modifiers::NONE);
        let before = editor.plan().gather_state();

        editor.set_tool(ToolKind::Select);
        editor.click(Point::new(85.0, 2.0), Modifiers::NONE);
        assert!(editor.handle_key("Delete", Modifiers::NONE));
        assert_eq!(editor.plan().walls().segment_count(), 0);
        assert!(editor.plan().fixtures().is_empty());
        assert!(editor.selection().is_empty());

        assert!(editor.handle_key("z", Modifiers::NONE.with_ctrl()));
        assert_eq!(editor.plan().gather_state(), before);
        assert!(editor.handle_key("Z", Modifiers::NONE.with_meta().with_shift()));
        assert_eq!(editor.plan().walls().segment_count(), 0);
    }

    #[test]
    fn test_delete_with_empty_selection_is_noop() {
        let mut editor = Editor::new();
        assert!(!editor.handle_key("Backspace", Modifiers::NONE));
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn test_node_drag_snaps_and_resyncs_fixtures() {
        let mut editor = Editor::new();
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        editor.set_tool(ToolKind::PlaceDoor);
        editor.click(Point::new(50.0, 0.0), Modifiers::NONE);
        editor.set_tool(ToolKind::Select);

        assert!(editor.begin_drag(Point::new(100.0, 0.0)));
        editor.drag_to(Point::new(103.0, 98.0));
        editor.end_drag();

        let seg = first_segment(&editor);
        let (_, end) = editor.plan().walls().segment_endpoints(seg).unwrap();
        assert_eq!(end, Point::new(100.0, 100.0));
        let door = editor.plan().fixtures().fixtures().next().copied().unwrap();
        assert_eq!(door.position, Point::new(50.0, 50.0));
        assert!((door.rotation - 45.0).abs() < 1e-9);

        editor.undo().unwrap();
        let (_, end) = editor.plan().walls().segment_endpoints(seg).unwrap();
        assert_eq!(end, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_text_drag_moves_by_delta() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::AddText);
        editor.click(Point::new(10.0, 10.0), Modifiers::NONE);
        editor.set_tool(ToolKind::Select);

        assert!(editor.begin_drag(Point::new(20.0, 15.0)));
        editor.drag_to(Point::new(70.0, 35.0));
        editor.end_drag();
        let text = editor.plan().annotations().texts().next().unwrap();
        assert_eq!(text.position, Point::new(60.0, 30.0));
    }

    #[test]
    fn test_begin_drag_misses() {
        let mut editor = Editor::new();
        assert!(!editor.begin_drag(Point::new(10.0, 10.0)));
        editor.set_tool(ToolKind::DrawWall);
        assert!(!editor.begin_drag(Point::new(10.0, 10.0)));
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn test_escape_and_tool_keys() {
        let mut editor = Editor::new();
        assert!(editor.handle_key("2", Modifiers::NONE));
        assert_eq!(editor.tool(), ToolKind::DrawWall);
        editor.click(Point::new(0.0, 0.0), Modifiers::NONE);
        assert!(editor.drawing().is_drawing());

        assert!(editor.handle_key("Escape", Modifiers::NONE));
        assert_eq!(editor.tool(), ToolKind::Select);
        assert!(!editor.drawing().is_drawing());
        assert!(!editor.handle_key("q", Modifiers::NONE));
    }

    #[test]
    fn test_switching_tool_cancels_chain() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::DrawWall);
        editor.click(Point::new(0.0, 0.0), Modifiers::NONE);
        editor.set_tool(ToolKind::PlaceDoor);
        assert!(!editor.drawing().is_drawing());
    }

    #[test]
    fn test_flip_selected_doors() {
        let mut editor = Editor::new();
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let door = editor.place_fixture(FixtureKind::Door, Point::new(50.0, 1.0)).unwrap();
        editor.set_tool(ToolKind::Select);
        editor.click(Point::new(50.0, 1.0), Modifiers::NONE);

        assert!(editor.handle_key("f", Modifiers::NONE));
        assert!(editor.plan().fixtures().get(door).unwrap().flipped);
        editor.undo().unwrap();
        assert!(!editor.plan().fixtures().get(door).unwrap().flipped);
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::AddText);
        editor.click(Point::new(0.0, 0.0), Modifiers::NONE);
        editor.set_tool(ToolKind::Select);
        editor.click(Point::new(5.0, 5.0), Modifiers::NONE);
        assert_eq!(editor.selection().len(), 1);

        editor.undo().unwrap();
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_paste() {
        let mut editor = Editor::new();
        editor.set_stage_size(Size::new(400.0, 400.0));
        assert!(editor.paste_text("hello").is_none());

        let id = editor.paste_text(" https://example.com/chair.png ").unwrap();
        let image = editor.plan().annotations().image(id).unwrap();
        assert_eq!(image.src, "https://example.com/chair.png");
        assert_eq!(image.position, Point::new(200.0, 200.0));
        assert_eq!(image.width, 200.0);

        let ids = editor.paste_images(&["data:image/png;base64,AAA".to_string(), "data:image/png;base64,BBB".to_string()]);
        assert_eq!(ids.len(), 2);
        editor.undo().unwrap();
        assert_eq!(editor.plan().annotations().image_count(), 1);
    }

    #[test]
    fn test_paste_page_url_records_link_request() {
        let mut editor = Editor::new();
        assert!(editor.paste_text(" https://shop.example.com/chair ").is_none());
        assert!(editor.plan().annotations().is_empty());
        assert!(!editor.history().can_undo());
        assert_eq!(editor.take_link_request().as_deref(), Some("https://shop.example.com/chair"));
        assert!(editor.take_link_request().is_none());

        editor.paste_text("just words");
        assert!(editor.take_link_request().is_none());
    }

    #[test]
    fn test_image_request_flow() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::AddImage);
        editor.click(Point::new(30.0, 40.0), Modifiers::NONE);
        let at = editor.take_image_request();
        assert_eq!(at, Some(Point::new(30.0, 40.0)));
        assert!(editor.take_image_request().is_none());

        let mut source = ImageSource::new("https://www.example.com/sofa");
        source.title = Some("Sofa".to_string());
        let id = editor.add_image_from_url("https://cdn.example.com/sofa.jpg", Some(source), at);
        let image = editor.plan().annotations().image(id).unwrap();
        assert_eq!(image.position, Point::new(30.0, 40.0));
        assert_eq!(image.source.as_ref().unwrap().label(), "Sofa · example.com");
    }

    #[test]
    fn test_segment_label_and_changed_flag() {
        let mut editor = Editor::new();
        assert!(!editor.take_changed());
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(175.0, 0.0));
        assert!(editor.take_changed());
        assert!(!editor.take_changed());
        assert_eq!(editor.segment_label(first_segment(&editor)).as_deref(), Some("3.50 m"));
        assert!(editor.segment_label(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_pointer_events_draw_and_finish() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::DrawWall);
        let t0 = Instant::now();
        let tap = |editor: &mut Editor, p: Point, t: Instant| {
            editor.handle_pointer_event(PointerEvent::Down { position: p, button: MouseButton::Left }, t);
            editor.handle_pointer_event(PointerEvent::Up { position: p, button: MouseButton::Left }, t);
        };
        tap(&mut editor, Point::new(0.0, 0.0), t0);
        tap(&mut editor, Point::new(100.0, 0.0), t0 + std::time::Duration::from_secs(1));
        tap(&mut editor, Point::new(100.0, 0.0), t0 + std::time::Duration::from_millis(1100));

        assert_eq!(editor.plan().walls().segment_count(), 1);
        assert!(!editor.drawing().is_drawing());
    }

    #[test]
    fn test_pan_on_empty_drag() {
        let mut editor = Editor::new();
        let now = Instant::now();
        editor.handle_pointer_event(PointerEvent::Down { position: Point::new(10.0, 10.0), button: MouseButton::Left }, now);
        editor.handle_pointer_event(PointerEvent::Move { position: Point::new(60.0, 10.0) }, now);
        editor.handle_pointer_event(PointerEvent::Up { position: Point::new(60.0, 10.0), button: MouseButton::Left }, now);
        assert_eq!(editor.viewport.offset, Vec2::new(50.0, 0.0));
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn test_load_document_resets_state() {
        let mut editor = Editor::new();
        draw_wall(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let mut doc = ProjectDocument::new("Saved");
        editor.store_into(&mut doc);

        let mut other = Editor::new();
        other.load_document(&doc).unwrap();
        assert_eq!(other.plan().gather_state(), doc.state);
        assert!(!other.history().can_undo());
        assert!(!other.take_changed());
    }

    #[test]
    fn test_load_document_replaces_degenerate_view() {
        let json = r#"{"id":"p1","name":"Zero","viewport":{"offset":{"x":0.0,"y":0.0},"scale":0.0}}"#;
        let doc = ProjectDocument::from_json(json).unwrap();

        let mut editor = Editor::new();
        editor.set_stage_size(Size::new(400.0, 400.0));
        editor.load_document(&doc).unwrap();
        assert_eq!(editor.viewport, Viewport::default());

        let image = editor.paste_text("https://example.com/rug.png").unwrap();
        assert_eq!(editor.plan().annotations().image(image).unwrap().position, Point::new(200.0, 200.0));

        editor.set_tool(ToolKind::DrawWall);
        let now = Instant::now();
        let p = Point::new(50.0, 50.0);
        editor.handle_pointer_event(PointerEvent::Down { position: p, button: MouseButton::Left }, now);
        editor.handle_pointer_event(PointerEvent::Up { position: p, button: MouseButton::Left }, now);
        let node = editor.plan().walls().nodes().next().unwrap();
        assert_eq!(node.position, Point::new(50.0, 50.0));

        let mut saved = ProjectDocument::new("Again");
        editor.store_into(&mut saved);
        assert!(saved.state.validate().is_ok());
        assert!(Editor::new().load_document(&saved).is_ok());
    }

    #[test]
    fn test_load_document_keeps_valid_view() {
        let mut doc = ProjectDocument::new("Zoomed");
        doc.viewport = Some(Viewport { offset: Vec2::new(10.0, -20.0), scale: 2.0 });
        let mut editor = Editor::new();
        editor.load_document(&doc).unwrap();
        assert_eq!(editor.viewport, doc.viewport.unwrap());
    }

    #[test]
    fn test_edit_and_transform_annotations() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::AddText);
        editor.click(Point::new(0.0, 0.0), Modifiers::NONE);
        let text = editor.plan().annotations().texts().next().unwrap().id;

        editor.edit_text(text, "Living room");
        editor.transform_text(text, Point::new(5.0, 5.0), 300.0, 0.0);
        let note = editor.plan().annotations().text(text).unwrap();
        assert_eq!(note.text, "Living room");
        assert_eq!(note.width, 300.0);

        let image = editor.add_image_from_url("a.png", None, Some(Point::ZERO));
        editor.transform_image(image, Rect::new(0.0, 0.0, 5.0, 5.0), 10.0);
        assert_eq!(editor.plan().annotations().image(image).unwrap().width, 20.0);
    }
}
