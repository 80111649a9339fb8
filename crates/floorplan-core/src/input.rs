//! Pointer and keyboard event types, and gesture recognition.
//!
//! [`InputState`] turns raw pointer events (in screen coordinates) into
//! clicks, double-clicks and drags for the editor.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    Scroll { position: Point, delta: Vec2 },
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;
/// Screen pixels the pointer must travel before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// High-level gesture recognized from pointer events. Positions are in
/// screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Click { position: Point, modifiers: Modifiers },
    DoubleClick { position: Point },
    Hover { position: Point },
    DragStart { position: Point },
    DragMove { position: Point },
    DragEnd { position: Point },
    Wheel { position: Point, delta_y: f64 },
}

/// Tracks the left button across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub pointer_position: Point,
    pub modifiers: Modifiers,
    press_position: Option<Point>,
    dragging: bool,
    last_click: Option<(Instant, Point)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Feed one pointer event observed at `now`.
    ///
    /// Non-left buttons are ignored apart from updating the pointer position.
    pub fn handle_pointer_event(&mut self, event: PointerEvent, now: Instant) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                if button == MouseButton::Left {
                    self.press_position = Some(position);
                    self.dragging = false;
                }
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
                match self.press_position {
                    Some(_) if self.dragging => gestures.push(Gesture::DragMove { position }),
                    Some(start) if start.distance(position) >= DRAG_THRESHOLD => {
                        self.dragging = true;
                        gestures.push(Gesture::DragStart { position: start });
                        gestures.push(Gesture::DragMove { position });
                    }
                    Some(_) => {}
                    None => gestures.push(Gesture::Hover { position }),
                }
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                if button != MouseButton::Left || self.press_position.take().is_none() {
                    return gestures;
                }
                if self.dragging {
                    self.dragging = false;
                    gestures.push(Gesture::DragEnd { position });
                    return gestures;
                }
                gestures.push(Gesture::Click {
                    position,
                    modifiers: self.modifiers,
                });
                if self.register_click(position, now) {
                    gestures.push(Gesture::DoubleClick { position });
                }
            }
            PointerEvent::Scroll { position, delta } => {
                self.pointer_position = position;
                gestures.push(Gesture::Wheel {
                    position,
                    delta_y: delta.y,
                });
            }
        }
        gestures
    }

    /// Record a click; true when it completes a double-click. A detected
    /// double-click resets the tracker so a triple click is not a second one.
    fn register_click(&mut self, position: Point, now: Instant) -> bool {
        if let Some((time, last)) = self.last_click {
            let quick = now.saturating_duration_since(time) < DOUBLE_CLICK_TIME;
            if quick && last.distance(position) < DOUBLE_CLICK_DISTANCE {
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((now, position));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputState, p: Point, now: Instant) -> Vec<Gesture> {
        let mut out = input.handle_pointer_event(
            PointerEvent::Down {
                position: p,
                button: MouseButton::Left,
            },
            now,
        );
        out.extend(input.handle_pointer_event(
            PointerEvent::Up {
                position: p,
                button: MouseButton::Left,
            },
            now,
        ));
        out
    }

    #[test]
    fn test_click() {
        let mut input = InputState::new();
        let p = Point::new(10.0, 10.0);
        let gestures = press(&mut input, p, Instant::now());
        assert_eq!(
            gestures,
            vec![Gesture::Click {
                position: p,
                modifiers: Modifiers::NONE
            }]
        );
    }

    #[test]
    fn test_double_click() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        press(&mut input, Point::new(10.0, 10.0), t0);
        let second = press(&mut input, Point::new(11.0, 10.0), t0 + Duration::from_millis(200));
        assert_eq!(second.len(), 2);
        assert!(matches!(second[1], Gesture::DoubleClick { .. }));

        // Third click is not another double-click.
        let third = press(&mut input, Point::new(11.0, 10.0), t0 + Duration::from_millis(300));
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn test_slow_or_far_clicks_are_single() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        press(&mut input, Point::new(10.0, 10.0), t0);
        let slow = press(&mut input, Point::new(10.0, 10.0), t0 + Duration::from_millis(800));
        assert_eq!(slow.len(), 1);
        let far = press(&mut input, Point::new(40.0, 10.0), t0 + Duration::from_millis(900));
        assert_eq!(far.len(), 1);
    }

    #[test]
    fn test_drag() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_pointer_event(
            PointerEvent::Down {
                position: Point::new(0.0, 0.0),
                button: MouseButton::Left,
            },
            now,
        );
        let small = input.handle_pointer_event(PointerEvent::Move { position: Point::new(1.0, 1.0) }, now);
        assert!(small.is_empty());

        let start = input.handle_pointer_event(PointerEvent::Move { position: Point::new(10.0, 0.0) }, now);
        assert_eq!(start[0], Gesture::DragStart { position: Point::ZERO });
        assert!(input.is_dragging());

        let up = input.handle_pointer_event(
            PointerEvent::Up {
                position: Point::new(10.0, 0.0),
                button: MouseButton::Left,
            },
            now,
        );
        assert_eq!(up, vec![Gesture::DragEnd { position: Point::new(10.0, 0.0) }]);
        assert!(!input.is_dragging());
    }

    #[test]
    fn test_hover_and_wheel() {
        let mut input = InputState::new();
        let now = Instant::now();
        let hover = input.handle_pointer_event(PointerEvent::Move { position: Point::new(3.0, 4.0) }, now);
        assert_eq!(hover, vec![Gesture::Hover { position: Point::new(3.0, 4.0) }]);

        let wheel = input.handle_pointer_event(
            PointerEvent::Scroll {
                position: Point::ZERO,
                delta: Vec2::new(0.0, -120.0),
            },
            now,
        );
        assert_eq!(wheel, vec![Gesture::Wheel { position: Point::ZERO, delta_y: -120.0 }]);
    }

    #[test]
    fn test_command_modifier() {
        assert!(Modifiers::NONE.with_ctrl().command());
        assert!(Modifiers::NONE.with_meta().command());
        assert!(!Modifiers::NONE.with_shift().command());
    }
}
