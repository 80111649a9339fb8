//! Pan/zoom view transform.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum zoom scale.
pub const MIN_SCALE: f64 = 0.1;
/// Maximum zoom scale.
pub const MAX_SCALE: f64 = 5.0;
/// Zoom factor applied per wheel tick.
pub const ZOOM_STEP: f64 = 1.1;

/// The view onto the world: a translation followed by a uniform scale.
///
/// Screen = world * scale + offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset: Vec2,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// World to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Screen to world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping `screen_point` over the same world point.
    /// The scale is clamped to [`MIN_SCALE`, `MAX_SCALE`].
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.scale = new_scale;
        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
    }

    /// One wheel tick in.
    pub fn zoom_in_at(&mut self, screen_point: Point) {
        self.zoom_at(screen_point, ZOOM_STEP);
    }

    /// One wheel tick out.
    pub fn zoom_out_at(&mut self, screen_point: Point) {
        self.zoom_at(screen_point, 1.0 / ZOOM_STEP);
    }

    /// Apply a wheel event: negative `delta_y` zooms in.
    pub fn wheel(&mut self, screen_point: Point, delta_y: f64) {
        if delta_y > 0.0 {
            self.zoom_out_at(screen_point);
        } else {
            self.zoom_in_at(screen_point);
        }
    }

    /// World point at the centre of a stage of the given size.
    pub fn visible_center(&self, stage: Size) -> Point {
        self.screen_to_world(Point::new(stage.width / 2.0, stage.height / 2.0))
    }

    /// Whether the transform is invertible and inside the zoom range.
    pub fn is_valid(&self) -> bool {
        self.offset.x.is_finite()
            && self.offset.y.is_finite()
            && self.scale.is_finite()
            && (MIN_SCALE..=MAX_SCALE).contains(&self.scale)
    }
}
