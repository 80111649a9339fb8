//! Geometry kernel: pure, total functions over world-space points.
//!
//! Nothing here has state or can fail. Degenerate inputs (zero-length
//! segments, zero grid size) return a defined value instead of NaN.

use kurbo::Point;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Midpoint between two points.
pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Angle in radians from `a` to `b` (`atan2(dy, dx)`).
pub fn angle_radians(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Angle in degrees from `a` to `b`.
pub fn angle_degrees(a: Point, b: Point) -> f64 {
    angle_radians(a, b).to_degrees()
}

/// Point at parameter `t` along `a -> b` (0 = a, 1 = b).
pub fn point_at_parameter(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, t)
}

/// Result of projecting a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Parameter along the segment, clamped to `[0, 1]`.
    pub t: f64,
    /// The closest point on the segment.
    pub projected: Point,
    /// Distance from the input point to `projected`.
    pub distance: f64,
}

/// Project `p` onto segment `a -> b`.
///
/// A zero-length segment projects everything onto `a` with `t = 0`.
pub fn project_point_on_segment(p: Point, a: Point, b: Point) -> Projection {
    let ab = b - a;
    let len_sq = ab.hypot2();

    if len_sq == 0.0 {
        return Projection {
            t: 0.0,
            projected: a,
            distance: p.distance(a),
        };
    }

    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let projected = a + ab * t;

    Projection {
        t,
        projected,
        distance: p.distance(projected),
    }
}

/// Snap a scalar to the nearest multiple of `grid_size`.
///
/// A grid size that is not a positive finite number leaves the value alone.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap each axis of a point independently to the grid.
pub fn snap_point_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(
        snap_to_grid(point.x, grid_size),
        snap_to_grid(point.y, grid_size),
    )
}

/// Convert a pixel distance to meters.
pub fn pixels_to_meters(px: f64, pixels_per_meter: f64) -> f64 {
    px / pixels_per_meter
}

/// Human-readable length of `a -> b` in meters, e.g. `"2.00 m"`.
pub fn format_length(a: Point, b: Point, pixels_per_meter: f64) -> String {
    format!("{:.2} m", pixels_to_meters(distance(a, b), pixels_per_meter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(distance(a, b), 5.0);
        assert_eq!(midpoint(a, b), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_angle() {
        let a = Point::new(0.0, 0.0);
        assert_eq!(angle_radians(a, Point::new(10.0, 0.0)), 0.0);
        assert!((angle_degrees(a, Point::new(0.0, 10.0)) - 90.0).abs() < 1e-9);
        assert!((angle_degrees(a, Point::new(-10.0, 0.0)) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_interior() {
        let proj = project_point_on_segment(
            Point::new(50.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((proj.t - 0.5).abs() < 1e-12);
        assert_eq!(proj.projected, Point::new(50.0, 0.0));
        assert!((proj.distance - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);

        let before = project_point_on_segment(Point::new(-20.0, 0.0), a, b);
        assert_eq!(before.t, 0.0);
        assert_eq!(before.projected, a);
        assert_eq!(before.distance, 20.0);

        let after = project_point_on_segment(Point::new(130.0, 40.0), a, b);
        assert_eq!(after.t, 1.0);
        assert_eq!(after.projected, b);
        assert_eq!(after.distance, 50.0);
    }

    #[test]
    fn test_project_degenerate_segment() {
        let a = Point::new(10.0, 10.0);
        let proj = project_point_on_segment(Point::new(13.0, 14.0), a, a);
        assert_eq!(proj.t, 0.0);
        assert_eq!(proj.projected, a);
        assert_eq!(proj.distance, 5.0);
        assert!(proj.distance.is_finite());
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(37.0, 25.0), 25.0);
        assert_eq!(snap_to_grid(38.0, 25.0), 50.0);
        assert_eq!(snap_to_grid(-13.0, 25.0), -25.0);
        assert_eq!(
            snap_point_to_grid(Point::new(12.0, 63.0), 25.0),
            Point::new(0.0, 75.0)
        );
    }

    #[test]
    fn test_snap_to_grid_invalid_size() {
        assert_eq!(snap_to_grid(37.0, 0.0), 37.0);
        assert_eq!(snap_to_grid(37.0, -5.0), 37.0);
        assert_eq!(snap_to_grid(37.0, f64::NAN), 37.0);
    }

    #[test]
    fn test_point_at_parameter() {
        let p = point_at_parameter(Point::new(0.0, 0.0), Point::new(100.0, 50.0), 0.25);
        assert_eq!(p, Point::new(25.0, 12.5));
    }

    #[test]
    fn test_format_length() {
        let label = format_length(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 50.0);
        assert_eq!(label, "2.00 m");
        assert_eq!(pixels_to_meters(125.0, 50.0), 2.5);
    }
}
