//! Device-space geometry for portrayal shapes.
//!
//! This module provides:
//! - Rectangle, ellipse and image footprints centered on a logical point
//! - The 7-vertex arrow glyph, its rotation and its device bounding box
//! - Evenly spaced gradient stop offsets
//!
//! Everything here is pure arithmetic over a [`CoordinateMapper`]; Cairo is
//! only touched by `draw::render`.

use crate::draw::CoordinateMapper;

// ============================================================================
// Boxes
// ============================================================================

/// Axis-aligned rectangle in device pixels (top-left origin, f64 precision).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DeviceRect {
    /// Builds a rectangle from min/max corners.
    pub fn from_min_max(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Bottom-right corner.
    pub fn max(&self) -> (f64, f64) {
        (self.x + self.width, self.y + self.height)
    }

    /// Returns true if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Device box of a `w`×`h` logical rectangle centered on (`x`, `y`).
///
/// `x` and `y` are already inverted and aligned.
pub fn rect_geometry(mapper: &CoordinateMapper, x: f64, y: f64, w: f64, h: f64) -> DeviceRect {
    let dx = mapper.to_device_extent_x(w);
    let dy = mapper.to_device_extent_y(h);
    DeviceRect {
        x: mapper.to_device_x(x) - dx / 2.0,
        y: mapper.to_device_y(y) - dy / 2.0,
        width: dx,
        height: dy,
    }
}

/// Device footprint of a square image of logical side `size` centered on (`x`, `y`).
pub fn image_geometry(mapper: &CoordinateMapper, x: f64, y: f64, size: f64) -> DeviceRect {
    rect_geometry(mapper, x, y, size, size)
}

/// Center and per-axis radii of a mapped circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseGeometry {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

impl EllipseGeometry {
    /// True when the ellipse has a drawable, finite area.
    pub fn is_drawable(&self) -> bool {
        [self.cx, self.cy, self.rx, self.ry]
            .iter()
            .all(|v| v.is_finite())
            && self.rx > 0.0
            && self.ry > 0.0
    }
}

/// Maps a logical circle of radius `r`; each radius scales with its own axis.
pub fn ellipse_geometry(mapper: &CoordinateMapper, x: f64, y: f64, r: f64) -> EllipseGeometry {
    EllipseGeometry {
        cx: mapper.to_device_x(x),
        cy: mapper.to_device_y(y),
        rx: mapper.to_device_extent_x(r),
        ry: mapper.to_device_extent_y(r),
    }
}

// ============================================================================
// Arrow Glyph
// ============================================================================

/// Number of vertices in the arrow polygon.
pub const ARROW_VERTEX_COUNT: usize = 7;

/// Fraction of the length where the head starts.
const ARROW_HEAD_START: f64 = 0.7;

/// Shaft half-width as a fraction of the arrow width.
const ARROW_SHAFT_HALF_WIDTH: f64 = 0.1875;

/// Arrow vertices in its local frame: pointing along +x, tail at `origin_offset`.
///
/// Order: tail bottom, tail top, shaft top, head top, tip, head bottom, shaft bottom.
pub fn arrow_local_vertices(
    length: f64,
    width: f64,
    origin_offset: f64,
) -> [(f64, f64); ARROW_VERTEX_COUNT] {
    let o = origin_offset;
    let neck = length * ARROW_HEAD_START + o;
    let shaft = width * ARROW_SHAFT_HALF_WIDTH;
    let head = width * 0.5;
    [
        (o, -shaft),
        (o, shaft),
        (neck, shaft),
        (neck, head),
        (length + o, 0.0),
        (neck, -head),
        (neck, -shaft),
    ]
}

/// A mapped arrow polygon and the bounds its gradient spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    /// Device vertices in drawing order
    pub vertices: [(f64, f64); ARROW_VERTEX_COUNT],
    /// Axis-aligned bounding box of `vertices`
    pub bounds: DeviceRect,
    /// Mapped (x, y) origin, where the label is anchored
    pub anchor: (f64, f64),
}

impl ArrowGeometry {
    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|(x, y)| x.is_finite() && y.is_finite())
    }
}

/// Rotates and maps the arrow glyph anchored at (`x`, `y`).
///
/// `y` is the inverted logical coordinate and `angle` the logical direction in
/// radians. The angle is negated here: after the y-inversion a positive
/// logical rotation has to turn clockwise on the surface.
pub fn arrow_geometry(
    mapper: &CoordinateMapper,
    x: f64,
    y: f64,
    angle: f64,
    length: f64,
    width: f64,
    origin_offset: f64,
) -> ArrowGeometry {
    let angle = -angle;
    let (sin, cos) = angle.sin_cos();

    let vertices = arrow_local_vertices(length, width, origin_offset).map(|(px, py)| {
        let rx = px * cos - py * sin;
        let ry = px * sin + py * cos;
        mapper.to_device(rx + x, ry + y)
    });

    let (mut min_x, mut min_y) = vertices[0];
    let (mut max_x, mut max_y) = vertices[0];
    for &(vx, vy) in &vertices[1..] {
        min_x = min_x.min(vx);
        max_x = max_x.max(vx);
        min_y = min_y.min(vy);
        max_y = max_y.max(vy);
    }

    ArrowGeometry {
        vertices,
        bounds: DeviceRect::from_min_max(min_x, min_y, max_x, max_y),
        anchor: mapper.to_device(x, y),
    }
}

// ============================================================================
// Gradients
// ============================================================================

/// Offsets of `count` evenly spaced gradient stops: `i / count` for `i` in `0..count`.
///
/// The last stop therefore sits short of 1.0 and the gradient pads with it.
pub fn gradient_offsets(count: usize) -> impl Iterator<Item = f64> {
    (0..count).map(move |i| i as f64 / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Bounds;
    use std::f64::consts::FRAC_PI_2;

    fn square_mapper() -> CoordinateMapper {
        CoordinateMapper::new(Bounds::new(0.0, 10.0, 0.0, 10.0), 100, 100)
    }

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn rect_is_centered_on_its_point() {
        let rect = rect_geometry(&square_mapper(), 5.0, 5.0, 2.0, 4.0);
        assert_eq!(rect, DeviceRect { x: 40.0, y: 30.0, width: 20.0, height: 40.0 });
        assert_eq!(rect.center(), (50.0, 50.0));
        assert_eq!(rect.max(), (60.0, 70.0));
    }

    #[test]
    fn zero_sized_rect_collapses_to_its_mapped_center() {
        let rect = rect_geometry(&square_mapper(), 2.5, 7.5, 0.0, 0.0);
        assert_eq!(rect, DeviceRect { x: 25.0, y: 75.0, width: 0.0, height: 0.0 });
    }

    #[test]
    fn circle_stays_round_only_with_equal_axis_scale() {
        let round = ellipse_geometry(&square_mapper(), 5.0, 5.0, 1.0);
        assert_eq!(round, EllipseGeometry { cx: 50.0, cy: 50.0, rx: 10.0, ry: 10.0 });

        let wide = CoordinateMapper::new(Bounds::new(0.0, 10.0, 0.0, 10.0), 200, 100);
        let stretched = ellipse_geometry(&wide, 5.0, 5.0, 1.0);
        assert_eq!(stretched.rx, 20.0);
        assert_eq!(stretched.ry, 10.0);
        assert!(stretched.is_drawable());

        let flat = ellipse_geometry(&square_mapper(), 5.0, 5.0, 0.0);
        assert!(!flat.is_drawable());
    }

    #[test]
    fn image_footprint_is_a_mapped_square() {
        let m = CoordinateMapper::new(Bounds::new(0.0, 4.0, 0.0, 2.0), 400, 100);
        let rect = image_geometry(&m, 2.0, 1.0, 1.0);
        assert_eq!(rect, DeviceRect { x: 150.0, y: 25.0, width: 100.0, height: 50.0 });
    }

    #[test]
    fn local_arrow_matches_glyph_table() {
        let v = arrow_local_vertices(2.0, 1.0, 0.5);
        let expected = [
            (0.5, -0.1875),
            (0.5, 0.1875),
            (1.9, 0.1875),
            (1.9, 0.5),
            (2.5, 0.0),
            (1.9, -0.5),
            (1.9, -0.1875),
        ];
        for (actual, expected) in v.into_iter().zip(expected) {
            assert_close(actual, expected);
        }
    }

    #[test]
    fn unrotated_arrow_points_right_with_tip_at_length_plus_offset() {
        let m = square_mapper();
        let arrow = arrow_geometry(&m, 3.0, 4.0, 0.0, 2.0, 0.9, 0.5);

        assert_close(arrow.vertices[4], m.to_device(3.0 + 2.0 + 0.5, 4.0));
        assert_close(arrow.anchor, (30.0, 40.0));
        // Tip is the rightmost vertex, the tail the leftmost.
        assert_close((arrow.bounds.max().0, 0.0), (arrow.vertices[4].0, 0.0));
        assert_close((arrow.bounds.x, 0.0), (m.to_device_x(3.5), 0.0));
        // Head spans the full width, symmetric about the axis.
        assert_close((arrow.bounds.y, arrow.bounds.height), (40.0 - 4.5, 9.0));
    }

    #[test]
    fn positive_angle_turns_up_on_screen() {
        let m = square_mapper();
        // Logical y = 6 arrives here already inverted to 4.
        let arrow = arrow_geometry(&m, 5.0, 4.0, FRAC_PI_2, 1.0, 0.3, 0.0);
        let tip = arrow.vertices[4];
        assert_close(tip, (50.0, 30.0));
        assert!(arrow.bounds.y <= tip.1 + 1e-9);
        assert!(arrow.bounds.max().1 >= 40.0 - 1e-9);
    }

    #[test]
    fn arrow_bounds_enclose_every_vertex() {
        let m = CoordinateMapper::new(Bounds::new(-1.0, 1.0, -1.0, 1.0), 300, 120);
        let arrow = arrow_geometry(&m, 0.2, -0.3, 2.3, 0.8, 0.4, -0.1);
        let (max_x, max_y) = arrow.bounds.max();
        for &(x, y) in &arrow.vertices {
            assert!(x >= arrow.bounds.x - 1e-9 && x <= max_x + 1e-9);
            assert!(y >= arrow.bounds.y - 1e-9 && y <= max_y + 1e-9);
        }
        assert!(arrow.vertices.iter().any(|v| v.0 == arrow.bounds.x));
        assert!(arrow.vertices.iter().any(|v| v.1 == arrow.bounds.y));
        assert!(arrow.is_finite());
    }

    #[test]
    fn gradient_offsets_are_evenly_spaced_from_zero() {
        assert_eq!(gradient_offsets(1).collect::<Vec<_>>(), vec![0.0]);
        assert_eq!(gradient_offsets(4).collect::<Vec<_>>(), vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(gradient_offsets(0).count(), 0);
    }
}
