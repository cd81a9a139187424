//! Outline geometry that each shape variant hands to renderers and hit-testing.

use crate::constants::MIN_POLYGON_VERTICES;
use crate::geometry::{Point, Rect};

/// The outline of a shape in image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingPath {
    /// Polyline through the vertices, closed back to the first one when `closed`.
    Polyline { points: Vec<Point>, closed: bool },
    /// Axis-aligned rectangle (signed size, as spanned by the two corners).
    Rect(Rect),
    /// Ellipse inscribed in the given rectangle.
    Ellipse(Rect),
}

impl BoundingPath {
    /// Point-in-path test.
    ///
    /// A polyline is filled as if it were closed (even-odd rule), so an open
    /// polygon still reports containment once it has an area.
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            BoundingPath::Polyline { points, .. } => polygon_contains(points, point),
            BoundingPath::Rect(rect) => rect.contains(point),
            BoundingPath::Ellipse(rect) => ellipse_contains(rect, point),
        }
    }

    /// Axis-aligned bounds with non-negative size.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            BoundingPath::Polyline { points, .. } => Rect::bounding(points),
            BoundingPath::Rect(rect) | BoundingPath::Ellipse(rect) => Some(rect.normalized()),
        }
    }
}

/// Ray casting point-in-polygon test.
fn polygon_contains(vertices: &[Point], point: &Point) -> bool {
    if vertices.len() < MIN_POLYGON_VERTICES {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn ellipse_contains(rect: &Rect, point: &Point) -> bool {
    let r = rect.normalized();
    let (rx, ry) = (r.width / 2.0, r.height / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = r.center();
    let dx = (point.x - c.x) / rx;
    let dy = (point.y - c.y) / ry;
    dx * dx + dy * dy <= 1.0
}
