//! Geometry kernel: points, rectangles and the proximity/bounds math used by
//! hit-testing and drawing.
//!
//! Everything here is pure. Coordinates are image-space pixels; the canvas
//! scale only enters through [`hit_radius`], which keeps the grab radius
//! constant in screen pixels regardless of zoom.

use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::constants::VERTEX_HIT_RADIUS;

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean norm of the point treated as a vector.
    pub fn distance_to_origin(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        (*self - *other).distance_to_origin()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for [f32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// Pixel dimensions of the image being annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Largest coordinate a vertex may take on each axis.
    ///
    /// Boundary clipping lands on the last pixel row/column, so dragged and
    /// clipped vertices always satisfy `!out_of_bounds`.
    pub fn max_point(&self) -> Point {
        Point::new(
            self.width.saturating_sub(1) as f32,
            self.height.saturating_sub(1) as f32,
        )
    }
}

/// An axis-aligned rectangle.
///
/// Width and height are signed: a rectangle built from two arbitrary corners
/// keeps the first corner as its origin. Use [`Rect::normalized`] before any
/// containment math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Origin X coordinate
    pub x: f32,
    /// Origin Y coordinate
    pub y: f32,
    /// Signed width
    pub width: f32,
    /// Signed height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two corners, origin at `p1`.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(p1.x, p1.y, p2.x - p1.x, p2.y - p1.y)
    }

    /// Bounding rectangle of a point set, or `None` when empty.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::from_corners(min, max))
    }

    /// Same rectangle with non-negative width and height.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    /// Top-left corner of the normalized rectangle.
    pub fn top_left(&self) -> Point {
        let n = self.normalized();
        Point::new(n.x, n.y)
    }

    /// Bottom-right corner of the normalized rectangle.
    pub fn bottom_right(&self) -> Point {
        let n = self.normalized();
        Point::new(n.x + n.width, n.y + n.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the rectangle (edges included).
    pub fn contains(&self, point: &Point) -> bool {
        let n = self.normalized();
        point.x >= n.x && point.x <= n.x + n.width && point.y >= n.y && point.y <= n.y + n.height
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let (a0, a1) = (self.top_left(), self.bottom_right());
        let (b0, b1) = (other.top_left(), other.bottom_right());
        Rect::from_corners(
            Point::new(a0.x.min(b0.x), a0.y.min(b0.y)),
            Point::new(a1.x.max(b1.x), a1.y.max(b1.y)),
        )
    }
}

// ============================================================================
// Proximity
// ============================================================================

/// Euclidean distance between two points.
pub fn distance(p1: Point, p2: Point) -> f32 {
    p1.distance_to(&p2)
}

/// Whether two points are strictly closer than `epsilon`.
pub fn close_enough(p1: Point, p2: Point, epsilon: f32) -> bool {
    distance(p1, p2) < epsilon
}

/// Hit radius in image pixels for the given canvas scale.
pub fn hit_radius(scale: f32) -> f32 {
    VERTEX_HIT_RADIUS / scale
}

/// Index of the vertex closest to `pos` within the scale-adjusted hit radius.
///
/// Vertices are scanned in order and only a strictly smaller distance
/// replaces the current best, so the lowest index wins ties.
pub fn nearest_vertex(points: &[Point], pos: Point, scale: f32) -> Option<usize> {
    let radius = hit_radius(scale);
    let mut best: Option<(usize, f32)> = None;
    for (i, p) in points.iter().enumerate() {
        let dist = p.distance_to(&pos);
        if dist > radius {
            continue;
        }
        if best.is_none_or(|(_, min)| dist < min) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

// ============================================================================
// Image bounds
// ============================================================================

/// Whether `p` lies outside `[0, width) x [0, height)`.
pub fn out_of_bounds(size: Size, p: Point) -> bool {
    p.x < 0.0 || p.x >= size.width as f32 || p.y < 0.0 || p.y >= size.height as f32
}

/// Where the segment `prev -> target` leaves the image.
///
/// The image border is walked clockwise through the last pixel row/column;
/// among the edges the segment crosses, the one whose midpoint is nearest
/// `target` is used. When that crossing is `prev` itself (the previous point
/// already sits on an edge) the pointer slides along that edge instead.
///
/// If the segment crosses no edge at all, `target` is clamped into the image.
pub fn clip_to_bounds(size: Size, prev: Point, target: Point) -> Point {
    let max = size.max_point();
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(max.x, 0.0),
        Point::new(max.x, max.y),
        Point::new(0.0, max.y),
    ];

    let mut best: Option<(f32, usize, Point)> = None;
    for i in 0..4 {
        let (p3, p4) = (corners[i], corners[(i + 1) % 4]);
        let Some(hit) = segment_intersection(prev, target, p3, p4) else {
            continue;
        };
        let mid = Point::new((p3.x + p4.x) / 2.0, (p3.y + p4.y) / 2.0);
        let d = distance(mid, target);
        let better = match best {
            None => true,
            Some((best_d, _, _)) => d.total_cmp(&best_d).is_lt(),
        };
        if better {
            best = Some((d, i, hit));
        }
    }

    let Some((_, i, hit)) = best else {
        log::trace!(
            "clip_to_bounds: no edge crossing for ({:.1}, {:.1}) -> ({:.1}, {:.1}), clamping",
            prev.x,
            prev.y,
            target.x,
            target.y
        );
        return Point::new(target.x.clamp(0.0, max.x), target.y.clamp(0.0, max.y));
    };

    if hit == prev {
        let (p3, p4) = (corners[i], corners[(i + 1) % 4]);
        if p3.x == p4.x {
            return Point::new(p3.x, target.y.max(0.0).min(p3.y.max(p4.y)));
        }
        return Point::new(target.x.max(0.0).min(p3.x.max(p4.x)), p3.y);
    }
    hit
}

/// Intersection of segments `p1-p2` and `p3-p4`, if any.
///
/// Parallel and coincident segments report no intersection.
fn segment_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if denom == 0.0 {
        return None;
    }
    let nua = (p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x);
    let nub = (p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x);
    let (ua, ub) = (nua / denom, nub / denom);
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(Point::new(p1.x + ua * (p2.x - p1.x), p1.y + ua * (p2.y - p1.y)))
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
