//! Shape types and their mutation operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MOVE_VERTEX_FACTOR, NEAT_VERTEX_FACTOR, POINT_SIZE};
use crate::error::ContractError;
use crate::geometry::{self, Point, Rect};
use crate::model::path::BoundingPath;

/// Identifier of a shape within its canvas session.
pub type ShapeId = u32;

/// The shape variants that can be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Ordered vertex ring
    #[default]
    Polygon,
    /// Two opposite corners
    Rectangle,
    /// Center and a point on the radius
    Circle,
}

impl ShapeKind {
    /// Get the on-disk name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Polygon => "polygon",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
        }
    }

    /// Get all shape kinds.
    pub fn all() -> &'static [ShapeKind] {
        &[ShapeKind::Polygon, ShapeKind::Rectangle, ShapeKind::Circle]
    }

    /// Whether the kind is fully defined by exactly two points.
    pub fn is_two_point(&self) -> bool {
        !matches!(self, ShapeKind::Polygon)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a highlighted vertex should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightMode {
    /// The pointer is about to close the polygon on this vertex.
    #[default]
    Neat,
    /// The vertex is under the pointer and can be dragged.
    Move,
}

/// A vector annotation.
///
/// Points are in image coordinates. Their meaning depends on [`ShapeKind`]:
/// polygon vertices in order, the two corners of a rectangle, or the center
/// of a circle followed by a point on its radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    /// Assigned once the shape is finalized.
    pub label: Option<String>,
    points: Vec<Point>,
    closed: bool,
    /// Part of the canvas selection.
    pub selected: bool,
    /// Under the pointer.
    pub hovered: bool,
    highlight: Option<usize>,
    highlight_mode: HighlightMode,
}

impl Shape {
    /// Create an empty, open shape.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: 0,
            kind,
            label: None,
            points: Vec::new(),
            closed: false,
            selected: false,
            hovered: false,
            highlight: None,
            highlight_mode: HighlightMode::Neat,
        }
    }

    /// Create a shape from existing points (e.g. when loading a file).
    ///
    /// Rectangles and circles may not hold more than two points.
    pub fn with_points(
        kind: ShapeKind,
        label: Option<String>,
        points: Vec<Point>,
    ) -> Result<Self, ContractError> {
        check_count(kind, points.len())?;
        Ok(Self {
            label,
            points,
            ..Self::new(kind)
        })
    }

    /// Two-point shape used for rubber-band previews.
    pub(crate) fn segment(kind: ShapeKind, from: Point, to: Point) -> Self {
        Self {
            points: vec![from, to],
            ..Self::new(kind)
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_point(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Get the vertex at `index`.
    pub fn point(&self, index: usize) -> Result<Point, ContractError> {
        self.points
            .get(index)
            .copied()
            .ok_or(ContractError::out_of_range(index, self.points.len()))
    }

    /// Replace the vertex at `index`.
    pub fn set_point(&mut self, index: usize, point: Point) -> Result<(), ContractError> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(ContractError::out_of_range(index, len))?;
        *slot = point;
        Ok(())
    }

    /// Replace all points at once.
    pub fn set_points(&mut self, points: Vec<Point>) -> Result<(), ContractError> {
        check_count(self.kind, points.len())?;
        self.points = points;
        Ok(())
    }

    /// Append a point, or close the shape if `point` equals the first point.
    pub fn add_point(&mut self, point: Point) -> Result<(), ContractError> {
        if self.points.first() == Some(&point) {
            self.close();
            return Ok(());
        }
        check_count(self.kind, self.points.len() + 1)?;
        self.points.push(point);
        Ok(())
    }

    /// Remove and return the last point.
    pub fn pop_point(&mut self) -> Option<Point> {
        self.points.pop()
    }

    /// Keep only the first `len` points.
    pub fn truncate(&mut self, len: usize) {
        self.points.truncate(len);
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn open(&mut self) {
        self.closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Translate one vertex.
    pub fn move_vertex(&mut self, index: usize, delta: Point) -> Result<(), ContractError> {
        let p = self.point(index)?;
        self.set_point(index, p + delta)
    }

    /// Translate the whole shape.
    pub fn move_by(&mut self, delta: Point) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Independent copy: same kind, label and points, transient state cleared.
    pub fn deep_copy(&self) -> Self {
        Self {
            id: self.id,
            kind: self.kind,
            label: self.label.clone(),
            points: self.points.clone(),
            closed: self.closed,
            ..Self::new(self.kind)
        }
    }

    pub fn highlight_vertex(&mut self, index: usize, mode: HighlightMode) {
        self.highlight = Some(index);
        self.highlight_mode = mode;
    }

    pub fn highlight_clear(&mut self) {
        self.highlight = None;
    }

    /// The highlighted vertex and how it should be drawn.
    pub fn highlighted_vertex(&self) -> Option<(usize, HighlightMode)> {
        self.highlight.map(|i| (i, self.highlight_mode))
    }

    /// Outline of the shape.
    ///
    /// Rectangles and circles need exactly two points, polygons at least one.
    pub fn bounding_path(&self) -> Result<BoundingPath, ContractError> {
        let count_error = || ContractError::PointCount {
            kind: self.kind,
            count: self.points.len(),
        };
        match self.kind {
            ShapeKind::Polygon => {
                if self.points.is_empty() {
                    return Err(count_error());
                }
                Ok(BoundingPath::Polyline {
                    points: self.points.clone(),
                    closed: self.closed,
                })
            }
            ShapeKind::Rectangle => match self.points.as_slice() {
                [p1, p2] => Ok(BoundingPath::Rect(Rect::from_corners(*p1, *p2))),
                _ => Err(count_error()),
            },
            ShapeKind::Circle => match self.points.as_slice() {
                [center, edge] => {
                    let r = center.distance_to(edge);
                    Ok(BoundingPath::Ellipse(Rect::new(
                        center.x - r,
                        center.y - r,
                        2.0 * r,
                        2.0 * r,
                    )))
                }
                _ => Err(count_error()),
            },
        }
    }

    /// Whether `point` lies inside the shape's outline.
    ///
    /// A shape whose outline cannot be built contains nothing.
    pub fn contains_point(&self, point: &Point) -> bool {
        self.bounding_path()
            .is_ok_and(|path| path.contains(point))
    }

    /// Axis-aligned bounds of the outline.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.bounding_path().ok()?.bounding_rect()
    }

    /// Closest vertex within the scale-adjusted hit radius.
    pub fn nearest_vertex(&self, pos: Point, scale: f32) -> Option<usize> {
        geometry::nearest_vertex(&self.points, pos, scale)
    }

    /// Diameter, in image pixels, of the marker a renderer should draw for a vertex.
    pub fn vertex_marker_size(&self, index: usize, scale: f32) -> f32 {
        let d = POINT_SIZE / scale;
        match self.highlighted_vertex() {
            Some((i, HighlightMode::Neat)) if i == index => d * NEAT_VERTEX_FACTOR,
            Some((i, HighlightMode::Move)) if i == index => d * MOVE_VERTEX_FACTOR,
            _ => d,
        }
    }
}

fn check_count(kind: ShapeKind, count: usize) -> Result<(), ContractError> {
    if kind.is_two_point() && count > 2 {
        return Err(ContractError::PointCount { kind, count });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
