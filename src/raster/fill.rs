//! Boolean coverage masks for single shapes.
//!
//! Pixels are sampled at their centers: pixel `(x, y)` is covered when
//! `(x + 0.5, y + 0.5)` lies inside the outline. A rectangle spanning
//! `(10, 10)` to `(50, 40)` therefore covers exactly 40 x 30 pixels.

use ndarray::Array2;

use crate::constants::MIN_POLYGON_VERTICES;
use crate::error::ContractError;
use crate::geometry::{Point, Rect, Size};
use crate::model::{Shape, ShapeKind};

/// Rasterize an outline into a `height x width` mask.
///
/// With `is_ellipse` the first two points are opposite corners of the
/// ellipse's bounding box; otherwise `points` is a polygon ring, implicitly
/// closed. Rings with fewer than three points cover nothing.
pub fn shape_to_mask(size: Size, points: &[Point], is_ellipse: bool) -> Array2<bool> {
    let mut mask = Array2::from_elem((size.height as usize, size.width as usize), false);
    if is_ellipse {
        if let [p1, p2, ..] = points {
            fill_ellipse(&mut mask, Rect::from_corners(*p1, *p2));
        }
    } else {
        fill_polygon(&mut mask, points);
    }
    mask
}

/// The fill input for a shape: its ring (or ellipse corners) and whether it is an ellipse.
///
/// Rectangles expand to a four-point ring in winding order; circles become
/// the corners of their bounding square.
pub fn shape_ring(shape: &Shape) -> Result<(Vec<Point>, bool), ContractError> {
    let count_error = || ContractError::PointCount {
        kind: shape.kind(),
        count: shape.len(),
    };
    match (shape.kind(), shape.points()) {
        (ShapeKind::Polygon, points) => Ok((points.to_vec(), false)),
        (ShapeKind::Rectangle, [p1, p2]) => Ok((
            vec![
                *p1,
                Point::new(p1.x, p2.y),
                *p2,
                Point::new(p2.x, p1.y),
            ],
            false,
        )),
        (ShapeKind::Circle, [center, edge]) => {
            let r = center.distance_to(edge);
            let offset = Point::new(r, r);
            Ok((vec![*center - offset, *center + offset], true))
        }
        _ => Err(count_error()),
    }
}

/// Coverage mask of a single shape.
pub fn mask_for_shape(size: Size, shape: &Shape) -> Result<Array2<bool>, ContractError> {
    let (ring, is_ellipse) = shape_ring(shape)?;
    Ok(shape_to_mask(size, &ring, is_ellipse))
}

/// Scanline fill using the even-odd rule.
fn fill_polygon(mask: &mut Array2<bool>, ring: &[Point]) {
    if ring.len() < MIN_POLYGON_VERTICES {
        return;
    }
    let (height, width) = mask.dim();
    let mut nodes: Vec<f32> = Vec::with_capacity(ring.len());

    for y in 0..height {
        let yf = y as f32 + 0.5;
        nodes.clear();
        for (i, a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            // Half-open so a vertex on the scanline is counted once
            if (a.y < yf && b.y >= yf) || (b.y < yf && a.y >= yf) {
                let t = (yf - a.y) / (b.y - a.y);
                nodes.push(a.x + t * (b.x - a.x));
            }
        }
        nodes.sort_by(f32::total_cmp);

        for pair in nodes.chunks_exact(2) {
            let start = first_covered(pair[0], width);
            let end = first_covered(pair[1], width);
            if start < end {
                for x in start..end {
                    mask[[y, x]] = true;
                }
            }
        }
    }
}

/// Index of the first pixel whose center lies at or right of `x`, clamped to `0..=len`.
fn first_covered(x: f32, len: usize) -> usize {
    (x - 0.5).ceil().clamp(0.0, len as f32) as usize
}

fn fill_ellipse(mask: &mut Array2<bool>, bounds: Rect) {
    let r = bounds.normalized();
    let (rx, ry) = (r.width / 2.0, r.height / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let c = r.center();
    let (height, width) = mask.dim();
    let rows = first_covered(r.y, height)..first_covered(r.y + r.height, height);
    let cols = first_covered(r.x, width)..first_covered(r.x + r.width, width);

    for y in rows {
        let dy = (y as f32 + 0.5 - c.y) / ry;
        for x in cols.clone() {
            let dx = (x as f32 + 0.5 - c.x) / rx;
            if dx * dx + dy * dy <= 1.0 {
                mask[[y, x]] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(mask: &Array2<bool>) -> usize {
        mask.iter().filter(|&&v| v).count()
    }

    #[test]
    fn test_rectangle_covers_exact_pixel_count() {
        let shape = Shape::with_points(
            ShapeKind::Rectangle,
            None,
            vec![Point::new(10.0, 10.0), Point::new(50.0, 40.0)],
        )
        .unwrap();
        let mask = mask_for_shape(Size::new(100, 100), &shape).unwrap();
        assert_eq!(count(&mask), 1200);
        assert!(mask[[10, 10]]);
        assert!(mask[[39, 49]]);
        assert!(!mask[[40, 49]]);
        assert!(!mask[[39, 50]]);
        assert!(!mask[[9, 10]]);
    }

    #[test]
    fn test_rectangle_corner_order_does_not_matter() {
        let size = Size::new(100, 100);
        let a = shape_to_mask(
            size,
            &shape_ring(
                &Shape::with_points(
                    ShapeKind::Rectangle,
                    None,
                    vec![Point::new(50.0, 40.0), Point::new(10.0, 10.0)],
                )
                .unwrap(),
            )
            .unwrap()
            .0,
            false,
        );
        assert_eq!(count(&a), 1200);
    }

    #[test]
    fn test_triangle_fill() {
        let ring = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let mask = shape_to_mask(Size::new(20, 20), &ring, false);
        // Row y covers centers x + 0.5 < 9.5 - y
        assert_eq!(count(&mask), (0..=9).sum::<usize>());
        assert!(mask[[0, 0]]);
        assert!(!mask[[9, 1]]);
    }

    #[test]
    fn test_polygon_clipped_to_image() {
        let ring = [
            Point::new(-10.0, -10.0),
            Point::new(30.0, -10.0),
            Point::new(30.0, 30.0),
            Point::new(-10.0, 30.0),
        ];
        let mask = shape_to_mask(Size::new(20, 10), &ring, false);
        assert_eq!(count(&mask), 200);
    }

    #[test]
    fn test_degenerate_ring_covers_nothing() {
        let ring = [Point::new(1.0, 1.0), Point::new(8.0, 8.0)];
        assert_eq!(count(&shape_to_mask(Size::new(10, 10), &ring, false)), 0);
    }

    #[test]
    fn test_circle_is_symmetric_disc() {
        let shape = Shape::with_points(
            ShapeKind::Circle,
            None,
            vec![Point::new(50.0, 50.0), Point::new(53.0, 50.0)],
        )
        .unwrap();
        let (ring, is_ellipse) = shape_ring(&shape).unwrap();
        assert!(is_ellipse);
        assert_eq!(ring, vec![Point::new(47.0, 47.0), Point::new(53.0, 53.0)]);

        let mask = mask_for_shape(Size::new(100, 100), &shape).unwrap();
        assert!(mask[[49, 49]] && mask[[50, 50]] && mask[[47, 49]]);
        assert!(!mask[[47, 47]]);
        assert!(!mask[[50, 53]]);
        // Fourfold symmetry about the center (50, 50)
        for (y, x) in [(47usize, 49usize), (48, 48), (49, 52)] {
            assert_eq!(mask[[y, x]], mask[[99 - y, 99 - x]]);
            assert_eq!(mask[[y, x]], mask[[x, y]]);
        }
        assert_eq!(count(&mask), 32);
    }

    #[test]
    fn test_wrong_point_count_rejected() {
        let shape = Shape::with_points(ShapeKind::Rectangle, None, vec![Point::new(1.0, 1.0)]).unwrap();
        assert!(matches!(
            shape_ring(&shape),
            Err(ContractError::PointCount { count: 1, .. })
        ));
    }
}
