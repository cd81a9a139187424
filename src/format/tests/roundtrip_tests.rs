//! Round-trip tests: canvas shapes to JSON and back.

use proptest::prelude::*;

use super::{file_with_image, test_image};
use crate::format::AnnotationFile;
use crate::geometry::Point;
use crate::model::{Shape, ShapeKind};

fn shape(kind: ShapeKind, label: &str, points: &[(f32, f32)]) -> Shape {
    let mut shape = Shape::with_points(
        kind,
        Some(label.to_string()),
        points.iter().map(|&p| Point::from(p)).collect(),
    )
    .unwrap();
    shape.close();
    shape
}

/// One shape of every kind.
fn mixed_shapes() -> Vec<Shape> {
    vec![
        shape(
            ShapeKind::Polygon,
            "road",
            &[(0.0, 0.0), (40.0, 0.0), (40.0, 12.0), (3.0, 20.0)],
        ),
        shape(ShapeKind::Rectangle, "car-1", &[(10.0, 10.0), (50.0, 40.0)]),
        shape(ShapeKind::Circle, "wheel", &[(20.0, 30.0), (23.0, 30.0)]),
    ]
}

fn assert_same_shapes(before: &[Shape], after: &[Shape]) {
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(after) {
        assert_eq!(a.label, b.label);
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.points(), b.points());
        assert!(b.is_closed());
    }
}

#[test]
fn test_roundtrip_through_json() {
    let shapes = mixed_shapes();
    let file = file_with_image(&shapes, &test_image(64, 48));

    let json = file.to_json().unwrap();
    let loaded = AnnotationFile::from_json(&json).unwrap();
    assert_eq!(loaded, file);
    assert_same_shapes(&shapes, &loaded.to_shapes().unwrap());
}

#[test]
fn test_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    let shapes = mixed_shapes();
    let image = test_image(64, 48);

    file_with_image(&shapes, &image).save(&path).unwrap();
    let loaded = AnnotationFile::load(&path).unwrap();

    assert_same_shapes(&shapes, &loaded.to_shapes().unwrap());
    assert_eq!(loaded.image_size().width, 64);
    assert_eq!(loaded.image_size().height, 48);
    assert_eq!(loaded.decode_image().unwrap().to_rgb8(), image.to_rgb8());
}

#[test]
fn test_rectangle_keeps_two_corners_on_disk() {
    let shapes = vec![shape(
        ShapeKind::Rectangle,
        "box",
        &[(50.0, 40.0), (10.0, 10.0)],
    )];
    let json = file_with_image(&shapes, &test_image(4, 4)).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["shapes"][0]["points"],
        serde_json::json!([[50.0, 40.0], [10.0, 10.0]])
    );
    assert_eq!(value["shapes"][0]["shape_type"], "rectangle");
}

proptest! {
    #[test]
    fn prop_polygon_roundtrip_integer_coordinates(
        points in prop::collection::vec((0i32..1000, 0i32..1000), 1..12),
        label in "[a-z]{1,8}(-[0-9])?",
    ) {
        let points: Vec<(f32, f32)> = points.iter().map(|&(x, y)| (x as f32, y as f32)).collect();
        let shapes = vec![shape(ShapeKind::Polygon, &label, &points)];
        let file = file_with_image(&shapes, &test_image(2, 2));
        let loaded = AnnotationFile::from_json(&file.to_json().unwrap()).unwrap();
        let restored = loaded.to_shapes().unwrap();
        prop_assert_eq!(restored[0].label.as_deref(), Some(label.as_str()));
        prop_assert_eq!(restored[0].points(), shapes[0].points());
    }
}
