//! On-disk records of the annotation JSON file.

use serde::{Deserialize, Serialize};

use crate::model::ShapeKind;

/// One annotation file, describing one image.
///
/// ```json
/// {
///   "shapes": [{ "label": "cat", "points": [[10.0, 10.0], [50.0, 40.0]], "shape_type": "rectangle" }],
///   "imagePath": "cat.jpg",
///   "imageData": "/9j/4AAQ...",
///   "imageHeight": 480,
///   "imageWidth": 640
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationFile {
    /// Shapes in commit order
    pub shapes: Vec<ShapeRecord>,
    /// Path of the source image, as chosen when saving
    pub image_path: String,
    /// Base64 of the re-encoded source image
    pub image_data: Option<String>,
    /// Image height in pixels
    pub image_height: u32,
    /// Image width in pixels
    pub image_width: u32,
}

/// A persisted shape.
///
/// Rectangles store their two defining corners and circles store
/// `[center, radius point]`, never an expanded outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub label: String,
    pub points: Vec<[f32; 2]>,
    /// Older files omit this; they only contain polygons
    #[serde(default)]
    pub shape_type: ShapeKind,
}
