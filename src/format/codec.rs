//! Conversion between canvas shapes and annotation records, plus the
//! embedded-image helpers.

use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat};

use super::error::{FormatError, FormatResult};
use super::record::{AnnotationFile, ShapeRecord};
use crate::error::ContractError;
use crate::geometry::{Point, Size};
use crate::model::{Shape, ShapeKind};

impl ShapeRecord {
    /// Record for a committed shape; `index` is only used for error reporting.
    pub fn from_shape(shape: &Shape, index: usize) -> FormatResult<Self> {
        let label = shape
            .label
            .clone()
            .ok_or(FormatError::UnlabeledShape { index })?;
        check_point_count(shape.kind(), shape.len())?;
        Ok(Self {
            label,
            points: shape.points().iter().map(|p| (*p).into()).collect(),
            shape_type: shape.kind(),
        })
    }

    /// Rebuild a closed shape from this record.
    pub fn to_shape(&self) -> FormatResult<Shape> {
        check_point_count(self.shape_type, self.points.len())?;
        let points = self.points.iter().map(|p| Point::from(*p)).collect();
        let mut shape = Shape::with_points(self.shape_type, Some(self.label.clone()), points)?;
        shape.close();
        Ok(shape)
    }
}

/// Rectangles and circles are persisted with exactly two points.
fn check_point_count(kind: ShapeKind, count: usize) -> Result<(), ContractError> {
    if kind.is_two_point() && count != 2 {
        return Err(ContractError::PointCount { kind, count });
    }
    Ok(())
}

impl AnnotationFile {
    /// Build a file from the shapes of a canvas session.
    pub fn from_canvas_shapes(
        shapes: &[Shape],
        image_path: impl Into<String>,
        image_data: Option<String>,
        size: Size,
    ) -> FormatResult<Self> {
        let shapes = shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| ShapeRecord::from_shape(shape, i))
            .collect::<FormatResult<Vec<_>>>()?;
        Ok(Self {
            shapes,
            image_path: image_path.into(),
            image_data,
            image_height: size.height,
            image_width: size.width,
        })
    }

    /// Shapes in file order, closed and labeled.
    pub fn to_shapes(&self) -> FormatResult<Vec<Shape>> {
        self.shapes.iter().map(ShapeRecord::to_shape).collect()
    }

    /// Image size recorded in the file.
    pub fn image_size(&self) -> Size {
        Size::new(self.image_width, self.image_height)
    }

    /// Decode the embedded image.
    pub fn decode_image(&self) -> FormatResult<DynamicImage> {
        let data = self
            .image_data
            .as_deref()
            .ok_or(FormatError::MissingImageData)?;
        let bytes = decode_image_data(data)?;
        let image = image::load_from_memory(&bytes)?;
        if (image.width(), image.height()) != (self.image_width, self.image_height) {
            log::warn!(
                "Embedded image is {}x{} but file records {}x{}",
                image.width(),
                image.height(),
                self.image_width,
                self.image_height
            );
        }
        Ok(image)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> FormatResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a file; it must carry embedded image data.
    pub fn from_json(json: &str) -> FormatResult<Self> {
        let file: Self = serde_json::from_str(json)?;
        if file.image_data.is_none() {
            return Err(FormatError::MissingImageData);
        }
        Ok(file)
    }

    /// Read and parse an annotation file.
    pub fn load(path: &Path) -> FormatResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let file = Self::from_json(&json)?;
        log::info!("Loaded {} shapes from {:?}", file.shapes.len(), path);
        Ok(file)
    }

    /// Write the file as pretty JSON.
    pub fn save(&self, path: &Path) -> FormatResult<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved {} shapes to {:?}", self.shapes.len(), path);
        Ok(())
    }
}

/// Base64 of raw image bytes.
pub fn encode_image_data(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Raw bytes of base64 image data.
pub fn decode_image_data(data: &str) -> FormatResult<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(data)?)
}

/// Encoding used when embedding the image at `path`: JPEG for `.jpg`/`.jpeg`, PNG otherwise.
pub fn embed_format(path: &Path) -> ImageFormat {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
    if is_jpeg {
        ImageFormat::Jpeg
    } else {
        ImageFormat::Png
    }
}

/// Encode an image to bytes in `format`.
pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> FormatResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut bytes, format)?,
        _ => image.write_to(&mut bytes, format)?,
    }
    Ok(bytes.into_inner())
}

/// Read the image at `path` and return it re-encoded as base64 `imageData`.
pub fn image_data_for_path(path: &Path) -> FormatResult<String> {
    let image = image::open(path)?;
    let format = embed_format(path);
    let bytes = encode_image(&image, format)?;
    log::debug!(
        "Embedded {:?} as {:?} ({} bytes)",
        path,
        format,
        bytes.len()
    );
    Ok(encode_image_data(&bytes))
}
