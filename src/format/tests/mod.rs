//! Unit tests for the annotation file format.
//!
//! These tests verify record conversion, the load contract and the
//! embedded-image helpers, plus shape round trips through JSON.

mod roundtrip_tests;

use image::{DynamicImage, Rgb, RgbImage};

use super::{AnnotationFile, encode_image, encode_image_data};
use crate::geometry::Size;
use crate::model::Shape;

/// Small gradient image that survives PNG encoding unchanged.
pub(super) fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 128])
    }))
}

/// Annotation file embedding `image` as PNG.
pub(super) fn file_with_image(shapes: &[Shape], image: &DynamicImage) -> AnnotationFile {
    let bytes = encode_image(image, image::ImageFormat::Png).unwrap();
    AnnotationFile::from_canvas_shapes(
        shapes,
        "test.png",
        Some(encode_image_data(&bytes)),
        Size::new(image.width(), image.height()),
    )
    .unwrap()
}
