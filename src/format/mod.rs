//! Annotation file format.
//!
//! One JSON file per image holds the labeled shapes and a base64 copy of the
//! image itself, so a file is self-contained for dataset export.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labelmask::format::{AnnotationFile, image_data_for_path};
//!
//! let data = image_data_for_path(Path::new("cat.jpg"))?;
//! let file = AnnotationFile::from_canvas_shapes(canvas.shapes(), "cat.jpg", Some(data), size)?;
//! file.save(Path::new("cat.json"))?;
//! ```

mod codec;
mod error;
mod record;

#[cfg(test)]
mod tests;

pub use codec::{
    decode_image_data, embed_format, encode_image, encode_image_data, image_data_for_path,
};
pub use error::{FormatError, FormatResult};
pub use record::{AnnotationFile, ShapeRecord};
