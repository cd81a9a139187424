//! Error types for mask rasterization and dataset export.

use thiserror::Error;

use crate::error::ContractError;
use crate::format::FormatError;

/// Errors that can occur while rasterizing shapes or writing a dataset.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Label ids are not exactly `0..K`
    #[error("Label ids must be dense from 0, found {ids:?}")]
    NonDenseLabels {
        /// The ids found, sorted
        ids: Vec<i32>,
    },

    /// The background label is mapped to something other than 0
    #[error("Background label must map to 0, found {0}")]
    BackgroundId(i32),

    /// A shape uses a label the index does not know
    #[error("Label '{0}' is not in the label index")]
    UnknownLabel(String),

    /// A shape has no label yet
    #[error("Shape {index} has no label")]
    UnlabeledShape {
        /// Position of the shape in the exported list
        index: usize,
    },

    /// Raster and image dimensions disagree
    #[error("Label raster is {label:?} but image is {image:?}")]
    SizeMismatch {
        /// Label raster size as (width, height)
        label: (usize, usize),
        /// Image size as (width, height)
        image: (usize, usize),
    },

    /// A label id does not fit the 16-bit label image
    #[error("Label id {0} cannot be stored in a 16-bit label image")]
    LabelOutOfRange(i32),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error while writing the dataset directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing the numpy label array
    #[error("NPY error: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reading the annotation file
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A shape broke its point-count contract
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl RasterError {
    /// Create an unknown-label error.
    pub fn unknown_label(label: impl Into<String>) -> Self {
        Self::UnknownLabel(label.into())
    }
}

/// Result type alias for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;
