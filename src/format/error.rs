//! Error types for annotation file operations.

use thiserror::Error;

use crate::error::ContractError;

/// Errors that can occur while reading or writing annotation files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Embedded image could not be decoded or encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// `imageData` is not valid base64
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The file carries no embedded image bytes
    #[error("Missing required field: imageData")]
    MissingImageData,

    /// A shape without a label cannot be persisted
    #[error("Shape {index} has no label")]
    UnlabeledShape {
        /// Position of the shape in the list
        index: usize,
    },

    /// A record violates a shape's point-count contract
    #[error("Invalid shape: {0}")]
    Contract(#[from] ContractError),
}

/// Result type alias for annotation file operations.
pub type FormatResult<T> = Result<T, FormatError>;
