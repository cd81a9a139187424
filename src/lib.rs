//! labelmask - vector annotation editing and label mask export
//!
//! The crate is the core of an image annotation tool: shapes are drawn and
//! edited on a [`Canvas`], persisted as self-contained JSON
//! [`AnnotationFile`](format::AnnotationFile)s, and exported as
//! pixel-accurate label masks with [`raster::export_dataset`].
//!
//! Windowing and on-screen painting are left to the embedding UI; the canvas
//! takes pointer input in image coordinates and reports back through
//! [`CanvasEvent`]s.

pub mod canvas;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod geometry;
pub mod model;
pub mod raster;

pub use canvas::{Canvas, CanvasEvent, Mode};
pub use error::ContractError;
pub use geometry::{Point, Rect, Size};
pub use model::{BoundingPath, HighlightMode, Shape, ShapeId, ShapeKind};
