//! Shape model: the annotation variants and their outline geometry.

mod path;
mod shape;

pub use path::BoundingPath;
pub use shape::{HighlightMode, Shape, ShapeId, ShapeKind};
