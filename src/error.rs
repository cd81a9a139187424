//! Input-contract violations shared by the shape model and the canvas.
//!
//! These indicate a caller bug rather than an expected interactive
//! situation: the operation is aborted and committed state is left as it was.

use thiserror::Error;

use crate::model::{ShapeId, ShapeKind};

/// A caller broke an operation's precondition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Vertex index past the end of the point list
    #[error("Vertex index {index} out of range for shape with {len} points")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of points in the shape
        len: usize,
    },

    /// Rectangle/circle with a point count other than the one required
    #[error("A {kind} cannot hold {count} points")]
    PointCount {
        /// The shape variant
        kind: ShapeKind,
        /// Number of points found
        count: usize,
    },

    /// Undo requested with nothing committed
    #[error("No committed shapes")]
    NoCommittedShapes,

    /// A shape id that the session does not own
    #[error("Unknown shape id {0}")]
    UnknownShape(ShapeId),

    /// Finalized shapes must carry a non-empty label
    #[error("Label must not be empty")]
    EmptyLabel,
}

impl ContractError {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}
