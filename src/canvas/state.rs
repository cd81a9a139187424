//! Canvas modes and the notifications the canvas emits.

use crate::geometry::Point;
use crate::model::ShapeId;

/// Interaction mode of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Clicks draw new shapes.
    Create,
    /// Clicks select, drags move vertices or shapes.
    #[default]
    Edit,
}

impl Mode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Create => "Create",
            Mode::Edit => "Edit",
        }
    }
}

/// Notifications for the surrounding UI.
///
/// The canvas queues these while handling input; drain them with
/// [`Canvas::take_events`](super::Canvas::take_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasEvent {
    /// A shape was finalized and appended; it still needs a label.
    NewShape(ShapeId),
    /// The selection now consists of exactly these shapes.
    SelectionChanged(Vec<ShapeId>),
    /// At least one vertex or shape moved during the last drag.
    ShapeMoved,
    /// Drawing of an in-progress shape started (`true`) or was aborted (`false`).
    PaintingShape(bool),
}

/// Anchor of an in-progress shape drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DragAnchor {
    /// Offset from the anchor to the top-left of the selection bounds.
    pub top_left: Point,
    /// Offset from the anchor to the bottom-right of the selection bounds.
    pub bottom_right: Point,
}
