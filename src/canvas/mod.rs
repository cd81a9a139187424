//! Interactive editing state machine for one image.
//!
//! A [`Canvas`] owns every shape of a session. Pointer and keyboard input is
//! fed in image coordinates; the canvas mutates its shapes and queues
//! [`CanvasEvent`]s for the surrounding UI (label dialogs, label lists,
//! dirty tracking) to drain.
//!
//! In [`Mode::Create`] the first click starts a shape of the configured kind
//! and a rubber-band preview follows the pointer. Polygons grow one vertex
//! per click and finish when a click lands on the first vertex; rectangles
//! and circles finish on the second click. In [`Mode::Edit`] the pointer
//! hovers vertices and shapes (most recently added first), clicks select and
//! left-button drags move a single vertex or the whole selection, clamped to
//! the image.

mod state;

pub use state::{CanvasEvent, Mode};

use state::DragAnchor;

use crate::error::ContractError;
use crate::geometry::{self, Point, Rect, Size};
use crate::model::{HighlightMode, Shape, ShapeId, ShapeKind};

/// Editing session over a single image.
#[derive(Debug)]
pub struct Canvas {
    mode: Mode,
    create_kind: ShapeKind,
    image_size: Option<Size>,
    scale: f32,
    shapes: Vec<Shape>,
    /// Shape being drawn, not yet in `shapes`.
    current: Option<Shape>,
    /// Rubber-band segment from the last committed point to the pointer.
    line: Option<Shape>,
    selected: Vec<ShapeId>,
    hover: Option<ShapeId>,
    /// Vertex of the hovered shape under the pointer.
    selected_vertex: Option<usize>,
    prev_point: Option<Point>,
    drag_anchor: Option<DragAnchor>,
    moved: bool,
    next_id: ShapeId,
    events: Vec<CanvasEvent>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create an empty canvas in edit mode with no image loaded.
    pub fn new() -> Self {
        Self {
            mode: Mode::Edit,
            create_kind: ShapeKind::Polygon,
            image_size: None,
            scale: 1.0,
            shapes: Vec::new(),
            current: None,
            line: None,
            selected: Vec::new(),
            hover: None,
            selected_vertex: None,
            prev_point: None,
            drag_anchor: None,
            moved: false,
            next_id: 1,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Set the extent of the image being annotated.
    pub fn load_image(&mut self, size: Size) {
        log::debug!("Canvas image loaded: {}x{}", size.width, size.height);
        self.image_size = Some(size);
    }

    pub fn image_size(&self) -> Option<Size> {
        self.image_size
    }

    /// Replace the committed shapes, e.g. after loading an annotation file.
    ///
    /// Loaded shapes are closed and receive fresh ids.
    pub fn load_shapes(&mut self, shapes: Vec<Shape>) {
        self.clear_interaction();
        self.set_selection(Vec::new());
        self.shapes.clear();
        for mut shape in shapes {
            shape.close();
            self.commit(shape);
        }
        log::info!("Loaded {} shapes", self.shapes.len());
    }

    /// Drop the image and every shape.
    pub fn reset(&mut self) {
        self.clear_interaction();
        self.set_selection(Vec::new());
        self.image_size = None;
        self.shapes.clear();
        self.current = None;
        self.line = None;
        log::debug!("Canvas reset");
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the zoom factor. Non-positive values are ignored.
    pub fn set_scale(&mut self, scale: f32) {
        if scale > 0.0 && scale.is_finite() {
            self.scale = scale;
        } else {
            log::debug!("Ignoring invalid canvas scale {}", scale);
        }
    }

    /// Map a widget-space position to image coordinates.
    ///
    /// When the scaled image is smaller than the widget it is centered, so the
    /// centering margin is removed as well.
    pub fn transform_pos(&self, widget_pos: Point, widget_size: (f32, f32)) -> Point {
        let s = self.scale;
        let Some(size) = self.image_size else {
            return Point::new(widget_pos.x / s, widget_pos.y / s);
        };
        let (w, h) = (size.width as f32 * s, size.height as f32 * s);
        let (aw, ah) = widget_size;
        let ox = if aw > w { (aw - w) / (2.0 * s) } else { 0.0 };
        let oy = if ah > h { (ah - h) / (2.0 * s) } else { 0.0 };
        Point::new(widget_pos.x / s - ox, widget_pos.y / s - oy)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_drawing(&self) -> bool {
        self.mode == Mode::Create
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Edit
    }

    pub fn create_kind(&self) -> ShapeKind {
        self.create_kind
    }

    /// Committed shapes in commit order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// The shape being drawn.
    pub fn current(&self) -> Option<&Shape> {
        self.current.as_ref()
    }

    /// The rubber-band preview segment.
    pub fn preview(&self) -> Option<&Shape> {
        self.line.as_ref()
    }

    pub fn selected_ids(&self) -> &[ShapeId] {
        &self.selected
    }

    /// Selected shapes in selection order.
    pub fn selected_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.selected.iter().filter_map(|id| self.shape(*id))
    }

    pub fn hover_shape(&self) -> Option<ShapeId> {
        self.hover
    }

    /// Vertex currently targeted for dragging, as `(shape, index)`.
    pub fn selected_vertex(&self) -> Option<(ShapeId, usize)> {
        self.hover.zip(self.selected_vertex)
    }

    /// Whether anything moved since the last pointer release.
    pub fn has_moved_shape(&self) -> bool {
        self.moved
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Mode transitions
    // ========================================================================

    /// Switch to drawing shapes of `kind`, discarding any in-progress shape.
    pub fn enter_create_mode(&mut self, kind: ShapeKind) {
        log::debug!("Entering create mode ({})", kind);
        self.mode = Mode::Create;
        self.create_kind = kind;
        self.line = None;
        if self.current.take().is_some() {
            self.events.push(CanvasEvent::PaintingShape(false));
        }
        self.clear_interaction();
        self.set_selection(Vec::new());
    }

    /// Switch to editing; an unfinished shape is discarded.
    pub fn enter_edit_mode(&mut self) {
        log::debug!("Entering edit mode");
        self.mode = Mode::Edit;
        self.line = None;
        if self.current.take().is_some() {
            self.events.push(CanvasEvent::PaintingShape(false));
        }
        self.clear_interaction();
    }

    /// Toggle between editing and drawing the configured shape kind.
    pub fn set_editing(&mut self, editing: bool) {
        if editing {
            self.enter_edit_mode();
        } else {
            self.enter_create_mode(self.create_kind);
        }
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// Pointer moved to `pos`, with the left button held if `left_down`.
    pub fn pointer_move(&mut self, pos: Point, left_down: bool) {
        let Some(size) = self.image_size else {
            return;
        };
        match self.mode {
            Mode::Create => self.update_preview(size, pos),
            Mode::Edit if left_down => self.drag_to(size, pos),
            Mode::Edit => self.update_hover(pos),
        }
    }

    /// Left button pressed at `pos`.
    pub fn pointer_press(&mut self, pos: Point) {
        let Some(size) = self.image_size else {
            log::debug!("Pointer press ignored: no image loaded");
            return;
        };
        match self.mode {
            Mode::Create => self.handle_drawing(size, pos),
            Mode::Edit => {
                self.select_shape_point(pos);
                self.prev_point = Some(pos);
            }
        }
    }

    /// Left button released; reports a finished move.
    pub fn pointer_release(&mut self) {
        if self.moved {
            self.events.push(CanvasEvent::ShapeMoved);
            self.moved = false;
        }
    }

    /// Escape: abort the shape being drawn, or leave create mode if idle.
    pub fn cancel(&mut self) {
        if self.current.take().is_some() {
            log::debug!("Drawing aborted");
            self.line = None;
            self.events.push(CanvasEvent::PaintingShape(false));
        } else {
            self.enter_edit_mode();
        }
    }

    fn update_preview(&mut self, size: Size, pos: Point) {
        let scale = self.scale;
        let Some(current) = self.current.as_mut() else {
            return;
        };
        current.highlight_clear();
        let (Some(first), Some(last)) = (current.first_point(), current.last_point()) else {
            return;
        };

        let mut pos = pos;
        if current.kind() == ShapeKind::Polygon
            && geometry::close_enough(first, pos, geometry::hit_radius(scale))
        {
            pos = first;
            current.highlight_vertex(0, HighlightMode::Neat);
        } else if geometry::out_of_bounds(size, pos) {
            pos = geometry::clip_to_bounds(size, last, pos);
        }

        let line = match current.kind() {
            ShapeKind::Polygon => Shape::segment(ShapeKind::Polygon, last, pos),
            kind @ (ShapeKind::Rectangle | ShapeKind::Circle) => {
                let mut line = Shape::segment(kind, first, pos);
                line.close();
                line
            }
        };
        self.line = Some(line);
    }

    fn handle_drawing(&mut self, size: Size, pos: Point) {
        if self.current.is_none() {
            if geometry::out_of_bounds(size, pos) {
                return;
            }
            let kind = self.create_kind;
            let mut shape = Shape::new(kind);
            if let Err(err) = shape.add_point(pos) {
                log::warn!("Could not start {}: {}", kind, err);
                return;
            }
            self.current = Some(shape);
            self.line = Some(Shape::segment(kind, pos, pos));
            self.events.push(CanvasEvent::PaintingShape(true));
            log::debug!("Started {} at ({:.1}, {:.1})", kind, pos.x, pos.y);
            return;
        }

        // Commit where the preview ends, after clipping and snapping.
        self.update_preview(size, pos);
        let Some(end) = self.line.as_ref().and_then(Shape::last_point) else {
            return;
        };
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let result = match current.kind() {
            ShapeKind::Polygon => current.add_point(end),
            ShapeKind::Rectangle | ShapeKind::Circle => match current.first_point() {
                Some(start) => current.set_points(vec![start, end]).map(|()| current.close()),
                None => return,
            },
        };
        if let Err(err) = result {
            log::warn!("Rejected point ({:.1}, {:.1}): {}", end.x, end.y, err);
            return;
        }

        if current.is_closed() {
            self.finalise();
        } else if let Some(last) = current.last_point() {
            self.line = Some(Shape::segment(current.kind(), last, end));
        }
    }

    fn finalise(&mut self) {
        let Some(mut shape) = self.current.take() else {
            return;
        };
        shape.close();
        shape.highlight_clear();
        let kind = shape.kind();
        let points = shape.len();
        let id = self.commit(shape);
        self.line = None;
        self.events.push(CanvasEvent::NewShape(id));
        log::info!("Finalized {} {} with {} points", kind, id, points);
    }

    fn commit(&mut self, mut shape: Shape) -> ShapeId {
        let id = self.next_id;
        self.next_id += 1;
        shape.set_id(id);
        self.shapes.push(shape);
        id
    }

    fn update_hover(&mut self, pos: Point) {
        let scale = self.scale;
        let found = self.shapes.iter().enumerate().rev().find_map(|(idx, shape)| {
            if let Some(vertex) = shape.nearest_vertex(pos, scale) {
                Some((idx, Some(vertex)))
            } else if shape.contains_point(&pos) {
                Some((idx, None))
            } else {
                None
            }
        });

        self.clear_hover();
        if let Some((idx, vertex)) = found {
            let shape = &mut self.shapes[idx];
            if let Some(vertex) = vertex {
                shape.highlight_vertex(vertex, HighlightMode::Move);
            }
            shape.hovered = true;
            self.hover = Some(shape.id());
            self.selected_vertex = vertex;
            log::trace!("Hover shape {} vertex {:?}", shape.id(), vertex);
        }
    }

    fn drag_to(&mut self, size: Size, pos: Point) {
        if let Some((id, index)) = self.selected_vertex() {
            let Some(shape) = self.shape_mut(id) else {
                return;
            };
            let Ok(point) = shape.point(index) else {
                return;
            };
            let target = if geometry::out_of_bounds(size, pos) {
                geometry::clip_to_bounds(size, point, pos)
            } else {
                pos
            };
            if shape.move_vertex(index, target - point).is_ok() {
                self.moved = true;
            }
            return;
        }

        if self.selected.is_empty() {
            return;
        }
        let Some(prev) = self.prev_point else {
            return;
        };
        if geometry::out_of_bounds(size, pos) {
            return;
        }
        let pos = self.clamp_drag(size, pos);
        let delta = pos - prev;
        let ids = self.selected.clone();
        for id in ids {
            if let Some(shape) = self.shape_mut(id) {
                shape.move_by(delta);
            }
        }
        self.prev_point = Some(pos);
        self.moved = true;
    }

    /// Adjust the pointer so the selection bounds stay inside the image.
    ///
    /// Each axis is clamped independently against the offsets cached when the
    /// drag started.
    fn clamp_drag(&self, size: Size, pos: Point) -> Point {
        let Some(anchor) = self.drag_anchor else {
            return pos;
        };
        let max = size.max_point();
        let mut pos = pos;

        let o1 = pos + anchor.top_left;
        pos.x -= o1.x.min(0.0);
        pos.y -= o1.y.min(0.0);

        let o2 = pos + anchor.bottom_right;
        pos.x += (max.x - o2.x).min(0.0);
        pos.y += (max.y - o2.y).min(0.0);
        pos
    }

    // ========================================================================
    // Selection
    // ========================================================================

    fn select_shape_point(&mut self, pos: Point) {
        if let Some((id, index)) = self.selected_vertex() {
            self.set_selection(vec![id]);
            if let Some(shape) = self.shape_mut(id) {
                shape.highlight_vertex(index, HighlightMode::Move);
            }
            self.drag_anchor = self.anchor_for_selection(pos);
            return;
        }

        let hit = self
            .shapes
            .iter()
            .rev()
            .find(|shape| shape.contains_point(&pos))
            .map(Shape::id);
        match hit {
            // Pressing inside an existing multi-selection drags all of it.
            Some(id) if self.selected.contains(&id) => {}
            Some(id) => self.set_selection(vec![id]),
            None => self.set_selection(Vec::new()),
        }
        self.drag_anchor = self.anchor_for_selection(pos);
    }

    /// Offsets from `anchor` to the union bounds of the selection.
    fn anchor_for_selection(&self, anchor: Point) -> Option<DragAnchor> {
        let bounds = selection_bounds(self.selected_shapes())?;
        Some(DragAnchor {
            top_left: bounds.top_left() - anchor,
            bottom_right: bounds.bottom_right() - anchor,
        })
    }

    /// Select exactly `ids`, e.g. from an external label list.
    ///
    /// Repeated ids are selected once, keeping the order of first mention.
    pub fn select_shapes(&mut self, ids: &[ShapeId]) -> Result<(), ContractError> {
        if let Some(missing) = ids.iter().find(|id| self.shape(**id).is_none()) {
            return Err(ContractError::UnknownShape(*missing));
        }
        let mut unique = Vec::with_capacity(ids.len());
        for &id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.set_selection(unique);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.set_selection(Vec::new());
    }

    fn set_selection(&mut self, ids: Vec<ShapeId>) {
        for shape in &mut self.shapes {
            shape.selected = ids.contains(&shape.id());
        }
        if ids != self.selected {
            self.selected = ids.clone();
            self.events.push(CanvasEvent::SelectionChanged(ids));
        }
    }

    // ========================================================================
    // Editing operations
    // ========================================================================

    /// Give the most recently committed shape its label.
    pub fn set_last_label(&mut self, label: impl Into<String>) -> Result<(), ContractError> {
        let label = label.into();
        if label.is_empty() {
            return Err(ContractError::EmptyLabel);
        }
        let shape = self
            .shapes
            .last_mut()
            .ok_or(ContractError::NoCommittedShapes)?;
        log::debug!("Labeled shape {} as '{}'", shape.id(), label);
        shape.label = Some(label);
        Ok(())
    }

    /// Reopen the most recently committed shape for drawing.
    ///
    /// Polygons resume with a preview closing back to the first vertex;
    /// rectangles and circles lose their second point and resume from the first.
    pub fn undo_last_line(&mut self) -> Result<(), ContractError> {
        let mut shape = self.shapes.pop().ok_or(ContractError::NoCommittedShapes)?;
        let id = shape.id();
        shape.open();
        shape.selected = false;
        shape.hovered = false;
        shape.highlight_clear();

        let kind = shape.kind();
        let (Some(first), Some(last)) = (shape.first_point(), shape.last_point()) else {
            // Nothing to resume from; put it back untouched.
            shape.close();
            self.shapes.push(shape);
            return Err(ContractError::PointCount { kind, count: 0 });
        };
        let line = match kind {
            ShapeKind::Polygon => Shape::segment(kind, last, first),
            ShapeKind::Rectangle | ShapeKind::Circle => {
                shape.truncate(1);
                let mut line = Shape::segment(kind, first, last);
                line.close();
                line
            }
        };

        if self.hover == Some(id) {
            self.clear_interaction();
        }
        let remaining: Vec<ShapeId> = self.selected.iter().copied().filter(|s| *s != id).collect();
        self.set_selection(remaining);

        self.mode = Mode::Create;
        self.create_kind = kind;
        self.current = Some(shape);
        self.line = Some(line);
        self.events.push(CanvasEvent::PaintingShape(true));
        log::debug!("Reopened {} {} for drawing", kind, id);
        Ok(())
    }

    /// Remove every selected shape and hand them back for bookkeeping.
    pub fn delete_selected(&mut self) -> Vec<Shape> {
        if self.selected.is_empty() {
            return Vec::new();
        }
        let ids = std::mem::take(&mut self.selected);
        let (mut removed, kept): (Vec<Shape>, Vec<Shape>) = std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|shape| ids.contains(&shape.id()));
        self.shapes = kept;

        for shape in &mut removed {
            shape.selected = false;
            shape.hovered = false;
            shape.highlight_clear();
        }
        self.clear_interaction();
        self.events.push(CanvasEvent::SelectionChanged(Vec::new()));
        log::info!("Deleted {} shapes", removed.len());
        removed
    }

    /// Duplicate the selection; the copies become the new selection.
    ///
    /// Returns the copies so label bookkeeping can account for them.
    pub fn copy_selected(&mut self) -> Vec<Shape> {
        let copies: Vec<Shape> = self.selected_shapes().map(Shape::deep_copy).collect();
        if copies.is_empty() {
            return copies;
        }
        let ids: Vec<ShapeId> = copies.into_iter().map(|copy| self.commit(copy)).collect();
        self.set_selection(ids.clone());
        self.drag_anchor = None;
        log::info!("Duplicated {} shapes", ids.len());
        ids.iter().filter_map(|id| self.shape(*id)).cloned().collect()
    }

    fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    fn clear_hover(&mut self) {
        if let Some(id) = self.hover.take() {
            if let Some(shape) = self.shape_mut(id) {
                shape.highlight_clear();
                shape.hovered = false;
            }
        }
        self.selected_vertex = None;
    }

    /// Forget hover and drag tracking so no stale shape reference survives.
    fn clear_interaction(&mut self) {
        self.clear_hover();
        self.prev_point = None;
        self.drag_anchor = None;
        self.moved = false;
    }
}

/// Union bounds of a set of shapes, used by renderers to frame a selection.
pub fn selection_bounds<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Option<Rect> {
    shapes
        .into_iter()
        .filter_map(Shape::bounding_rect)
        .reduce(|a, b| a.union(&b))
}
