//! Global constants for labelmask

/// Vertex hit radius in screen pixels; divided by the canvas scale before use.
pub const VERTEX_HIT_RADIUS: f32 = 10.0;

/// Base vertex marker diameter in screen pixels.
pub const POINT_SIZE: f32 = 8.0;

/// Marker growth factor for a vertex about to close a polygon.
pub const NEAT_VERTEX_FACTOR: f32 = 4.0;

/// Marker growth factor for a vertex under the pointer in edit mode.
pub const MOVE_VERTEX_FACTOR: f32 = 1.5;

/// Minimum number of vertices for a polygon to have an area.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Label name that always maps to id 0.
pub const BACKGROUND_LABEL: &str = "_background_";

/// Default overlay opacity for label visualizations.
pub const DEFAULT_ALPHA: f32 = 0.3;

/// Separator between class name and instance suffix (`car-2` belongs to class `car`).
pub const INSTANCE_SEPARATOR: char = '-';

/// Label value for pixels that carry no label at all.
pub const UNLABELED: i32 = -1;

/// File names written into a `<stem>_dataset/` directory.
pub mod dataset {
    /// Suffix appended to the annotation file stem.
    pub const DIR_SUFFIX: &str = "_dataset";
    /// Re-encoded source image.
    pub const IMAGE: &str = "img.png";
    /// Label raster as 16-bit grayscale PNG.
    pub const LABEL_PNG: &str = "label.png";
    /// Label raster as a raw `i32` numpy array.
    pub const LABEL_NPY: &str = "label.npy";
    /// Instance raster as 16-bit grayscale PNG, instance mode only.
    pub const INSTANCE_PNG: &str = "instance.png";
    /// Instance raster as a raw `i32` numpy array, instance mode only.
    pub const INSTANCE_NPY: &str = "instance.npy";
    /// Blended visualization.
    pub const VISUALIZATION: &str = "label_viz.png";
    /// Newline separated label names in id order.
    pub const LABEL_NAMES: &str = "label_names.txt";
    /// Structured sidecar.
    pub const INFO: &str = "info.json";
}
