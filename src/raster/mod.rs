//! Rasterization of vector shapes into label masks.
//!
//! ## Pipeline
//!
//! 1. [`LabelIndex`] assigns each label a dense id, `_background_` = 0.
//! 2. [`shapes_to_label_mask`] paints shapes in list order into an `i32`
//!    raster, later shapes winning where they overlap.
//! 3. [`label_to_visualization`] blends [`label_color`]s over a grayscale
//!    copy of the image.
//! 4. [`export_dataset`] composes the above and [`Dataset::save`] writes the
//!    result into a `<stem>_dataset/` directory.

mod colormap;
mod dataset;
mod error;
mod fill;
mod label;

pub use colormap::{colormap, label_color, label_to_visualization};
pub use dataset::{
    Dataset, DatasetInfo, dataset_dir, export_dataset, export_dataset_with, json_to_dataset,
    json_to_datasets,
};
pub use error::{RasterError, RasterResult};
pub use fill::{mask_for_shape, shape_ring, shape_to_mask};
pub use label::{LabelIndex, LabelMasks, MaskMode, class_name, shapes_to_label_mask};
