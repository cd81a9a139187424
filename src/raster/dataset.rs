//! Dataset export: label rasters, visualization and label names for one image.
//!
//! Everything is computed in memory first; the output directory is only
//! touched once the whole dataset is known to be encodable, so a failed
//! export never leaves a half-written directory behind.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, Luma, RgbImage};
use ndarray::Array2;
use ndarray_npy::WriteNpyExt;
use serde::{Deserialize, Serialize};

use super::colormap::label_to_visualization;
use super::error::{RasterError, RasterResult};
use super::label::{LabelIndex, MaskMode, shapes_to_label_mask};
use crate::config::ExportSettings;
use crate::constants::dataset as files;
use crate::format::AnnotationFile;
use crate::geometry::Size;
use crate::model::Shape;

/// Everything written to a `<stem>_dataset/` directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// The source image as RGB.
    pub image: RgbImage,
    /// Class id per pixel.
    pub label: Array2<i32>,
    /// Instance id per pixel, instance mode only.
    pub instance: Option<Array2<i32>>,
    /// Label colors blended over the grayscale image.
    pub visualization: RgbImage,
    /// Label names in id order, background first.
    pub label_names: Vec<String>,
}

/// Structured sidecar written next to the rasters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub label_names: Vec<String>,
}

/// Export with default settings: class masks, alpha 0.3.
pub fn export_dataset(
    image: &DynamicImage,
    shapes: &[Shape],
    index: &LabelIndex,
) -> RasterResult<Dataset> {
    export_dataset_with(image, shapes, index, &ExportSettings::default())
}

/// Rasterize `shapes` over `image` and build the visualization.
///
/// Deterministic: identical inputs give identical datasets.
pub fn export_dataset_with(
    image: &DynamicImage,
    shapes: &[Shape],
    index: &LabelIndex,
    settings: &ExportSettings,
) -> RasterResult<Dataset> {
    let image = image.to_rgb8();
    let size = Size::new(image.width(), image.height());
    let masks = shapes_to_label_mask(
        size,
        shapes,
        index,
        settings.mode,
        settings.instance_separator,
    )?;
    let visualization = label_to_visualization(&masks.class, &image, settings.alpha)?;

    Ok(Dataset {
        image,
        label: masks.class,
        instance: masks.instance,
        visualization,
        label_names: index.names().to_vec(),
    })
}

impl Dataset {
    /// Write the dataset into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path, write_npy: bool) -> RasterResult<()> {
        let label_png = to_label_image(&self.label)?;
        let instance_png = self.instance.as_ref().map(to_label_image).transpose()?;
        let mut names = self.label_names.join("\n");
        names.push('\n');
        let info = serde_json::to_string_pretty(&DatasetInfo {
            label_names: self.label_names.clone(),
        })?;

        std::fs::create_dir_all(dir)?;
        self.image.save(dir.join(files::IMAGE))?;
        label_png.save(dir.join(files::LABEL_PNG))?;
        self.visualization.save(dir.join(files::VISUALIZATION))?;
        std::fs::write(dir.join(files::LABEL_NAMES), names)?;
        std::fs::write(dir.join(files::INFO), info)?;
        if write_npy {
            save_npy(&dir.join(files::LABEL_NPY), &self.label)?;
        }
        if let (Some(instance), Some(instance_png)) = (&self.instance, instance_png) {
            instance_png.save(dir.join(files::INSTANCE_PNG))?;
            if write_npy {
                save_npy(&dir.join(files::INSTANCE_NPY), instance)?;
            }
        }

        log::info!(
            "Wrote dataset with {} labels to {:?}",
            self.label_names.len(),
            dir
        );
        Ok(())
    }
}

/// Lossless 16-bit grayscale encoding of a label raster.
fn to_label_image(label: &Array2<i32>) -> RasterResult<ImageBuffer<Luma<u16>, Vec<u16>>> {
    let pixels = label
        .iter()
        .map(|&id| u16::try_from(id).map_err(|_| RasterError::LabelOutOfRange(id)))
        .collect::<RasterResult<Vec<u16>>>()?;
    let (height, width) = label.dim();
    ImageBuffer::from_raw(width as u32, height as u32, pixels).ok_or(RasterError::SizeMismatch {
        label: (width, height),
        image: (width, height),
    })
}

fn save_npy(path: &Path, array: &Array2<i32>) -> RasterResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    array.write_npy(writer)?;
    Ok(())
}

/// Output directory for an annotation file: `<dir>/<stem>_dataset`.
pub fn dataset_dir(json_path: &Path) -> PathBuf {
    let stem = json_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    json_path.with_file_name(format!("{}{}", stem, files::DIR_SUFFIX))
}

/// Export the annotation file at `path` into its dataset directory.
///
/// Label ids are assigned in order of first appearance, background 0.
pub fn json_to_dataset(path: &Path, settings: &ExportSettings) -> RasterResult<PathBuf> {
    let file = AnnotationFile::load(path)?;
    let image = file.decode_image()?;
    let shapes = file.to_shapes()?;
    let index = LabelIndex::from_shapes(&shapes, settings.mode, settings.instance_separator)?;
    let dataset = export_dataset_with(&image, &shapes, &index, settings)?;

    let dir = dataset_dir(path);
    dataset.save(&dir, settings.write_npy)?;
    Ok(dir)
}

/// Export every file, returning `(succeeded, failed)`.
pub fn json_to_datasets<P: AsRef<Path>>(paths: &[P], settings: &ExportSettings) -> (usize, usize) {
    let mut success = 0;
    let mut fail = 0;
    for path in paths {
        let path = path.as_ref();
        match json_to_dataset(path, settings) {
            Ok(dir) => {
                log::info!("Exported {:?} to {:?}", path, dir);
                success += 1;
            }
            Err(e) => {
                log::warn!("Failed to export {:?}: {}", path, e);
                fail += 1;
            }
        }
    }
    log::info!(
        "Dataset export finished: {} succeeded, {} failed ({} masks)",
        success,
        fail,
        settings.mode.name()
    );
    (success, fail)
}
