//! Dense label ids and whole-image label rasters.

use std::collections::HashMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::error::{RasterError, RasterResult};
use super::fill;
use crate::constants::BACKGROUND_LABEL;
use crate::geometry::Size;
use crate::model::Shape;

/// What the label raster encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// One id per label.
    #[default]
    Class,
    /// Class ids from the label prefix, plus a per-label instance raster.
    Instance,
}

impl MaskMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            MaskMode::Class => "class",
            MaskMode::Instance => "instance",
        }
    }
}

/// Mapping from label name to a dense id.
///
/// Ids are exactly `0..len()` and the background label, when present, is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelIndex {
    /// Names indexed by id.
    names: Vec<String>,
    ids: HashMap<String, i32>,
}

impl LabelIndex {
    /// Build an index from explicit `(name, id)` pairs, validating density.
    pub fn new(pairs: impl IntoIterator<Item = (String, i32)>) -> RasterResult<Self> {
        let mut pairs: Vec<(String, i32)> = pairs.into_iter().collect();
        pairs.sort_by_key(|(_, id)| *id);

        let dense = pairs
            .iter()
            .enumerate()
            .all(|(expected, (_, id))| usize::try_from(*id).is_ok_and(|id| id == expected));
        if !dense {
            return Err(RasterError::NonDenseLabels {
                ids: pairs.iter().map(|(_, id)| *id).collect(),
            });
        }
        if let Some((_, id)) = pairs.iter().find(|(name, _)| name == BACKGROUND_LABEL) {
            if *id != 0 {
                return Err(RasterError::BackgroundId(*id));
            }
        }

        let ids = pairs.iter().cloned().collect::<HashMap<_, _>>();
        if ids.len() != pairs.len() {
            // A name listed twice leaves a gap once deduplicated
            return Err(RasterError::NonDenseLabels {
                ids: pairs.iter().map(|(_, id)| *id).collect(),
            });
        }
        let names = pairs.into_iter().map(|(name, _)| name).collect();
        Ok(Self { names, ids })
    }

    /// Index containing only the background label.
    pub fn background() -> Self {
        Self {
            names: vec![BACKGROUND_LABEL.to_string()],
            ids: HashMap::from([(BACKGROUND_LABEL.to_string(), 0)]),
        }
    }

    /// Build the index a dataset export uses: background first, then class
    /// names in order of first appearance.
    ///
    /// In [`MaskMode::Instance`] the class name is the part of the label
    /// before `separator`.
    pub fn from_shapes(shapes: &[Shape], mode: MaskMode, separator: char) -> RasterResult<Self> {
        let mut index = Self::background();
        for (i, shape) in shapes.iter().enumerate() {
            let label = shape
                .label
                .as_deref()
                .ok_or(RasterError::UnlabeledShape { index: i })?;
            index.insert(class_name(label, mode, separator));
        }
        log::debug!("Label index: {:?}", index.names);
        Ok(index)
    }

    /// Append `name` with the next id unless it is already present.
    fn insert(&mut self, name: &str) -> i32 {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.names.len() as i32;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Id of a label.
    pub fn get(&self, name: &str) -> Option<i32> {
        self.ids.get(name).copied()
    }

    /// Label names in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Class name of a label under `mode`.
pub fn class_name(label: &str, mode: MaskMode, separator: char) -> &str {
    match mode {
        MaskMode::Class => label,
        MaskMode::Instance => label.split(separator).next().unwrap_or(label),
    }
}

/// Result of [`shapes_to_label_mask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMasks {
    /// Class id per pixel, background 0.
    pub class: Array2<i32>,
    /// Instance id per pixel in [`MaskMode::Instance`], background 0.
    pub instance: Option<Array2<i32>>,
}

/// Paint every shape into a label raster, later shapes over earlier ones.
///
/// Instance ids number distinct full labels in order of first appearance,
/// starting at 1.
pub fn shapes_to_label_mask(
    size: Size,
    shapes: &[Shape],
    index: &LabelIndex,
    mode: MaskMode,
    separator: char,
) -> RasterResult<LabelMasks> {
    let dim = (size.height as usize, size.width as usize);
    let mut class = Array2::<i32>::zeros(dim);
    let mut instance = match mode {
        MaskMode::Class => None,
        MaskMode::Instance => Some(Array2::<i32>::zeros(dim)),
    };
    let mut instance_names = LabelIndex::background();

    for (i, shape) in shapes.iter().enumerate() {
        let label = shape
            .label
            .as_deref()
            .ok_or(RasterError::UnlabeledShape { index: i })?;
        let name = class_name(label, mode, separator);
        let class_id = index
            .get(name)
            .ok_or_else(|| RasterError::unknown_label(name))?;
        let mask = fill::mask_for_shape(size, shape)?;

        class.zip_mut_with(&mask, |px, &covered| {
            if covered {
                *px = class_id;
            }
        });
        if let Some(instance) = instance.as_mut() {
            let instance_id = instance_names.insert(label);
            instance.zip_mut_with(&mask, |px, &covered| {
                if covered {
                    *px = instance_id;
                }
            });
        }
    }

    log::debug!(
        "Rasterized {} shapes into {}x{} {} mask",
        shapes.len(),
        size.width,
        size.height,
        mode.name()
    );
    Ok(LabelMasks { class, instance })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::geometry::Point;
    use crate::model::ShapeKind;

    fn rect(label: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Shape {
        Shape::with_points(
            ShapeKind::Rectangle,
            Some(label.to_string()),
            vec![Point::new(x0, y0), Point::new(x1, y1)],
        )
        .unwrap()
    }

    fn pairs(items: &[(&str, i32)]) -> Vec<(String, i32)> {
        items.iter().map(|(n, id)| (n.to_string(), *id)).collect()
    }

    #[test]
    fn test_index_accepts_dense_ids() {
        let index = LabelIndex::new(pairs(&[("cat", 1), ("_background_", 0), ("dog", 2)])).unwrap();
        assert_eq!(index.names(), &["_background_", "cat", "dog"]);
        assert_eq!(index.get("dog"), Some(2));
        assert_eq!(index.get("bird"), None);
    }

    #[test]
    fn test_index_rejects_gaps_and_duplicates() {
        assert!(matches!(
            LabelIndex::new(pairs(&[("_background_", 0), ("cat", 2)])),
            Err(RasterError::NonDenseLabels { .. })
        ));
        assert!(matches!(
            LabelIndex::new(pairs(&[("_background_", 0), ("cat", 0)])),
            Err(RasterError::NonDenseLabels { .. })
        ));
        assert!(matches!(
            LabelIndex::new(pairs(&[("cat", -1), ("dog", 0)])),
            Err(RasterError::NonDenseLabels { .. })
        ));
        assert!(matches!(
            LabelIndex::new(pairs(&[("cat", 0), ("_background_", 1)])),
            Err(RasterError::BackgroundId(1))
        ));
    }

    #[test]
    fn test_index_from_shapes_first_appearance() {
        let shapes = vec![
            rect("dog-1", 0.0, 0.0, 1.0, 1.0),
            rect("cat", 0.0, 0.0, 1.0, 1.0),
            rect("dog-2", 0.0, 0.0, 1.0, 1.0),
        ];
        let class = LabelIndex::from_shapes(&shapes, MaskMode::Class, '-').unwrap();
        assert_eq!(class.names(), &["_background_", "dog-1", "cat", "dog-2"]);

        let instance = LabelIndex::from_shapes(&shapes, MaskMode::Instance, '-').unwrap();
        assert_eq!(instance.names(), &["_background_", "dog", "cat"]);
    }

    #[test]
    fn test_later_shapes_win() {
        let shapes = vec![
            rect("a", 0.0, 0.0, 10.0, 10.0),
            rect("b", 5.0, 5.0, 15.0, 15.0),
        ];
        let index = LabelIndex::from_shapes(&shapes, MaskMode::Class, '-').unwrap();
        let masks =
            shapes_to_label_mask(Size::new(20, 20), &shapes, &index, MaskMode::Class, '-').unwrap();
        assert_eq!(masks.class[[2, 2]], 1);
        assert_eq!(masks.class[[7, 7]], 2);
        assert_eq!(masks.class[[18, 18]], 0);
        assert!(masks.instance.is_none());
    }

    #[test]
    fn test_instance_mode_numbers_full_labels() {
        let shapes = vec![
            rect("car-1", 0.0, 0.0, 5.0, 5.0),
            rect("car-2", 10.0, 0.0, 15.0, 5.0),
            rect("car-1", 0.0, 10.0, 5.0, 15.0),
        ];
        let index = LabelIndex::from_shapes(&shapes, MaskMode::Instance, '-').unwrap();
        let masks =
            shapes_to_label_mask(Size::new(20, 20), &shapes, &index, MaskMode::Instance, '-')
                .unwrap();
        let instance = masks.instance.unwrap();
        assert_eq!(masks.class[[2, 2]], 1);
        assert_eq!(masks.class[[2, 12]], 1);
        assert_eq!(instance[[2, 2]], 1);
        assert_eq!(instance[[2, 12]], 2);
        // A repeated label reuses its instance id
        assert_eq!(instance[[12, 2]], 1);
    }

    #[test]
    fn test_unknown_and_missing_labels() {
        let index = LabelIndex::background();
        let shapes = vec![rect("cat", 0.0, 0.0, 5.0, 5.0)];
        assert!(matches!(
            shapes_to_label_mask(Size::new(10, 10), &shapes, &index, MaskMode::Class, '-'),
            Err(RasterError::UnknownLabel(name)) if name == "cat"
        ));

        let mut unlabeled = rect("x", 0.0, 0.0, 5.0, 5.0);
        unlabeled.label = None;
        assert!(matches!(
            LabelIndex::from_shapes(&[unlabeled], MaskMode::Class, '-'),
            Err(RasterError::UnlabeledShape { index: 0 })
        ));
    }

    proptest! {
        #[test]
        fn prop_rasterization_is_deterministic(
            rects in prop::collection::vec((0.0f32..30.0, 0.0f32..30.0, 0.0f32..30.0, 0.0f32..30.0), 0..6),
        ) {
            let shapes: Vec<Shape> = rects
                .iter()
                .enumerate()
                .map(|(i, (x0, y0, x1, y1))| rect(&format!("l{}", i % 3), *x0, *y0, *x1, *y1))
                .collect();
            let index = LabelIndex::from_shapes(&shapes, MaskMode::Class, '-').unwrap();
            let size = Size::new(32, 32);
            let a = shapes_to_label_mask(size, &shapes, &index, MaskMode::Class, '-').unwrap();
            let b = shapes_to_label_mask(size, &shapes, &index, MaskMode::Class, '-').unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
