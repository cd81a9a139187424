//! Deterministic label palette and overlay visualization.

use image::{Rgb, RgbImage};
use ndarray::Array2;

use super::error::{RasterError, RasterResult};
use crate::constants::UNLABELED;

/// Color of label `id`.
///
/// Bit `3j + c` of the id becomes bit `7 - j` of channel `c`, so small ids
/// get bright, well separated colors and the same id always maps to the
/// same color.
pub fn label_color(id: u32) -> [u8; 3] {
    let mut rgb = [0u8; 3];
    let mut id = id;
    for j in 0..8 {
        for (c, channel) in rgb.iter_mut().enumerate() {
            *channel |= (((id >> c) & 1) as u8) << (7 - j);
        }
        id >>= 3;
    }
    rgb
}

/// Palette for ids `0..n`.
pub fn colormap(n: usize) -> Vec<[u8; 3]> {
    (0..n).map(|i| label_color(i as u32)).collect()
}

/// Blend label colors over a grayscale copy of `image`.
///
/// Each pixel is `alpha * color + (1 - alpha) * gray`. Unlabeled pixels
/// (`-1`) are painted black.
pub fn label_to_visualization(
    label: &Array2<i32>,
    image: &RgbImage,
    alpha: f32,
) -> RasterResult<RgbImage> {
    let (height, width) = label.dim();
    if (width, height) != (image.width() as usize, image.height() as usize) {
        return Err(RasterError::SizeMismatch {
            label: (width, height),
            image: (image.width() as usize, image.height() as usize),
        });
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let gray = image::imageops::grayscale(image);

    let viz = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let id = label[[y as usize, x as usize]];
        if id == UNLABELED {
            return Rgb([0, 0, 0]);
        }
        let color = label_color(id.max(0) as u32);
        let g = f32::from(gray.get_pixel(x, y).0[0]);
        Rgb(color.map(|c| (alpha * f32::from(c) + (1.0 - alpha) * g) as u8))
    });
    Ok(viz)
}
