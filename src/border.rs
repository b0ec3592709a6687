//! Letterbox detection from brightness statistics.
//!
//! Artificial borders show up as near-zero brightness variance along two
//! opposite edges while the interior stays busy. The image is reduced to
//! a fixed luminance grid first so band positions are size-independent.

use std::ops::Range;

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

const GRID: u32 = 100;
const EDGE_BAND: u32 = 15;
const EDGE_STDDEV_MAX: f64 = 8.0;
const INTERIOR_STDDEV_MIN: f64 = 15.0;

/// True when the image carries uniform letterbox bands on either the
/// horizontal or the vertical axis. Failures never propagate; an image
/// that cannot be measured is simply not letterboxed.
pub fn is_letterboxed(image: &DynamicImage) -> bool {
    match measure(image) {
        Some(letterboxed) => letterboxed,
        None => {
            debug!("border statistics unavailable, treating as not letterboxed");
            false
        }
    }
}

fn measure(image: &DynamicImage) -> Option<bool> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }

    let gray = image.to_luma8();
    let grid = image::imageops::resize(&gray, GRID, GRID, FilterType::Nearest);
    let data = grid.as_raw();
    if data.len() != (GRID * GRID) as usize {
        return None;
    }

    let top = band_stddev(data, 0..EDGE_BAND, 0..GRID);
    let bottom = band_stddev(data, GRID - EDGE_BAND..GRID, 0..GRID);
    let row_interior = band_stddev(data, EDGE_BAND..GRID - EDGE_BAND, 0..GRID);

    let left = band_stddev(data, 0..GRID, 0..EDGE_BAND);
    let right = band_stddev(data, 0..GRID, GRID - EDGE_BAND..GRID);
    let col_interior = band_stddev(data, 0..GRID, EDGE_BAND..GRID - EDGE_BAND);

    let horizontal = top < EDGE_STDDEV_MAX
        && bottom < EDGE_STDDEV_MAX
        && row_interior > INTERIOR_STDDEV_MIN;
    let vertical = left < EDGE_STDDEV_MAX
        && right < EDGE_STDDEV_MAX
        && col_interior > INTERIOR_STDDEV_MIN;

    Some(horizontal || vertical)
}

fn band_stddev(data: &[u8], rows: Range<u32>, cols: Range<u32>) -> f64 {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for row in rows.clone() {
        for col in cols.clone() {
            sum += data[(row * GRID + col) as usize] as f64;
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }

    let mean = sum / count as f64;
    let mut variance = 0.0f64;
    for row in rows {
        for col in cols.clone() {
            let delta = data[(row * GRID + col) as usize] as f64 - mean;
            variance += delta * delta;
        }
    }
    (variance / count as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    // Deterministic speckle with plenty of brightness variance.
    fn noisy_value(x: u32, y: u32) -> u8 {
        ((x.wrapping_mul(31).wrapping_add(y.wrapping_mul(57)).wrapping_add(13)) % 256) as u8
    }

    fn letterboxed_image() -> DynamicImage {
        let img = GrayImage::from_fn(100, 100, |x, y| {
            if y < 15 || y >= 85 {
                Luma([0u8])
            } else {
                Luma([noisy_value(x, y)])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    fn noisy_image() -> DynamicImage {
        let img = GrayImage::from_fn(100, 100, |x, y| Luma([noisy_value(x, y)]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_flat_bands_noisy_interior_is_letterboxed() {
        assert!(is_letterboxed(&letterboxed_image()));
    }

    #[test]
    fn test_uniform_noise_is_not_letterboxed() {
        assert!(!is_letterboxed(&noisy_image()));
    }

    #[test]
    fn test_flat_image_is_not_letterboxed() {
        let img = GrayImage::from_pixel(100, 100, Luma([128u8]));
        assert!(!is_letterboxed(&DynamicImage::ImageLuma8(img)));
    }
}
