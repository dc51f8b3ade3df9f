//! Region reducers for the in-memory backend.
//!
//! Reductions run over the pixels whose centers fall inside the region, at
//! the scene's native grid. The `max_pixels` safety cap counts every pixel in
//! the region window, valid or not.

use crate::error::{EngineError, Result};
use crate::expr::Histogram;
use crate::geometry::Region;
use crate::memory::grid::Grid;
use crate::memory::scene::SceneImage;

/// Pixels of `scene` whose centers fall inside `region`.
fn region_pixels(scene: &SceneImage, region: &Region) -> Vec<(usize, usize)> {
    let (rows, cols) = scene.shape();
    let footprint = scene.footprint();
    let mut pixels = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = footprint.pixel_center(row, col);
            if region.contains(x, y) {
                pixels.push((row, col));
            }
        }
    }
    pixels
}

/// Sum a band's valid values over a region.
///
/// An empty window sums to zero. Exceeding `max_pixels` is a backend error.
pub fn sum_region(
    scene: &SceneImage,
    band: &str,
    region: &Region,
    max_pixels: f64,
) -> Result<f64> {
    let grid = scene
        .band(band)
        .ok_or_else(|| EngineError::BandNotFound(band.to_string()))?;

    let pixels = region_pixels(scene, region);
    check_budget(pixels.len(), max_pixels)?;

    let sum = pixels
        .iter()
        .map(|&(r, c)| grid.get(r, c))
        .filter(|v| Grid::is_valid(*v))
        .sum();
    Ok(sum)
}

/// Fixed-bucket-count histogram of a band's valid values over a region.
///
/// Returns `None` when the window holds no valid pixels. A uniform band
/// collapses into a single bucket.
pub fn histogram_region(
    scene: &SceneImage,
    band: &str,
    region: &Region,
    buckets: usize,
) -> Result<Option<Histogram>> {
    let grid = scene
        .band(band)
        .ok_or_else(|| EngineError::BandNotFound(band.to_string()))?;

    let values: Vec<f64> = region_pixels(scene, region)
        .iter()
        .map(|&(r, c)| grid.get(r, c))
        .filter(|v| Grid::is_valid(*v))
        .collect();

    if values.is_empty() || buckets == 0 {
        return Ok(None);
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        // Uniform band: one degenerate bucket.
        return Ok(Some(Histogram {
            counts: vec![values.len() as f64],
            bucket_means: vec![min],
        }));
    }

    let width = (max - min) / buckets as f64;
    let mut counts = vec![0.0; buckets];
    for v in &values {
        let idx = (((v - min) / width) as usize).min(buckets - 1);
        counts[idx] += 1.0;
    }
    let bucket_means = (0..buckets)
        .map(|i| min + (i as f64 + 0.5) * width)
        .collect();

    Ok(Some(Histogram { counts, bucket_means }))
}

fn check_budget(pixels: usize, max_pixels: f64) -> Result<()> {
    if (pixels as f64) > max_pixels {
        return Err(EngineError::PixelBudget {
            pixels: pixels as u64,
            max_pixels: max_pixels as u64,
        });
    }
    Ok(())
}
