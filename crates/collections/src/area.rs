//! Pixel-area aggregation over a region.
//!
//! Masks a band at a threshold, sums per-pixel area over a region through
//! the backend's sum reducer, and attaches the result as an image property
//! keyed by the band name. The dynamic variant derives its threshold from a
//! histogram of the band via Otsu's method instead of taking a fixed cutoff.

use playa_engine::{Histogram, Image, PropertyExpr, Region};
use tracing::warn;

/// Options for the fixed-threshold area sum.
#[derive(Debug, Clone)]
pub struct AreaSumOptions {
    /// Inclusion cutoff: pixels with `band >= threshold` count (default -1,
    /// admitting every valid normalized-index value).
    pub threshold: f64,
    /// Reducer pixel scale (default 30, the Landsat grid).
    pub scale: f64,
    /// Reducer safety cap (default 1e12 pixels).
    pub max_pixels: f64,
}

impl Default for AreaSumOptions {
    fn default() -> Self {
        Self {
            threshold: -1.0,
            scale: 30.0,
            max_pixels: 1e12,
        }
    }
}

/// Options for the dynamic-threshold (Otsu) water-area sum.
#[derive(Debug, Clone)]
pub struct DynamicAreaOptions {
    /// Band to threshold and sum (default `ndwi`).
    pub band: String,
    /// Reducer pixel scale (default 30).
    pub scale: f64,
    /// Reducer safety cap (default 1e12 pixels).
    pub max_pixels: f64,
}

impl Default for DynamicAreaOptions {
    fn default() -> Self {
        Self {
            band: "ndwi".to_string(),
            scale: 30.0,
            max_pixels: 1e12,
        }
    }
}

/// Histogram buffer around the region, in length units of the geometry.
const HISTOGRAM_BUFFER: f64 = 6000.0;
/// Histogram bucket count.
const HISTOGRAM_BUCKETS: usize = 255;
/// Calibration offset added to the Otsu threshold, biasing the mask toward
/// stricter inclusion.
const OTSU_OFFSET: f64 = 0.15;

/// Sum the area of pixels where `band >= threshold` over a region, and
/// attach the result (lazily) as a property named after the band.
pub fn pixel_area_sum(
    image: &Image,
    band_name: &str,
    geometry: &Region,
    options: &AreaSumOptions,
) -> Image {
    let mask = image.select(&[band_name]).gte(options.threshold);
    let area = image
        .with_pixel_area()
        .select(&["area"])
        .update_mask(&mask)
        .rename(&[band_name]);
    image.set_expr(
        band_name,
        PropertyExpr::SumRegion {
            source: area.expr().clone(),
            band: band_name.to_string(),
            region: *geometry,
            scale: options.scale,
            max_pixels: options.max_pixels,
        },
    )
}

/// Dynamic-threshold water-area sum.
///
/// Realizes a 255-bucket histogram of the band over the region buffered by
/// 6000 units, picks the Otsu threshold, adds the +0.15 calibration offset,
/// then sums like [`pixel_area_sum`]. A degenerate histogram (uniform band,
/// empty window) yields no valid threshold: the aggregation is skipped and
/// the image is returned unchanged.
pub fn dynamic_pixel_area_sum(
    image: &Image,
    geometry: &Region,
    options: &DynamicAreaOptions,
) -> crate::error::Result<Image> {
    let histogram = image.region_histogram(
        &options.band,
        &geometry.buffer(HISTOGRAM_BUFFER),
        options.scale,
        HISTOGRAM_BUCKETS,
    )?;

    let threshold = histogram.as_ref().and_then(otsu_threshold);
    let Some(threshold) = threshold else {
        warn!(band = %options.band, "degenerate histogram, skipping area aggregation");
        return Ok(image.clone());
    };

    Ok(pixel_area_sum(
        image,
        &options.band,
        geometry,
        &AreaSumOptions {
            threshold: threshold + OTSU_OFFSET,
            scale: options.scale,
            max_pixels: options.max_pixels,
        },
    ))
}

/// Otsu's threshold: the bucket mean whose split maximizes between-class
/// variance. Returns `None` when no split leaves both classes non-empty.
pub fn otsu_threshold(histogram: &Histogram) -> Option<f64> {
    let counts = &histogram.counts;
    let means = &histogram.bucket_means;
    if counts.len() != means.len() || counts.is_empty() {
        return None;
    }

    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let sum: f64 = counts.iter().zip(means).map(|(c, m)| c * m).sum();
    let mean = sum / total;

    let mut best: Option<(f64, f64)> = None;
    let mut a_count = 0.0;
    let mut a_sum = 0.0;

    // Split after bucket i-1: below = buckets [0, i), at-or-above = [i, n).
    for i in 1..counts.len() {
        a_count += counts[i - 1];
        a_sum += counts[i - 1] * means[i - 1];

        let b_count = total - a_count;
        if a_count <= 0.0 || b_count <= 0.0 {
            continue;
        }

        let a_mean = a_sum / a_count;
        let b_mean = (sum - a_sum) / b_count;
        let between = a_count * (a_mean - mean).powi(2) + b_count * (b_mean - mean).powi(2);

        if best.map(|(b, _)| between > b).unwrap_or(true) {
            best = Some((between, means[i - 1]));
        }
    }

    best.map(|(_, threshold)| threshold)
}
