//! Spectral index derivation.
//!
//! Every index is the normalized difference `(A - B) / (A + B)` between two
//! sensor-specific bands, masked to `value >= threshold`, renamed to its
//! semantic name, with the source image's properties carried over. Index
//! values lie in [-1, 1]; the default threshold of -1 therefore admits every
//! valid pixel.

use playa_engine::Image;

use crate::bands;

/// Threshold admitting every valid index value.
pub const DEFAULT_INDEX_THRESHOLD: f64 = -1.0;

/// Shared core: normalized difference, threshold mask, semantic rename,
/// property propagation.
fn normalized_index(image: &Image, first: &str, second: &str, threshold: f64, name: &str) -> Image {
    let index = image.normalized_difference(first, second);
    index
        .update_mask(&index.gte(threshold))
        .rename(&[name])
        .copy_properties(image)
}

// ── Landsat ─────────────────────────────────────────────────────────

/// NDWI (green vs. NIR): positive over open water.
pub fn landsat_ndwi(image: &Image, threshold: f64) -> Image {
    normalized_index(image, bands::LANDSAT_GREEN, bands::LANDSAT_NIR, threshold, "ndwi")
}

/// NDVI (NIR vs. red): positive over vegetation.
pub fn landsat_ndvi(image: &Image, threshold: f64) -> Image {
    normalized_index(image, bands::LANDSAT_NIR, bands::LANDSAT_RED, threshold, "ndvi")
}

/// Halite index (red vs. SWIR1): highlights rock-salt crusts.
pub fn landsat_halite(image: &Image, threshold: f64) -> Image {
    normalized_index(image, bands::LANDSAT_RED, bands::LANDSAT_SWIR1, threshold, "halite")
}

/// Gypsum index (SWIR1 vs. SWIR2): highlights gypsiferous surfaces.
pub fn landsat_gypsum(image: &Image, threshold: f64) -> Image {
    normalized_index(image, bands::LANDSAT_SWIR1, bands::LANDSAT_SWIR2, threshold, "gypsum")
}

// ── Sentinel-2 ──────────────────────────────────────────────────────

pub fn sentinel_ndwi(image: &Image, threshold: f64) -> Image {
    normalized_index(image, bands::SENTINEL_GREEN, bands::SENTINEL_NIR, threshold, "ndwi")
}

pub fn sentinel_ndvi(image: &Image, threshold: f64) -> Image {
    normalized_index(image, bands::SENTINEL_NIR, bands::SENTINEL_RED, threshold, "ndvi")
}

pub fn sentinel_halite(image: &Image, threshold: f64) -> Image {
    normalized_index(image, bands::SENTINEL_RED, bands::SENTINEL_SWIR1, threshold, "halite")
}

pub fn sentinel_gypsum(image: &Image, threshold: f64) -> Image {
    normalized_index(image, bands::SENTINEL_SWIR1, bands::SENTINEL_SWIR2, threshold, "gypsum")
}
