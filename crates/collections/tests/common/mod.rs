//! Synthetic scene fixtures shared by the integration tests.
//!
//! Scenes are 10x10 grids of 30 m cells with the origin at (0, 300), so the
//! full extent is the region (0, 0)..(300, 300) and one pixel covers 900 m².

#![allow(dead_code)]

use chrono::NaiveDate;

use playa_collections::temperature::blackbody_radiance;
use playa_engine::memory::{Grid, MemoryBackend, SceneImage};
use playa_engine::{Footprint, Region, Session};

pub const CELL: f64 = 30.0;
pub const ROWS: usize = 10;
pub const COLS: usize = 10;

/// Default surface temperature encoded into the thermal fixture bands.
pub const FIXTURE_LST: f64 = 25.0;

pub fn date_ms(day: &str) -> i64 {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_millis()
}

pub fn footprint() -> Footprint {
    Footprint::new(0.0, 300.0, CELL)
}

/// The scenes' full geographic extent.
pub fn full_region() -> Region {
    Region::new(0.0, 0.0, 300.0, 300.0)
}

pub fn uniform(value: f64) -> Grid {
    Grid::filled(ROWS, COLS, value)
}

/// A grid whose top half (rows 0..5) holds one value and bottom half
/// another.
pub fn split_rows(top: f64, bottom: f64) -> Grid {
    let mut grid = Grid::filled(ROWS, COLS, bottom);
    for row in 0..ROWS / 2 {
        for col in 0..COLS {
            grid.set(row, col, top);
        }
    }
    grid
}

// ── Landsat fixtures ────────────────────────────────────────────────

/// A canonical-schema Landsat 8/9 scene with plausible uniform reflectances
/// and an ideal-atmosphere thermal stack encoding [`FIXTURE_LST`].
pub fn landsat_scene(day: &str, path: i32, row: i32, cloud: f64) -> SceneImage {
    SceneImage::new(footprint())
        .with_timestamp(date_ms(day))
        .with_property("WRS_PATH", path)
        .with_property("WRS_ROW", row)
        .with_property("CLOUD_COVER", cloud)
        .with_band("SR_B2", uniform(0.05))
        .with_band("SR_B3", uniform(0.3))
        .with_band("SR_B4", uniform(0.15))
        .with_band("SR_B5", uniform(0.45))
        .with_band("SR_B6", uniform(0.2))
        .with_band("SR_B7", uniform(0.1))
        .with_band("QA_PIXEL", uniform(0.0))
        .with_band("ST_ATRAN", uniform(10_000.0))
        .with_band("ST_EMIS", uniform(10_000.0))
        .with_band("ST_DRAD", uniform(0.0))
        .with_band("ST_TRAD", uniform(blackbody_radiance(FIXTURE_LST) / 0.001))
        .with_band("ST_URAD", uniform(0.0))
}

/// A Landsat 5 scene in the pre-rename band layout (no thermal stack).
pub fn landsat5_scene(day: &str, path: i32, row: i32, cloud: f64) -> SceneImage {
    SceneImage::new(footprint())
        .with_timestamp(date_ms(day))
        .with_property("WRS_PATH", path)
        .with_property("WRS_ROW", row)
        .with_property("CLOUD_COVER", cloud)
        .with_band("SR_B1", uniform(0.04))
        .with_band("SR_B2", uniform(0.28))
        .with_band("SR_B3", uniform(0.14))
        .with_band("SR_B4", uniform(0.42))
        .with_band("SR_B5", uniform(0.19))
        .with_band("SR_B7", uniform(0.09))
        .with_band("QA_PIXEL", uniform(0.0))
}

pub fn landsat_session(
    l8: Vec<SceneImage>,
    l9: Vec<SceneImage>,
    l5: Vec<SceneImage>,
) -> Session {
    MemoryBackend::new()
        .with_archive("LANDSAT/LC08/C02/T1_L2", l8)
        .with_archive("LANDSAT/LC09/C02/T1_L2", l9)
        .with_archive("LANDSAT/LT05/C02/T1_L2", l5)
        .into_session()
}

/// Blank a scene's bands outside the given half so mosaics have gaps to
/// fill: `keep_top` keeps rows 0..5, otherwise rows 5..10.
pub fn half_coverage(scene: SceneImage, keep_top: bool) -> SceneImage {
    let mut out = scene.clone();
    let masked = scene
        .bands()
        .iter()
        .map(|(name, grid)| {
            let mut g = grid.clone();
            for row in 0..ROWS {
                let blank = if keep_top { row >= ROWS / 2 } else { row < ROWS / 2 };
                if blank {
                    for col in 0..COLS {
                        g.set(row, col, f64::NAN);
                    }
                }
            }
            (name.clone(), g)
        })
        .collect();
    out.set_bands(masked);
    out
}

// ── Sentinel-2 fixtures ─────────────────────────────────────────────

pub fn sentinel_scene(day: &str, tile: &str, cloud: f64, nodata: f64) -> SceneImage {
    SceneImage::new(footprint())
        .with_timestamp(date_ms(day))
        .with_property("MGRS_TILE", tile)
        .with_property("CLOUDY_PIXEL_PERCENTAGE", cloud)
        .with_property("NODATA_PIXEL_PERCENTAGE", nodata)
        .with_band("B3", uniform(0.25))
        .with_band("B4", uniform(0.12))
        .with_band("B8", uniform(0.4))
        .with_band("B11", uniform(0.18))
        .with_band("B12", uniform(0.08))
        .with_band("SCL", uniform(4.0))
}

pub fn sentinel_session(scenes: Vec<SceneImage>) -> Session {
    MemoryBackend::new()
        .with_archive("COPERNICUS/S2_SR_HARMONIZED", scenes)
        .into_session()
}

// ── Assertions ──────────────────────────────────────────────────────

/// The single value of a band that is uniform over the scene extent, via
/// the histogram reducer.
pub fn uniform_band_value(img: &playa_engine::Image, band: &str) -> f64 {
    let hist = img
        .region_histogram(band, &full_region(), CELL, 64)
        .unwrap()
        .expect("band should hold valid pixels");
    assert_eq!(hist.bucket_means.len(), 1, "band is not uniform");
    hist.bucket_means[0]
}

/// Number of valid pixels a band holds over the full extent.
pub fn valid_pixels(img: &playa_engine::Image, band: &str) -> usize {
    match img.region_histogram(band, &full_region(), CELL, 64).unwrap() {
        Some(hist) => hist.total() as usize,
        None => 0,
    }
}
