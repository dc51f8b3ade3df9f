//! Canonical band layouts per sensor family.
//!
//! Landsat 8/9 surface-reflectance band names are the canonical layout for
//! the Landsat family; Landsat 5 scenes are renormalized onto it before any
//! union. Sentinel-2 uses its native L2A names.

use playa_engine::Image;

/// The property every image is tagged with at ingestion: its acquisition
/// date normalized to `YYYY-MM-DD`. It is the join key across collections
/// and is never recomputed downstream.
pub const DATE_FILTER: &str = "Date_Filter";

/// Acquisition timestamp property (epoch milliseconds), preserved through
/// mosaicking.
pub const TIME_START: &str = "system:time_start";

// ── Landsat (canonical: Landsat 8/9 layout) ─────────────────────────

pub const LANDSAT_GREEN: &str = "SR_B3";
pub const LANDSAT_RED: &str = "SR_B4";
pub const LANDSAT_NIR: &str = "SR_B5";
pub const LANDSAT_SWIR1: &str = "SR_B6";
pub const LANDSAT_SWIR2: &str = "SR_B7";
pub const LANDSAT_QA: &str = "QA_PIXEL";

/// Landsat 5 band names, in the positional order matching
/// [`LANDSAT_CANONICAL`].
pub const LANDSAT5_SOURCE: [&str; 7] = [
    "SR_B1", "SR_B2", "SR_B3", "SR_B4", "SR_B5", "SR_B7", "QA_PIXEL",
];

/// Canonical Landsat band names the whole family presents after union.
pub const LANDSAT_CANONICAL: [&str; 7] = [
    "SR_B2", "SR_B3", "SR_B4", "SR_B5", "SR_B6", "SR_B7", "QA_PIXEL",
];

/// Raw thermal bands required for surface-temperature retrieval.
pub const LANDSAT_THERMAL: [&str; 5] = [
    "ST_ATRAN", "ST_EMIS", "ST_DRAD", "ST_TRAD", "ST_URAD",
];

// ── Sentinel-2 ──────────────────────────────────────────────────────

pub const SENTINEL_GREEN: &str = "B3";
pub const SENTINEL_RED: &str = "B4";
pub const SENTINEL_NIR: &str = "B8";
pub const SENTINEL_SWIR1: &str = "B11";
pub const SENTINEL_SWIR2: &str = "B12";
pub const SENTINEL_SCL: &str = "SCL";

/// Rename a Landsat 5 image onto the canonical Landsat layout.
///
/// Pure positional select+rename: pixel values pass through unchanged. A
/// scene missing one of the source bands does not fail here; the deferred
/// evaluation error is caught by the constructor's band checks.
pub fn landsat5_band_rename(image: &Image) -> Image {
    image.select(&LANDSAT5_SOURCE).rename(&LANDSAT_CANONICAL)
}
