//! # Playa Collections
//!
//! Remote-sensing analytics over Landsat and Sentinel-2 image collections:
//! the index/mask/time-series pipeline layer behind a map dashboard.
//!
//! This crate provides:
//! - `LandsatCollection` / `Sentinel2Collection`: filtered, date-sorted
//!   collection managers with eagerly derived views (cloud masks, NDWI,
//!   NDVI, halite, gypsum, surface temperature)
//! - Band normalization across sensor generations
//! - QA bit-flag and scene-classification masking
//! - Pixel-area aggregation, fixed-threshold or Otsu-derived
//! - Date-keyed collection stitching (lazy and legacy eager variants)
//!
//! All raster work is described lazily against a
//! [`playa_engine::Session`]; the backend executes it.

pub mod area;
pub mod bands;
pub mod derived;
pub mod error;
pub mod indices;
pub mod landsat;
pub mod masks;
pub mod sentinel;
pub mod stitch;
pub mod temperature;

pub use area::{
    dynamic_pixel_area_sum, otsu_threshold, pixel_area_sum, AreaSumOptions, DynamicAreaOptions,
};
pub use derived::{DateIndexed, DerivedCollection};
pub use error::{CollectionError, Result};
pub use landsat::{LandsatCollection, LandsatFilter};
pub use sentinel::{Sentinel2Collection, Sentinel2Filter};
pub use stitch::{collection_stitch, PropertySide};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::area::{pixel_area_sum, AreaSumOptions, DynamicAreaOptions};
    pub use crate::derived::{DateIndexed, DerivedCollection};
    pub use crate::error::{CollectionError, Result};
    pub use crate::landsat::{LandsatCollection, LandsatFilter};
    pub use crate::sentinel::{Sentinel2Collection, Sentinel2Filter};
    pub use crate::stitch::{collection_stitch, PropertySide};
}
