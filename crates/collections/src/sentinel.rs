//! Sentinel-2 collection manager.
//!
//! Wraps the harmonized surface-reflectance archive behind a date-sorted
//! collection filtered by MGRS tile membership, no-data share and cloudy
//! share, with the same derived views as the Landsat manager minus the
//! thermal capability (the MSI instrument carries no thermal band).

use serde::{Deserialize, Serialize};
use tracing::debug;

use playa_engine::{Image, ImageCollection, PropertyValue, Session};

use crate::bands::{self, DATE_FILTER};
use crate::derived::{
    grab_by_index, pick_by_date, require_bands, tag_acquisition_date, DateIndexed,
    DerivedCollection,
};
use crate::error::{CollectionError, Result};
use crate::indices::{self, DEFAULT_INDEX_THRESHOLD};
use crate::landsat::stitch_by_date;
use crate::masks;

/// Harmonized Sentinel-2 L2A surface-reflectance archive.
pub const SENTINEL2_ARCHIVE: &str = "COPERNICUS/S2_SR_HARMONIZED";

/// Filter parameters for the Sentinel-2 archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentinel2Filter {
    /// Inclusive start date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Exclusive end date, `YYYY-MM-DD`.
    pub end_date: String,
    /// MGRS tiles to keep (set membership; must be non-empty).
    pub tiles: Vec<String>,
    /// Keep scenes with `CLOUDY_PIXEL_PERCENTAGE` at or below this.
    pub cloud_percentage_threshold: f64,
    /// Keep scenes with `NODATA_PIXEL_PERCENTAGE` at or below this.
    pub nodata_threshold: f64,
}

/// A filtered, date-sorted Sentinel-2 collection with its derived views.
///
/// Same all-or-nothing construction contract as
/// [`crate::landsat::LandsatCollection`].
#[derive(Debug, Clone)]
pub struct Sentinel2Collection {
    collection: ImageCollection,
    dates: Vec<String>,
    masked_clouds: DerivedCollection,
    ndwi: DerivedCollection,
    ndvi: DerivedCollection,
    halite: DerivedCollection,
    gypsum: DerivedCollection,
}

impl Sentinel2Collection {
    /// Build from raw filter parameters against the archive.
    pub fn from_filter(session: &Session, filter: &Sentinel2Filter) -> Result<Self> {
        if filter.tiles.is_empty() {
            return Err(CollectionError::Config("empty MGRS tile set".into()));
        }
        Self::build(filtered_archive(session, filter))
    }

    /// Wrap a pre-built collection; the dates index is recomputed.
    pub fn from_collection(collection: ImageCollection) -> Result<Self> {
        Self::build(collection)
    }

    fn build(collection: ImageCollection) -> Result<Self> {
        let dates = collection.aggregate_string_array(DATE_FILTER)?;
        let available = collection.first().band_names()?;

        require_bands("ndwi", &available, &[bands::SENTINEL_GREEN, bands::SENTINEL_NIR])?;
        require_bands("ndvi", &available, &[bands::SENTINEL_RED, bands::SENTINEL_NIR])?;
        require_bands("halite", &available, &[bands::SENTINEL_RED, bands::SENTINEL_SWIR1])?;
        require_bands("gypsum", &available, &[bands::SENTINEL_SWIR1, bands::SENTINEL_SWIR2])?;

        debug!(images = dates.len(), "sentinel-2 collection validated");

        let masked_clouds = DerivedCollection::new(
            collection.map(|img| masks::mask_sentinel_clouds(&img)),
            &dates,
        );
        let ndwi = DerivedCollection::new(
            collection.map(|img| indices::sentinel_ndwi(&img, DEFAULT_INDEX_THRESHOLD)),
            &dates,
        );
        let ndvi = DerivedCollection::new(
            collection.map(|img| indices::sentinel_ndvi(&img, DEFAULT_INDEX_THRESHOLD)),
            &dates,
        );
        let halite = DerivedCollection::new(
            collection.map(|img| indices::sentinel_halite(&img, DEFAULT_INDEX_THRESHOLD)),
            &dates,
        );
        let gypsum = DerivedCollection::new(
            collection.map(|img| indices::sentinel_gypsum(&img, DEFAULT_INDEX_THRESHOLD)),
            &dates,
        );

        Ok(Self {
            collection,
            dates,
            masked_clouds,
            ndwi,
            ndvi,
            halite,
            gypsum,
        })
    }

    // ── Views ───────────────────────────────────────────────────────

    /// The filtered, date-sorted collection.
    pub fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    /// Per-image `Date_Filter` values in sort order.
    pub fn list_of_dates(&self) -> &[String] {
        &self.dates
    }

    /// Cloud-masked scenes (scene classification code 9 removed).
    pub fn masked_clouds(&self) -> &DerivedCollection {
        &self.masked_clouds
    }

    pub fn ndwi(&self) -> &DerivedCollection {
        &self.ndwi
    }

    pub fn ndvi(&self) -> &DerivedCollection {
        &self.ndvi
    }

    pub fn halite(&self) -> &DerivedCollection {
        &self.halite
    }

    pub fn gypsum(&self) -> &DerivedCollection {
        &self.gypsum
    }

    /// Water-masked scenes (scene classification code 6 removed), derived
    /// on demand.
    pub fn masked_water_collection(&self) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| masks::mask_sentinel_water(&img)),
            &self.dates,
        )
    }

    /// NDWI view at a caller-chosen threshold.
    pub fn ndwi_collection(&self, threshold: f64) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| indices::sentinel_ndwi(&img, threshold)),
            &self.dates,
        )
    }

    /// NDVI view at a caller-chosen threshold.
    pub fn ndvi_collection(&self, threshold: f64) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| indices::sentinel_ndvi(&img, threshold)),
            &self.dates,
        )
    }

    /// Halite view at a caller-chosen threshold.
    pub fn halite_collection(&self, threshold: f64) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| indices::sentinel_halite(&img, threshold)),
            &self.dates,
        )
    }

    /// Gypsum view at a caller-chosen threshold.
    pub fn gypsum_collection(&self, threshold: f64) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| indices::sentinel_gypsum(&img, threshold)),
            &self.dates,
        )
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Positional lookup through the dates index.
    pub fn image_grab(&self, index: usize) -> Result<Option<Image>> {
        grab_by_index(&self.collection, &self.dates, index)
    }

    /// Date-keyed lookup with any caller-supplied date.
    pub fn image_pick(&self, date: &str) -> Result<Option<Image>> {
        pick_by_date(&self.collection, date)
    }

    /// Positional lookup against an external collection sharing this
    /// instance's date ordering.
    pub fn custom_image_grab(
        &self,
        collection: &ImageCollection,
        index: usize,
    ) -> Result<Option<Image>> {
        grab_by_index(collection, &self.dates, index)
    }

    // ── Stitching ───────────────────────────────────────────────────

    /// Inner-join with another Sentinel-2 collection by acquisition date,
    /// mosaicking each matching pair. See
    /// [`crate::landsat::LandsatCollection::collection_stitch`].
    pub fn collection_stitch(&self, other: &Sentinel2Collection) -> Result<Sentinel2Collection> {
        let stitched = stitch_by_date(&self.collection, self.list_of_dates(), &other.collection);
        Sentinel2Collection::from_collection(stitched)
    }
}

impl DateIndexed for Sentinel2Collection {
    fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    fn dates(&self) -> &[String] {
        &self.dates
    }
}

fn filtered_archive(session: &Session, filter: &Sentinel2Filter) -> ImageCollection {
    let tiles: Vec<PropertyValue> = filter
        .tiles
        .iter()
        .map(|t| PropertyValue::Str(t.clone()))
        .collect();

    session
        .archive(SENTINEL2_ARCHIVE)
        .filter_date(&filter.start_date, &filter.end_date)
        .filter_in("MGRS_TILE", tiles)
        .filter_lte("NODATA_PIXEL_PERCENTAGE", filter.nodata_threshold)
        .filter_lte("CLOUDY_PIXEL_PERCENTAGE", filter.cloud_percentage_threshold)
        .map(|img| tag_acquisition_date(&img))
        .sort(DATE_FILTER)
}
