//! Landsat collection manager.
//!
//! Wraps the three-generation Landsat surface-reflectance archives (5, 8, 9)
//! behind one date-sorted collection with a canonical band schema, and
//! eagerly derives the standard views: cloud-masked scenes, the four
//! spectral indices, and surface temperature.

use serde::{Deserialize, Serialize};
use tracing::debug;

use playa_engine::{Image, ImageCollection, PropertyValue, Session};

use crate::bands::{
    self, DATE_FILTER, LANDSAT_THERMAL, TIME_START,
};
use crate::derived::{
    grab_by_index, pick_by_date, require_bands, tag_acquisition_date, DateIndexed,
    DerivedCollection,
};
use crate::error::Result;
use crate::indices::{self, DEFAULT_INDEX_THRESHOLD};
use crate::masks;
use crate::temperature::{scaled_temperature_bands, surface_temperature};

/// Landsat 8 Collection 2 Tier 1 Level 2 archive.
pub const LANDSAT8_ARCHIVE: &str = "LANDSAT/LC08/C02/T1_L2";
/// Landsat 9 Collection 2 Tier 1 Level 2 archive.
pub const LANDSAT9_ARCHIVE: &str = "LANDSAT/LC09/C02/T1_L2";
/// Landsat 5 Collection 2 Tier 1 Level 2 archive (pre-rename band layout).
pub const LANDSAT5_ARCHIVE: &str = "LANDSAT/LT05/C02/T1_L2";

/// Filter parameters for the Landsat archives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandsatFilter {
    /// Inclusive start date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Exclusive end date, `YYYY-MM-DD`.
    pub end_date: String,
    /// WRS-2 path of the scenes to keep.
    pub tile_path: i32,
    /// WRS-2 row of the scenes to keep.
    pub tile_row: i32,
    /// Keep scenes with `CLOUD_COVER` at or below this percentage.
    pub cloud_percentage_threshold: f64,
}

/// A filtered, date-sorted Landsat collection with its derived views.
///
/// Construction validates the band schema against every derived capability
/// before committing: either the caller gets a fully populated manager or a
/// fatal error, never a partial object. All derived views are computed at
/// construction and read-only thereafter.
#[derive(Debug, Clone)]
pub struct LandsatCollection {
    collection: ImageCollection,
    dates: Vec<String>,
    masked_clouds: DerivedCollection,
    ndwi: DerivedCollection,
    ndvi: DerivedCollection,
    halite: DerivedCollection,
    gypsum: DerivedCollection,
    lst: DerivedCollection,
}

impl LandsatCollection {
    /// Build from raw filter parameters against the three-generation union.
    pub fn from_filter(session: &Session, filter: &LandsatFilter) -> Result<Self> {
        Self::build(filtered_archive(session, filter))
    }

    /// Wrap a pre-built collection (stitched results, external subsets).
    ///
    /// The dates index is recomputed from the collection; images must
    /// already carry `Date_Filter`.
    pub fn from_collection(collection: ImageCollection) -> Result<Self> {
        Self::build(collection)
    }

    fn build(collection: ImageCollection) -> Result<Self> {
        let dates = collection.aggregate_string_array(DATE_FILTER)?;
        let available = collection.first().band_names()?;

        require_bands("ndwi", &available, &[bands::LANDSAT_GREEN, bands::LANDSAT_NIR])?;
        require_bands("ndvi", &available, &[bands::LANDSAT_RED, bands::LANDSAT_NIR])?;
        require_bands("halite", &available, &[bands::LANDSAT_RED, bands::LANDSAT_SWIR1])?;
        require_bands("gypsum", &available, &[bands::LANDSAT_SWIR1, bands::LANDSAT_SWIR2])?;
        require_bands("surface temperature", &available, &LANDSAT_THERMAL)?;

        debug!(images = dates.len(), "landsat collection validated");

        let masked_clouds = DerivedCollection::new(
            collection.map(|img| masks::mask_landsat_clouds(&img)),
            &dates,
        );
        let ndwi = DerivedCollection::new(
            collection.map(|img| indices::landsat_ndwi(&img, DEFAULT_INDEX_THRESHOLD)),
            &dates,
        );
        let ndvi = DerivedCollection::new(
            collection.map(|img| indices::landsat_ndvi(&img, DEFAULT_INDEX_THRESHOLD)),
            &dates,
        );
        let halite = DerivedCollection::new(
            collection.map(|img| indices::landsat_halite(&img, DEFAULT_INDEX_THRESHOLD)),
            &dates,
        );
        let gypsum = DerivedCollection::new(
            collection.map(|img| indices::landsat_gypsum(&img, DEFAULT_INDEX_THRESHOLD)),
            &dates,
        );
        let lst = DerivedCollection::new(
            collection.map(|img| surface_temperature(&scaled_temperature_bands(&img))),
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
            lst,
        })
    }

    // ── Views ───────────────────────────────────────────────────────

    /// The filtered, date-sorted collection.
    pub fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    /// Per-image `Date_Filter` values in sort order (duplicates possible
    /// when two generations image the same day).
    pub fn list_of_dates(&self) -> &[String] {
        &self.dates
    }

    /// Cloud- and cirrus-masked scenes.
    pub fn masked_clouds(&self) -> &DerivedCollection {
        &self.masked_clouds
    }

    /// NDWI view built with the default (admit-all) threshold.
    pub fn ndwi(&self) -> &DerivedCollection {
        &self.ndwi
    }

    /// NDVI view built with the default threshold.
    pub fn ndvi(&self) -> &DerivedCollection {
        &self.ndvi
    }

    /// Halite-index view built with the default threshold.
    pub fn halite(&self) -> &DerivedCollection {
        &self.halite
    }

    /// Gypsum-index view built with the default threshold.
    pub fn gypsum(&self) -> &DerivedCollection {
        &self.gypsum
    }

    /// Surface-temperature view (`LST` band in Celsius).
    pub fn surface_temperature(&self) -> &DerivedCollection {
        &self.lst
    }

    /// Water-masked scenes, derived on demand.
    pub fn masked_water_collection(&self) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| masks::mask_landsat_water(&img)),
            &self.dates,
        )
    }

    /// NDWI view at a caller-chosen threshold.
    pub fn ndwi_collection(&self, threshold: f64) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| indices::landsat_ndwi(&img, threshold)),
            &self.dates,
        )
    }

    /// NDVI view at a caller-chosen threshold.
    pub fn ndvi_collection(&self, threshold: f64) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| indices::landsat_ndvi(&img, threshold)),
            &self.dates,
        )
    }

    /// Halite view at a caller-chosen threshold.
    pub fn halite_collection(&self, threshold: f64) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| indices::landsat_halite(&img, threshold)),
            &self.dates,
        )
    }

    /// Gypsum view at a caller-chosen threshold.
    pub fn gypsum_collection(&self, threshold: f64) -> DerivedCollection {
        DerivedCollection::new(
            self.collection.map(|img| indices::landsat_gypsum(&img, threshold)),
            &self.dates,
        )
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Positional lookup: resolve the date at `index`, return the first
    /// image carrying it. Empty match is a typed `None`.
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

    /// Inner-join this collection with another by acquisition date and
    /// mosaic each matching pair into one per-date composite.
    ///
    /// Dates present on only one side are silently dropped. The composite
    /// carries the first side's properties with `Date_Filter` and the
    /// acquisition timestamp explicitly re-set. Every step stays lazy; the
    /// result is a new manager over the mosaicked, date-sorted collection.
    pub fn collection_stitch(&self, other: &LandsatCollection) -> Result<LandsatCollection> {
        let stitched = stitch_by_date(&self.collection, self.list_of_dates(), &other.collection);
        LandsatCollection::from_collection(stitched)
    }
}

impl DateIndexed for LandsatCollection {
    fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    fn dates(&self) -> &[String] {
        &self.dates
    }
}

/// The lazy date-join mosaic shared by both sensor families.
pub(crate) fn stitch_by_date(
    ours: &ImageCollection,
    our_dates: &[String],
    theirs: &ImageCollection,
) -> ImageCollection {
    let our_dates: Vec<PropertyValue> = our_dates
        .iter()
        .map(|d| PropertyValue::Str(d.clone()))
        .collect();

    // Their images on our dates, then our images on the surviving dates:
    // the inner join, built without realizing either side.
    let partners = theirs.filter_in(DATE_FILTER, our_dates);
    let shared = ours.filter_in_expr(DATE_FILTER, partners.aggregate_array_expr(DATE_FILTER));

    let session = ours.session().clone();
    shared
        .map(|img| {
            let date = img.property_expr(DATE_FILTER);
            let partner = partners.filter_eq_expr(DATE_FILTER, date.clone()).first();
            ImageCollection::from_images(&session, &[img.clone(), partner])
                .mosaic()
                .copy_properties(&img)
                .set_expr(DATE_FILTER, date)
                .set_expr(TIME_START, img.property_expr(TIME_START))
        })
        .sort(DATE_FILTER)
}

fn filtered_archive(session: &Session, filter: &LandsatFilter) -> ImageCollection {
    let landsat8 = session.archive(LANDSAT8_ARCHIVE);
    let landsat9 = session.archive(LANDSAT9_ARCHIVE);
    // Landsat 5 is renormalized onto the canonical schema before the union.
    let landsat5 = session
        .archive(LANDSAT5_ARCHIVE)
        .map(|img| bands::landsat5_band_rename(&img));

    landsat8
        .merge(&landsat9)
        .merge(&landsat5)
        .filter_date(&filter.start_date, &filter.end_date)
        .filter_eq("WRS_PATH", filter.tile_path)
        .filter_eq("WRS_ROW", filter.tile_row)
        .filter_lte("CLOUD_COVER", filter.cloud_percentage_threshold)
        .map(|img| tag_acquisition_date(&img))
        .sort(DATE_FILTER)
}
