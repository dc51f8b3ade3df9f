//! End-to-end tests of the Landsat manager against the in-memory backend.

mod common;

use common::*;

use playa_collections::area::{
    dynamic_pixel_area_sum, pixel_area_sum, AreaSumOptions, DynamicAreaOptions,
};
use playa_collections::{CollectionError, LandsatCollection, LandsatFilter};
use playa_engine::{PropertyValue, Region};

fn standard_filter() -> LandsatFilter {
    LandsatFilter {
        start_date: "2023-05-01".to_string(),
        end_date: "2023-08-01".to_string(),
        tile_path: 39,
        tile_row: 32,
        cloud_percentage_threshold: 50.0,
    }
}

/// Three archives, of which one scene falls outside the date range, one
/// exceeds the cloud cap and one sits on a different path.
fn standard_collection() -> LandsatCollection {
    let session = landsat_session(
        vec![
            landsat_scene("2023-06-01", 39, 32, 10.0),
            landsat_scene("2023-07-01", 39, 32, 80.0), // too cloudy
            landsat_scene("2023-09-01", 39, 32, 5.0),  // past the range
        ],
        vec![
            landsat_scene("2023-06-17", 39, 32, 5.0),
            landsat_scene("2023-06-17", 40, 32, 5.0), // wrong path
        ],
        vec![landsat5_scene("2023-06-25", 39, 32, 0.0)],
    );
    LandsatCollection::from_filter(&session, &standard_filter()).unwrap()
}

#[test]
fn construction_filters_tags_and_sorts() {
    let col = standard_collection();
    assert_eq!(
        col.list_of_dates(),
        &["2023-06-01", "2023-06-17", "2023-06-25"]
    );
}

#[test]
fn landsat5_scenes_present_the_canonical_schema() {
    let col = standard_collection();
    let l5 = col.image_grab(2).unwrap().expect("date should match");
    assert_eq!(
        l5.band_names().unwrap(),
        vec!["SR_B2", "SR_B3", "SR_B4", "SR_B5", "SR_B6", "SR_B7", "QA_PIXEL"]
    );
    // Pure rename: the old green band's values surface unchanged under the
    // canonical green name.
    let green = uniform_band_value(&l5, "SR_B3");
    assert!((green - 0.28).abs() < 1e-12);
    let swir1 = uniform_band_value(&l5, "SR_B6");
    assert!((swir1 - 0.19).abs() < 1e-12);
}

#[test]
fn ndwi_view_computes_masks_and_propagates_dates() {
    let col = standard_collection();
    let img = col.ndwi().image_grab(0).unwrap().unwrap();

    assert_eq!(img.band_names().unwrap(), vec!["ndwi"]);
    // (0.3 - 0.45) / (0.3 + 0.45)
    let value = uniform_band_value(&img, "ndwi");
    assert!((value - (-0.2)).abs() < 1e-12, "got {value}");
    assert!((-1.0..=1.0).contains(&value));

    assert_eq!(
        img.property("Date_Filter").unwrap(),
        Some(PropertyValue::Str("2023-06-01".into()))
    );
}

#[test]
fn index_views_cover_all_four_signatures() {
    let col = standard_collection();

    let ndvi = col.ndvi().image_grab(0).unwrap().unwrap();
    let value = uniform_band_value(&ndvi, "ndvi");
    assert!((value - 0.5).abs() < 1e-12); // (0.45 - 0.15) / 0.6

    let halite = col.halite().image_grab(0).unwrap().unwrap();
    let value = uniform_band_value(&halite, "halite");
    assert!((value - (-0.05 / 0.35)).abs() < 1e-12);

    let gypsum = col.gypsum().image_grab(0).unwrap().unwrap();
    let value = uniform_band_value(&gypsum, "gypsum");
    assert!((value - (0.1 / 0.3)).abs() < 1e-12);
}

#[test]
fn per_call_threshold_actually_masks() {
    let col = standard_collection();

    // NDWI is -0.2 everywhere: a 0.0 cutoff masks every pixel...
    let strict = col.ndwi_collection(0.0).image_grab(0).unwrap().unwrap();
    assert_eq!(valid_pixels(&strict, "ndwi"), 0);

    // ...while the admit-all default keeps them.
    let lax = col.ndwi_collection(-1.0).image_grab(0).unwrap().unwrap();
    assert_eq!(valid_pixels(&lax, "ndwi"), 100);
}

#[test]
fn derived_views_are_idempotent() {
    let col = standard_collection();
    let region = full_region();

    let once = col
        .ndwi()
        .image_grab(0)
        .unwrap()
        .unwrap()
        .region_histogram("ndwi", &region, CELL, 32)
        .unwrap()
        .unwrap();
    let twice = col
        .ndwi()
        .image_grab(0)
        .unwrap()
        .unwrap()
        .region_histogram("ndwi", &region, CELL, 32)
        .unwrap()
        .unwrap();

    assert_eq!(once.counts, twice.counts);
    assert_eq!(once.bucket_means, twice.bucket_means);
}

#[test]
fn cloud_mask_drops_flagged_pixels() {
    // Cloud bit (3) set over the bottom half of one scene.
    let cloudy = landsat_scene("2023-06-01", 39, 32, 10.0)
        .with_band("QA_PIXEL", split_rows(0.0, 8.0));
    let session = landsat_session(vec![cloudy], vec![], vec![]);
    let col = LandsatCollection::from_filter(&session, &standard_filter()).unwrap();

    let raw = col.image_grab(0).unwrap().unwrap();
    assert_eq!(valid_pixels(&raw, "SR_B3"), 100);

    let masked = col.masked_clouds().image_grab(0).unwrap().unwrap();
    assert_eq!(valid_pixels(&masked, "SR_B3"), 50);
}

#[test]
fn cirrus_bit_masks_independently() {
    // Cirrus bit (2) set over the top half.
    let hazy = landsat_scene("2023-06-01", 39, 32, 10.0)
        .with_band("QA_PIXEL", split_rows(4.0, 0.0));
    let session = landsat_session(vec![hazy], vec![], vec![]);
    let col = LandsatCollection::from_filter(&session, &standard_filter()).unwrap();

    let masked = col.masked_clouds().image_grab(0).unwrap().unwrap();
    assert_eq!(valid_pixels(&masked, "SR_B3"), 50);
}

#[test]
fn water_mask_is_on_demand() {
    // Water bit (7) set over the top half.
    let scene = landsat_scene("2023-06-01", 39, 32, 10.0)
        .with_band("QA_PIXEL", split_rows(128.0, 0.0));
    let session = landsat_session(vec![scene], vec![], vec![]);
    let col = LandsatCollection::from_filter(&session, &standard_filter()).unwrap();

    let masked = col.masked_water_collection().image_grab(0).unwrap().unwrap();
    assert_eq!(valid_pixels(&masked, "SR_B4"), 50);
}

#[test]
fn surface_temperature_recovers_the_encoded_blackbody() {
    let col = standard_collection();
    let img = col.surface_temperature().image_grab(0).unwrap().unwrap();

    let names = img.band_names().unwrap();
    assert!(names.contains(&"LST".to_string()));
    // Raw bands are added to, not replaced.
    assert!(names.contains(&"SR_B3".to_string()));
    assert!(names.contains(&"B10_radiance".to_string()));

    let lst = uniform_band_value(&img, "LST");
    assert!(
        (lst - FIXTURE_LST).abs() < 0.01,
        "expected {FIXTURE_LST} °C, got {lst}"
    );
}

#[test]
fn missing_swir_band_is_a_fatal_schema_error() {
    let mut broken = landsat_scene("2023-06-01", 39, 32, 10.0);
    let bands: Vec<_> = broken
        .bands()
        .iter()
        .filter(|(name, _)| name != "SR_B6")
        .cloned()
        .collect();
    broken.set_bands(bands);

    let session = landsat_session(vec![broken], vec![], vec![]);
    let err = LandsatCollection::from_filter(&session, &standard_filter()).unwrap_err();
    match err {
        CollectionError::Schema { capability, missing } => {
            assert_eq!(capability, "halite");
            assert_eq!(missing, vec!["SR_B6"]);
        }
        other => panic!("expected a schema error, got {other:?}"),
    }
}

#[test]
fn lookups_distinguish_absence_from_caller_errors() {
    let col = standard_collection();

    assert!(col.image_pick("2023-06-17").unwrap().is_some());
    assert!(col.image_pick("2019-01-01").unwrap().is_none());

    assert!(matches!(
        col.image_grab(99),
        Err(CollectionError::IndexOutOfBounds { index: 99, len: 3 })
    ));

    // Positional resolution against an external collection sharing the
    // date order.
    let ndwi = col.ndwi().collection().clone();
    let img = col.custom_image_grab(&ndwi, 1).unwrap().unwrap();
    assert_eq!(img.band_names().unwrap(), vec!["ndwi"]);
}

#[test]
fn fixed_threshold_area_sum() {
    let col = standard_collection();
    let img = col.ndwi().image_grab(0).unwrap().unwrap();

    // A window over the 2x2 north-west pixel block.
    let region = Region::new(0.0, 240.0, 60.0, 300.0);
    let with_area = pixel_area_sum(&img, "ndwi", &region, &AreaSumOptions::default());

    let area = with_area.property("ndwi").unwrap().unwrap().as_num().unwrap();
    assert!((area - 4.0 * CELL * CELL).abs() < 1e-6, "got {area}");
}

#[test]
fn area_sum_respects_the_threshold() {
    let col = standard_collection();
    let img = col.ndwi().image_grab(0).unwrap().unwrap();

    let options = AreaSumOptions { threshold: 0.5, ..Default::default() };
    let with_area = pixel_area_sum(&img, "ndwi", &full_region(), &options);

    // NDWI is -0.2 everywhere; nothing clears a 0.5 cutoff.
    let area = with_area.property("ndwi").unwrap().unwrap().as_num().unwrap();
    assert_eq!(area, 0.0);
}

#[test]
fn dynamic_area_sum_picks_an_otsu_threshold() {
    // Bimodal NDWI: 0.8 over the top half (water), 0.1 over the bottom.
    let scene = landsat_scene("2023-06-01", 39, 32, 10.0)
        .with_band("SR_B3", split_rows(0.9, 0.55))
        .with_band("SR_B5", split_rows(0.1, 0.45));
    let session = landsat_session(vec![scene], vec![], vec![]);
    let col = LandsatCollection::from_filter(&session, &standard_filter()).unwrap();

    let img = col.ndwi().image_grab(0).unwrap().unwrap();
    let with_area =
        dynamic_pixel_area_sum(&img, &full_region(), &DynamicAreaOptions::default()).unwrap();

    // The +0.15 offset lands between the modes, so only the 50 water
    // pixels survive.
    let area = with_area.property("ndwi").unwrap().unwrap().as_num().unwrap();
    assert!((area - 50.0 * CELL * CELL).abs() < 1e-6, "got {area}");
}

#[test]
fn dynamic_area_sum_skips_degenerate_scenes() {
    // Uniform NDWI: no valid Otsu split.
    let col = standard_collection();
    let img = col.ndwi().image_grab(0).unwrap().unwrap();

    let out = dynamic_pixel_area_sum(&img, &full_region(), &DynamicAreaOptions::default()).unwrap();
    assert!(out.property("ndwi").unwrap().is_none());
}

#[test]
fn filter_parameters_round_trip_as_json() {
    let filter = standard_filter();
    let json = serde_json::to_string(&filter).unwrap();
    let back: LandsatFilter = serde_json::from_str(&json).unwrap();
    assert_eq!(back.start_date, filter.start_date);
    assert_eq!(back.tile_path, filter.tile_path);
    assert_eq!(back.cloud_percentage_threshold, filter.cloud_percentage_threshold);
}
