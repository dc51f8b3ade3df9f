//! Legacy eager collection stitcher.
//!
//! Mosaics north/south scene pairs only when their dates match, ignoring
//! scenes without a partner. Unlike the managers' lazy
//! `collection_stitch`, this variant materializes both date lists up front
//! and loops over them, and it lets the caller choose which side's
//! metadata survives the mosaic.

use playa_engine::{Image, ImageCollection};

use crate::derived::DateIndexed;
use crate::error::Result;

/// Which side's metadata the mosaics carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySide {
    First,
    Second,
}

/// Eagerly inner-join two date-indexed collections and mosaic each matching
/// pair, in ascending date order.
///
/// Dates present on only one side are skipped. Returns the mosaicked
/// collection; wrap it in a manager with `from_collection` if the derived
/// views are needed.
pub fn collection_stitch<C: DateIndexed>(
    col1: &C,
    col2: &C,
    copy_properties_from: PropertySide,
) -> Result<ImageCollection> {
    let mut dates: Vec<&String> = col1.dates().iter().chain(col2.dates()).collect();
    dates.sort();
    dates.dedup();

    let session = col1.collection().session().clone();
    let mut mosaics: Vec<Image> = Vec::new();

    for date in dates {
        if !col1.dates().iter().any(|d| d == date) || !col2.dates().iter().any(|d| d == date) {
            continue;
        }
        let Some(first) = crate::derived::pick_by_date(col1.collection(), date)? else {
            continue;
        };
        let Some(second) = crate::derived::pick_by_date(col2.collection(), date)? else {
            continue;
        };

        let merged = ImageCollection::from_images(&session, &[first.clone(), second.clone()]);
        let keeper = match copy_properties_from {
            PropertySide::First => &first,
            PropertySide::Second => &second,
        };
        mosaics.push(merged.mosaic().copy_properties(keeper));
    }

    Ok(ImageCollection::from_images(&session, &mosaics))
}
