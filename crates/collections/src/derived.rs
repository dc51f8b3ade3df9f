//! Date-indexed collection machinery shared by the managers and their
//! derived views.
//!
//! A derived view (masked clouds, an index, surface temperature) owns no
//! storage of its own: it pairs a lazy collection with its parent's dates
//! index, so positional and date-keyed lookup keep working without
//! re-validating the parent's band schema.

use playa_engine::{Image, ImageCollection, PropertyExpr};

use crate::bands::DATE_FILTER;
use crate::error::{CollectionError, Result};

/// Tag an image with its normalized acquisition date (`Date_Filter`).
///
/// Applied once, at ingestion; every later transform carries the tag
/// forward.
pub fn tag_acquisition_date(image: &Image) -> Image {
    image.set_expr(DATE_FILTER, PropertyExpr::AcquisitionDate)
}

/// Anything that exposes a date-sorted collection and its dates index.
pub trait DateIndexed {
    fn collection(&self) -> &ImageCollection;
    fn dates(&self) -> &[String];
}

/// A named lazy view over a parent collection, indexed by the parent's
/// dates.
#[derive(Debug, Clone)]
pub struct DerivedCollection {
    collection: ImageCollection,
    dates: Vec<String>,
}

impl DerivedCollection {
    pub(crate) fn new(collection: ImageCollection, dates: &[String]) -> Self {
        Self {
            collection,
            dates: dates.to_vec(),
        }
    }

    /// The lazy collection behind this view.
    pub fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    /// The dates index, in the parent's sort order.
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Positional lookup through the dates index.
    pub fn image_grab(&self, index: usize) -> Result<Option<Image>> {
        grab_by_index(&self.collection, &self.dates, index)
    }

    /// Date-keyed lookup; an absent date is a typed `None`.
    pub fn image_pick(&self, date: &str) -> Result<Option<Image>> {
        pick_by_date(&self.collection, date)
    }
}

impl DateIndexed for DerivedCollection {
    fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    fn dates(&self) -> &[String] {
        &self.dates
    }
}

/// Resolve the date at `index`, then return the first image carrying it.
///
/// An out-of-range index is a caller error; a date with no matching image
/// is a typed absence.
pub(crate) fn grab_by_index(
    collection: &ImageCollection,
    dates: &[String],
    index: usize,
) -> Result<Option<Image>> {
    let date = dates.get(index).ok_or(CollectionError::IndexOutOfBounds {
        index,
        len: dates.len(),
    })?;
    pick_by_date(collection, date)
}

/// First image whose `Date_Filter` equals `date`, if any.
pub(crate) fn pick_by_date(collection: &ImageCollection, date: &str) -> Result<Option<Image>> {
    let matched = collection.filter_eq(DATE_FILTER, date);
    if matched.size()? == 0 {
        Ok(None)
    } else {
        Ok(Some(matched.first()))
    }
}

/// Constructor-time schema check for one derived capability.
pub(crate) fn require_bands(
    capability: &'static str,
    available: &[String],
    required: &[&str],
) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|b| !available.iter().any(|a| a == **b))
        .map(|b| b.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CollectionError::Schema { capability, missing })
    }
}
