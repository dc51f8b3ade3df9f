//! Concrete multi-band scenes held by the in-memory backend.

use crate::geometry::Footprint;
use crate::memory::grid::Grid;
use crate::property::{PropertyMap, PropertyValue};

/// Key of the acquisition timestamp property (epoch milliseconds).
pub const TIME_START: &str = "system:time_start";

/// A realized multi-band raster with scalar metadata and a footprint.
///
/// Band order is significant: positional rename and select operate on it.
#[derive(Debug, Clone)]
pub struct SceneImage {
    bands: Vec<(String, Grid)>,
    props: PropertyMap,
    footprint: Footprint,
}

impl SceneImage {
    /// Create an empty scene with the given footprint.
    pub fn new(footprint: Footprint) -> Self {
        Self {
            bands: Vec::new(),
            props: PropertyMap::new(),
            footprint,
        }
    }

    /// Builder: append a band (replacing any same-named band).
    pub fn with_band(mut self, name: &str, grid: Grid) -> Self {
        self.insert_band(name.to_string(), grid);
        self
    }

    /// Builder: set a scalar property.
    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    /// Builder: set the acquisition timestamp (epoch milliseconds).
    pub fn with_timestamp(self, millis: i64) -> Self {
        self.with_property(TIME_START, millis as f64)
    }

    /// Append a band, replacing any same-named band in place.
    pub fn insert_band(&mut self, name: String, grid: Grid) {
        if let Some(slot) = self.bands.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = grid;
        } else {
            self.bands.push((name, grid));
        }
    }

    pub fn band(&self, name: &str) -> Option<&Grid> {
        self.bands.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }

    /// The first band, if any.
    pub fn first_band(&self) -> Option<&Grid> {
        self.bands.first().map(|(_, g)| g)
    }

    pub fn band_names(&self) -> Vec<String> {
        self.bands.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn bands(&self) -> &[(String, Grid)] {
        &self.bands
    }

    /// Replace the band list wholesale.
    pub fn set_bands(&mut self, bands: Vec<(String, Grid)>) {
        self.bands = bands;
    }

    pub fn props(&self) -> &PropertyMap {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut PropertyMap {
        &mut self.props
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Grid dimensions as (rows, cols); (0, 0) for a band-less scene.
    pub fn shape(&self) -> (usize, usize) {
        self.first_band().map(|g| g.shape()).unwrap_or((0, 0))
    }

    /// The acquisition timestamp, if tagged.
    pub fn timestamp(&self) -> Option<i64> {
        self.props
            .get(TIME_START)
            .and_then(PropertyValue::as_num)
            .map(|ms| ms as i64)
    }
}
