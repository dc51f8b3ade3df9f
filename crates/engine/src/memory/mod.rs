//! In-memory reference backend.
//!
//! Holds named archives of concrete [`SceneImage`]s and evaluates the lazy
//! graph over them. It is the reference semantics for every operation the
//! engine can describe, and the harness the domain layer is tested against.
//!
//! Reductions run at the scene's native grid; the `scale` argument of the
//! reducer interface is accepted for interface parity with scale-aware
//! backends.

pub mod grid;
pub mod scene;

mod eval;
mod reduce;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::expr::{CollectionExpr, Histogram, ImageExpr};
use crate::geometry::Region;
use crate::property::PropertyValue;
use crate::session::{RasterBackend, Session};

use eval::{Ctx, Evaluator};

pub use grid::Grid;
pub use scene::{SceneImage, TIME_START};

/// An in-memory raster backend over named scene archives.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    archives: HashMap<String, Vec<SceneImage>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register an archive under a name.
    pub fn with_archive(mut self, name: &str, scenes: Vec<SceneImage>) -> Self {
        self.archives.insert(name.to_string(), scenes);
        self
    }

    /// Wrap this backend in a session handle.
    pub fn into_session(self) -> Session {
        Session::new(Arc::new(self))
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.archives)
    }
}

impl RasterBackend for MemoryBackend {
    fn aggregate_strings(&self, collection: &CollectionExpr, field: &str) -> Result<Vec<String>> {
        let scenes = self.evaluator().collection(collection, Ctx::default())?;
        Ok(scenes
            .iter()
            .filter_map(|s| s.props().get(field).map(|v| v.to_string()))
            .collect())
    }

    fn size(&self, collection: &CollectionExpr) -> Result<usize> {
        Ok(self.evaluator().collection(collection, Ctx::default())?.len())
    }

    fn band_names(&self, image: &ImageExpr) -> Result<Vec<String>> {
        let scene = self.evaluator().image(image, Ctx::default())?;
        Ok(scene.band_names())
    }

    fn property(&self, image: &ImageExpr, key: &str) -> Result<Option<PropertyValue>> {
        let scene = self.evaluator().image(image, Ctx::default())?;
        Ok(scene.props().get(key).cloned())
    }

    fn histogram(
        &self,
        image: &ImageExpr,
        band: &str,
        region: &Region,
        _scale: f64,
        buckets: usize,
    ) -> Result<Option<Histogram>> {
        let scene = self.evaluator().image(image, Ctx::default())?;
        reduce::histogram_region(&scene, band, region, buckets)
    }
}
