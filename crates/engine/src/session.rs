//! Backend capability interface and session handle.
//!
//! The backend is an opaque service: this layer hands it a lazy graph and
//! blocks until a concrete scalar or small list comes back. Backends do all
//! scheduling and heavy computation; an error from the backend is fatal and
//! propagates unchanged.

use std::sync::Arc;

use crate::collection::ImageCollection;
use crate::error::Result;
use crate::expr::{CollectionExpr, Histogram, ImageExpr};
use crate::geometry::Region;
use crate::property::PropertyValue;

/// Realization entry points of a raster-processing backend.
///
/// Everything not on this trait stays in the lazy graph. Implementations are
/// synchronous request/response: each call blocks until the backend returns a
/// result or an error.
pub trait RasterBackend: Send + Sync {
    /// Realize `aggregate_array(field)` over a collection, in collection
    /// order. Images lacking the property are skipped.
    fn aggregate_strings(&self, collection: &CollectionExpr, field: &str) -> Result<Vec<String>>;

    /// Realize the number of images in a collection.
    fn size(&self, collection: &CollectionExpr) -> Result<usize>;

    /// Realize the band names of an image, in band order.
    fn band_names(&self, image: &ImageExpr) -> Result<Vec<String>>;

    /// Realize a property of an image, computing lazily attached reductions
    /// on demand. Absent keys realize to `None`.
    fn property(&self, image: &ImageExpr, key: &str) -> Result<Option<PropertyValue>>;

    /// Realize a fixed-bucket histogram of a band over a region. Returns
    /// `None` when the region holds no valid pixels.
    fn histogram(
        &self,
        image: &ImageExpr,
        band: &str,
        region: &Region,
        scale: f64,
        buckets: usize,
    ) -> Result<Option<Histogram>>;
}

/// A handle on a backend session.
///
/// Sessions are passed explicitly into every component constructor; there is
/// no process-global connection state. Cloning is cheap.
#[derive(Clone)]
pub struct Session {
    backend: Arc<dyn RasterBackend>,
}

impl Session {
    pub fn new(backend: Arc<dyn RasterBackend>) -> Self {
        Self { backend }
    }

    /// The backend this session talks to.
    pub fn backend(&self) -> &Arc<dyn RasterBackend> {
        &self.backend
    }

    /// Open a named archive as a lazy, filterable collection.
    pub fn archive(&self, name: &str) -> ImageCollection {
        ImageCollection::from_expr(self.clone(), CollectionExpr::Archive(name.to_string()))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
