//! Lazy image-collection handle.

use std::sync::Arc;

use crate::error::Result;
use crate::expr::{CollectionExpr, ImageExpr, ListExpr, PropertyExpr};
use crate::image::Image;
use crate::property::PropertyValue;
use crate::session::Session;

/// An ordered, lazily-evaluated set of images sharing a band schema.
///
/// Conceptually immutable: every transform produces a new collection. The
/// graph is only executed when a realize method
/// ([`aggregate_string_array`](Self::aggregate_string_array),
/// [`size`](Self::size)) hands it to the backend.
#[derive(Debug, Clone)]
pub struct ImageCollection {
    session: Session,
    expr: Arc<CollectionExpr>,
}

impl ImageCollection {
    pub(crate) fn from_expr(session: Session, expr: CollectionExpr) -> Self {
        Self { session, expr: Arc::new(expr) }
    }

    /// Assemble a collection from explicit images, in order.
    pub fn from_images(session: &Session, images: &[Image]) -> Self {
        let exprs = images.iter().map(|img| img.expr().clone()).collect();
        Self::from_expr(session.clone(), CollectionExpr::FromImages(exprs))
    }

    /// The session this collection realizes through.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The underlying lazy expression.
    pub fn expr(&self) -> &Arc<CollectionExpr> {
        &self.expr
    }

    fn derive(&self, expr: CollectionExpr) -> ImageCollection {
        ImageCollection::from_expr(self.session.clone(), expr)
    }

    // ── Filters ─────────────────────────────────────────────────────

    /// Keep images acquired in `[start, end)` (`YYYY-MM-DD` bounds; start
    /// inclusive, end exclusive).
    pub fn filter_date(&self, start: &str, end: &str) -> ImageCollection {
        self.derive(CollectionExpr::FilterDate {
            input: self.expr.clone(),
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    /// Keep images whose property equals a literal value.
    pub fn filter_eq(&self, field: &str, value: impl Into<PropertyValue>) -> ImageCollection {
        self.filter_eq_expr(field, PropertyExpr::Literal(value.into()))
    }

    /// Keep images whose property equals a lazily evaluated value.
    pub fn filter_eq_expr(&self, field: &str, value: PropertyExpr) -> ImageCollection {
        self.derive(CollectionExpr::FilterEq {
            input: self.expr.clone(),
            field: field.to_string(),
            value,
        })
    }

    /// Keep images whose property is a member of a literal list.
    pub fn filter_in(&self, field: &str, values: Vec<PropertyValue>) -> ImageCollection {
        self.filter_in_expr(field, ListExpr::Literal(values))
    }

    /// Keep images whose property is a member of a lazily evaluated list.
    pub fn filter_in_expr(&self, field: &str, values: ListExpr) -> ImageCollection {
        self.derive(CollectionExpr::FilterIn {
            input: self.expr.clone(),
            field: field.to_string(),
            values,
        })
    }

    /// Keep images whose numeric property is `<=` a cap.
    pub fn filter_lte(&self, field: &str, value: f64) -> ImageCollection {
        self.derive(CollectionExpr::FilterLte {
            input: self.expr.clone(),
            field: field.to_string(),
            value,
        })
    }

    // ── Structure ───────────────────────────────────────────────────

    /// Map a pure per-image transform over the collection.
    ///
    /// The closure receives a placeholder image and the graph it builds
    /// becomes the map body; it runs once, now, and never touches the
    /// backend.
    pub fn map<F>(&self, f: F) -> ImageCollection
    where
        F: FnOnce(Image) -> Image,
    {
        let input = Image::from_expr(self.session.clone(), ImageExpr::Input);
        let body = f(input);
        self.derive(CollectionExpr::Map {
            input: self.expr.clone(),
            body: body.expr().clone(),
        })
    }

    /// Concatenate with another collection.
    pub fn merge(&self, other: &ImageCollection) -> ImageCollection {
        self.derive(CollectionExpr::Merge {
            first: self.expr.clone(),
            second: other.expr.clone(),
        })
    }

    /// Stable sort by a property value.
    pub fn sort(&self, field: &str) -> ImageCollection {
        self.derive(CollectionExpr::Sort {
            input: self.expr.clone(),
            field: field.to_string(),
        })
    }

    /// The first image in collection order (lazy; an empty collection is a
    /// backend error at evaluation time).
    pub fn first(&self) -> Image {
        Image::from_expr(self.session.clone(), ImageExpr::First(self.expr.clone()))
    }

    /// Mosaic the collection into one image: later images take precedence,
    /// earlier images show through only where later ones have no data.
    pub fn mosaic(&self) -> Image {
        Image::from_expr(self.session.clone(), ImageExpr::Mosaic(self.expr.clone()))
    }

    /// A lazy `aggregate_array(field)` reference, usable in membership
    /// filters without realizing anything.
    pub fn aggregate_array_expr(&self, field: &str) -> ListExpr {
        ListExpr::AggregateArray {
            collection: self.expr.clone(),
            field: field.to_string(),
        }
    }

    // ── Realization ─────────────────────────────────────────────────

    /// Realize the per-image values of a string property, in collection
    /// order. Images lacking the property are skipped.
    pub fn aggregate_string_array(&self, field: &str) -> Result<Vec<String>> {
        self.session.backend().aggregate_strings(&self.expr, field)
    }

    /// Realize the number of images in the collection.
    pub fn size(&self) -> Result<usize> {
        self.session.backend().size(&self.expr)
    }
}
