//! Lazy single-image handle.

use std::sync::Arc;

use crate::error::Result;
use crate::expr::{CompareOp, ExprVar, Histogram, ImageExpr, PropertyExpr};
use crate::geometry::Region;
use crate::property::PropertyValue;
use crate::session::Session;

/// A lazy multi-band image.
///
/// Every transform returns a new `Image`; nothing executes until a realize
/// method ([`band_names`](Self::band_names), [`property`](Self::property),
/// [`region_histogram`](Self::region_histogram)) hands the graph to the
/// backend.
#[derive(Debug, Clone)]
pub struct Image {
    session: Session,
    expr: Arc<ImageExpr>,
}

/// An operand bound to a named placeholder in [`Image::expression`].
#[derive(Debug, Clone)]
pub enum Operand {
    Image(Image),
    Number(f64),
}

impl From<&Image> for Operand {
    fn from(img: &Image) -> Self {
        Operand::Image(img.clone())
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl Image {
    pub(crate) fn from_expr(session: Session, expr: ImageExpr) -> Self {
        Self { session, expr: Arc::new(expr) }
    }

    /// The underlying lazy expression.
    pub fn expr(&self) -> &Arc<ImageExpr> {
        &self.expr
    }

    fn derive(&self, expr: ImageExpr) -> Image {
        Image::from_expr(self.session.clone(), expr)
    }

    // ── Band selection ──────────────────────────────────────────────

    /// Select a subset of bands, in the given order.
    ///
    /// A missing band is not an error here; it surfaces when the graph is
    /// evaluated by the backend.
    pub fn select(&self, bands: &[&str]) -> Image {
        self.derive(ImageExpr::Select {
            input: self.expr.clone(),
            bands: bands.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Rename every band positionally. The name count must equal the band
    /// count when the graph is evaluated.
    pub fn rename(&self, names: &[&str]) -> Image {
        self.derive(ImageExpr::Rename {
            input: self.expr.clone(),
            names: names.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Append the bands of `other`, replacing any same-named band.
    pub fn add_bands(&self, other: &Image) -> Image {
        self.derive(ImageExpr::AddBands {
            input: self.expr.clone(),
            bands: other.expr.clone(),
        })
    }

    /// Append a band named `area` holding the per-pixel area.
    pub fn with_pixel_area(&self) -> Image {
        self.derive(ImageExpr::WithPixelArea { input: self.expr.clone() })
    }

    // ── Per-pixel arithmetic ────────────────────────────────────────

    /// `(first - second) / (first + second)` between two bands, as a single
    /// band named `nd`. The result carries no properties of its own.
    pub fn normalized_difference(&self, first: &str, second: &str) -> Image {
        self.derive(ImageExpr::NormalizedDifference {
            input: self.expr.clone(),
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    /// Multiply every band by a constant.
    pub fn multiply(&self, factor: f64) -> Image {
        self.derive(ImageExpr::Scale { input: self.expr.clone(), factor })
    }

    /// Bitwise AND of every band with a flag mask.
    pub fn bit_and(&self, mask: u32) -> Image {
        self.derive(ImageExpr::BitAnd { input: self.expr.clone(), mask })
    }

    /// Per-pixel `== value`, producing 1/0 bands.
    pub fn eq(&self, value: f64) -> Image {
        self.compare(CompareOp::Eq, value)
    }

    /// Per-pixel `!= value`, producing 1/0 bands.
    pub fn neq(&self, value: f64) -> Image {
        self.compare(CompareOp::Neq, value)
    }

    /// Per-pixel `>= value`, producing 1/0 bands.
    pub fn gte(&self, value: f64) -> Image {
        self.compare(CompareOp::Gte, value)
    }

    fn compare(&self, op: CompareOp, value: f64) -> Image {
        self.derive(ImageExpr::Compare { input: self.expr.clone(), op, value })
    }

    /// Mask this image by a boolean raster: pixels where `mask` is zero or
    /// no-data become no-data (never zero).
    pub fn update_mask(&self, mask: &Image) -> Image {
        self.derive(ImageExpr::UpdateMask {
            input: self.expr.clone(),
            mask: mask.expr.clone(),
        })
    }

    /// Evaluate an arithmetic formula over named operands.
    ///
    /// Supports `+ - * /`, unary minus, parentheses and `log()` (natural
    /// logarithm). Image operands contribute their first band. The result is
    /// a single band named `expression` with no properties of its own.
    pub fn expression(&self, formula: &str, vars: &[(&str, Operand)]) -> Image {
        let vars = vars
            .iter()
            .map(|(name, operand)| {
                let var = match operand {
                    Operand::Image(img) => ExprVar::Image(img.expr.clone()),
                    Operand::Number(n) => ExprVar::Number(*n),
                };
                (name.to_string(), var)
            })
            .collect();
        self.derive(ImageExpr::Expression { formula: formula.to_string(), vars })
    }

    // ── Properties ──────────────────────────────────────────────────

    /// Copy the source image's non-`system:` properties onto this image.
    pub fn copy_properties(&self, source: &Image) -> Image {
        self.derive(ImageExpr::CopyProperties {
            input: self.expr.clone(),
            source: source.expr.clone(),
        })
    }

    /// Attach (or overwrite) a literal property.
    pub fn set(&self, key: &str, value: impl Into<PropertyValue>) -> Image {
        self.set_expr(key, PropertyExpr::Literal(value.into()))
    }

    /// Attach (or overwrite) a lazily computed property.
    pub fn set_expr(&self, key: &str, value: PropertyExpr) -> Image {
        self.derive(ImageExpr::Set {
            input: self.expr.clone(),
            key: key.to_string(),
            value,
        })
    }

    /// A lazy reference to one of this image's properties, usable in filters
    /// and property assignments without realizing anything.
    pub fn property_expr(&self, key: &str) -> PropertyExpr {
        PropertyExpr::OfImage {
            image: self.expr.clone(),
            key: key.to_string(),
        }
    }

    // ── Realization ─────────────────────────────────────────────────

    /// Realize the band names, in band order.
    pub fn band_names(&self) -> Result<Vec<String>> {
        self.session.backend().band_names(&self.expr)
    }

    /// Realize a property. Absent keys realize to `None`.
    pub fn property(&self, key: &str) -> Result<Option<PropertyValue>> {
        self.session.backend().property(&self.expr, key)
    }

    /// Realize a fixed-bucket histogram of a band over a region. `None` when
    /// the region holds no valid pixels.
    pub fn region_histogram(
        &self,
        band: &str,
        region: &Region,
        scale: f64,
        buckets: usize,
    ) -> Result<Option<Histogram>> {
        self.session
            .backend()
            .histogram(&self.expr, band, region, scale, buckets)
    }
}
