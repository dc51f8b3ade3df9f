//! Recursive graph evaluator of the in-memory backend.
//!
//! Evaluation is purely functional over [`SceneImage`] values: every node
//! produces fresh scenes, and re-evaluating the same graph over the same
//! archives yields identical results.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};

use crate::error::{EngineError, Result};
use crate::expr::{
    CollectionExpr, CompareOp, ExprVar, ImageExpr, ListExpr, PropertyExpr,
};
use crate::formula;
use crate::memory::grid::Grid;
use crate::memory::reduce;
use crate::memory::scene::{SceneImage, TIME_START};
use crate::property::PropertyValue;

/// Evaluation context: the current image inside a `map` body, if any.
#[derive(Clone, Copy, Default)]
pub(crate) struct Ctx<'a> {
    pub input: Option<&'a SceneImage>,
}

/// Evaluates lazy graphs against a set of named archives.
pub(crate) struct Evaluator<'a> {
    archives: &'a HashMap<String, Vec<SceneImage>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(archives: &'a HashMap<String, Vec<SceneImage>>) -> Self {
        Self { archives }
    }

    // ── Collections ─────────────────────────────────────────────────

    pub fn collection(&self, expr: &CollectionExpr, ctx: Ctx<'_>) -> Result<Vec<SceneImage>> {
        match expr {
            CollectionExpr::Archive(name) => self
                .archives
                .get(name)
                .cloned()
                .ok_or_else(|| EngineError::UnknownArchive(name.clone())),

            CollectionExpr::FilterDate { input, start, end } => {
                let start_ms = parse_date_millis(start)?;
                let end_ms = parse_date_millis(end)?;
                let scenes = self.collection(input, ctx)?;
                Ok(scenes
                    .into_iter()
                    .filter(|s| {
                        s.timestamp()
                            .map(|t| t >= start_ms && t < end_ms)
                            .unwrap_or(false)
                    })
                    .collect())
            }

            CollectionExpr::FilterEq { input, field, value } => {
                let wanted = self
                    .property_value(value, None, ctx)?
                    .ok_or_else(|| EngineError::MissingProperty(field.clone()))?;
                let scenes = self.collection(input, ctx)?;
                Ok(scenes
                    .into_iter()
                    .filter(|s| s.props().get(field) == Some(&wanted))
                    .collect())
            }

            CollectionExpr::FilterIn { input, field, values } => {
                let wanted = self.list(values, ctx)?;
                let scenes = self.collection(input, ctx)?;
                Ok(scenes
                    .into_iter()
                    .filter(|s| {
                        s.props()
                            .get(field)
                            .map(|v| wanted.contains(v))
                            .unwrap_or(false)
                    })
                    .collect())
            }

            CollectionExpr::FilterLte { input, field, value } => {
                let scenes = self.collection(input, ctx)?;
                Ok(scenes
                    .into_iter()
                    .filter(|s| {
                        s.props()
                            .get(field)
                            .and_then(PropertyValue::as_num)
                            .map(|n| n <= *value)
                            .unwrap_or(false)
                    })
                    .collect())
            }

            CollectionExpr::Map { input, body } => {
                let scenes = self.collection(input, ctx)?;
                scenes
                    .iter()
                    .map(|scene| self.image(body, Ctx { input: Some(scene) }))
                    .collect()
            }

            CollectionExpr::Merge { first, second } => {
                let mut scenes = self.collection(first, ctx)?;
                scenes.extend(self.collection(second, ctx)?);
                Ok(scenes)
            }

            CollectionExpr::Sort { input, field } => {
                let mut scenes = self.collection(input, ctx)?;
                scenes.sort_by(|a, b| {
                    prop_ordering(a.props().get(field), b.props().get(field))
                });
                Ok(scenes)
            }

            CollectionExpr::FromImages(images) => images
                .iter()
                .map(|img| self.image(img, ctx))
                .collect(),
        }
    }

    // ── Images ──────────────────────────────────────────────────────

    pub fn image(&self, expr: &ImageExpr, ctx: Ctx<'_>) -> Result<SceneImage> {
        match expr {
            ImageExpr::Input => ctx
                .input
                .cloned()
                .ok_or(EngineError::InputOutsideMap),

            ImageExpr::First(collection) => {
                let scenes = self.collection(collection, ctx)?;
                scenes.into_iter().next().ok_or(EngineError::EmptyCollection)
            }

            ImageExpr::Mosaic(collection) => {
                let scenes = self.collection(collection, ctx)?;
                self.mosaic(&scenes)
            }

            ImageExpr::Select { input, bands } => {
                let scene = self.image(input, ctx)?;
                let mut selected = Vec::with_capacity(bands.len());
                for name in bands {
                    let grid = scene
                        .band(name)
                        .ok_or_else(|| EngineError::BandNotFound(name.clone()))?;
                    selected.push((name.clone(), grid.clone()));
                }
                let mut out = scene;
                out.set_bands(selected);
                Ok(out)
            }

            ImageExpr::Rename { input, names } => {
                let mut scene = self.image(input, ctx)?;
                if names.len() != scene.bands().len() {
                    return Err(EngineError::RenameMismatch {
                        expected: names.len(),
                        actual: scene.bands().len(),
                    });
                }
                let renamed = names
                    .iter()
                    .cloned()
                    .zip(scene.bands().iter().map(|(_, g)| g.clone()))
                    .collect();
                scene.set_bands(renamed);
                Ok(scene)
            }

            ImageExpr::AddBands { input, bands } => {
                let mut base = self.image(input, ctx)?;
                let extra = self.image(bands, ctx)?;
                check_shapes(&base, &extra)?;
                for (name, grid) in extra.bands() {
                    base.insert_band(name.clone(), grid.clone());
                }
                Ok(base)
            }

            ImageExpr::WithPixelArea { input } => {
                let mut scene = self.image(input, ctx)?;
                let (rows, cols) = scene.shape();
                let area = Grid::filled(rows, cols, scene.footprint().pixel_area());
                scene.insert_band("area".to_string(), area);
                Ok(scene)
            }

            ImageExpr::NormalizedDifference { input, first, second } => {
                let scene = self.image(input, ctx)?;
                let a = scene
                    .band(first)
                    .ok_or_else(|| EngineError::BandNotFound(first.clone()))?;
                let b = scene
                    .band(second)
                    .ok_or_else(|| EngineError::BandNotFound(second.clone()))?;
                let nd = a.zip_map(b, |x, y| {
                    let sum = x + y;
                    if sum.abs() < 1e-10 {
                        f64::NAN
                    } else {
                        (x - y) / sum
                    }
                })?;
                let mut out = SceneImage::new(scene.footprint());
                out.insert_band("nd".to_string(), nd);
                Ok(out)
            }

            ImageExpr::Scale { input, factor } => {
                self.map_bands(input, ctx, |v| v * factor)
            }

            ImageExpr::BitAnd { input, mask } => {
                let mask = *mask as i64;
                self.map_bands(input, ctx, move |v| ((v as i64) & mask) as f64)
            }

            ImageExpr::Compare { input, op, value } => {
                let op = *op;
                let value = *value;
                self.map_bands(input, ctx, move |v| {
                    let hit = match op {
                        CompareOp::Eq => v == value,
                        CompareOp::Neq => v != value,
                        CompareOp::Gte => v >= value,
                    };
                    if hit {
                        1.0
                    } else {
                        0.0
                    }
                })
            }

            ImageExpr::UpdateMask { input, mask } => {
                let scene = self.image(input, ctx)?;
                let mask_scene = self.image(mask, ctx)?;
                let mask_grid = mask_scene
                    .first_band()
                    .ok_or_else(|| EngineError::BandNotFound("mask".to_string()))?;
                let mut out = scene.clone();
                let masked = scene
                    .bands()
                    .iter()
                    .map(|(name, grid)| {
                        grid.zip_map(mask_grid, |v, m| if m == 0.0 { f64::NAN } else { v })
                            .map(|g| (name.clone(), g))
                    })
                    .collect::<Result<Vec<_>>>()?;
                out.set_bands(masked);
                Ok(out)
            }

            ImageExpr::Expression { formula: src, vars } => {
                self.expression(src, vars, ctx)
            }

            ImageExpr::CopyProperties { input, source } => {
                let mut scene = self.image(input, ctx)?;
                let source = self.image(source, ctx)?;
                for (key, value) in source.props() {
                    if !key.starts_with("system:") {
                        scene.props_mut().insert(key.clone(), value.clone());
                    }
                }
                Ok(scene)
            }

            ImageExpr::Set { input, key, value } => {
                let mut scene = self.image(input, ctx)?;
                let realized = self
                    .property_value(value, Some(&scene), ctx)?
                    .ok_or_else(|| EngineError::MissingProperty(key.clone()))?;
                scene.props_mut().insert(key.clone(), realized);
                Ok(scene)
            }
        }
    }

    // ── Scalars and lists ───────────────────────────────────────────

    fn property_value(
        &self,
        expr: &PropertyExpr,
        subject: Option<&SceneImage>,
        ctx: Ctx<'_>,
    ) -> Result<Option<PropertyValue>> {
        match expr {
            PropertyExpr::Literal(value) => Ok(Some(value.clone())),

            PropertyExpr::AcquisitionDate => {
                let subject = subject.ok_or_else(|| {
                    EngineError::Backend("acquisition date outside a property assignment".into())
                })?;
                let millis = subject
                    .timestamp()
                    .ok_or_else(|| EngineError::MissingProperty(TIME_START.to_string()))?;
                Ok(Some(PropertyValue::Str(format_date(millis)?)))
            }

            PropertyExpr::OfImage { image, key } => {
                let scene = self.image(image, ctx)?;
                Ok(scene.props().get(key).cloned())
            }

            PropertyExpr::SumRegion { source, band, region, max_pixels, .. } => {
                let scene = self.image(source, ctx)?;
                let sum = reduce::sum_region(&scene, band, region, *max_pixels)?;
                Ok(Some(PropertyValue::Num(sum)))
            }
        }
    }

    fn list(&self, expr: &ListExpr, ctx: Ctx<'_>) -> Result<Vec<PropertyValue>> {
        match expr {
            ListExpr::Literal(values) => Ok(values.clone()),
            ListExpr::AggregateArray { collection, field } => {
                let scenes = self.collection(collection, ctx)?;
                Ok(scenes
                    .iter()
                    .filter_map(|s| s.props().get(field).cloned())
                    .collect())
            }
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn map_bands<F>(&self, input: &ImageExpr, ctx: Ctx<'_>, f: F) -> Result<SceneImage>
    where
        F: Fn(f64) -> f64,
    {
        let mut scene = self.image(input, ctx)?;
        let mapped = scene
            .bands()
            .iter()
            .map(|(name, grid)| (name.clone(), grid.map(&f)))
            .collect();
        scene.set_bands(mapped);
        Ok(scene)
    }

    fn mosaic(&self, scenes: &[SceneImage]) -> Result<SceneImage> {
        let first = scenes.first().ok_or(EngineError::EmptyCollection)?;
        let (rows, cols) = first.shape();
        for scene in scenes {
            check_shapes(first, scene)?;
        }

        // Band union in first-seen order.
        let mut order: Vec<String> = Vec::new();
        for scene in scenes {
            for name in scene.band_names() {
                if !order.contains(&name) {
                    order.push(name);
                }
            }
        }

        let mut out = SceneImage::new(first.footprint());
        for name in order {
            let mut composite = Grid::filled(rows, cols, f64::NAN);
            for scene in scenes {
                if let Some(grid) = scene.band(&name) {
                    for row in 0..rows {
                        for col in 0..cols {
                            let v = grid.get(row, col);
                            if Grid::is_valid(v) {
                                composite.set(row, col, v);
                            }
                        }
                    }
                }
            }
            out.insert_band(name, composite);
        }
        Ok(out)
    }

    fn expression(
        &self,
        src: &str,
        vars: &[(String, ExprVar)],
        ctx: Ctx<'_>,
    ) -> Result<SceneImage> {
        let node = formula::parse(src)?;

        let mut numbers: Vec<(String, f64)> = Vec::new();
        let mut scenes: Vec<(String, SceneImage)> = Vec::new();
        for (name, var) in vars {
            match var {
                ExprVar::Number(n) => numbers.push((name.clone(), *n)),
                ExprVar::Image(img) => scenes.push((name.clone(), self.image(img, ctx)?)),
            }
        }

        let first = scenes
            .first()
            .map(|(_, s)| s)
            .ok_or_else(|| EngineError::Expression("formula has no image operands".into()))?;
        let (rows, cols) = first.shape();
        for (_, scene) in &scenes {
            check_shapes(first, scene)?;
        }

        let mut grids: Vec<(&str, &Grid)> = Vec::with_capacity(scenes.len());
        for (name, scene) in &scenes {
            let grid = scene.first_band().ok_or_else(|| {
                EngineError::Expression(format!("operand '{name}' has no bands"))
            })?;
            grids.push((name.as_str(), grid));
        }

        let footprint = first.footprint();
        let mut result = Grid::filled(rows, cols, f64::NAN);
        for row in 0..rows {
            for col in 0..cols {
                let value = node.eval(&|name: &str| {
                    grids
                        .iter()
                        .find(|(n, _)| *n == name)
                        .map(|(_, g)| g.get(row, col))
                        .or_else(|| {
                            numbers
                                .iter()
                                .find(|(n, _)| n == name)
                                .map(|(_, v)| *v)
                        })
                })?;
                result.set(row, col, value);
            }
        }

        let mut out = SceneImage::new(footprint);
        out.insert_band("expression".to_string(), result);
        Ok(out)
    }
}

fn check_shapes(a: &SceneImage, b: &SceneImage) -> Result<()> {
    if a.shape() != b.shape() {
        let (ar, ac) = a.shape();
        let (br, bc) = b.shape();
        return Err(EngineError::ShapeMismatch { ar, ac, br, bc });
    }
    Ok(())
}

fn prop_ordering(a: Option<&PropertyValue>, b: Option<&PropertyValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(PropertyValue::Str(x)), Some(PropertyValue::Str(y))) => x.cmp(y),
        (Some(PropertyValue::Num(x)), Some(PropertyValue::Num(y))) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (Some(PropertyValue::Num(_)), Some(PropertyValue::Str(_))) => Ordering::Less,
        (Some(PropertyValue::Str(_)), Some(PropertyValue::Num(_))) => Ordering::Greater,
    }
}

/// Parse a `YYYY-MM-DD` date to epoch milliseconds at midnight UTC.
pub(crate) fn parse_date_millis(date: &str) -> Result<i64> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(date.to_string()))?;
    let midnight = parsed
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| EngineError::InvalidDate(date.to_string()))?;
    Ok(midnight.and_utc().timestamp_millis())
}

/// Format epoch milliseconds as `YYYY-MM-DD` (UTC).
pub(crate) fn format_date(millis: i64) -> Result<String> {
    let dt = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| EngineError::Backend(format!("timestamp out of range: {millis}")))?;
    Ok(dt.format("%Y-%m-%d").to_string())
}
