//! Single-band raster grid used by the in-memory backend.

use ndarray::Array2;

use crate::error::{EngineError, Result};

/// A 2D grid of `f64` samples. NaN is the no-data value.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    data: Array2<f64>,
}

impl Grid {
    /// Create a grid filled with a value.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self { data: Array2::from_elem((rows, cols), value) }
    }

    /// Create a grid from row-major data.
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| EngineError::Backend(e.to_string()))?;
        Ok(Self { data: array })
    }

    /// Create a grid from an ndarray.
    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Value at (row, col); out-of-bounds reads are a caller bug.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[(row, col)] = value;
    }

    /// Whether a sample carries data.
    pub fn is_valid(value: f64) -> bool {
        !value.is_nan()
    }

    /// Apply a function to every valid sample; no-data is preserved.
    pub fn map<F>(&self, f: F) -> Grid
    where
        F: Fn(f64) -> f64,
    {
        Grid::from_array(self.data.mapv(|v| if v.is_nan() { v } else { f(v) }))
    }

    /// Combine two grids sample-wise; no-data in either input produces
    /// no-data in the output.
    pub fn zip_map<F>(&self, other: &Grid, f: F) -> Result<Grid>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(EngineError::ShapeMismatch {
                ar: self.rows(),
                ac: self.cols(),
                br: other.rows(),
                bc: other.cols(),
            });
        }
        let mut out = self.data.clone();
        ndarray::Zip::from(&mut out)
            .and(&other.data)
            .for_each(|v, &w| {
                *v = if v.is_nan() || w.is_nan() { f64::NAN } else { f(*v, w) };
            });
        Ok(Grid { data: out })
    }

    /// The underlying array.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}
