//! Error types for the engine layer.

use thiserror::Error;

/// Errors produced while building or realizing a lazy raster graph.
///
/// Backend failures are opaque and fatal: they propagate unchanged with no
/// retry and no translation.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("unknown archive: {0}")]
    UnknownArchive(String),

    #[error("band not found: {0}")]
    BandNotFound(String),

    #[error("rename expects {expected} names, image has {actual} bands")]
    RenameMismatch { expected: usize, actual: usize },

    #[error("empty collection has no first image")]
    EmptyCollection,

    #[error("grid shape mismatch: {ar}x{ac} vs {br}x{bc}")]
    ShapeMismatch { ar: usize, ac: usize, br: usize, bc: usize },

    #[error("invalid expression: {0}")]
    Expression(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("missing property: {0}")]
    MissingProperty(String),

    #[error("region covers {pixels} pixels, exceeding the budget of {max_pixels}")]
    PixelBudget { pixels: u64, max_pixels: u64 },

    #[error("mapped-image placeholder evaluated outside map()")]
    InputOutsideMap,
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
