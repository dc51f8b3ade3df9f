//! Error types for the collection managers.

use thiserror::Error;

/// Errors raised while constructing or querying a collection manager.
#[derive(Error, Debug)]
pub enum CollectionError {
    /// Misconfigured filter input (e.g. an empty tile set).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The first image lacks bands a derived capability requires.
    /// Construction is all-or-nothing; no partial manager is returned.
    #[error("first image lacks bands required for {capability}: missing {missing:?}")]
    Schema {
        capability: &'static str,
        missing: Vec<String>,
    },

    /// A positional lookup past the end of the dates index.
    #[error("date index {index} out of bounds ({len} dates)")]
    IndexOutOfBounds { index: usize, len: usize },

    /// An engine/backend failure, propagated unchanged.
    #[error(transparent)]
    Engine(#[from] playa_engine::EngineError),
}

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, CollectionError>;
