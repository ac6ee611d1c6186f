//! Error types for the book mesher.

use crate::config::ComponentId;
use thiserror::Error;

/// Result type alias using BookError.
pub type Result<T> = std::result::Result<T, BookError>;

/// Validation failures for a book configuration.
///
/// These are raised synchronously before any layout math runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A required component has no color entry.
    #[error("missing color for component '{0}'")]
    MissingColor(ComponentId),

    /// A color string could not be parsed.
    #[error("invalid color '{value}' for component '{component}'")]
    InvalidColor { component: ComponentId, value: String },

    /// The view variant is not one of `closed` or `open`.
    #[error("unknown view variant: {0}")]
    UnknownViewVariant(String),

    /// Page count must lie in `1..=MAX_PAGE_COUNT`.
    #[error(
        "page count must be between 1 and {max}, got {0}",
        max = crate::config::MAX_PAGE_COUNT
    )]
    InvalidPageCount(i64),

    /// No preset exists with this name.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Main error type for book meshing operations.
#[derive(Error, Debug)]
pub enum BookError {
    /// The configuration failed validation.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to export mesh.
    #[error("Export error: {0}")]
    Export(String),
}
